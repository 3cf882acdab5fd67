//! In-memory page markup.
//!
//! Each document owns a container keyed `pdoc-{id}` whose `page-image`
//! elements, in order, are the document's pages. The `end` class on a page is
//! the segment end marker and the only segment state kept while editing.

use std::collections::BTreeMap;

use crate::types::page::{
    DocumentId, ImageDescriptor, PageElement, PAGE_IMAGE_CLASS, SEGMENT_END_CLASS,
};

#[derive(Debug, Clone, Default)]
pub struct Markup {
    containers: BTreeMap<String, Vec<PageElement>>,
    order: Vec<DocumentId>,
}

impl Markup {
    pub fn new() -> Self {
        Markup::default()
    }

    /// Adds (or replaces) a document container with unmarked page images.
    pub fn insert_document(&mut self, document: DocumentId, images: Vec<ImageDescriptor>) {
        let elements = images.into_iter().map(PageElement::page_image).collect();
        if self
            .containers
            .insert(document.container_id(), elements)
            .is_none()
        {
            self.order.push(document);
        }
    }

    /// Adds a raw element to a document container, creating the container if needed.
    pub fn push_element(&mut self, document: DocumentId, element: PageElement) {
        let container = self.containers.entry(document.container_id()).or_default();
        if container.is_empty() && !self.order.contains(&document) {
            self.order.push(document);
        }
        container.push(element);
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> &[DocumentId] {
        &self.order
    }

    pub fn contains_document(&self, document: DocumentId) -> bool {
        self.containers.contains_key(&document.container_id())
    }

    /// Page elements of a document in order. An unknown document has no pages.
    pub fn pages(&self, document: DocumentId) -> Vec<&PageElement> {
        self.containers
            .get(&document.container_id())
            .map(|elements| {
                elements
                    .iter()
                    .filter(|el| el.has_class(PAGE_IMAGE_CLASS))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pages_mut(&mut self, document: DocumentId) -> Vec<&mut PageElement> {
        self.containers
            .get_mut(&document.container_id())
            .map(|elements| {
                elements
                    .iter_mut()
                    .filter(|el| el.has_class(PAGE_IMAGE_CLASS))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Segment end marker of every page, in page order.
    pub fn end_markers(&self, document: DocumentId) -> Vec<bool> {
        self.pages(document)
            .iter()
            .map(|page| page.has_class(SEGMENT_END_CLASS))
            .collect()
    }
}
