use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Class carried by every page element of a document container.
pub const PAGE_IMAGE_CLASS: &str = "page-image";
/// Class marking a page as the last page of its segment.
pub const SEGMENT_END_CLASS: &str = "end";

/// Identifier scoping a page sequence to one reviewed document.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl DocumentId {
    /// Id of the markup container holding this document's pages.
    pub fn container_id(&self) -> String {
        format!("pdoc-{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display data for one page image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ImageDescriptor {
    pub url: String,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

/// One element in a document container.
#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    pub image: ImageDescriptor,
    pub classes: BTreeSet<String>,
}

impl PageElement {
    /// Creates a page-image element with no segment marker.
    pub fn page_image(image: ImageDescriptor) -> Self {
        let mut classes = BTreeSet::new();
        classes.insert(PAGE_IMAGE_CLASS.to_string());
        PageElement { image, classes }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn is_segment_end(&self) -> bool {
        self.has_class(SEGMENT_END_CLASS)
    }
}
