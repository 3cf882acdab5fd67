//! Segmentation helper for the review interface.
//!
//! Reads segment boundaries out of the page markup, sends them to the server,
//! writes saved boundaries back into the markup and drives the zoom overlay.

use crate::client::{SaveReceipt, SegmentClient};
use crate::config::Config;
use crate::cookie::csrf_token;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::markup::Markup;
use crate::types::page::{DocumentId, ImageDescriptor, PageElement, SEGMENT_END_CLASS};
use crate::types::segments::SegmentList;
use crate::zoom::{PointerEvent, ZoomOverlay};

/// Tracing target for segmentation operations.
pub const TRACING_TARGET: &str = "incident_segmenter::segmentable";

#[derive(Debug)]
pub struct Segmentable {
    markup: Markup,
    overlay: ZoomOverlay,
    cookie_header: String,
    client: SegmentClient,
}

/// A save that owns everything it needs, so it can run on another task.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub document: DocumentId,
    pub segments: SegmentList,
    pub csrf_token: Option<String>,
    client: SegmentClient,
}

impl SaveRequest {
    pub async fn send(self) -> Result<SaveReceipt> {
        self.client
            .save_segments(self.document, &self.segments, self.csrf_token.as_deref())
            .await
    }
}

impl Segmentable {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Segmentable {
            markup: Markup::new(),
            overlay: ZoomOverlay::new(config.zoom_scale_percent as f64),
            cookie_header: config.cookie.clone().unwrap_or_default(),
            client: SegmentClient::new(config)?,
        })
    }

    /// Builds the markup from a manifest and applies each document's saved segments.
    ///
    /// Saved segments that do not fit their document are logged and skipped,
    /// leaving that document unmarked.
    pub fn from_manifest(config: &Config, manifest: &Manifest) -> Result<Self> {
        let mut segmentable = Segmentable::new(config)?;
        for document in &manifest.documents {
            segmentable
                .markup
                .insert_document(document.id, document.pages.clone());
            if let Err(e) = segmentable.apply_segments(document.id, document.incident_pgs.as_ref()) {
                tracing::warn!(target: TRACING_TARGET, document = %document.id, error = %e, "ignoring saved segments");
            }
        }
        Ok(segmentable)
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn markup_mut(&mut self) -> &mut Markup {
        &mut self.markup
    }

    pub fn overlay(&self) -> &ZoomOverlay {
        &self.overlay
    }

    pub fn set_cookie_header(&mut self, cookie_header: impl Into<String>) {
        self.cookie_header = cookie_header.into();
    }

    /// Page elements of a document, in order. Unknown documents have none.
    pub fn locate_pages(&self, document: DocumentId) -> Vec<&PageElement> {
        self.markup.pages(document)
    }

    /// Segment list currently encoded in the document's end markers.
    pub fn segment_list(&self, document: DocumentId) -> SegmentList {
        SegmentList::from_end_markers(&self.markup.end_markers(document))
    }

    pub fn csrf_token(&self) -> Option<String> {
        csrf_token(&self.cookie_header)
    }

    /// Captures the current segment list and token for a later `send`.
    pub fn save_request(&self, document: DocumentId) -> SaveRequest {
        let segments = self.segment_list(document);
        tracing::debug!(target: TRACING_TARGET, %document, ?segments, "derived segments");
        SaveRequest {
            document,
            segments,
            csrf_token: self.csrf_token(),
            client: self.client.clone(),
        }
    }

    /// Sends the document's current segment list to the server.
    pub async fn save_segments(&self, document: DocumentId) -> Result<SaveReceipt> {
        self.save_request(document).send().await
    }

    /// Replaces the document's end markers with those of `segments`.
    ///
    /// Every segment end is checked against the page count before anything
    /// changes; `None` or an empty list just clears the markers.
    pub fn apply_segments(
        &mut self,
        document: DocumentId,
        segments: Option<&SegmentList>,
    ) -> Result<()> {
        let mut pages = self.markup.pages_mut(document);
        let page_count = pages.len();

        if let Some(end) = segments.and_then(SegmentList::max_end) {
            if end >= page_count {
                return Err(Error::SegmentOutOfRange {
                    document,
                    end,
                    pages: page_count,
                });
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            %document,
            segments = segments.map_or(0, SegmentList::len),
            "applying segments"
        );

        for page in pages.iter_mut() {
            page.remove_class(SEGMENT_END_CLASS);
        }
        for segment in segments.into_iter().flatten() {
            pages[segment.end].add_class(SEGMENT_END_CLASS);
        }
        Ok(())
    }

    /// Flips the end marker of one page and returns its new state.
    pub fn toggle_end(&mut self, document: DocumentId, position: usize) -> Result<bool> {
        if !self.markup.contains_document(document) {
            return Err(Error::UnknownDocument(document));
        }
        let mut pages = self.markup.pages_mut(document);
        let page_count = pages.len();
        let page = pages.get_mut(position).ok_or(Error::PageOutOfRange {
            document,
            position,
            pages: page_count,
        })?;

        let marked = !page.is_segment_end();
        if marked {
            page.add_class(SEGMENT_END_CLASS);
        } else {
            page.remove_class(SEGMENT_END_CLASS);
        }
        Ok(marked)
    }

    pub fn zoom_page(&mut self, image: &ImageDescriptor, event: &PointerEvent) {
        self.overlay.zoom_in(image, event);
    }

    pub fn zoom_out(&mut self, image: &ImageDescriptor) {
        self.overlay.zoom_out(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmentable_with(doc: DocumentId, pages: usize) -> Segmentable {
        let mut segmentable = Segmentable::new(&Config::default()).unwrap();
        let images = (0..pages)
            .map(|i| ImageDescriptor {
                url: format!("/media/{doc}/{i}.png"),
                width: 100.0,
                height: 100.0,
            })
            .collect();
        segmentable.markup_mut().insert_document(doc, images);
        segmentable
    }

    #[test]
    fn test_derive_from_toggled_markers() {
        let doc = DocumentId(5);
        let mut segmentable = segmentable_with(doc, 5);
        assert!(segmentable.toggle_end(doc, 1).unwrap());
        assert!(segmentable.toggle_end(doc, 4).unwrap());

        assert_eq!(
            segmentable.segment_list(doc),
            SegmentList::from(vec![(0, 1), (2, 4)])
        );
    }

    #[test]
    fn test_apply_marks_exactly_segment_ends() {
        let doc = DocumentId(5);
        let mut segmentable = segmentable_with(doc, 5);
        segmentable.toggle_end(doc, 2).unwrap();

        let list = SegmentList::from(vec![(0, 1), (2, 4)]);
        segmentable.apply_segments(doc, Some(&list)).unwrap();

        assert_eq!(
            segmentable.markup().end_markers(doc),
            vec![false, true, false, false, true]
        );
    }

    #[test]
    fn test_derive_apply_derive_is_stable() {
        let doc = DocumentId(9);
        let mut segmentable = segmentable_with(doc, 7);
        for position in [0, 3, 4] {
            segmentable.toggle_end(doc, position).unwrap();
        }
        let before = segmentable.markup().end_markers(doc);
        let derived = segmentable.segment_list(doc);

        segmentable.apply_segments(doc, None).unwrap();
        assert_eq!(segmentable.markup().end_markers(doc), vec![false; 7]);

        segmentable.apply_segments(doc, Some(&derived)).unwrap();
        let mut expected = before.clone();
        // the last page always closes its segment
        expected[6] = true;
        assert_eq!(segmentable.markup().end_markers(doc), expected);
        assert_eq!(segmentable.segment_list(doc), derived);
    }

    #[test]
    fn test_out_of_range_apply_leaves_markers_untouched() {
        let doc = DocumentId(1);
        let mut segmentable = segmentable_with(doc, 3);
        segmentable.toggle_end(doc, 0).unwrap();

        let err = segmentable
            .apply_segments(doc, Some(&SegmentList::from(vec![(0, 1), (2, 3)])))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SegmentOutOfRange { end: 3, pages: 3, .. }
        ));
        assert_eq!(segmentable.markup().end_markers(doc), vec![true, false, false]);
    }

    #[test]
    fn test_missing_document_is_a_no_op() {
        let mut segmentable = Segmentable::new(&Config::default()).unwrap();
        let doc = DocumentId(404);
        assert!(segmentable.locate_pages(doc).is_empty());
        assert!(segmentable.segment_list(doc).is_empty());
        segmentable.apply_segments(doc, None).unwrap();
        segmentable
            .apply_segments(doc, Some(&SegmentList::new()))
            .unwrap();
    }

    #[test]
    fn test_toggle_errors() {
        let doc = DocumentId(2);
        let mut segmentable = segmentable_with(doc, 2);
        assert!(matches!(
            segmentable.toggle_end(doc, 2),
            Err(Error::PageOutOfRange { position: 2, pages: 2, .. })
        ));
        assert!(matches!(
            segmentable.toggle_end(DocumentId(3), 0),
            Err(Error::UnknownDocument(DocumentId(3)))
        ));
        assert!(segmentable.toggle_end(doc, 0).unwrap());
        assert!(!segmentable.toggle_end(doc, 0).unwrap());
    }

    #[test]
    fn test_save_request_captures_token_and_segments() {
        let config = Config {
            cookie: Some("sessionid=x; csrftoken=abc%20def".to_string()),
            ..Default::default()
        };
        let doc = DocumentId(8);
        let mut segmentable = Segmentable::new(&config).unwrap();
        segmentable
            .markup_mut()
            .insert_document(doc, vec![ImageDescriptor::default(); 3]);

        let request = segmentable.save_request(doc);
        assert_eq!(request.csrf_token.as_deref(), Some("abc def"));
        assert_eq!(request.segments, SegmentList::from(vec![(0, 2)]));

        segmentable.set_cookie_header("");
        assert!(segmentable.save_request(doc).csrf_token.is_none());
    }

    #[test]
    fn test_from_manifest_applies_saved_segments() {
        let manifest = Manifest::from_json(
            r#"{"documents": [
                {"id": 1, "pages": [{"url": "a"}, {"url": "b"}, {"url": "c"}], "incident_pgs": [[0, 0], [1, 2]]},
                {"id": 2, "pages": [{"url": "d"}], "incident_pgs": [[0, 5]]}
            ]}"#,
        )
        .unwrap();
        let segmentable = Segmentable::from_manifest(&Config::default(), &manifest).unwrap();

        assert_eq!(
            segmentable.markup().end_markers(DocumentId(1)),
            vec![true, false, true]
        );
        assert_eq!(segmentable.markup().end_markers(DocumentId(2)), vec![false]);
        assert_eq!(segmentable.markup().documents(), &[DocumentId(1), DocumentId(2)]);
    }
}
