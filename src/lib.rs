//! Page segmentation for document review.
//!
//! Reviewers group the pages of a document into contiguous incidents by
//! marking the last page of each one. This crate derives `[start, end]`
//! segment lists from those markers, saves them to the review server,
//! re-applies saved lists and drives the hover-zoom overlay.

pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod manifest;
pub mod markup;
pub mod segmentable;
pub mod types {
    pub mod page;
    pub mod segments;
}
pub mod zoom;

pub use error::{Error, Result};
pub use segmentable::Segmentable;
pub use types::page::DocumentId;
pub use types::segments::{Segment, SegmentList};
