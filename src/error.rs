//! Error types for incident segmentation.

use thiserror::Error;

use crate::types::page::DocumentId;

/// Result type alias for incident segmentation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for incident segmentation operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered the save request with a non-success status.
    #[error("saving segments for document {document} failed with status {status}")]
    Status {
        document: DocumentId,
        status: reqwest::StatusCode,
    },

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A segment ends past the last page of the document.
    #[error("segment end {end} is out of range for document {document} with {pages} pages")]
    SegmentOutOfRange {
        document: DocumentId,
        end: usize,
        pages: usize,
    },

    /// A page position does not exist in the document.
    #[error("page {position} is out of range for document {document} with {pages} pages")]
    PageOutOfRange {
        document: DocumentId,
        position: usize,
        pages: usize,
    },

    /// The document is not part of the loaded markup.
    #[error("document {0} is not loaded")]
    UnknownDocument(DocumentId),
}
