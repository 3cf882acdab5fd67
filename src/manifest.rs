use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::page::{DocumentId, ImageDescriptor};
use crate::types::segments::SegmentList;

/// One document as rendered by the host page: its page images and the
/// segment list saved for it last time, if any.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    pub pages: Vec<ImageDescriptor>,
    #[serde(default)]
    pub incident_pgs: Option<SegmentList>,
}

impl ManifestDocument {
    pub fn display_name(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => format!("{} (#{})", title, self.id),
            _ => format!("Document #{}", self.id),
        }
    }
}

/// Initial review state supplied by the host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    pub documents: Vec<ManifestDocument>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a manifest from a JSON file.
    pub fn load(file_path: &Path) -> Result<Self> {
        let file = File::open(file_path).map_err(|source| Error::Io {
            path: file_path.display().to_string(),
            source,
        })?;
        let manifest: Manifest = serde_json::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %file_path.display(),
            documents = manifest.documents.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn document(&self, id: DocumentId) -> Option<&ManifestDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }
}
