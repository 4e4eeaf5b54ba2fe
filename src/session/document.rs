//! Saved report document.
//!
//! The document is what save/load collaborators receive: the report's name
//! and its composition. Result rows, drill levels and transient filter
//! inputs are not part of it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::Composition;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read report document: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid report document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported document version {found} (expected at most {DOCUMENT_VERSION})")]
    UnsupportedVersion { found: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub composition: Composition,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl ReportDocument {
    pub fn new(name: impl Into<String>, composition: Composition) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            name: name.into(),
            composition,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: ReportDocument = serde_json::from_str(json)?;
        if doc.version > DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion { found: doc.version });
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
