//! Per-item outcomes of an import batch
//!
//! Each source path gets its own outcome so one failure never hides the
//! result of the others.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to the description of a copied image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DescriptionOutcome {
    /// Description generated and persisted under this artifact key
    Stored(String),
    /// No description generator configured
    Skipped,
    /// Generation or persistence failed; the image copy is kept
    Failed(String),
}

/// Result for a single source path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestStatus {
    /// Image copied into the managed directory
    Copied { description: DescriptionOutcome },
    /// Image not copied
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Path as supplied by the caller
    pub source: PathBuf,
    /// Destination file name, when one could be derived
    pub file_name: Option<String>,
    pub status: IngestStatus,
}

impl IngestOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self.status, IngestStatus::Copied { .. })
    }

    pub fn is_described(&self) -> bool {
        matches!(
            self.status,
            IngestStatus::Copied {
                description: DescriptionOutcome::Stored(_)
            }
        )
    }

    /// Artifact key of the stored description, if any
    pub fn description_key(&self) -> Option<&str> {
        match &self.status {
            IngestStatus::Copied {
                description: DescriptionOutcome::Stored(key),
            } => Some(key),
            _ => None,
        }
    }
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub imported: usize,
    pub failed: usize,
    pub described: usize,
}

impl IngestSummary {
    pub fn from_outcomes(outcomes: &[IngestOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut acc, outcome| {
            if outcome.is_copied() {
                acc.imported += 1;
            } else {
                acc.failed += 1;
            }
            if outcome.is_described() {
                acc.described += 1;
            }
            acc
        })
    }
}
