//! Image set scanner
//!
//! Polls the managed image directory and reports whether the listing changed
//! since the previous poll. Listings are sorted by file name, so the
//! element-by-element comparison only reports a change when membership does.

use crate::models::{ImageEntry, ImageKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Image scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Managed directory could not be created
    #[error("Cannot create directory {0}: {1}")]
    CreateDir(PathBuf, String),

    /// Directory listing failed
    #[error("Cannot list {0}: {1}")]
    List(PathBuf, String),
}

/// Outcome of a single poll tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeResult {
    /// Listing identical to the previous snapshot
    Unchanged,
    /// New snapshot (file names in listing order)
    Updated(Vec<String>),
}

impl ChangeResult {
    pub fn is_updated(&self) -> bool {
        matches!(self, ChangeResult::Updated(_))
    }
}

/// Polling scanner over one flat image directory
///
/// Holds the last snapshot and nothing else.
#[derive(Debug)]
pub struct ImageScanner {
    image_dir: PathBuf,
    snapshot: Vec<String>,
}

impl ImageScanner {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            snapshot: Vec::new(),
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Run one poll tick
    ///
    /// A directory that cannot be created or listed is logged and reported as
    /// `Unchanged`; absence of images is never an error.
    pub fn poll(&mut self) -> ChangeResult {
        let listing = match self.list_images() {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!("Image poll skipped: {}", e);
                return ChangeResult::Unchanged;
            }
        };

        if listing == self.snapshot {
            return ChangeResult::Unchanged;
        }

        tracing::debug!(
            previous = self.snapshot.len(),
            current = listing.len(),
            "Image set changed"
        );

        self.snapshot = listing.clone();
        ChangeResult::Updated(listing)
    }

    /// List image file names, creating the directory if absent
    pub fn list_images(&self) -> Result<Vec<String>, ScanError> {
        ensure_dir(&self.image_dir)?;

        let mut names = Vec::new();
        let walker = WalkDir::new(&self.image_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let Some(name) = entry.file_name().to_str() else {
                        tracing::debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
                        continue;
                    };
                    if ImageKind::from_file_name(name).is_some() {
                        names.push(name.to_string());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::List(self.image_dir.clone(), e.to_string()));
                }
                Err(e) => {
                    // Broken symlink or an entry removed mid-listing
                    tracing::debug!("Error accessing entry: {}", e);
                }
            }
        }

        Ok(names)
    }

    /// Last snapshot (file names)
    pub fn current(&self) -> Vec<String> {
        self.snapshot.clone()
    }

    /// Last snapshot as typed entries
    pub fn current_entries(&self) -> Vec<ImageEntry> {
        self.snapshot
            .iter()
            .filter_map(|name| ImageEntry::from_file_name(name.as_str()))
            .collect()
    }

    /// Forget the snapshot; the next poll reports any existing images
    pub fn reset(&mut self) {
        self.snapshot.clear();
    }
}

/// Create `dir` (and parents) if missing; safe to call repeatedly
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ScanError> {
    std::fs::create_dir_all(dir).map_err(|e| ScanError::CreateDir(dir.to_path_buf(), e.to_string()))
}
