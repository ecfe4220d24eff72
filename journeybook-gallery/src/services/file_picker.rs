//! File picker collaborator
//!
//! Front ends decide how the user chooses files; the core only sees the
//! resulting paths or a cancellation.

use crate::models::ImageFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    /// Absolute source paths (may be empty)
    Selected(Vec<PathBuf>),
    Canceled,
}

pub trait FilePicker: Send + Sync {
    fn pick(&self, filter: &ImageFilter) -> PickResult;
}

/// Picker over a fixed list of paths, e.g. command-line arguments
///
/// Relative paths are resolved against the current directory. Paths are not
/// filtered here; the ingestion pipeline reports non-images per item.
#[derive(Debug, Clone, Default)]
pub struct PathListPicker {
    paths: Vec<PathBuf>,
}

impl PathListPicker {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl FilePicker for PathListPicker {
    fn pick(&self, _filter: &ImageFilter) -> PickResult {
        if self.paths.is_empty() {
            return PickResult::Canceled;
        }

        let cwd = std::env::current_dir().unwrap_or_default();
        PickResult::Selected(
            self.paths
                .iter()
                .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
                .collect(),
        )
    }
}
