//! Filename and description search
//!
//! Two independent modes with no shared ranking. Both are pure reads over
//! the scanner snapshot, the description store and the image directory.

use crate::services::description_store::DescriptionStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

/// Which index a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Filename,
    Description,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "filename" | "name" => Ok(SearchMode::Filename),
            "description" | "desc" => Ok(SearchMode::Description),
            other => Err(format!("unknown search mode '{}'", other)),
        }
    }
}

/// Filename search: case-insensitive substring over `current_set`
///
/// An empty or whitespace query returns `current_set` as given. Order of
/// `current_set` is preserved.
pub fn search_by_filename(query: &str, current_set: &[String]) -> Vec<String> {
    if query.trim().is_empty() {
        return current_set.to_vec();
    }

    let query_lower = query.to_lowercase();
    current_set
        .iter()
        .filter(|name| name.to_lowercase().contains(&query_lower))
        .cloned()
        .collect()
}

/// Search engine bound to one image directory and description store
#[derive(Debug, Clone)]
pub struct SearchEngine {
    image_dir: PathBuf,
    store: DescriptionStore,
}

impl SearchEngine {
    pub fn new(image_dir: impl Into<PathBuf>, store: DescriptionStore) -> Self {
        Self {
            image_dir: image_dir.into(),
            store,
        }
    }

    /// Dispatch on `mode`; the query is trimmed first
    pub fn search(&self, mode: SearchMode, query: &str, current_set: &[String]) -> Vec<String> {
        let query = query.trim();
        match mode {
            SearchMode::Filename => search_by_filename(query, current_set),
            SearchMode::Description => self.search_by_description(query, current_set),
        }
    }

    /// Description search: substring over artifact keys
    ///
    /// Matching artifacts are resolved to image file names; names whose file
    /// no longer exists are dropped and duplicates collapse. Results are
    /// sorted. Any store failure degrades to fewer (or no) results.
    pub fn search_by_description(&self, query: &str, current_set: &[String]) -> Vec<String> {
        if query.trim().is_empty() {
            return current_set.to_vec();
        }

        let query_lower = query.to_lowercase();
        let keys = match self.store.list_matching_keys(&query_lower) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Description search failed to list artifacts: {}", e);
                return Vec::new();
            }
        };

        let mut matched = BTreeSet::new();
        for key in keys {
            let image_name = match self.store.resolve(&key) {
                Ok(name) => name,
                Err(e) => {
                    // Deleted between listing and reading
                    tracing::debug!(key = %key, "Skipping artifact: {}", e);
                    continue;
                }
            };

            if image_name.is_empty() || image_name.contains(['/', '\\']) {
                tracing::debug!(key = %key, "Skipping artifact with unusable target");
                continue;
            }

            if self.image_dir.join(&image_name).is_file() {
                matched.insert(image_name);
            }
        }

        tracing::debug!(query = %query, results = matched.len(), "Description search complete");
        matched.into_iter().collect()
    }
}
