//! Image ingestion
//!
//! Copy first, describe second. Every source path is processed in isolation:
//! a failed copy or a failed description is recorded in that item's outcome
//! and the batch moves on. A failed description never removes the copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use journeybook_common::{Error, Result};

use crate::models::{DescriptionOutcome, ImageKind, IngestOutcome, IngestStatus, Language};
use crate::services::description_generator::DescriptionGenerator;
use crate::services::description_store::DescriptionStore;

/// Copies images into the managed directory and optionally describes them
#[derive(Clone)]
pub struct IngestPipeline {
    image_dir: PathBuf,
    store: DescriptionStore,
    generator: Option<Arc<dyn DescriptionGenerator>>,
    language: Language,
}

impl IngestPipeline {
    /// Copy-only pipeline
    pub fn new(image_dir: impl Into<PathBuf>, store: DescriptionStore) -> Self {
        Self {
            image_dir: image_dir.into(),
            store,
            generator: None,
            language: Language::default(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn DescriptionGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Ingest every source path in order, one outcome per path
    pub async fn ingest(&self, sources: &[PathBuf]) -> Vec<IngestOutcome> {
        let mut outcomes = Vec::with_capacity(sources.len());

        for (index, source) in sources.iter().enumerate() {
            tracing::debug!(
                source = %source.display(),
                "Importing image {} of {}",
                index + 1,
                sources.len()
            );
            outcomes.push(self.ingest_one(source).await);
        }

        outcomes
    }

    async fn ingest_one(&self, source: &Path) -> IngestOutcome {
        let file_name = match destination_name(source) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(source = %source.display(), "Import skipped: {}", e);
                return IngestOutcome {
                    source: source.to_path_buf(),
                    file_name: None,
                    status: IngestStatus::Failed {
                        error: e.to_string(),
                    },
                };
            }
        };

        let dest = match self.copy_into_library(source, &file_name).await {
            Ok(dest) => dest,
            Err(e) => {
                tracing::warn!(source = %source.display(), "Import failed: {}", e);
                return IngestOutcome {
                    source: source.to_path_buf(),
                    file_name: Some(file_name),
                    status: IngestStatus::Failed {
                        error: e.to_string(),
                    },
                };
            }
        };

        tracing::info!(file = %file_name, "Image copied into library");

        let description = self.describe(&dest, &file_name).await;

        IngestOutcome {
            source: source.to_path_buf(),
            file_name: Some(file_name),
            status: IngestStatus::Copied { description },
        }
    }

    /// Copy `source` to `<image_dir>/<file_name>` via a hidden temp file
    ///
    /// The temp name does not carry an image extension, so a concurrent poll
    /// never lists a partially copied file. Existing files are replaced.
    async fn copy_into_library(&self, source: &Path, file_name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.image_dir).await?;

        let dest = self.image_dir.join(file_name);
        let tmp = self.image_dir.join(format!(".{}.part", file_name));

        if let Err(e) = tokio::fs::copy(source, &tmp).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("source image {}", source.display()))
            } else {
                e.into()
            });
        }

        if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        Ok(dest)
    }

    async fn describe(&self, dest: &Path, file_name: &str) -> DescriptionOutcome {
        let Some(generator) = &self.generator else {
            return DescriptionOutcome::Skipped;
        };

        let description = match generator
            .describe(dest, self.language.description_prompt())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %file_name, "Failed to describe image: {}", e);
                return DescriptionOutcome::Failed(e.to_string());
            }
        };

        let store = self.store.clone();
        let image_name = file_name.to_string();
        let stored =
            tokio::task::spawn_blocking(move || store.put(&description, &image_name)).await;

        match stored {
            Ok(Ok(key)) => DescriptionOutcome::Stored(key),
            Ok(Err(e)) => {
                tracing::warn!(file = %file_name, "Failed to store description: {}", e);
                DescriptionOutcome::Failed(e.to_string())
            }
            Err(e) => {
                tracing::error!(file = %file_name, "Description store task failed: {}", e);
                DescriptionOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Destination file name for `source`: its base name, if it is an image
fn destination_name(source: &Path) -> Result<String> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("no usable file name in {}", source.display())))?;

    if ImageKind::from_file_name(name).is_none() {
        return Err(Error::InvalidInput(format!("{} is not a jpg, jpeg, png or gif image", name)));
    }

    Ok(name.to_string())
}
