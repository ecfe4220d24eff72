//! Gallery state
//!
//! Owns everything the front end needs: the shared scanner snapshot, the
//! description store, search, ingestion and the optional generators. One
//! instance per application root; tests build their own over a temp dir.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use journeybook_common::events::{EventBus, GalleryEvent};
use journeybook_common::{Error, Result};
use tokio::sync::Mutex;

use crate::models::{ImageFilter, IngestOutcome, IngestSummary, Language, Settings};
use crate::services::{
    poll_once, ChangeResult, DescriptionGenerator, DescriptionStore, FilePicker,
    HttpDescriptionGenerator, HttpImageGenerator, ImageGenerator, ImageScanner, IngestPipeline,
    PickResult, PollLoop, SearchEngine, SearchMode, SharedScanner,
};

/// Image directory name under the application root
pub const IMAGE_DIR_NAME: &str = "img";
/// Description artifact directory name under the application root
pub const SEARCH_DIR_NAME: &str = "search";

const DEFAULT_GENERATION_PROMPT: &str = "Generate an image";

#[derive(Clone)]
pub struct Gallery {
    root: PathBuf,
    image_dir: PathBuf,
    scanner: SharedScanner,
    store: DescriptionStore,
    search: SearchEngine,
    ingest: IngestPipeline,
    image_generator: Option<Arc<dyn ImageGenerator>>,
    event_bus: EventBus,
}

impl Gallery {
    /// Copy-only gallery rooted at `root` (no generators configured)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let image_dir = root.join(IMAGE_DIR_NAME);
        let store = DescriptionStore::new(root.join(SEARCH_DIR_NAME));

        Self {
            scanner: Arc::new(Mutex::new(ImageScanner::new(&image_dir))),
            search: SearchEngine::new(&image_dir, store.clone()),
            ingest: IngestPipeline::new(&image_dir, store.clone()),
            store,
            image_dir,
            root,
            image_generator: None,
            event_bus: EventBus::default(),
        }
    }

    /// Gallery with HTTP generators when `settings` carries an endpoint and key
    pub fn from_settings(root: impl Into<PathBuf>, settings: &Settings) -> Result<Self> {
        let mut gallery = Self::new(root).with_language(settings.language);

        if let Some(generator) = HttpDescriptionGenerator::from_settings(settings)? {
            gallery = gallery.with_description_generator(Arc::new(generator));
        }
        if let Some(generator) = HttpImageGenerator::from_settings(settings)? {
            gallery = gallery.with_image_generator(Arc::new(generator));
        }

        Ok(gallery)
    }

    pub fn with_description_generator(mut self, generator: Arc<dyn DescriptionGenerator>) -> Self {
        self.ingest = self.ingest.with_generator(generator);
        self
    }

    pub fn with_image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.image_generator = Some(generator);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.ingest = self.ingest.with_language(language);
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn store(&self) -> &DescriptionStore {
        &self.store
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// True when imports will also request descriptions
    pub fn describes_on_import(&self) -> bool {
        self.ingest.has_generator()
    }

    pub fn scanner(&self) -> SharedScanner {
        self.scanner.clone()
    }

    /// Poll loop over this gallery's scanner and event bus
    pub fn poll_loop(&self) -> PollLoop {
        PollLoop::new(self.scanner.clone(), self.event_bus.clone())
    }

    /// Poll now instead of waiting for the next tick
    pub async fn poll(&self) -> ChangeResult {
        let result = poll_once(&self.scanner).await;
        if let ChangeResult::Updated(images) = &result {
            self.event_bus.emit_lossy(GalleryEvent::ImageSetChanged {
                images: images.clone(),
                timestamp: Utc::now(),
            });
        }
        result
    }

    /// Snapshot from the last poll
    pub async fn current_images(&self) -> Vec<String> {
        self.scanner.lock().await.current()
    }

    /// Clear the snapshot so the next poll reports the directory afresh
    pub async fn reset(&self) {
        self.scanner.lock().await.reset();
    }

    /// Run a query; failures degrade to no results
    pub async fn search(&self, mode: SearchMode, query: &str) -> Vec<String> {
        let current = self.current_images().await;
        let engine = self.search.clone();
        let query = query.to_string();

        match tokio::task::spawn_blocking(move || engine.search(mode, &query, &current)).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Search task failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Import `sources`, then poll immediately
    pub async fn import(&self, sources: &[PathBuf]) -> Vec<IngestOutcome> {
        let outcomes = self.ingest.ingest(sources).await;
        let summary = IngestSummary::from_outcomes(&outcomes);

        tracing::info!(
            imported = summary.imported,
            failed = summary.failed,
            described = summary.described,
            "Import batch complete"
        );

        self.event_bus.emit_lossy(GalleryEvent::ImportCompleted {
            imported: summary.imported,
            failed: summary.failed,
            described: summary.described,
            timestamp: Utc::now(),
        });

        self.poll().await;
        outcomes
    }

    /// Ask `picker` for files and import them; `None` if the pick was canceled
    pub async fn import_with_picker(&self, picker: &dyn FilePicker) -> Option<Vec<IngestOutcome>> {
        let filter = ImageFilter::default();
        match picker.pick(&filter) {
            PickResult::Canceled => {
                tracing::debug!("Import canceled by picker");
                None
            }
            PickResult::Selected(paths) if paths.is_empty() => None,
            PickResult::Selected(paths) => {
                let non_images = paths.iter().filter(|p| !filter.matches(p)).count();
                if non_images > 0 {
                    tracing::debug!(non_images, "Picker returned files outside the image filter");
                }
                Some(self.import(&paths).await)
            }
        }
    }

    /// Generate an image from `prompt` and save it as `api_image_<millis>.png`
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let generator = self
            .image_generator
            .as_ref()
            .ok_or_else(|| Error::Config("image generation API not configured".to_string()))?;

        let prompt = match prompt.trim() {
            "" => DEFAULT_GENERATION_PROMPT,
            p => p,
        };

        let url = generator.generate(prompt).await?;
        tracing::debug!(url = %url, "Image generated, downloading");
        let bytes = generator.download(&url).await?;
        if bytes.is_empty() {
            return Err(Error::MalformedResponse("downloaded image is empty".to_string()));
        }

        tokio::fs::create_dir_all(&self.image_dir).await?;
        let mut millis = Utc::now().timestamp_millis();
        let mut file_name = format!("api_image_{}.png", millis);
        while tokio::fs::try_exists(self.image_dir.join(&file_name)).await? {
            millis += 1;
            file_name = format!("api_image_{}.png", millis);
        }

        let tmp = self.image_dir.join(format!(".{}.part", file_name));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, self.image_dir.join(&file_name)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!(file = %file_name, bytes = bytes.len(), "Generated image saved");
        self.event_bus.emit_lossy(GalleryEvent::ImageGenerated {
            file_name: file_name.clone(),
            timestamp: Utc::now(),
        });

        self.poll().await;
        Ok(file_name)
    }
}
