//! Gallery core services
//!
//! Leaves first: description store and image scanner, then the search
//! engine, ingestion pipeline and poll loop built on them. The generator and
//! picker modules hold the collaborator traits and their implementations.

pub mod description_generator;
pub mod description_store;
pub mod file_picker;
pub mod image_generator;
pub mod image_scanner;
pub mod ingest_pipeline;
pub mod poll_loop;
pub mod search_engine;

pub use description_generator::{DescriptionGenerator, GenerationError, HttpDescriptionGenerator};
pub use description_store::{sanitize_key, DescriptionStore, ARTIFACT_SUFFIX};
pub use file_picker::{FilePicker, PathListPicker, PickResult};
pub use image_generator::{HttpImageGenerator, ImageGenerator};
pub use image_scanner::{ChangeResult, ImageScanner, ScanError};
pub use ingest_pipeline::IngestPipeline;
pub use poll_loop::{
    poll_once, IntervalTicker, ManualTicker, PollLoop, PollStats, SharedScanner, TickHandle,
    Ticker, DEFAULT_POLL_INTERVAL,
};
pub use search_engine::{search_by_filename, SearchEngine, SearchMode};
