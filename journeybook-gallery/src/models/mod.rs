//! Data models for the gallery core

pub mod image_entry;
pub mod ingest_result;
pub mod settings;

pub use image_entry::{ImageEntry, ImageFilter, ImageKind};
pub use ingest_result::{DescriptionOutcome, IngestOutcome, IngestStatus, IngestSummary};
pub use settings::{Language, Settings};
