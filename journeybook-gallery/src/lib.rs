//! journeybook-gallery library interface
//!
//! Synchronization and search core for a local image collection:
//! - a polling scanner over the image directory
//! - a file-backed description index (one artifact per description)
//! - filename and description search
//! - an ingestion pipeline that copies images and derives descriptions

pub mod config;
pub mod gallery;
pub mod models;
pub mod services;

pub use crate::gallery::{Gallery, IMAGE_DIR_NAME, SEARCH_DIR_NAME};
pub use journeybook_common::{Error, Result};
