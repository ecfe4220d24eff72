//! Shared helpers for journeybook-gallery integration tests

#![allow(dead_code)]

pub mod log_capture;
pub mod mock_api;

use std::fs;
use std::path::{Path, PathBuf};

pub use log_capture::{capture_logs, LogCapture};
pub use mock_api::{spawn_mock_api, ChatBehavior, ImageBehavior, MockApi};

/// Smallest valid PNG (1x1, transparent)
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Write `names` into `dir` (created if needed) with PNG bytes
pub fn seed_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, PNG_1X1).unwrap();
            path
        })
        .collect()
}
