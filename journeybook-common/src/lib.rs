//! # JourneyBook Common Library
//!
//! Shared code for the JourneyBook gallery crates:
//! - Error taxonomy
//! - Bootstrap configuration and root folder resolution
//! - Event bus and gallery event types

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
