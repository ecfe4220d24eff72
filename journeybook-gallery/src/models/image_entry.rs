//! Image entries and the extension filter that defines them

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extension class of a managed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpg,
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Every accepted extension, lowercase
    pub const EXTENSIONS: [&'static str; 4] = ["jpg", "jpeg", "png", "gif"];

    /// Classify an extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" => Some(Self::Jpg),
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Classify a file name by the text after its last `.`
    ///
    /// A bare `.png` counts: the whole name is the extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        name.rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// A file believed to reside in the managed image directory
///
/// The file name is the only identity; there is no persisted id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageEntry {
    pub name: String,
    pub kind: ImageKind,
}

impl ImageEntry {
    /// Build an entry if `name` carries an accepted image extension
    pub fn from_file_name(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let kind = ImageKind::from_file_name(&name)?;
        Some(Self { name, kind })
    }
}

/// Filter handed to a file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFilter {
    /// Label shown by pickers that display one
    pub name: String,
    pub extensions: Vec<String>,
}

impl ImageFilter {
    /// True if `path` has one of the filter's extensions (case-insensitive)
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            name: "Images".to_string(),
            extensions: ImageKind::EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
