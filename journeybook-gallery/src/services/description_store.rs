//! Description artifact store
//!
//! One file per description. The file NAME is the sanitized description
//! (the searchable text) and the file CONTENT is the image file name it
//! describes. Each artifact is written with a single write-then-rename, so a
//! crash never leaves a half-written index behind.

use journeybook_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Suffix appended to every artifact key
pub const ARTIFACT_SUFFIX: &str = ".pwq";

/// Maximum sanitized description length, in characters, before the suffix
pub const MAX_KEY_CHARS: usize = 100;

/// Maximum sanitized description length, in UTF-8 bytes, before the suffix
///
/// Keeps `<stem>.pwq` within the 255-byte file name limit of ext4 and APFS.
/// CJK ideographs take 3 bytes each, so a CJK stem stops at 83 characters.
pub const MAX_KEY_STEM_BYTES: usize = 250;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Turn a description into an artifact key
///
/// Keeps ASCII alphanumerics and CJK unified ideographs (U+4E00..=U+9FA5),
/// replaces every run of other characters with one `_`, lowercases, stops at
/// [`MAX_KEY_CHARS`] characters or [`MAX_KEY_STEM_BYTES`] bytes (whichever
/// comes first, always on a char boundary) and appends [`ARTIFACT_SUFFIX`].
pub fn sanitize_key(description: &str) -> String {
    let mut key =
        String::with_capacity(description.len().min(MAX_KEY_STEM_BYTES) + ARTIFACT_SUFFIX.len());
    let mut chars = 0usize;

    for c in description.chars() {
        let c = if is_key_char(c) {
            c.to_ascii_lowercase()
        } else if key.ends_with('_') {
            continue;
        } else {
            '_'
        };

        if chars == MAX_KEY_CHARS || key.len() + c.len_utf8() > MAX_KEY_STEM_BYTES {
            break;
        }
        key.push(c);
        chars += 1;
    }

    key.push_str(ARTIFACT_SUFFIX);
    key
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// File-backed description index
#[derive(Debug, Clone)]
pub struct DescriptionStore {
    dir: PathBuf,
}

impl DescriptionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `image_file_name` under the key derived from `description`
    ///
    /// Overwrites an existing artifact with the same key (last write wins).
    pub fn put(&self, description: &str, image_file_name: &str) -> Result<String> {
        let key = sanitize_key(description);
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(&key);
        if path.exists() {
            tracing::debug!(key = %key, image = %image_file_name, "Replacing existing description artifact");
        }

        // Temp name length must not depend on the key
        let tmp_path = self.dir.join(format!(
            ".put-{}-{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp_path, image_file_name.as_bytes())?;
        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::info!(key = %key, image = %image_file_name, "Stored description artifact");
        Ok(key)
    }

    /// Every artifact key, sorted. A missing store directory has no keys.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable artifact entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(ARTIFACT_SUFFIX) && !name.starts_with('.') {
                    keys.push(name.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Keys containing `query_lower` (case-insensitive substring match)
    pub fn list_matching_keys(&self, query_lower: &str) -> Result<Vec<String>> {
        let needle = query_lower.to_lowercase();
        Ok(self
            .list_keys()?
            .into_iter()
            .filter(|key| key.to_lowercase().contains(&needle))
            .collect())
    }

    /// Image file name stored in artifact `key`, trimmed
    pub fn resolve(&self, key: &str) -> Result<String> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::InvalidInput(format!("invalid artifact key '{}'", key)));
        }

        match std::fs::read_to_string(self.dir.join(key)) {
            Ok(content) => Ok(content.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("description artifact {}", key)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_collapses_separators() {
        let key = sanitize_key("A  cat!! sits.");
        assert_eq!(key, "a_cat_sits_.pwq");
        assert!(key.starts_with("a_cat_sits"));
        assert!(!key.contains("__"));
    }

    #[test]
    fn test_sanitize_keeps_cjk() {
        assert_eq!(sanitize_key("一只猫，坐在窗台上"), "一只猫_坐在窗台上.pwq");
        // Hiragana is outside the kept range
        assert_eq!(sanitize_key("ねこ cat"), "_cat.pwq");
    }

    #[test]
    fn test_sanitize_existing_underscores_collapse() {
        assert_eq!(sanitize_key("snake__case___name"), "snake_case_name.pwq");
        assert_eq!(sanitize_key("a_-_b"), "a_b.pwq");
    }

    #[test]
    fn test_sanitize_truncates_to_limit() {
        let long = "abc ".repeat(60);
        let key = sanitize_key(&long);
        let stem = key.strip_suffix(ARTIFACT_SUFFIX).unwrap();
        assert_eq!(stem.chars().count(), MAX_KEY_CHARS);
    }

    #[test]
    fn test_sanitize_cjk_stays_within_file_name_limit() {
        let key = sanitize_key(&"猫".repeat(150));
        let stem = key.strip_suffix(ARTIFACT_SUFFIX).unwrap();
        assert_eq!(stem.chars().count(), MAX_KEY_STEM_BYTES / 3);
        assert!(stem.len() <= MAX_KEY_STEM_BYTES);
        assert!(key.len() <= 255);

        // Mixed widths: the cut lands on a char boundary below the byte cap
        let mixed = sanitize_key(&"a猫".repeat(100));
        assert!(mixed.len() <= MAX_KEY_STEM_BYTES + ARTIFACT_SUFFIX.len());
        assert!(mixed.strip_suffix(ARTIFACT_SUFFIX).unwrap().chars().count() <= MAX_KEY_CHARS);
    }

    #[test]
    fn test_put_long_chinese_description() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path().join("search"));
        let description = "这是一张阳光明媚的海滩照片".repeat(10);

        let key = store.put(&description, "beach.png").unwrap();

        assert!(key.len() <= 255);
        assert!(key.starts_with("这是一张阳光明媚的海滩照片"));
        assert_eq!(store.list_keys().unwrap(), vec![key.clone()]);
        assert_eq!(store.list_matching_keys("海滩").unwrap(), vec![key.clone()]);
        assert_eq!(store.resolve(&key).unwrap(), "beach.png");
    }

    #[test]
    fn test_put_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path());
        store.put("a lighthouse", "l.png").unwrap();
        store.put("a lighthouse", "l2.png").unwrap();

        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_lighthouse.pwq".to_string()]);
    }

    #[test]
    fn test_put_resolve_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path().join("search"));

        let key = store.put("A  cat!! sits.", "a.png").unwrap();
        let matches = store.list_matching_keys("a_cat_sits").unwrap();
        assert_eq!(matches, vec![key.clone()]);
        assert_eq!(store.resolve(&key).unwrap(), "a.png");
    }

    #[test]
    fn test_colliding_keys_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path());

        let first = store.put("a red bus", "one.png").unwrap();
        let second = store.put("A red bus!", "two.png").unwrap();

        assert_eq!(first, "a_red_bus.pwq");
        assert_eq!(second, "a_red_bus_.pwq");
        let third = store.put("a red bus", "three.png").unwrap();
        assert_eq!(third, first);
        assert_eq!(store.resolve(&first).unwrap(), "three.png");
        assert_eq!(store.list_keys().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path().join("absent"));
        assert!(store.list_keys().unwrap().is_empty());
        assert!(store.list_matching_keys("cat").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path());
        assert!(matches!(store.resolve("gone.pwq"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resolve_rejects_path_keys() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path());
        assert!(matches!(store.resolve("../etc/passwd"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_trims_content() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("manual.pwq"), "  b.jpg\n").unwrap();
        let store = DescriptionStore::new(temp.path());
        assert_eq!(store.resolve("manual.pwq").unwrap(), "b.jpg");
    }

    #[test]
    fn test_non_artifact_files_ignored() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("readme.txt"), "x").unwrap();
        std::fs::write(temp.path().join(".half.pwq.tmp"), "x").unwrap();
        let store = DescriptionStore::new(temp.path());
        store.put("dog", "d.png").unwrap();
        assert_eq!(store.list_keys().unwrap(), vec!["dog.pwq".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_odd_entries_do_not_hide_other_keys() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path());
        std::fs::create_dir(temp.path().join("folder.pwq")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), temp.path().join("dangling.pwq"))
            .unwrap();
        store.put("a quiet street", "street.png").unwrap();

        assert_eq!(store.list_keys().unwrap(), vec!["a_quiet_street.pwq".to_string()]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let store = DescriptionStore::new(temp.path());
        store.put("Mountain lake", "m.png").unwrap();
        assert_eq!(store.list_matching_keys("LAKE").unwrap(), vec!["mountain_lake.pwq".to_string()]);
    }
}
