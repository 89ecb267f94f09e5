//! Validated sets of file extensions used for media discovery

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::error::{ScreenTraceError, ScreenTraceResult};

/// Image extensions recognised without configuration
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];
/// Video extensions recognised without configuration
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Case-folded extensions stored without the leading dot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default image extensions plus `extra`
    pub fn images<I, S>(extra: I) -> ScreenTraceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_defaults(DEFAULT_IMAGE_EXTENSIONS, extra)
    }

    /// Default video extensions plus `extra`
    pub fn videos<I, S>(extra: I) -> ScreenTraceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_defaults(DEFAULT_VIDEO_EXTENSIONS, extra)
    }

    /// The built-in image extensions only
    pub fn default_images() -> Self {
        Self::from_static(DEFAULT_IMAGE_EXTENSIONS)
    }

    /// The built-in video extensions only
    pub fn default_videos() -> Self {
        Self::from_static(DEFAULT_VIDEO_EXTENSIONS)
    }

    fn from_static(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    fn from_defaults<I, S>(defaults: &[&str], extra: I) -> ScreenTraceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for ext in defaults {
            set.insert(ext)?;
        }
        for ext in extra {
            set.insert(ext.as_ref())?;
        }
        Ok(set)
    }

    /// Add one extension; `".MKV"`, `"mkv"` and `" mkv "` are the same entry
    pub fn insert(&mut self, raw: &str) -> ScreenTraceResult<bool> {
        let normalized = normalize(raw)?;
        Ok(self.extensions.insert(normalized))
    }

    pub fn contains(&self, extension: &str) -> bool {
        normalize(extension)
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }

    /// Whether `path` carries one of the extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.contains(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.iter().map(|ext| format!(".{}", ext)).collect();
        write!(f, "{}", joined.join(", "))
    }
}

fn normalize(raw: &str) -> ScreenTraceResult<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(ScreenTraceError::invalid_config(format!(
            "empty file extension '{}'",
            raw
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ScreenTraceError::invalid_config(format!(
            "invalid file extension '{}'",
            raw
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}
