//! Image references: validated locators of stored image bytes.
//!
//! A reference is a `/`-separated path relative to the storage root and
//! always lives under [`IMAGES_DIR`], e.g. `images/12_0.png`. Validation
//! rejects absolute paths, backslashes, drive prefixes and `.`/`..`
//! components so a reference can never resolve outside the images root.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::NodeId;

/// Directory (relative to the storage root) that holds every image asset.
pub const IMAGES_DIR: &str = "images";

/// A validated image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageReference(String);

impl ImageReference {
    /// Validates `raw` as an image reference.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidReference {
            reference: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty reference"));
        }
        if raw.contains('\\') {
            return Err(invalid("backslash separators are not allowed"));
        }
        if raw.contains(':') {
            return Err(invalid("drive or scheme prefixes are not allowed"));
        }
        if raw.starts_with('/') {
            return Err(invalid("reference must be relative"));
        }

        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() < 2 || segments[0] != IMAGES_DIR {
            return Err(invalid("reference must point into the images directory"));
        }
        for segment in &segments[1..] {
            match *segment {
                "" => return Err(invalid("empty path component")),
                "." | ".." => return Err(invalid("relative path components are not allowed")),
                _ => {}
            }
        }

        Ok(ImageReference(raw.to_string()))
    }

    /// The deterministic reference for image slot `index` of `node`:
    /// `images/<node>_<index>.<ext>`.
    pub fn for_slot(node: NodeId, index: usize, ext: &str) -> Self {
        ImageReference(format!("{}/{}_{}.{}", IMAGES_DIR, node, index, ext))
    }

    /// The reference as stored in the document.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path component (the file name shown to clients).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Path components in order, starting with [`IMAGES_DIR`].
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ImageReference {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ImageReference::parse(&value)
    }
}

impl From<ImageReference> for String {
    fn from(reference: ImageReference) -> Self {
        reference.0
    }
}

impl PartialEq<str> for ImageReference {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<String> for ImageReference {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}
