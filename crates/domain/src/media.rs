use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

const REMOTE_SCHEMES: [&str; 2] = ["https://", "http://"];
const CANONICAL_EXTENSION: &str = ".jpg";
const FALLBACK_FILE_STEM: &str = "image";

/// An image that so far only exists on the device. Dimensions and metadata
/// are whatever the picker reported and may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalImageHandle {
    pub uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

impl LocalImageHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }
}

pub fn is_remote_reference(reference: &str) -> bool {
    let lowered = reference.trim_start().to_ascii_lowercase();
    REMOTE_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}

/// A form image reference after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Remote(String),
    Local(LocalImageHandle),
}

impl ImageRef {
    pub fn classify(reference: &str) -> Result<Self, DomainError> {
        if reference.trim().is_empty() {
            return Err(DomainError::EmptyImageReference);
        }
        if is_remote_reference(reference) {
            Ok(Self::Remote(reference.to_string()))
        } else {
            Ok(Self::Local(LocalImageHandle::new(reference)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Ordered, de-duplicated set of image references attached to a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSelection {
    references: Vec<String>,
}

impl ImageSelection {
    pub fn from_references<I, S>(references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        selection.add(references);
        selection
    }

    /// Appends references in order, skipping any already present. Returns
    /// how many were actually added.
    pub fn add<I, S>(&mut self, references: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.references.len();
        for reference in references {
            let reference = reference.into();
            if reference.is_empty() || self.contains(&reference) {
                continue;
            }
            self.references.push(reference);
        }
        self.references.len() - before
    }

    pub fn remove(&mut self, reference: &str) -> bool {
        let before = self.references.len();
        self.references.retain(|existing| existing != reference);
        before != self.references.len()
    }

    pub fn clear(&mut self) {
        self.references.clear();
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.references.iter().any(|existing| existing == reference)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.references
    }
}

/// Storage file name for a local reference: its last path segment with any
/// query string removed, with a `.jpeg` suffix folded to `.jpg` and `.jpg`
/// appended when missing.
pub fn derive_upload_file_name(local_uri: &str) -> String {
    let without_query = local_uri.split('?').next().unwrap_or(local_uri);
    let last = without_query
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or(FALLBACK_FILE_STEM);

    let lowered = last.to_ascii_lowercase();
    if lowered.ends_with(".jpg") {
        return last.to_string();
    }
    if lowered.ends_with(".jpeg") {
        let stem = &last[..last.len() - ".jpeg".len()];
        return format!("{stem}{CANONICAL_EXTENSION}");
    }
    format!("{last}{CANONICAL_EXTENSION}")
}

/// Picks the upload content type: the blob's reported type when it is a
/// well-formed `image/*` type, then the file extension, then JPEG.
pub fn infer_content_type(reported: Option<&str>, file_name: &str) -> String {
    if let Some(reported) = reported.map(str::trim) {
        if is_well_formed_image_type(reported) {
            return reported.to_ascii_lowercase();
        }
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg".to_string(),
        Some("png") => "image/png".to_string(),
        Some("webp") => "image/webp".to_string(),
        Some("gif") => "image/gif".to_string(),
        Some("heic") => "image/heic".to_string(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

fn is_well_formed_image_type(value: &str) -> bool {
    let Some((kind, subtype)) = value.split_once('/') else {
        return false;
    };
    kind.eq_ignore_ascii_case("image")
        && !subtype.is_empty()
        && subtype
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '+' | '-'))
}
