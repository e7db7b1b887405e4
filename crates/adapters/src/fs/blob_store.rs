use std::fs;
use std::path::{Component, Path, PathBuf};

use lite_market_application::{ApplicationError, BlobStore, UploadOptions};
use tracing::debug;

/// Public-bucket object storage on the local filesystem. Objects live at
/// `<root>/<bucket>/<path>` and are served from `<base_url>/<bucket>/<path>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    /// Resolves an object path inside the bucket, refusing anything that
    /// would climb out of it.
    pub fn object_path(&self, path: &str) -> Result<PathBuf, ApplicationError> {
        let mut resolved = self.bucket_dir();
        let mut segments = 0;
        for component in Path::new(path).components() {
            match component {
                Component::Normal(segment) => {
                    resolved.push(segment);
                    segments += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ApplicationError::InvalidInput(format!(
                        "object path escapes bucket: {path}"
                    )));
                }
            }
        }
        if segments == 0 {
            return Err(ApplicationError::InvalidInput(
                "object path must not be empty".to_string(),
            ));
        }
        Ok(resolved)
    }
}

impl BlobStore for FsBlobStore {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<(), ApplicationError> {
        let target = self.object_path(path)?;
        if !options.upsert && target.exists() {
            return Err(ApplicationError::Io(format!("object already exists: {path}")));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|error| ApplicationError::Io(error.to_string()))?;
        }
        fs::write(&target, bytes).map_err(|error| ApplicationError::Io(error.to_string()))?;

        debug!(
            path = %path,
            size = bytes.len(),
            content_type = %options.content_type,
            "stored object"
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        if self.public_base_url.is_empty() || self.object_path(path).is_err() {
            return None;
        }
        Some(format!("{}/{}/{}", self.public_base_url, self.bucket, path))
    }
}
