use lite_market_domain::{
    derive_upload_file_name, infer_content_type, ListingId, LocalImageHandle, UserId,
};
use tracing::info;

use crate::{ApplicationError, BlobStore, LocalImageReader, UploadOptions};

/// `{owner}/{listing}/{file}`; the same inputs always address the same object.
pub fn storage_path(owner_id: &UserId, listing_id: &ListingId, file_name: &str) -> String {
    format!("{}/{}/{}", owner_id.as_str(), listing_id.as_str(), file_name)
}

pub struct ImageUploader {
    blobs: Box<dyn BlobStore>,
    reader: Box<dyn LocalImageReader>,
}

impl ImageUploader {
    pub fn new(blobs: Box<dyn BlobStore>, reader: Box<dyn LocalImageReader>) -> Self {
        Self { blobs, reader }
    }

    /// Uploads with upsert semantics and returns the public reference.
    pub fn upload(
        &self,
        image: &LocalImageHandle,
        owner_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<String, ApplicationError> {
        let file_name = derive_upload_file_name(&image.uri);
        let path = storage_path(owner_id, listing_id, &file_name);

        let blob = self
            .reader
            .read(image)
            .map_err(|error| ApplicationError::UploadFailed {
                path: path.clone(),
                message: format!("failed to read image: {error}"),
            })?;

        let reported = blob.reported_type.as_deref().or(image.mime_type.as_deref());
        let options = UploadOptions {
            content_type: infer_content_type(reported, &file_name),
            upsert: true,
        };

        self.blobs
            .upload(&path, &blob.bytes, &options)
            .map_err(|error| ApplicationError::UploadFailed {
                path: path.clone(),
                message: error.to_string(),
            })?;

        let public_url = self
            .blobs
            .public_url(&path)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApplicationError::UrlResolutionFailed { path: path.clone() })?;

        info!(
            path = %path,
            bytes = blob.bytes.len(),
            content_type = %options.content_type,
            "uploaded listing image"
        );
        Ok(public_url)
    }
}
