use std::fs;
use std::path::PathBuf;

use image::ImageFormat;
use lite_market_application::{ApplicationError, LocalBlob, LocalImageReader};
use lite_market_domain::LocalImageHandle;

const FILE_SCHEME: &str = "file://";

/// Maps a device URI (`file:///...` or a plain path) to a filesystem path.
pub fn local_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}

#[derive(Debug, Default)]
pub struct FsLocalImageReader;

impl LocalImageReader for FsLocalImageReader {
    fn read(&self, handle: &LocalImageHandle) -> Result<LocalBlob, ApplicationError> {
        let bytes = fs::read(local_path(&handle.uri))
            .map_err(|error| ApplicationError::Io(format!("{}: {error}", handle.uri)))?;
        let reported_type = image::guess_format(&bytes)
            .ok()
            .and_then(mime_for_format)
            .map(str::to_string);
        Ok(LocalBlob {
            bytes,
            reported_type,
        })
    }
}

fn mime_for_format(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}
