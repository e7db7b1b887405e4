use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::ColorType;
use lite_market_application::{ApplicationError, ImageCompressor};
use lite_market_domain::LocalImageHandle;
use tracing::debug;
use uuid::Uuid;

use super::reader::local_path;

pub const MAX_WIDTH: u32 = 1080;
pub const JPEG_QUALITY: u8 = 70;

/// Re-encodes picked images as JPEG no wider than [`MAX_WIDTH`], writing
/// `<stem>-<source hash>.jpg` into `out_dir`. The same source always maps to
/// the same output; sources sharing a stem never do.
#[derive(Debug, Clone)]
pub struct ImageCrateCompressor {
    out_dir: PathBuf,
}

impl ImageCrateCompressor {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

/// Width capped at [`MAX_WIDTH`], height scaled to keep the aspect ratio.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_WIDTH || width == 0 {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(MAX_WIDTH) / f64::from(width)).round();
    (MAX_WIDTH, (scaled as u32).max(1))
}

impl ImageCompressor for ImageCrateCompressor {
    fn compress(&self, handle: &LocalImageHandle) -> Result<LocalImageHandle, ApplicationError> {
        let failed = |message: String| ApplicationError::CompressionFailed {
            uri: handle.uri.clone(),
            message,
        };

        let source = local_path(&handle.uri);
        let decoded = ImageReader::open(&source)
            .map_err(|error| failed(error.to_string()))?
            .with_guessed_format()
            .map_err(|error| failed(error.to_string()))?
            .decode()
            .map_err(|error| failed(error.to_string()))?;

        let (width, height) = target_dimensions(decoded.width(), decoded.height());
        let resized = if (width, height) == (decoded.width(), decoded.height()) {
            decoded
        } else {
            decoded.resize_exact(width, height, FilterType::Triangle)
        };
        let rgb = resized.to_rgb8();

        let file_name = output_file_name(&source);
        let target = self.out_dir.join(&file_name);
        fs::create_dir_all(&self.out_dir).map_err(|error| failed(error.to_string()))?;
        let mut writer =
            BufWriter::new(File::create(&target).map_err(|error| failed(error.to_string()))?);
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
            .encode(rgb.as_raw(), width, height, ColorType::Rgb8)
            .map_err(|error| failed(error.to_string()))?;
        writer.flush().map_err(|error| failed(error.to_string()))?;

        let file_size = fs::metadata(&target).ok().map(|metadata| metadata.len());
        debug!(
            source = %source.display(),
            target = %target.display(),
            width,
            height,
            "compressed image"
        );

        Ok(LocalImageHandle {
            uri: format!("file://{}", target.display()),
            width: Some(width),
            height: Some(height),
            file_name: Some(file_name),
            mime_type: Some("image/jpeg".to_string()),
            file_size,
        })
    }
}

fn output_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("image");
    let digest = Uuid::new_v5(&Uuid::NAMESPACE_URL, source.to_string_lossy().as_bytes())
        .simple()
        .to_string();
    format!("{stem}-{}.jpg", &digest[..8])
}
