mod blob_store;
mod clock;
mod compressor;
mod library;
mod reader;

pub use blob_store::FsBlobStore;
pub use clock::SystemClock;
pub use compressor::{ImageCrateCompressor, JPEG_QUALITY, MAX_WIDTH};
pub use library::FsMediaLibrary;
pub use reader::{local_path, FsLocalImageReader};
