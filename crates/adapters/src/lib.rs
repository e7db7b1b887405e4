pub mod fs;
pub mod identity;
pub mod migrations;
pub mod presenters;
pub mod sqlite;

pub use fs::{
    local_path, FsBlobStore, FsLocalImageReader, FsMediaLibrary, ImageCrateCompressor,
    SystemClock, JPEG_QUALITY, MAX_WIDTH,
};
pub use identity::MockIdentityProvider;
pub use presenters::{
    present_dots, present_listing_detail, present_listing_row, present_viewer_effect,
    present_viewer_header,
};
pub use sqlite::{normalize_images, SqliteRecordStore};
