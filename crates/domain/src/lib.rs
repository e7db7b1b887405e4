mod carousel;
mod error;
mod listing;
mod media;
mod price;
mod viewer;

pub use carousel::{resolve_slide_height, CarouselController, CarouselState, ScrollCommand};
pub use error::DomainError;
pub use listing::{Listing, ListingId, ListingStatus, UserId};
pub use media::{
    derive_upload_file_name, infer_content_type, is_remote_reference, ImageRef, ImageSelection,
    LocalImageHandle, DEFAULT_CONTENT_TYPE,
};
pub use price::{format_price_cents, parse_price_cents};
pub use viewer::{
    select_renderer, CloseSource, FullScreenViewerController, GestureViewerRenderer, PageSignal,
    PlatformCapability, RendererKind, ScrollPagingRenderer, ViewerEffect, ViewerRenderer,
    ViewerState,
};
