use lite_market_domain::{Listing, ListingId, ListingStatus, LocalImageHandle, UserId};

use crate::ApplicationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub seller_id: UserId,
    pub created_at: String,
}

/// Field-wise overwrite; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub images: Option<Vec<String>>,
    pub status: Option<ListingStatus>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.images.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingFilter {
    Id(ListingId),
    Seller(UserId),
    Status(ListingStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    #[default]
    CreatedAtDesc,
    IdDesc,
}

/// Inclusive row range, as offset/limit pagination expresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub filters: Vec<ListingFilter>,
    pub order: ListingOrder,
    pub range: Option<RowRange>,
}

pub trait RecordStore {
    fn initialize(&self) -> Result<(), ApplicationError>;

    fn create_listing(&self, listing: &NewListing) -> Result<Listing, ApplicationError>;

    /// Applies `patch` to the listing matching both `listing_id` and `seller_id`.
    fn update_listing(
        &self,
        listing_id: &ListingId,
        seller_id: &UserId,
        patch: &ListingPatch,
    ) -> Result<Listing, ApplicationError>;

    fn select_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, ApplicationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    pub upsert: bool,
}

pub trait BlobStore {
    fn upload(&self, path: &str, bytes: &[u8], options: &UploadOptions)
        -> Result<(), ApplicationError>;

    fn public_url(&self, path: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerOptions {
    pub allows_multiple: bool,
    pub quality: f32,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            allows_multiple: true,
            quality: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Cancelled,
    Picked(Vec<LocalImageHandle>),
}

pub trait MediaLibrary {
    fn request_permission(&self) -> Result<PermissionStatus, ApplicationError>;

    fn launch_picker(&self, options: &PickerOptions) -> Result<PickerOutcome, ApplicationError>;
}

pub trait ImageCompressor {
    fn compress(&self, image: &LocalImageHandle) -> Result<LocalImageHandle, ApplicationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBlob {
    pub bytes: Vec<u8>,
    pub reported_type: Option<String>,
}

pub trait LocalImageReader {
    fn read(&self, image: &LocalImageHandle) -> Result<LocalBlob, ApplicationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub trait IdentityProvider {
    fn current_session(&self) -> Result<Option<Session>, ApplicationError>;

    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApplicationError>;

    fn sign_up(&self, credentials: &Credentials) -> Result<Session, ApplicationError>;

    fn sign_out(&self) -> Result<(), ApplicationError>;
}

pub trait Clock {
    fn now_timestamp_string(&self) -> String;
}
