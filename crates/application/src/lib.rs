mod error;
mod form;
mod media;
mod ports;
mod service;
mod session;
mod submission;
mod uploader;
mod use_cases;

pub use error::{ApplicationError, ErrorKind, FieldErrors};
pub use form::{FormMode, ListingForm};
pub use media::{ImagePickerState, MediaPicker};
pub use ports::{
    BlobStore, Clock, Credentials, IdentityProvider, ImageCompressor, ListingFilter,
    ListingOrder, ListingPatch, ListingQuery, LocalBlob, LocalImageReader, MediaLibrary,
    NewListing, PermissionStatus, PickerOptions, PickerOutcome, RecordStore, RowRange, Session,
    UploadOptions,
};
pub use service::{ApplicationService, MAX_PAGE_SIZE};
pub use session::{SessionStore, SubscriptionId};
pub use submission::{ListingDraft, ListingSubmissionPipeline, SubmissionStage};
pub use uploader::{storage_path, ImageUploader};
pub use use_cases::{
    BootstrapCommand, CreateListingCommand, EditListingCommand, ListAvailableQuery,
    MyListingsQuery, ShowListingQuery, SignInCommand,
};
