use std::fmt::{Display, Formatter};

use lite_market_domain::{DomainError, ListingId};
use thiserror::Error;

/// Per-field validation messages, rendered inline next to each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub price: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.title.as_deref(), self.price.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join(" "))
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("media library permission denied")]
    PermissionDenied,
    #[error("image picking cancelled")]
    Cancelled,
    #[error("picker failed: {0}")]
    Picker(String),
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("failed to compress {uri}: {message}")]
    CompressionFailed { uri: String, message: String },
    #[error("failed to upload {path}: {message}")]
    UploadFailed { path: String, message: String },
    #[error("failed to get public url for {path}")]
    UrlResolutionFailed { path: String },
    #[error("record store error: {0}")]
    RecordStore(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("unknown error: {0}")]
    Unknown(String),
    /// The listing record exists but a later step of the same submission
    /// failed. Retrying must edit `listing_id` rather than create again.
    #[error("listing {listing_id} was saved but not completed: {source}")]
    PartiallySaved {
        listing_id: ListingId,
        source: Box<ApplicationError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    Cancelled,
    ValidationError,
    NotAuthenticated,
    CompressionFailed,
    UploadFailed,
    UrlResolutionFailed,
    RecordStoreError,
    UnknownError,
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PartiallySaved { source, .. } => source.kind(),
            Self::Domain(DomainError::EmptyTitle)
            | Self::Domain(DomainError::InvalidPrice(_))
            | Self::Domain(DomainError::NonPositivePrice(_))
            | Self::Domain(DomainError::EmptyImageReference)
            | Self::Validation(_)
            | Self::InvalidInput(_) => ErrorKind::ValidationError,
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NotAuthenticated | Self::InvalidCredentials => ErrorKind::NotAuthenticated,
            Self::CompressionFailed { .. } => ErrorKind::CompressionFailed,
            Self::UploadFailed { .. } => ErrorKind::UploadFailed,
            Self::UrlResolutionFailed { .. } => ErrorKind::UrlResolutionFailed,
            Self::RecordStore(_) | Self::NotFound(_) => ErrorKind::RecordStoreError,
            Self::Domain(_)
            | Self::Picker(_)
            | Self::Io(_)
            | Self::SubmissionInFlight
            | Self::Unknown(_) => ErrorKind::UnknownError,
        }
    }

    /// The single message shown to the user. `None` for outcomes that are
    /// not errors from the user's point of view.
    pub fn user_message(&self) -> Option<String> {
        if let Self::PartiallySaved { source, .. } = self {
            return source.user_message();
        }
        let message = match self.kind() {
            ErrorKind::Cancelled => return None,
            ErrorKind::PermissionDenied => "Media library permission denied.".to_string(),
            ErrorKind::ValidationError => match self {
                Self::Validation(fields) => fields.to_string(),
                other => other.to_string(),
            },
            ErrorKind::NotAuthenticated => match self {
                Self::InvalidCredentials => "Invalid email or password.".to_string(),
                _ => "Please sign in to continue.".to_string(),
            },
            ErrorKind::CompressionFailed => "Failed to prepare an image for upload.".to_string(),
            ErrorKind::UploadFailed => "Failed to upload images. Please try again.".to_string(),
            ErrorKind::UrlResolutionFailed => "Failed to get public URL".to_string(),
            ErrorKind::RecordStoreError => match self {
                Self::NotFound(message) => format!("Not found: {message}"),
                _ => "Could not save the listing. Please try again.".to_string(),
            },
            ErrorKind::UnknownError => match self {
                Self::SubmissionInFlight => "Already saving, please wait.".to_string(),
                _ => "Something went wrong.".to_string(),
            },
        };
        Some(message)
    }

    /// Listing left behind by a submission that failed after creating it.
    pub fn created_listing(&self) -> Option<&ListingId> {
        match self {
            Self::PartiallySaved { listing_id, .. } => Some(listing_id),
            _ => None,
        }
    }
}
