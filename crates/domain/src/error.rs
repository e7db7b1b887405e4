use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("listing id must not be empty")]
    EmptyListingId,
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("title is required")]
    EmptyTitle,
    #[error("price is not a number: {0:?}")]
    InvalidPrice(String),
    #[error("price must be positive, got {0} cents")]
    NonPositivePrice(i64),
    #[error("unknown listing status: {0}")]
    UnknownStatus(String),
    #[error("image reference must not be empty")]
    EmptyImageReference,
}
