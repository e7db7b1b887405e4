use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyListingId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ListingId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a listing. `Available` is the status the public browse feed
/// filters on; new listings start out `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    #[default]
    Active,
    Paused,
    Sold,
    Available,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Sold => "sold",
            Self::Available => "available",
        }
    }
}

impl Display for ListingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "sold" => Ok(Self::Sold),
            "available" => Ok(Self::Available),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    /// Display order; every entry is a remote reference once persisted.
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub seller_id: UserId,
    pub created_at: String,
}

impl Listing {
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.seller_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_id_is_trimmed_and_must_not_be_empty() {
        assert_eq!(ListingId::new("  abc ").expect("id").as_str(), "abc");
        assert_eq!(ListingId::new("   "), Err(DomainError::EmptyListingId));
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(ListingStatus::default(), ListingStatus::Active);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Available".parse::<ListingStatus>(), Ok(ListingStatus::Available));
        assert_eq!("sold".parse::<ListingStatus>(), Ok(ListingStatus::Sold));
        assert!(matches!(
            "archived".parse::<ListingStatus>(),
            Err(DomainError::UnknownStatus(_))
        ));
    }
}
