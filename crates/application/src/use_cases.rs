use lite_market_domain::ListingId;

use crate::ListingDraft;

#[derive(Debug, Clone, Default)]
pub struct BootstrapCommand;

#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ListAvailableQuery {
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListAvailableQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShowListingQuery {
    pub listing_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct MyListingsQuery;

#[derive(Debug, Clone)]
pub struct CreateListingCommand {
    pub draft: ListingDraft,
}

#[derive(Debug, Clone)]
pub struct EditListingCommand {
    pub listing_id: ListingId,
    pub draft: ListingDraft,
}
