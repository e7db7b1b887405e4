mod queries;

use std::fs;
use std::path::PathBuf;

use lite_market_application::{
    ApplicationError, ListingPatch, ListingQuery, NewListing, RecordStore,
};
use lite_market_domain::{Listing, ListingId, UserId};
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::migrations::MIGRATIONS;

pub use queries::normalize_images;
use queries::{encode_images, ItemsRow};

#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    path: PathBuf,
}

impl SqliteRecordStore {
    pub fn new(path: String) -> Self {
        Self {
            path: PathBuf::from(path),
        }
    }

    fn open_connection(&self) -> Result<Connection, ApplicationError> {
        Connection::open(&self.path).map_err(persistence)
    }

    fn fetch(&self, conn: &Connection, item_id: &str) -> Result<Listing, ApplicationError> {
        queries::find_item(conn, item_id)
            .map_err(persistence)?
            .ok_or_else(|| ApplicationError::NotFound("item not found".to_string()))?
            .into_listing()
    }
}

fn persistence(error: rusqlite::Error) -> ApplicationError {
    ApplicationError::RecordStore(error.to_string())
}

impl RecordStore for SqliteRecordStore {
    fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "database path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }

        let conn = self.open_connection()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(persistence)?;

        let applied: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(persistence)?;
        for (version, migration) in MIGRATIONS.iter().enumerate().skip(applied.max(0) as usize) {
            let next = version as i64 + 1;
            info!(version = next, "applying listing store migration");
            conn.execute_batch(migration).map_err(persistence)?;
            conn.pragma_update(None, "user_version", next)
                .map_err(persistence)?;
        }

        Ok(())
    }

    fn create_listing(&self, listing: &NewListing) -> Result<Listing, ApplicationError> {
        let conn = self.open_connection()?;
        let row = ItemsRow {
            id: Uuid::new_v4().to_string(),
            title: listing.title.clone(),
            description: Some(listing.description.clone()),
            price: listing.price_cents,
            images: Some(encode_images(&listing.images)),
            status: listing.status.as_str().to_string(),
            seller_id: listing.seller_id.as_str().to_string(),
            created_at: listing.created_at.clone(),
        };
        queries::insert_item(&conn, &row).map_err(persistence)?;
        debug!(listing_id = %row.id, "inserted item row");
        self.fetch(&conn, &row.id)
    }

    fn update_listing(
        &self,
        listing_id: &ListingId,
        seller_id: &UserId,
        patch: &ListingPatch,
    ) -> Result<Listing, ApplicationError> {
        if patch.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "no fields to update".to_string(),
            ));
        }

        let conn = self.open_connection()?;
        let matched = queries::update_item(&conn, listing_id.as_str(), seller_id.as_str(), patch)
            .map_err(persistence)?;
        if matched == 0 {
            return Err(ApplicationError::NotFound("item not found".to_string()));
        }
        self.fetch(&conn, listing_id.as_str())
    }

    fn select_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, ApplicationError> {
        let conn = self.open_connection()?;
        queries::select_items(&conn, query)
            .map_err(persistence)?
            .into_iter()
            .map(ItemsRow::into_listing)
            .collect()
    }
}
