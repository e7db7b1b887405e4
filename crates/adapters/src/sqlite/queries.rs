use lite_market_application::{
    ApplicationError, ListingFilter, ListingOrder, ListingPatch, ListingQuery,
};
use lite_market_domain::{Listing, ListingId, ListingStatus, UserId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result, Row};

const ITEM_COLUMNS: &str = "id, title, description, price, images, status, seller_id, created_at";

/// Raw `items` row. Decoding into [`Listing`] is the only place stored
/// shapes are reconciled with the domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub images: Option<String>,
    pub status: String,
    pub seller_id: String,
    pub created_at: String,
}

impl ItemsRow {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            images: row.get(4)?,
            status: row.get(5)?,
            seller_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    pub fn into_listing(self) -> std::result::Result<Listing, ApplicationError> {
        let status = self.status.parse::<ListingStatus>()?;
        Ok(Listing {
            id: ListingId::new(self.id)?,
            title: self.title,
            description: self.description.unwrap_or_default(),
            price_cents: self.price,
            images: normalize_images(self.images.as_deref()),
            status,
            seller_id: UserId::new(self.seller_id)?,
            created_at: self.created_at,
        })
    }
}

/// Accepts a JSON array, a JSON string (which may itself hold an encoded
/// array), a bare reference, or nothing. Non-string array entries are dropped.
pub fn normalize_images(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(values)) => string_entries(values),
        Ok(serde_json::Value::String(inner)) => match serde_json::from_str(inner.trim()) {
            Ok(serde_json::Value::Array(values)) => string_entries(values),
            _ if inner.trim().is_empty() => Vec::new(),
            _ => vec![inner],
        },
        Ok(serde_json::Value::Null) => Vec::new(),
        _ => vec![raw.to_string()],
    }
}

fn string_entries(values: Vec<serde_json::Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(reference) => Some(reference),
            _ => None,
        })
        .collect()
}

pub fn encode_images(images: &[String]) -> String {
    serde_json::Value::from(images.to_vec()).to_string()
}

pub fn insert_item(conn: &Connection, row: &ItemsRow) -> Result<()> {
    conn.execute(
        "INSERT INTO items (id, title, description, price, images, status, seller_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.id,
            row.title,
            row.description,
            row.price,
            row.images,
            row.status,
            row.seller_id,
            row.created_at,
        ],
    )?;
    Ok(())
}

/// Overwrites only the fields present in `patch`. Returns the number of
/// matched rows.
pub fn update_item(
    conn: &Connection,
    item_id: &str,
    seller_id: &str,
    patch: &ListingPatch,
) -> Result<usize> {
    let mut assignments = Vec::new();
    let mut values = Vec::new();

    if let Some(title) = &patch.title {
        assignments.push("title = ?");
        values.push(Value::Text(title.clone()));
    }
    if let Some(description) = &patch.description {
        assignments.push("description = ?");
        values.push(Value::Text(description.clone()));
    }
    if let Some(price) = patch.price_cents {
        assignments.push("price = ?");
        values.push(Value::Integer(price));
    }
    if let Some(images) = &patch.images {
        assignments.push("images = ?");
        values.push(Value::Text(encode_images(images)));
    }
    if let Some(status) = patch.status {
        assignments.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    values.push(Value::Text(item_id.to_string()));
    values.push(Value::Text(seller_id.to_string()));
    let sql = format!(
        "UPDATE items SET {} WHERE id = ? AND seller_id = ?",
        assignments.join(", ")
    );
    conn.execute(&sql, params_from_iter(values))
}

pub fn select_items(conn: &Connection, query: &ListingQuery) -> Result<Vec<ItemsRow>> {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for filter in &query.filters {
        match filter {
            ListingFilter::Id(id) => {
                clauses.push("id = ?");
                values.push(Value::Text(id.as_str().to_string()));
            }
            ListingFilter::Seller(seller_id) => {
                clauses.push("seller_id = ?");
                values.push(Value::Text(seller_id.as_str().to_string()));
            }
            ListingFilter::Status(status) => {
                clauses.push("status = ?");
                values.push(Value::Text(status.as_str().to_string()));
            }
        }
    }

    let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(match query.order {
        ListingOrder::CreatedAtDesc => " ORDER BY created_at DESC, id DESC",
        ListingOrder::IdDesc => " ORDER BY id DESC",
    });
    if let Some(range) = query.range {
        let limit = range.to.saturating_sub(range.from) + 1;
        sql.push_str(" LIMIT ? OFFSET ?");
        values.push(Value::Integer(limit as i64));
        values.push(Value::Integer(range.from as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), ItemsRow::from_row)?;
    rows.collect()
}

pub fn find_item(conn: &Connection, item_id: &str) -> Result<Option<ItemsRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))?;
    let mut rows = stmt.query(params![item_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(ItemsRow::from_row(row)?));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_every_stored_image_shape() {
        assert_eq!(normalize_images(None), Vec::<String>::new());
        assert_eq!(normalize_images(Some("  ")), Vec::<String>::new());
        assert_eq!(normalize_images(Some(r#"["a", 3, "b"]"#)), vec!["a", "b"]);
        assert_eq!(
            normalize_images(Some("https://cdn.test/a.jpg")),
            vec!["https://cdn.test/a.jpg"]
        );
        assert_eq!(normalize_images(Some(r#""https://x/y.jpg""#)), vec!["https://x/y.jpg"]);
        assert_eq!(normalize_images(Some("null")), Vec::<String>::new());
        assert_eq!(
            normalize_images(Some(r#""[\"a\",\"b\"]""#)),
            vec!["a", "b"]
        );
    }

    #[test]
    fn unknown_status_is_rejected_at_decode() {
        let row = ItemsRow {
            id: "i".to_string(),
            title: "t".to_string(),
            description: None,
            price: 1,
            images: None,
            status: "archived".to_string(),
            seller_id: "u".to_string(),
            created_at: "c".to_string(),
        };
        assert!(matches!(
            row.into_listing(),
            Err(ApplicationError::Domain(_))
        ));
    }
}
