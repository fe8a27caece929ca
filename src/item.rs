//! Item records and the comma-joined SKU list
//!
//! An item is one stocked part. Relationships to manufacturers, clients,
//! statuses, countries and tags are plain names, not foreign keys.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used for the `skus` and `tags` columns
pub const LIST_SEPARATOR: char = ',';

/// Quantity at or below which stock counts as low
pub const LOW_STOCK_THRESHOLD: i64 = 2;

/// Coarse on-hand level used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Out,
    Low,
    Available,
}

impl StockLevel {
    pub fn of(quantity: i64) -> Self {
        if quantity <= 0 {
            StockLevel::Out
        } else if quantity <= LOW_STOCK_THRESHOLD {
            StockLevel::Low
        } else {
            StockLevel::Available
        }
    }
}

/// Ordered list of per-unit serial identifiers.
///
/// Persisted as a single comma-joined column. Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct SkuList(Vec<String>);

impl SkuList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a stored column value. Blank segments are dropped.
    pub fn parse(column: &str) -> Self {
        Self(split_list(column))
    }

    /// Join back into the stored column value
    pub fn to_column(&self) -> String {
        join_list(&self.0)
    }

    /// Append an SKU, rejecting separators and duplicates
    pub fn push(&mut self, sku: &str) -> Result<()> {
        let sku = sku.trim();
        check_sku(sku)?;
        if self.contains(sku) {
            return Err(Error::DuplicateSku(sku.to_string()));
        }
        self.0.push(sku.to_string());
        Ok(())
    }

    /// Remove the first exact match. Returns whether anything was removed.
    pub fn remove(&mut self, sku: &str) -> bool {
        let sku = sku.trim();
        match self.0.iter().position(|s| s == sku) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.0.iter().any(|s| s == sku)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for SkuList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl TryFrom<Vec<String>> for SkuList {
    type Error = Error;

    fn try_from(values: Vec<String>) -> Result<Self> {
        let mut skus = Self::new();
        for sku in &values {
            skus.push(sku)?;
        }
        Ok(skus)
    }
}

impl From<SkuList> for Vec<String> {
    fn from(skus: SkuList) -> Self {
        skus.0
    }
}

fn check_sku(sku: &str) -> Result<()> {
    if sku.is_empty() || sku != sku.trim() || sku.contains(LIST_SEPARATOR) || sku.contains(';') {
        return Err(Error::InvalidSku(sku.to_string()));
    }
    Ok(())
}

/// A tag must survive the comma-joined column unchanged
fn check_tag(tag: &str) -> Result<()> {
    if tag.trim().is_empty() || tag.contains(LIST_SEPARATOR) || tag.contains(';') {
        return Err(Error::InvalidInput(format!("invalid tag '{}'", tag)));
    }
    Ok(())
}

/// Split a comma-joined column, trimming and dropping blanks
pub fn split_list(column: &str) -> Vec<String> {
    column
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join values into a comma-joined column
pub fn join_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Insert-form payload for an item.
///
/// Also used for full-column overwrites by `InventoryStore::update_item`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub barcode: Option<String>,
    pub part_number: Option<String>,
    pub skus: SkuList,
    pub quantity: i64,
    pub manufacturer: Option<String>,
    pub client: Option<String>,
    pub status: Option<String>,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub is_serialized: bool,
    pub is_hazardous: bool,
    pub received_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub image: Option<Vec<u8>>,
}

impl NewItem {
    /// Create a payload with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.part_number = Some(part_number.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Mark as serialized: quantity follows the SKU list
    pub fn serialized(mut self, skus: SkuList) -> Self {
        self.is_serialized = true;
        self.quantity = skus.len() as i64;
        self.skus = skus;
        self
    }

    pub fn hazardous(mut self) -> Self {
        self.is_hazardous = true;
        self
    }

    pub fn with_received_at(mut self, date: NaiveDate) -> Self {
        self.received_at = Some(date);
        self
    }

    pub fn with_expires_at(mut self, date: NaiveDate) -> Self {
        self.expires_at = Some(date);
        self
    }

    /// Check the form before it is written
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("item name is required".to_string()));
        }
        if self.quantity < 0 {
            return Err(Error::InvalidQuantity(self.quantity));
        }
        for (i, sku) in self.skus.0.iter().enumerate() {
            check_sku(sku)?;
            if self.skus.0[..i].contains(sku) {
                return Err(Error::DuplicateSku(sku.clone()));
            }
        }
        for tag in &self.tags {
            check_tag(tag)?;
        }
        if let (Some(received), Some(expires)) = (self.received_at, self.expires_at) {
            if expires < received {
                return Err(Error::InvalidInput(format!(
                    "expiry {} is before receipt {}",
                    expires, received
                )));
            }
        }
        Ok(())
    }
}

/// A stored item row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub barcode: Option<String>,
    pub part_number: Option<String>,
    pub skus: SkuList,
    pub quantity: i64,
    pub manufacturer: Option<String>,
    pub client: Option<String>,
    pub status: Option<String>,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub is_serialized: bool,
    pub is_hazardous: bool,
    pub received_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    /// Omitted from JSON output; fetch with `InventoryStore::get_image`
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl Item {
    /// Convert back into an editable form (for full-column overwrites)
    pub fn to_new_item(&self) -> NewItem {
        NewItem {
            name: self.name.clone(),
            barcode: self.barcode.clone(),
            part_number: self.part_number.clone(),
            skus: self.skus.clone(),
            quantity: self.quantity,
            manufacturer: self.manufacturer.clone(),
            client: self.client.clone(),
            status: self.status.clone(),
            country: self.country.clone(),
            tags: self.tags.clone(),
            location: self.location.clone(),
            notes: self.notes.clone(),
            is_serialized: self.is_serialized,
            is_hazardous: self.is_hazardous,
            received_at: self.received_at,
            expires_at: self.expires_at,
            image: self.image.clone(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::of(self.quantity)
    }

    /// Whether the shelf life has run out as of `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_at.is_some_and(|d| d < today)
    }

    /// Get a short description for display
    pub fn short_description(&self) -> String {
        match &self.part_number {
            Some(pn) => format!("#{} {} [{}] x{}", self.id, self.name, pn, self.quantity),
            None => format!("#{} {} x{}", self.id, self.name, self.quantity),
        }
    }
}
