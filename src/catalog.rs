//! Lookup catalogs - manufacturers, clients, statuses, countries, tags
//!
//! Every catalog is a flat table of unique names. Items refer to catalog
//! entries by name only; renaming or deleting an entry does not touch the
//! items that carry the old name.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five lookup catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Part maker; detail holds the CAGE code
    Manufacturer,
    /// Customer the stock is held for; detail holds a contact
    Client,
    /// Stock condition (serviceable, quarantine, ...)
    Status,
    /// Country of origin; detail holds the ISO code
    Country,
    /// Free-form label; an item may carry several
    Tag,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Manufacturer => "manufacturer",
            CatalogKind::Client => "client",
            CatalogKind::Status => "status",
            CatalogKind::Country => "country",
            CatalogKind::Tag => "tag",
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::Manufacturer => "manufacturers",
            CatalogKind::Client => "clients",
            CatalogKind::Status => "statuses",
            CatalogKind::Country => "countries",
            CatalogKind::Tag => "tags",
        }
    }

    /// Column on `items` that refers to this catalog by name
    pub fn item_column(&self) -> &'static str {
        match self {
            CatalogKind::Manufacturer => "manufacturer",
            CatalogKind::Client => "client",
            CatalogKind::Status => "status",
            CatalogKind::Country => "country",
            CatalogKind::Tag => "tags",
        }
    }

    pub fn all() -> &'static [CatalogKind] {
        &[
            CatalogKind::Manufacturer,
            CatalogKind::Client,
            CatalogKind::Status,
            CatalogKind::Country,
            CatalogKind::Tag,
        ]
    }
}

impl FromStr for CatalogKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "manufacturer" | "manufacturers" | "mfr" | "maker" => Ok(CatalogKind::Manufacturer),
            "client" | "clients" | "customer" | "customers" => Ok(CatalogKind::Client),
            "status" | "statuses" | "state" => Ok(CatalogKind::Status),
            "country" | "countries" | "origin" => Ok(CatalogKind::Country),
            "tag" | "tags" | "label" => Ok(CatalogKind::Tag),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row in one of the catalog tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub kind: CatalogKind,
    pub name: String,
    /// Kind-specific free text (CAGE code, contact, ISO code, description)
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Trim a catalog name and reject blanks or list separators
pub fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("name is required".to_string()));
    }
    // Tags are stored comma-joined on items.
    if name.contains(',') || name.contains(';') {
        return Err(Error::InvalidInput(format!(
            "name {:?} may not contain ',' or ';'",
            name
        )));
    }
    Ok(name.to_string())
}
