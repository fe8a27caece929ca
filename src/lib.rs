//! # Aerostock - Inventory store for aerospace parts
//!
//! Aerostock keeps a single-tenant parts inventory in a local SQLite file:
//! - Items with barcodes, comma-joined SKU lists, quantities and audit fields
//! - Per-item change history stored as parallel semicolon-joined columns
//! - Lookup catalogs: manufacturers, clients, statuses, countries, tags
//! - Grouped quantity aggregates for reporting

pub mod item;
pub mod history;
pub mod catalog;
pub mod storage;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use item::{Item, NewItem, SkuList, StockLevel};
pub use history::{HistoryEntry, HistoryRecord};
pub use catalog::{CatalogEntry, CatalogKind};
pub use storage::InventoryStore;

/// Result type alias for Aerostock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Aerostock operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid SKU: {0:?}")]
    InvalidSku(String),

    #[error("SKU {0} is already listed on this item")]
    DuplicateSku(String),

    #[error("{kind} named {name:?} already exists")]
    Duplicate { kind: CatalogKind, name: String },

    #[error("Quantity cannot be negative: {0}")]
    InvalidQuantity(i64),

    #[error("Item {item_id} has {available} units, cannot remove {requested}")]
    InsufficientStock {
        item_id: i64,
        available: i64,
        requested: u64,
    },

    #[error("Item {item_id} quantity would overflow when adding {delta}")]
    QuantityOverflow { item_id: i64, delta: i64 },

    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("History for item {item_id} is corrupt: {reason}")]
    CorruptHistory { item_id: i64, reason: String },

    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
