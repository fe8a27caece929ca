//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - items(id, name, barcode, part_number, skus, quantity, ..., image, audit fields)
//! - history(item_id, names, statuses, comments, dates, users)
//! - manufacturers / clients / statuses / countries / tags(id, name, detail, created_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, GroupTotal, InventoryStore, ItemFilter};
