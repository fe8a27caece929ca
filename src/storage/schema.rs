//! Database schema definitions

/// Value written to `PRAGMA user_version` when the schema is created
pub const SCHEMA_VERSION: i64 = 1;

/// SQL to create the items table
///
/// `skus` and `tags` are comma-joined lists. `manufacturer`, `client`,
/// `status` and `country` hold catalog names, not ids.
pub const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    barcode TEXT,
    part_number TEXT,
    skus TEXT NOT NULL DEFAULT '',
    quantity INTEGER NOT NULL DEFAULT 0,
    manufacturer TEXT,
    client TEXT,
    status TEXT,
    country TEXT,
    tags TEXT NOT NULL DEFAULT '',
    location TEXT,
    notes TEXT,
    is_serialized INTEGER NOT NULL DEFAULT 0,
    is_hazardous INTEGER NOT NULL DEFAULT 0,
    received_at TEXT,
    expires_at TEXT,
    image BLOB,
    created_at TEXT NOT NULL,
    created_by TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    updated_by TEXT NOT NULL
)
"#;

/// SQL to create the history table
/// One row per item; the five list columns are `;`-joined and parallel
pub const CREATE_HISTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS history (
    item_id INTEGER PRIMARY KEY,
    names TEXT NOT NULL DEFAULT '',
    statuses TEXT NOT NULL DEFAULT '',
    comments TEXT NOT NULL DEFAULT '',
    dates TEXT NOT NULL DEFAULT '',
    users TEXT NOT NULL DEFAULT ''
)
"#;

pub const CREATE_MANUFACTURERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS manufacturers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    detail TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const CREATE_CLIENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    detail TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const CREATE_STATUSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS statuses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    detail TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const CREATE_COUNTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    detail TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const CREATE_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    detail TEXT,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_items_barcode ON items(barcode)",
    "CREATE INDEX IF NOT EXISTS idx_items_name ON items(name)",
    "CREATE INDEX IF NOT EXISTS idx_items_manufacturer ON items(manufacturer)",
    "CREATE INDEX IF NOT EXISTS idx_items_status ON items(status)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_ITEMS_TABLE,
        CREATE_HISTORY_TABLE,
        CREATE_MANUFACTURERS_TABLE,
        CREATE_CLIENTS_TABLE,
        CREATE_STATUSES_TABLE,
        CREATE_COUNTRIES_TABLE,
        CREATE_TAGS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
