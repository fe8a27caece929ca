//! SQLite storage implementation

use std::collections::BTreeMap;
use std::path::Path;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use serde::Serialize;
use crate::{Result, Error};
use crate::catalog::{self, CatalogEntry, CatalogKind};
use crate::history::{self, HistoryEntry, HistoryRecord};
use crate::item::{self, Item, NewItem, SkuList};
use super::schema;

const ITEM_COLUMNS: &str = "id, name, barcode, part_number, skus, quantity, manufacturer, client, \
    status, country, tags, location, notes, is_serialized, is_hazardous, received_at, expires_at, \
    image, created_at, created_by, updated_at, updated_by";

const HISTORY_COLUMNS: &str = "item_id, names, statuses, comments, dates, users";

/// Group key for items with no value in the grouped column
pub const NO_GROUP: &str = "(none)";

/// SQLite-backed storage for the inventory
pub struct InventoryStore {
    conn: Connection,
}

impl InventoryStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("opened inventory at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        if self.schema_version()? == 0 {
            self.conn.pragma_update(None, "user_version", schema::SCHEMA_VERSION)?;
        }
        Ok(())
    }

    /// Schema version recorded in the file
    pub fn schema_version(&self) -> Result<i64> {
        let version = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    // ========== Item Operations ==========

    /// Insert a new item and return the stored row
    pub fn insert_item(&self, item: &NewItem, user: &str) -> Result<Item> {
        item.validate()?;
        let now = Utc::now();
        self.conn.execute(
            r#"
            INSERT INTO items (name, barcode, part_number, skus, quantity, manufacturer, client,
                status, country, tags, location, notes, is_serialized, is_hazardous, received_at,
                expires_at, image, created_at, created_by, updated_at, updated_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?18, ?19)
            "#,
            params![
                item.name.trim(),
                cleaned(&item.barcode),
                cleaned(&item.part_number),
                item.skus.to_column(),
                item.quantity,
                cleaned(&item.manufacturer),
                cleaned(&item.client),
                cleaned(&item.status),
                cleaned(&item.country),
                item::join_list(&item.tags),
                cleaned(&item.location),
                item.notes,
                item.is_serialized,
                item.is_hazardous,
                item.received_at,
                item.expires_at,
                item.image,
                now,
                user,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(item_id = id, user, "inserted item {:?}", item.name);
        self.get_item(id)?.ok_or(Error::ItemNotFound(id))
    }

    /// Get an item by id
    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], |row| self.row_to_item(row))
            .optional()
            .map_err(Into::into)
    }

    /// Find the item carrying a scanned barcode (lowest id wins)
    pub fn find_item_by_barcode(&self, barcode: &str) -> Result<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE barcode = ?1 ORDER BY id LIMIT 1");
        self.conn
            .query_row(&sql, [barcode.trim()], |row| self.row_to_item(row))
            .optional()
            .map_err(Into::into)
    }

    /// All items, ordered by name
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY name, id");
        self.query_items(&sql, [])
    }

    /// Search name, barcode, part number, SKUs and notes
    pub fn search_items(&self, query: &str, limit: usize) -> Result<Vec<Item>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let sql = format!(
            r"SELECT {ITEM_COLUMNS} FROM items
             WHERE name LIKE ?1 ESCAPE '\' OR barcode LIKE ?1 ESCAPE '\'
                OR part_number LIKE ?1 ESCAPE '\' OR skus LIKE ?1 ESCAPE '\'
                OR notes LIKE ?1 ESCAPE '\'
             ORDER BY name, id
             LIMIT ?2"
        );
        self.query_items(&sql, params![pattern, limit as i64])
    }

    /// Items referring to a catalog name
    pub fn items_by(&self, filter: &ItemFilter) -> Result<Vec<Item>> {
        let sql = if filter.kind == CatalogKind::Tag {
            format!(
                "SELECT {ITEM_COLUMNS} FROM items
                 WHERE instr(',' || tags || ',', ',' || ?1 || ',') > 0
                 ORDER BY name, id"
            )
        } else {
            format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE {} = ?1 ORDER BY name, id",
                filter.kind.item_column()
            )
        };
        self.query_items(&sql, [filter.name.as_str()])
    }

    /// Items whose shelf life ran out before `today`
    pub fn expired_items(&self, today: NaiveDate) -> Result<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE expires_at IS NOT NULL AND expires_at < ?1
             ORDER BY expires_at, id"
        );
        self.query_items(&sql, [today])
    }

    /// Overwrite every column of an item. Returns false if it does not exist.
    pub fn update_item(&self, id: i64, item: &NewItem, user: &str) -> Result<bool> {
        item.validate()?;
        let changed = self.conn.execute(
            r#"
            UPDATE items SET name = ?2, barcode = ?3, part_number = ?4, skus = ?5, quantity = ?6,
                manufacturer = ?7, client = ?8, status = ?9, country = ?10, tags = ?11,
                location = ?12, notes = ?13, is_serialized = ?14, is_hazardous = ?15,
                received_at = ?16, expires_at = ?17, image = ?18, updated_at = ?19, updated_by = ?20
            WHERE id = ?1
            "#,
            params![
                id,
                item.name.trim(),
                cleaned(&item.barcode),
                cleaned(&item.part_number),
                item.skus.to_column(),
                item.quantity,
                cleaned(&item.manufacturer),
                cleaned(&item.client),
                cleaned(&item.status),
                cleaned(&item.country),
                item::join_list(&item.tags),
                cleaned(&item.location),
                item.notes,
                item.is_serialized,
                item.is_hazardous,
                item.received_at,
                item.expires_at,
                item.image,
                Utc::now(),
                user,
            ],
        )?;
        tracing::debug!(item_id = id, user, changed, "updated item");
        Ok(changed == 1)
    }

    /// Set the quantity on hand
    pub fn set_quantity(&self, id: i64, quantity: i64, user: &str) -> Result<bool> {
        if quantity < 0 {
            return Err(Error::InvalidQuantity(quantity));
        }
        let changed = self.conn.execute(
            "UPDATE items SET quantity = ?2, updated_at = ?3, updated_by = ?4 WHERE id = ?1",
            params![id, quantity, Utc::now(), user],
        )?;
        Ok(changed == 1)
    }

    /// Add `delta` (may be negative) to the quantity and return the new value
    pub fn adjust_quantity(&self, id: i64, delta: i64, user: &str) -> Result<i64> {
        let current: i64 = self
            .conn
            .query_row("SELECT quantity FROM items WHERE id = ?1", [id], |row| row.get(0))
            .optional()?
            .ok_or(Error::ItemNotFound(id))?;

        let updated = current
            .checked_add(delta)
            .ok_or(Error::QuantityOverflow { item_id: id, delta })?;
        if updated < 0 {
            return Err(Error::InsufficientStock {
                item_id: id,
                available: current,
                requested: delta.unsigned_abs(),
            });
        }
        self.set_quantity(id, updated, user)?;
        tracing::debug!(item_id = id, delta, quantity = updated, "adjusted quantity");
        Ok(updated)
    }

    /// Replace or clear the image blob
    pub fn set_image(&self, id: i64, image: Option<&[u8]>, user: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE items SET image = ?2, updated_at = ?3, updated_by = ?4 WHERE id = ?1",
            params![id, image, Utc::now(), user],
        )?;
        Ok(changed == 1)
    }

    /// Get the image blob of an item
    pub fn get_image(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let image: Option<Option<Vec<u8>>> = self
            .conn
            .query_row("SELECT image FROM items WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(image.flatten())
    }

    /// Delete an item row. Its history record is left in place.
    pub fn delete_item(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
        tracing::debug!(item_id = id, deleted, "deleted item");
        Ok(deleted == 1)
    }

    /// Count all items
    pub fn count_items(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to run an item query
    fn query_items<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql)?;
        let items = stmt
            .query_map(params, |row| self.row_to_item(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Helper to convert a row to an Item
    fn row_to_item(&self, row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let skus: String = row.get(4)?;
        let tags: String = row.get(10)?;

        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            barcode: row.get(2)?,
            part_number: row.get(3)?,
            skus: SkuList::parse(&skus),
            quantity: row.get(5)?,
            manufacturer: row.get(6)?,
            client: row.get(7)?,
            status: row.get(8)?,
            country: row.get(9)?,
            tags: item::split_list(&tags),
            location: row.get(11)?,
            notes: row.get(12)?,
            is_serialized: row.get(13)?,
            is_hazardous: row.get(14)?,
            received_at: row.get(15)?,
            expires_at: row.get(16)?,
            image: row.get(17)?,
            created_at: row.get(18)?,
            created_by: row.get(19)?,
            updated_at: row.get(20)?,
            updated_by: row.get(21)?,
        })
    }

    // ========== SKU Operations ==========

    /// Append an SKU. Serialized items gain one unit.
    pub fn add_sku(&self, item_id: i64, sku: &str, user: &str) -> Result<SkuList> {
        let (mut skus, quantity, serialized) = self.sku_state(item_id)?;
        skus.push(sku)?;
        let quantity = if serialized {
            quantity
                .checked_add(1)
                .ok_or(Error::QuantityOverflow { item_id, delta: 1 })?
        } else {
            quantity
        };
        self.write_skus(item_id, &skus, quantity, user)?;
        tracing::debug!(item_id, sku, "added sku");
        Ok(skus)
    }

    /// Remove an SKU. Serialized items lose one unit, never going below zero.
    pub fn remove_sku(&self, item_id: i64, sku: &str, user: &str) -> Result<bool> {
        let (mut skus, quantity, serialized) = self.sku_state(item_id)?;
        if !skus.remove(sku) {
            return Ok(false);
        }
        let quantity = if serialized { quantity.saturating_sub(1).max(0) } else { quantity };
        self.write_skus(item_id, &skus, quantity, user)?;
        tracing::debug!(item_id, sku, "removed sku");
        Ok(true)
    }

    /// Find the item whose SKU list contains `sku` exactly
    pub fn find_item_by_sku(&self, sku: &str) -> Result<Option<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE instr(',' || skus || ',', ',' || ?1 || ',') > 0
             ORDER BY id LIMIT 1"
        );
        self.conn
            .query_row(&sql, [sku.trim()], |row| self.row_to_item(row))
            .optional()
            .map_err(Into::into)
    }

    fn sku_state(&self, item_id: i64) -> Result<(SkuList, i64, bool)> {
        self.conn
            .query_row(
                "SELECT skus, quantity, is_serialized FROM items WHERE id = ?1",
                [item_id],
                |row| {
                    let skus: String = row.get(0)?;
                    Ok((SkuList::parse(&skus), row.get(1)?, row.get(2)?))
                },
            )
            .optional()?
            .ok_or(Error::ItemNotFound(item_id))
    }

    fn write_skus(&self, item_id: i64, skus: &SkuList, quantity: i64, user: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE items SET skus = ?2, quantity = ?3, updated_at = ?4, updated_by = ?5 WHERE id = ?1",
            params![item_id, skus.to_column(), quantity, Utc::now(), user],
        )?;
        Ok(())
    }

    // ========== History Operations ==========

    /// Create an empty history record. Returns false if one already exists.
    pub fn create_history(&self, item_id: i64) -> Result<bool> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO history (item_id) VALUES (?1)", [item_id])?;
        Ok(inserted == 1)
    }

    /// Get the raw history record of an item
    pub fn get_history(&self, item_id: i64) -> Result<Option<HistoryRecord>> {
        let sql = format!("SELECT {HISTORY_COLUMNS} FROM history WHERE item_id = ?1");
        self.conn
            .query_row(&sql, [item_id], |row| {
                Ok(HistoryRecord {
                    item_id: row.get(0)?,
                    names: row.get(1)?,
                    statuses: row.get(2)?,
                    comments: row.get(3)?,
                    dates: row.get(4)?,
                    users: row.get(5)?,
                })
            })
            .optional()
            .map_err(Into::into)
    }

    /// History entries of an item, oldest first. Empty if it has no record.
    pub fn history_entries(&self, item_id: i64) -> Result<Vec<HistoryEntry>> {
        let Some(record) = self.get_history(item_id)? else {
            return Ok(Vec::new());
        };
        record.entries().inspect_err(|e| {
            tracing::warn!(item_id, "unreadable history: {}", e);
        })
    }

    /// Append an entry, creating the record on first use.
    ///
    /// The five columns are extended by a single UPDATE so they cannot
    /// drift apart.
    pub fn append_history(&self, item_id: i64, entry: &HistoryEntry) -> Result<()> {
        entry.check()?;
        self.create_history(item_id)?;
        let [name, status, comment, date, user] = history::entry_segments(entry);
        self.conn.execute(
            r#"
            UPDATE history SET
                names    = CASE WHEN (names || statuses || comments || dates || users) = '' THEN ?2 ELSE names    || ';' || ?2 END,
                statuses = CASE WHEN (names || statuses || comments || dates || users) = '' THEN ?3 ELSE statuses || ';' || ?3 END,
                comments = CASE WHEN (names || statuses || comments || dates || users) = '' THEN ?4 ELSE comments || ';' || ?4 END,
                dates    = CASE WHEN (names || statuses || comments || dates || users) = '' THEN ?5 ELSE dates    || ';' || ?5 END,
                users    = CASE WHEN (names || statuses || comments || dates || users) = '' THEN ?6 ELSE users    || ';' || ?6 END
            WHERE item_id = ?1
            "#,
            params![item_id, name, status, comment, date, user],
        )?;
        tracing::debug!(item_id, "appended history entry");
        Ok(())
    }

    /// Snapshot the item's name and status into a new history entry
    pub fn record_change(&self, item_id: i64, comment: &str, user: &str) -> Result<HistoryEntry> {
        let item = self.get_item(item_id)?.ok_or(Error::ItemNotFound(item_id))?;
        let entry = HistoryEntry::at(
            Utc::now(),
            item.name,
            item.status.unwrap_or_default(),
            comment,
            user,
        );
        self.append_history(item_id, &entry)?;
        Ok(entry)
    }

    /// Delete the history record of an item
    pub fn delete_history(&self, item_id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM history WHERE item_id = ?1", [item_id])?;
        Ok(deleted == 1)
    }

    /// Item ids that have history but no item
    pub fn orphaned_history(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT h.item_id FROM history h LEFT JOIN items i ON i.id = h.item_id
             WHERE i.id IS NULL ORDER BY h.item_id",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        if !ids.is_empty() {
            tracing::warn!(count = ids.len(), "found orphaned history records");
        }
        Ok(ids)
    }

    /// Count history records
    pub fn count_history(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Catalog Operations ==========

    /// Insert a catalog entry. Names are unique per kind.
    pub fn insert_catalog(&self, kind: CatalogKind, name: &str, detail: Option<&str>) -> Result<CatalogEntry> {
        let name = catalog::normalize_name(name)?;
        let sql = format!(
            "INSERT INTO {} (name, detail, created_at) VALUES (?1, ?2, ?3)",
            kind.table()
        );
        self.conn
            .execute(&sql, params![name, detail, Utc::now()])
            .map_err(|e| unique_violation(e, kind, &name))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(kind = kind.as_str(), id, "inserted catalog entry {:?}", name);
        self.get_catalog(kind, id)?
            .ok_or_else(|| Error::InvalidInput(format!("{} {} vanished after insert", kind, id)))
    }

    /// Get a catalog entry by id
    pub fn get_catalog(&self, kind: CatalogKind, id: i64) -> Result<Option<CatalogEntry>> {
        let sql = format!("SELECT id, name, detail, created_at FROM {} WHERE id = ?1", kind.table());
        self.conn
            .query_row(&sql, [id], |row| row_to_catalog(kind, row))
            .optional()
            .map_err(Into::into)
    }

    /// Find a catalog entry by exact name
    pub fn find_catalog_by_name(&self, kind: CatalogKind, name: &str) -> Result<Option<CatalogEntry>> {
        let sql = format!("SELECT id, name, detail, created_at FROM {} WHERE name = ?1", kind.table());
        self.conn
            .query_row(&sql, [name.trim()], |row| row_to_catalog(kind, row))
            .optional()
            .map_err(Into::into)
    }

    /// All entries of a catalog, ordered by name
    pub fn list_catalog(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT id, name, detail, created_at FROM {} ORDER BY name COLLATE NOCASE, id",
            kind.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], |row| row_to_catalog(kind, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Rename an entry and replace its detail. Items keep the old name.
    pub fn update_catalog(&self, kind: CatalogKind, id: i64, name: &str, detail: Option<&str>) -> Result<bool> {
        let name = catalog::normalize_name(name)?;
        let sql = format!("UPDATE {} SET name = ?2, detail = ?3 WHERE id = ?1", kind.table());
        let changed = self
            .conn
            .execute(&sql, params![id, name, detail])
            .map_err(|e| unique_violation(e, kind, &name))?;
        Ok(changed == 1)
    }

    /// Delete an entry. Items keep the name.
    pub fn delete_catalog(&self, kind: CatalogKind, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
        let deleted = self.conn.execute(&sql, [id])?;
        Ok(deleted == 1)
    }

    /// Count entries of a catalog
    pub fn count_catalog(&self, kind: CatalogKind) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of items referring to a catalog name
    pub fn catalog_usage(&self, kind: CatalogKind, name: &str) -> Result<usize> {
        let sql = if kind == CatalogKind::Tag {
            "SELECT COUNT(*) FROM items WHERE instr(',' || tags || ',', ',' || ?1 || ',') > 0".to_string()
        } else {
            format!("SELECT COUNT(*) FROM items WHERE {} = ?1", kind.item_column())
        };
        let count: i64 = self.conn.query_row(&sql, [name.trim()], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Aggregates ==========

    /// Item count and units per catalog value, largest quantity first
    pub fn quantity_by(&self, kind: CatalogKind) -> Result<Vec<GroupTotal>> {
        let mut totals: BTreeMap<String, (usize, i64)> = BTreeMap::new();

        if kind == CatalogKind::Tag {
            let mut stmt = self.conn.prepare("SELECT tags, quantity FROM items")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for (tags, quantity) in rows {
                let tags = item::split_list(&tags);
                if tags.is_empty() {
                    add_to_group(&mut totals, NO_GROUP, quantity);
                }
                for tag in tags {
                    add_to_group(&mut totals, &tag, quantity);
                }
            }
        } else {
            let sql = format!(
                "SELECT COALESCE(NULLIF({col}, ''), ?1) AS key, COUNT(*), COALESCE(SUM(quantity), 0)
                 FROM items GROUP BY key",
                col = kind.item_column()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map([NO_GROUP], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for (key, items, quantity) in rows {
                totals.insert(key, (items as usize, quantity));
            }
        }

        let mut groups: Vec<GroupTotal> = totals
            .into_iter()
            .map(|(key, (items, quantity))| GroupTotal { key, items, quantity })
            .collect();
        // BTreeMap order already breaks ties by key; the sort is stable.
        groups.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        Ok(groups)
    }

    /// Total units across all items
    pub fn total_units(&self) -> Result<i64> {
        let units: i64 = self
            .conn
            .query_row("SELECT COALESCE(SUM(quantity), 0) FROM items", [], |row| row.get(0))?;
        Ok(units)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Delete an item together with its history in one transaction
    pub fn purge_item(&mut self, id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM items WHERE id = ?1", [id])?;
        let history = tx.execute("DELETE FROM history WHERE item_id = ?1", [id])?;
        tx.commit()?;
        tracing::debug!(item_id = id, deleted, history, "purged item");
        Ok(deleted == 1)
    }

    /// Delete all data
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM history", [])?;
        self.conn.execute("DELETE FROM items", [])?;
        for kind in CatalogKind::all() {
            self.conn.execute(&format!("DELETE FROM {}", kind.table()), [])?;
        }
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            items: self.count_items()?,
            units: self.total_units()?,
            history: self.count_history()?,
            orphaned_history: self.orphaned_history()?.len(),
            manufacturers: self.count_catalog(CatalogKind::Manufacturer)?,
            clients: self.count_catalog(CatalogKind::Client)?,
            statuses: self.count_catalog(CatalogKind::Status)?,
            countries: self.count_catalog(CatalogKind::Country)?,
            tags: self.count_catalog(CatalogKind::Tag)?,
        })
    }
}

/// Helper to convert a row to a CatalogEntry
fn row_to_catalog(kind: CatalogKind, row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.get(0)?,
        kind,
        name: row.get(1)?,
        detail: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn unique_violation(err: rusqlite::Error, kind: CatalogKind, name: &str) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Error::Duplicate {
                kind,
                name: name.to_string(),
            }
        }
        _ => err.into(),
    }
}

/// Trimmed value, with blanks stored as NULL
fn cleaned(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn add_to_group(totals: &mut BTreeMap<String, (usize, i64)>, key: &str, quantity: i64) {
    let entry = totals.entry(key.to_string()).or_insert((0, 0));
    entry.0 += 1;
    entry.1 += quantity;
}

/// Restrict item listings to one catalog value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub kind: CatalogKind,
    pub name: String,
}

impl ItemFilter {
    pub fn new(kind: CatalogKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into().trim().to_string(),
        }
    }
}

/// One row of a grouped quantity report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub items: usize,
    pub quantity: i64,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub items: usize,
    pub units: i64,
    pub history: usize,
    pub orphaned_history: usize,
    pub manufacturers: usize,
    pub clients: usize,
    pub statuses: usize,
    pub countries: usize,
    pub tags: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Units on hand: {}", self.units)?;
        writeln!(f, "  History records: {}", self.history)?;
        writeln!(f, "  Orphaned history: {}", self.orphaned_history)?;
        writeln!(f, "  Manufacturers: {}", self.manufacturers)?;
        writeln!(f, "  Clients: {}", self.clients)?;
        writeln!(f, "  Statuses: {}", self.statuses)?;
        writeln!(f, "  Countries: {}", self.countries)?;
        writeln!(f, "  Tags: {}", self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item(name: &str) -> NewItem {
        NewItem::new(name)
            .with_barcode(format!("BC-{}", name))
            .with_part_number("MS20995C32")
            .with_quantity(4)
            .with_manufacturer("Boeing")
            .with_status("Serviceable")
            .with_country("USA")
            .with_tag("hydraulics")
    }

    #[test]
    fn test_item_crud() {
        let store = InventoryStore::open_in_memory().unwrap();

        let item = store.insert_item(&sample_item("pump"), "alice").unwrap();
        assert!(item.id > 0);
        assert_eq!(item.created_by, "alice");
        assert_eq!(item.updated_by, "alice");

        let retrieved = store.get_item(item.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "pump");
        assert_eq!(retrieved.quantity, 4);
        assert_eq!(retrieved.tags, vec!["hydraulics".to_string()]);
        assert_eq!(retrieved.manufacturer.as_deref(), Some("Boeing"));

        assert!(store.delete_item(item.id).unwrap());
        assert!(store.get_item(item.id).unwrap().is_none());
        assert!(!store.delete_item(item.id).unwrap());
    }

    #[test]
    fn test_insert_rejects_invalid_form() {
        let store = InventoryStore::open_in_memory().unwrap();
        assert!(store.insert_item(&NewItem::new(""), "alice").is_err());
        assert_eq!(store.count_items().unwrap(), 0);
    }

    #[test]
    fn test_dates_and_image_roundtrip() {
        let store = InventoryStore::open_in_memory().unwrap();
        let received = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut form = sample_item("sealant").with_received_at(received).hazardous();
        form.image = Some(vec![0x89, 0x50, 0x4e, 0x47]);

        let item = store.insert_item(&form, "bob").unwrap();
        assert_eq!(item.received_at, Some(received));
        assert!(item.is_hazardous);
        assert_eq!(store.get_image(item.id).unwrap(), Some(vec![0x89, 0x50, 0x4e, 0x47]));

        assert!(store.set_image(item.id, None, "bob").unwrap());
        assert_eq!(store.get_image(item.id).unwrap(), None);
        assert_eq!(store.get_image(999).unwrap(), None);
    }

    #[test]
    fn test_update_overwrites_all_columns() {
        let store = InventoryStore::open_in_memory().unwrap();
        let item = store.insert_item(&sample_item("valve"), "alice").unwrap();

        let form = NewItem::new("check valve").with_quantity(9);
        assert!(store.update_item(item.id, &form, "bob").unwrap());

        let updated = store.get_item(item.id).unwrap().unwrap();
        assert_eq!(updated.name, "check valve");
        assert_eq!(updated.quantity, 9);
        assert_eq!(updated.manufacturer, None);
        assert!(updated.tags.is_empty());
        assert_eq!(updated.created_by, "alice");
        assert_eq!(updated.updated_by, "bob");

        assert!(!store.update_item(999, &form, "bob").unwrap());
    }

    #[test]
    fn test_barcode_and_search() {
        let store = InventoryStore::open_in_memory().unwrap();
        store.insert_item(&sample_item("pump"), "alice").unwrap();
        store.insert_item(&sample_item("filter").with_notes("replace every 500h"), "alice").unwrap();

        let found = store.find_item_by_barcode("BC-filter").unwrap().unwrap();
        assert_eq!(found.name, "filter");
        assert!(store.find_item_by_barcode("nope").unwrap().is_none());

        assert_eq!(store.search_items("500h", 10).unwrap().len(), 1);
        assert_eq!(store.search_items("MS20995", 10).unwrap().len(), 2);
        assert_eq!(store.search_items("MS20995", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_items_by_filter() {
        let store = InventoryStore::open_in_memory().unwrap();
        store.insert_item(&sample_item("pump"), "alice").unwrap();
        store
            .insert_item(&NewItem::new("rivet").with_manufacturer("Airbus").with_tag("fasteners").with_tag("hydraulics-kit"), "alice")
            .unwrap();

        let boeing = store.items_by(&ItemFilter::new(CatalogKind::Manufacturer, "Boeing")).unwrap();
        assert_eq!(boeing.len(), 1);
        assert_eq!(boeing[0].name, "pump");

        // Tag membership is exact, not a substring match.
        let hydraulics = store.items_by(&ItemFilter::new(CatalogKind::Tag, "hydraulics")).unwrap();
        assert_eq!(hydraulics.len(), 1);
        assert_eq!(hydraulics[0].name, "pump");
    }

    #[test]
    fn test_quantity_adjustments() {
        let store = InventoryStore::open_in_memory().unwrap();
        let item = store.insert_item(&sample_item("pump"), "alice").unwrap();

        assert_eq!(store.adjust_quantity(item.id, 3, "alice").unwrap(), 7);
        assert_eq!(store.adjust_quantity(item.id, -7, "alice").unwrap(), 0);
        assert!(matches!(
            store.adjust_quantity(item.id, -1, "alice"),
            Err(Error::InsufficientStock { available: 0, requested: 1, .. })
        ));
        assert!(matches!(store.adjust_quantity(42, 1, "alice"), Err(Error::ItemNotFound(42))));
        assert!(matches!(store.set_quantity(item.id, -2, "alice"), Err(Error::InvalidQuantity(-2))));
        assert!(store.set_quantity(item.id, 12, "alice").unwrap());
        assert_eq!(store.get_item(item.id).unwrap().unwrap().quantity, 12);
    }

    #[test]
    fn test_sku_tracking_on_serialized_items() {
        let store = InventoryStore::open_in_memory().unwrap();
        let form = NewItem::new("actuator").serialized(SkuList::parse("SN-1,SN-2"));
        let item = store.insert_item(&form, "alice").unwrap();
        assert_eq!(item.quantity, 2);

        let skus = store.add_sku(item.id, "SN-3", "alice").unwrap();
        assert_eq!(skus.to_column(), "SN-1,SN-2,SN-3");
        assert_eq!(store.get_item(item.id).unwrap().unwrap().quantity, 3);

        assert!(matches!(store.add_sku(item.id, "SN-3", "alice"), Err(Error::DuplicateSku(_))));

        assert!(store.remove_sku(item.id, "SN-1", "alice").unwrap());
        assert!(!store.remove_sku(item.id, "SN-1", "alice").unwrap());
        let stored = store.get_item(item.id).unwrap().unwrap();
        assert_eq!(stored.skus.to_column(), "SN-2,SN-3");
        assert_eq!(stored.quantity, 2);

        let owner = store.find_item_by_sku("SN-2").unwrap().unwrap();
        assert_eq!(owner.id, item.id);
        assert!(store.find_item_by_sku("SN-").unwrap().is_none());
    }

    #[test]
    fn test_sku_on_plain_item_leaves_quantity() {
        let store = InventoryStore::open_in_memory().unwrap();
        let item = store.insert_item(&sample_item("bolt"), "alice").unwrap();
        store.add_sku(item.id, "LOT-9", "alice").unwrap();
        assert_eq!(store.get_item(item.id).unwrap().unwrap().quantity, 4);
        assert!(matches!(store.add_sku(77, "X", "alice"), Err(Error::ItemNotFound(77))));
    }

    #[test]
    fn test_history_append_and_read() {
        let store = InventoryStore::open_in_memory().unwrap();
        let item = store.insert_item(&sample_item("pump"), "alice").unwrap();

        assert!(store.history_entries(item.id).unwrap().is_empty());
        assert!(store.create_history(item.id).unwrap());
        assert!(!store.create_history(item.id).unwrap());

        store
            .append_history(item.id, &HistoryEntry::new("pump", "", "created", "2024-01-01 08:00:00", "alice"))
            .unwrap();
        store.record_change(item.id, "moved; to bin 7", "bob").unwrap();

        let record = store.get_history(item.id).unwrap().unwrap();
        assert_eq!(record.len().unwrap(), 2);
        assert_eq!(record.statuses, ";Serviceable");

        let entries = store.history_entries(item.id).unwrap();
        assert_eq!(entries[0].comment, "created");
        assert_eq!(entries[0].status, "");
        assert_eq!(entries[1].comment, "moved, to bin 7");
        assert_eq!(entries[1].user, "bob");
        assert!(entries[1].parsed_date().is_some());
    }

    #[test]
    fn test_store_append_matches_in_memory_push() {
        let store = InventoryStore::open_in_memory().unwrap();
        let entries = [
            HistoryEntry::new("a", "s1", "", "d1", "u"),
            HistoryEntry::new("a", "", "c2", "d2", "u"),
            HistoryEntry::new("b", "s3", "c3", "d3", "u"),
        ];

        let mut expected = HistoryRecord::empty(1);
        for entry in &entries {
            store.append_history(1, entry).unwrap();
            expected.push(entry).unwrap();
        }
        assert_eq!(store.get_history(1).unwrap().unwrap(), expected);
    }

    #[test]
    fn test_delete_item_leaves_orphaned_history() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        let kept = store.insert_item(&sample_item("kept"), "alice").unwrap();
        let gone = store.insert_item(&sample_item("gone"), "alice").unwrap();
        let purged = store.insert_item(&sample_item("purged"), "alice").unwrap();
        for item in [&kept, &gone, &purged] {
            store.record_change(item.id, "created", "alice").unwrap();
        }

        store.delete_item(gone.id).unwrap();
        assert_eq!(store.orphaned_history().unwrap(), vec![gone.id]);
        assert_eq!(store.history_entries(gone.id).unwrap().len(), 1);

        assert!(store.purge_item(purged.id).unwrap());
        assert!(store.get_history(purged.id).unwrap().is_none());
        assert_eq!(store.orphaned_history().unwrap(), vec![gone.id]);

        assert!(store.delete_history(gone.id).unwrap());
        assert!(store.orphaned_history().unwrap().is_empty());
        assert!(matches!(store.record_change(gone.id, "x", "alice"), Err(Error::ItemNotFound(_))));
    }

    #[test]
    fn test_corrupt_history_is_reported() {
        let store = InventoryStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO history (item_id, names, statuses, comments, dates, users) VALUES (5, 'a;b', 'x', 'c;d', 'e;f', 'g;h')",
                [],
            )
            .unwrap();
        assert!(matches!(
            store.history_entries(5),
            Err(Error::CorruptHistory { item_id: 5, .. })
        ));
    }

    #[test]
    fn test_catalog_crud() {
        let store = InventoryStore::open_in_memory().unwrap();

        let entry = store
            .insert_catalog(CatalogKind::Manufacturer, " Honeywell ", Some("CAGE 55284"))
            .unwrap();
        assert_eq!(entry.name, "Honeywell");
        assert_eq!(entry.kind, CatalogKind::Manufacturer);

        assert!(matches!(
            store.insert_catalog(CatalogKind::Manufacturer, "Honeywell", None),
            Err(Error::Duplicate { .. })
        ));
        // Same name in another catalog is fine.
        store.insert_catalog(CatalogKind::Client, "Honeywell", None).unwrap();

        let fetched = store.find_catalog_by_name(CatalogKind::Manufacturer, "Honeywell").unwrap().unwrap();
        assert_eq!(fetched.detail.as_deref(), Some("CAGE 55284"));

        assert!(store.update_catalog(CatalogKind::Manufacturer, entry.id, "Honeywell Aerospace", None).unwrap());
        let renamed = store.get_catalog(CatalogKind::Manufacturer, entry.id).unwrap().unwrap();
        assert_eq!(renamed.name, "Honeywell Aerospace");
        assert_eq!(renamed.detail, None);

        assert!(store.delete_catalog(CatalogKind::Manufacturer, entry.id).unwrap());
        assert!(store.get_catalog(CatalogKind::Manufacturer, entry.id).unwrap().is_none());
        assert_eq!(store.count_catalog(CatalogKind::Manufacturer).unwrap(), 0);
        assert_eq!(store.count_catalog(CatalogKind::Client).unwrap(), 1);
    }

    #[test]
    fn test_catalog_list_order_and_usage() {
        let store = InventoryStore::open_in_memory().unwrap();
        for name in ["zinc", "Avionics", "brakes"] {
            store.insert_catalog(CatalogKind::Tag, name, None).unwrap();
        }
        let names: Vec<_> = store
            .list_catalog(CatalogKind::Tag)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Avionics", "brakes", "zinc"]);

        store.insert_item(&NewItem::new("disc").with_tag("brakes"), "alice").unwrap();
        store.insert_item(&NewItem::new("pad").with_tag("brakes").with_tag("zinc"), "alice").unwrap();
        assert_eq!(store.catalog_usage(CatalogKind::Tag, "brakes").unwrap(), 2);
        assert_eq!(store.catalog_usage(CatalogKind::Tag, "Avionics").unwrap(), 0);
    }

    #[test]
    fn test_deleting_catalog_entry_keeps_item_reference() {
        let store = InventoryStore::open_in_memory().unwrap();
        let status = store.insert_catalog(CatalogKind::Status, "Quarantine", None).unwrap();
        let item = store.insert_item(&NewItem::new("seal").with_status("Quarantine"), "alice").unwrap();

        store.delete_catalog(CatalogKind::Status, status.id).unwrap();
        let item = store.get_item(item.id).unwrap().unwrap();
        assert_eq!(item.status.as_deref(), Some("Quarantine"));
        assert_eq!(store.catalog_usage(CatalogKind::Status, "Quarantine").unwrap(), 1);
    }

    #[test]
    fn test_quantity_by_groups() {
        let store = InventoryStore::open_in_memory().unwrap();
        store.insert_item(&NewItem::new("a").with_manufacturer("Boeing").with_quantity(5).with_tag("x"), "u").unwrap();
        store.insert_item(&NewItem::new("b").with_manufacturer("Boeing").with_quantity(1).with_tag("x").with_tag("y"), "u").unwrap();
        store.insert_item(&NewItem::new("c").with_manufacturer("Airbus").with_quantity(10), "u").unwrap();
        store.insert_item(&NewItem::new("d").with_quantity(2), "u").unwrap();

        let by_mfr = store.quantity_by(CatalogKind::Manufacturer).unwrap();
        assert_eq!(
            by_mfr,
            vec![
                GroupTotal { key: "Airbus".into(), items: 1, quantity: 10 },
                GroupTotal { key: "Boeing".into(), items: 2, quantity: 6 },
                GroupTotal { key: NO_GROUP.into(), items: 1, quantity: 2 },
            ]
        );

        let by_tag = store.quantity_by(CatalogKind::Tag).unwrap();
        assert_eq!(
            by_tag,
            vec![
                GroupTotal { key: NO_GROUP.into(), items: 2, quantity: 12 },
                GroupTotal { key: "x".into(), items: 2, quantity: 6 },
                GroupTotal { key: "y".into(), items: 1, quantity: 1 },
            ]
        );
    }

    #[test]
    fn test_expired_items() {
        let store = InventoryStore::open_in_memory().unwrap();
        let jan = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let jun = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        store.insert_item(&NewItem::new("old sealant").with_expires_at(jan), "u").unwrap();
        store.insert_item(&NewItem::new("new sealant").with_expires_at(jun), "u").unwrap();
        store.insert_item(&NewItem::new("bracket"), "u").unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let expired = store.expired_items(today).unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].name, "old sealant");
        assert!(expired[0].is_expired(today));
    }

    #[test]
    fn test_stats_and_clear() {
        let store = InventoryStore::open_in_memory().unwrap();
        let item = store.insert_item(&sample_item("pump"), "alice").unwrap();
        store.record_change(item.id, "created", "alice").unwrap();
        store.insert_catalog(CatalogKind::Country, "France", Some("FR")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.items, 1);
        assert_eq!(stats.units, 4);
        assert_eq!(stats.history, 1);
        assert_eq!(stats.countries, 1);
        assert!(stats.to_string().contains("Items: 1"));

        store.clear_all().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.items + stats.history + stats.countries, 0);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");

        let id = {
            let store = InventoryStore::open(&path).unwrap();
            store.insert_item(&sample_item("pump"), "alice").unwrap().id
        };

        let store = InventoryStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
        assert_eq!(store.get_item(id).unwrap().unwrap().name, "pump");
    }

    #[test]
    fn test_manual_transaction_rollback() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        store.begin_transaction().unwrap();
        store.insert_item(&sample_item("temp"), "alice").unwrap();
        store.rollback().unwrap();
        assert_eq!(store.count_items().unwrap(), 0);

        store.begin_transaction().unwrap();
        store.insert_item(&sample_item("kept"), "alice").unwrap();
        store.commit().unwrap();
        assert_eq!(store.count_items().unwrap(), 1);
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let store = InventoryStore::open_in_memory().unwrap();
        let id = store
            .insert_item(&sample_item("rivet").with_quantity(i64::MAX), "alice")
            .unwrap()
            .id;

        assert!(matches!(
            store.adjust_quantity(id, 1, "alice"),
            Err(Error::QuantityOverflow { delta: 1, .. })
        ));
        assert_eq!(store.get_item(id).unwrap().unwrap().quantity, i64::MAX);

        store.set_quantity(id, 3, "alice").unwrap();
        let err = store.adjust_quantity(id, i64::MIN, "alice").unwrap_err();
        match err {
            Error::InsufficientStock { available, requested, .. } => {
                assert_eq!(available, 3);
                assert_eq!(requested, i64::MIN.unsigned_abs());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.get_item(id).unwrap().unwrap().quantity, 3);
    }

    #[test]
    fn test_add_sku_at_max_quantity_fails() {
        let store = InventoryStore::open_in_memory().unwrap();
        let form = NewItem::new("actuator")
            .serialized(SkuList::parse("SN-1"))
            .with_quantity(i64::MAX);
        let id = store.insert_item(&form, "alice").unwrap().id;

        assert!(matches!(
            store.add_sku(id, "SN-2", "alice"),
            Err(Error::QuantityOverflow { .. })
        ));
        let item = store.get_item(id).unwrap().unwrap();
        assert_eq!(item.skus.to_column(), "SN-1");
        assert_eq!(item.quantity, i64::MAX);
    }

    #[test]
    fn test_insert_rejects_separator_in_tag() {
        let store = InventoryStore::open_in_memory().unwrap();
        assert!(matches!(
            store.insert_item(&sample_item("pump").with_tag("a,b"), "alice"),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(store.count_items().unwrap(), 0);
    }

    #[test]
    fn test_full_field_roundtrip() {
        let store = InventoryStore::open_in_memory().unwrap();
        let form = sample_item("fuel nozzle")
            .serialized(SkuList::parse("FN-1,FN-2"))
            .with_client("Lufthansa Technik")
            .with_location("Bay 3 / Shelf B")
            .with_notes("cap; keep sealed")
            .with_tag("fuel")
            .hazardous()
            .with_received_at(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
            .with_expires_at(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());

        let stored = store.insert_item(&form, "alice").unwrap();
        let read = store.get_item(stored.id).unwrap().unwrap();

        assert_eq!(read.to_new_item(), form);
        assert!(read.is_serialized);
        assert_eq!(read.client.as_deref(), Some("Lufthansa Technik"));
        assert_eq!(read.country.as_deref(), Some("USA"));
        assert_eq!(read.location.as_deref(), Some("Bay 3 / Shelf B"));
        assert_eq!(read.expires_at, NaiveDate::from_ymd_opt(2026, 1, 10));
    }

    #[test]
    fn test_catalog_values_are_trimmed_on_write() {
        let store = InventoryStore::open_in_memory().unwrap();
        let padded = NewItem::new("strut")
            .with_quantity(2)
            .with_manufacturer("Boeing ")
            .with_client("  ")
            .with_barcode(" BC-77 ");
        let id = store.insert_item(&padded, "alice").unwrap().id;
        store.insert_item(&sample_item("pump"), "alice").unwrap();

        let item = store.get_item(id).unwrap().unwrap();
        assert_eq!(item.manufacturer.as_deref(), Some("Boeing"));
        assert_eq!(item.client, None);
        assert_eq!(item.barcode.as_deref(), Some("BC-77"));
        assert_eq!(store.find_item_by_barcode("BC-77").unwrap().unwrap().id, id);

        let boeing = store
            .items_by(&ItemFilter::new(CatalogKind::Manufacturer, "Boeing"))
            .unwrap();
        assert_eq!(boeing.len(), 2);

        let groups = store.quantity_by(CatalogKind::Manufacturer).unwrap();
        assert_eq!(
            groups,
            vec![GroupTotal { key: "Boeing".to_string(), items: 2, quantity: 6 }]
        );

        let mut form = item.to_new_item();
        form.status = Some(" Quarantine ".to_string());
        store.update_item(id, &form, "bob").unwrap();
        assert_eq!(
            store.get_item(id).unwrap().unwrap().status.as_deref(),
            Some("Quarantine")
        );
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let store = InventoryStore::open_in_memory().unwrap();
        store.insert_item(&sample_item("pump"), "alice").unwrap();
        store.insert_item(&sample_item("valve"), "alice").unwrap();
        store.insert_item(&NewItem::new("seal_kit"), "alice").unwrap();
        store.insert_item(&NewItem::new("100% cotton rag"), "alice").unwrap();
        store.insert_item(&NewItem::new(r"C:\parts"), "alice").unwrap();

        let underscore = store.search_items("_", 10).unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].name, "seal_kit");

        let percent = store.search_items("%", 10).unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% cotton rag");

        let backslash = store.search_items(r"\", 10).unwrap();
        assert_eq!(backslash.len(), 1);
        assert_eq!(backslash[0].name, r"C:\parts");

        assert_eq!(store.search_items("pu", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_list_items_orders_by_name_then_id() {
        let store = InventoryStore::open_in_memory().unwrap();
        let b = store.insert_item(&NewItem::new("bolt"), "alice").unwrap().id;
        let a1 = store.insert_item(&NewItem::new("anchor"), "alice").unwrap().id;
        let a2 = store.insert_item(&NewItem::new("anchor"), "alice").unwrap().id;

        let ids: Vec<i64> = store.list_items().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a1, a2, b]);
    }

    #[test]
    fn test_shared_barcode_resolves_to_lowest_id() {
        let store = InventoryStore::open_in_memory().unwrap();
        let first = store
            .insert_item(&NewItem::new("zeta").with_barcode("DUP-1"), "alice")
            .unwrap()
            .id;
        store
            .insert_item(&NewItem::new("alpha").with_barcode("DUP-1"), "alice")
            .unwrap();

        let found = store.find_item_by_barcode("DUP-1").unwrap().unwrap();
        assert_eq!(found.id, first);
        assert_eq!(found.name, "zeta");
    }

    #[test]
    fn test_items_by_client_and_country() {
        let store = InventoryStore::open_in_memory().unwrap();
        store
            .insert_item(&sample_item("pump").with_client("KLM"), "alice")
            .unwrap();
        store
            .insert_item(&sample_item("valve").with_client("Delta").with_country("France"), "alice")
            .unwrap();

        let klm = store.items_by(&ItemFilter::new(CatalogKind::Client, "KLM")).unwrap();
        assert_eq!(klm.len(), 1);
        assert_eq!(klm[0].name, "pump");

        let usa = store.items_by(&ItemFilter::new(CatalogKind::Country, "USA")).unwrap();
        assert_eq!(usa.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), vec!["pump"]);
        let france = store.items_by(&ItemFilter::new(CatalogKind::Country, "France")).unwrap();
        assert_eq!(france[0].client.as_deref(), Some("Delta"));
    }

    #[test]
    fn test_purge_missing_item_still_clears_history() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        store.create_history(404).unwrap();
        assert_eq!(store.orphaned_history().unwrap(), vec![404]);

        assert!(!store.purge_item(404).unwrap());
        assert!(store.get_history(404).unwrap().is_none());
        assert_eq!(store.count_history().unwrap(), 0);
    }

    #[test]
    fn test_single_entry_with_blank_column_reads_back() {
        let store = InventoryStore::open_in_memory().unwrap();
        let id = store.insert_item(&sample_item("pump"), "alice").unwrap().id;
        store
            .conn
            .execute(
                "INSERT INTO history (item_id, names, statuses, comments, dates, users)
                 VALUES (?1, 'pump', '', 'created', '2024-01-01 00:00:00', 'alice')",
                [id],
            )
            .unwrap();

        let entries = store.history_entries(id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, "");
        assert_eq!(entries[0].comment, "created");
    }
}
