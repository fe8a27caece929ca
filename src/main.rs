//! Aerostock CLI - Command-line interface for the parts inventory

use aerostock::config::{self, AerostockConfig};
use aerostock::item::split_list;
use aerostock::storage::ItemFilter;
use aerostock::ui::{self, Icons};
use aerostock::{CatalogKind, InventoryStore, NewItem, SkuList, StockLevel};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "aerostock")]
#[command(version)]
#[command(about = "Inventory store for aerospace parts")]
#[command(long_about = r#"
Aerostock tracks parts stock in a local SQLite file:
  • Items with barcodes, SKUs, quantities and shelf-life dates
  • Per-item change history
  • Manufacturer, client, status, country and tag catalogs

Example usage:
  aerostock init
  aerostock item add "Hydraulic pump" --part-number 66165 --quantity 2 --manufacturer Parker
  aerostock item scan 0123456789012
  aerostock history show 1
  aerostock summary --by status
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// User name recorded in audit fields and history
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Add, inspect, change and remove items
    #[command(subcommand)]
    Item(ItemCommand),

    /// Manage the SKU list of an item
    #[command(subcommand)]
    Sku(SkuCommand),

    /// Read and append item history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Manage manufacturers, clients, statuses, countries and tags
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Show item counts and units grouped by a catalog
    Summary {
        /// Group by: manufacturer, client, status, country or tag
        #[arg(short, long, default_value = "status")]
        by: String,
    },

    /// Show statistics about the inventory
    Stats,
}

#[derive(Subcommand)]
enum ItemCommand {
    /// Add a new item
    Add {
        /// Item name
        name: String,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Show one item
    Show { id: i64 },

    /// List items, optionally filtered by a catalog value
    List {
        /// Catalog to filter on (manufacturer, client, status, country, tag)
        #[arg(short, long, requires = "value")]
        kind: Option<String>,

        /// Value to match
        #[arg(long)]
        value: Option<String>,
    },

    /// Search name, barcode, part number, SKUs and notes
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Change fields of an item; unspecified fields keep their value
    Update {
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Delete an item (its history is kept)
    Delete { id: i64 },

    /// Delete an item and its history together
    Purge { id: i64 },

    /// Set or adjust the quantity on hand
    Qty {
        id: i64,

        /// Set the quantity to this value
        #[arg(long, conflicts_with = "adjust")]
        set: Option<i64>,

        /// Add this (possibly negative) amount
        #[arg(long, allow_hyphen_values = true)]
        adjust: Option<i64>,
    },

    /// Look up an item by scanned barcode
    Scan { barcode: String },

    /// Attach, export or clear the item image
    Image {
        id: i64,

        /// Read the image from this file
        #[arg(long, conflicts_with_all = ["export", "clear"])]
        set: Option<PathBuf>,

        /// Write the image to this file
        #[arg(long, conflicts_with = "clear")]
        export: Option<PathBuf>,

        /// Remove the image
        #[arg(long)]
        clear: bool,
    },

    /// List items past their expiry date
    Expired {
        /// Reference date (defaults to today, UTC)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct ItemFields {
    #[arg(long)]
    barcode: Option<String>,
    #[arg(long)]
    part_number: Option<String>,
    #[arg(short, long)]
    quantity: Option<i64>,
    #[arg(long)]
    manufacturer: Option<String>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Comma-separated tags (replaces existing tags)
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Comma-separated SKUs; marks the item serialized
    #[arg(long)]
    skus: Option<String>,
    /// Mark as hazardous material
    #[arg(long)]
    hazardous: Option<bool>,
    /// Date received (YYYY-MM-DD)
    #[arg(long)]
    received: Option<NaiveDate>,
    /// Shelf-life expiry (YYYY-MM-DD)
    #[arg(long)]
    expires: Option<NaiveDate>,
}

impl ItemFields {
    /// Overlay the given fields onto a form
    fn apply(self, mut form: NewItem) -> aerostock::Result<NewItem> {
        if let Some(v) = self.barcode {
            form.barcode = Some(v);
        }
        if let Some(v) = self.part_number {
            form.part_number = Some(v);
        }
        if let Some(v) = self.manufacturer {
            form.manufacturer = Some(v);
        }
        if let Some(v) = self.client {
            form.client = Some(v);
        }
        if let Some(v) = self.status {
            form.status = Some(v);
        }
        if let Some(v) = self.country {
            form.country = Some(v);
        }
        if let Some(v) = self.tags {
            form.tags = v
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = self.location {
            form.location = Some(v);
        }
        if let Some(v) = self.notes {
            form.notes = Some(v);
        }
        if let Some(v) = self.skus {
            let mut skus = SkuList::new();
            for sku in split_list(&v) {
                skus.push(&sku)?;
            }
            form = form.serialized(skus);
        }
        if let Some(v) = self.quantity {
            form.quantity = v;
        }
        if let Some(v) = self.hazardous {
            form.is_hazardous = v;
        }
        if let Some(v) = self.received {
            form.received_at = Some(v);
        }
        if let Some(v) = self.expires {
            form.expires_at = Some(v);
        }
        Ok(form)
    }
}

#[derive(Subcommand)]
enum SkuCommand {
    /// Append an SKU to an item
    Add { item: i64, sku: String },
    /// Remove an SKU from an item
    Remove { item: i64, sku: String },
    /// Find the item carrying an SKU
    Find { sku: String },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Show the history of an item
    Show { item: i64 },
    /// Append a comment to an item's history
    Note { item: i64, comment: String },
    /// List history records whose item was deleted
    Orphans {
        /// Delete the orphaned records
        #[arg(long)]
        clean: bool,
    },
    /// Delete the history of an item
    Clear { item: i64 },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Add an entry
    Add {
        kind: String,
        name: String,
        /// CAGE code, contact, ISO code or description
        #[arg(long)]
        detail: Option<String>,
    },
    /// List entries with how many items use them
    List { kind: String },
    /// Rename an entry (items keep the old name)
    Rename {
        kind: String,
        id: i64,
        name: String,
        #[arg(long)]
        detail: Option<String>,
    },
    /// Delete an entry (items keep the name)
    Delete { kind: String, id: i64 },
}

/// Resolved settings shared by every command
struct Context {
    database: PathBuf,
    user: String,
    json: bool,
}

impl Context {
    fn open_store(&self) -> anyhow::Result<InventoryStore> {
        config::ensure_db_dir(&self.database)?;
        Ok(InventoryStore::open(&self.database)?)
    }

    /// Print JSON in `--json` mode; returns whether it did
    fn emit<T: Serialize>(&self, value: &T) -> anyhow::Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ui::failed(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let base = std::env::current_dir()?;
    let ctx = Context {
        database: cfg.resolve_database(cli.database.as_deref(), &base),
        user: cfg.resolve_user(cli.user.as_deref()),
        json: cli.json,
    };
    tracing::debug!("database {:?}, user {}", ctx.database, ctx.user);

    match cli.command {
        Commands::Init { force } => run_init(&ctx, cli.config.as_deref(), cli.database.is_some(), force),
        Commands::Item(cmd) => run_item(&ctx, cmd),
        Commands::Sku(cmd) => run_sku(&ctx, cmd),
        Commands::History(cmd) => run_history(&ctx, cmd),
        Commands::Catalog(cmd) => run_catalog(&ctx, cmd),
        Commands::Summary { by } => {
            let kind: CatalogKind = by.parse()?;
            let store = ctx.open_store()?;
            let groups = store.quantity_by(kind)?;
            if ctx.emit(&groups)? {
                return Ok(());
            }
            ui::banner(&format!("Stock by {}", kind));
            if groups.is_empty() {
                println!("{} No items.", Icons::EMPTY);
            } else {
                println!("{}", ui::group_table(&groups));
            }
            Ok(())
        }
        Commands::Stats => {
            let store = ctx.open_store()?;
            let stats = store.stats()?;
            if ctx.emit(&stats)? {
                return Ok(());
            }
            println!("{} Aerostock Statistics ({:?})", Icons::STATS, ctx.database);
            println!("{}", ui::stats_table(&stats));
            if stats.orphaned_history > 0 {
                ui::caution("Some history records have no item; see `history orphans`.");
            }
            Ok(())
        }
    }
}

fn run_init(ctx: &Context, config_path: Option<&Path>, explicit_db: bool, force: bool) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    let cfg = AerostockConfig {
        database: explicit_db.then(|| ctx.database.to_string_lossy().to_string()),
        user: Some(ctx.user.clone()),
    };
    config::write_config(&path, &cfg, force)?;

    let store = ctx.open_store()?;
    let project_root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config::ensure_gitignore(project_root)?;

    ui::done(&format!("Wrote {}", path.display()));
    ui::marked(Icons::DATABASE, "Database", &ctx.database.display().to_string());
    ui::marked(Icons::PERSON, "User", &ctx.user);
    ui::field("Schema version", &store.schema_version()?.to_string());
    Ok(())
}

fn run_item(ctx: &Context, cmd: ItemCommand) -> anyhow::Result<()> {
    match cmd {
        ItemCommand::Add { name, fields } => {
            let store = ctx.open_store()?;
            let form = fields.apply(NewItem::new(name))?;
            let item = store.insert_item(&form, &ctx.user)?;
            store.record_change(item.id, "Created", &ctx.user)?;
            if !ctx.emit(&item)? {
                ui::done(&format!("Added {}", item.short_description()));
            }
        }

        ItemCommand::Show { id } => {
            let store = ctx.open_store()?;
            let Some(item) = store.get_item(id)? else {
                anyhow::bail!("Item not found: {}", id);
            };
            if ctx.emit(&item)? {
                return Ok(());
            }
            ui::banner(&item.name);
            ui::field("ID", &item.id.to_string());
            let optional = [
                ("Barcode", &item.barcode),
                ("Part number", &item.part_number),
                ("Manufacturer", &item.manufacturer),
                ("Client", &item.client),
                ("Status", &item.status),
                ("Country", &item.country),
                ("Location", &item.location),
                ("Notes", &item.notes),
            ];
            for (label, value) in optional {
                if let Some(v) = value {
                    ui::field(label, v);
                }
            }
            ui::field("Quantity", &ui::quantity(item.quantity));
            if !item.skus.is_empty() {
                ui::field("SKUs", &item.skus.to_string());
            }
            if !item.tags.is_empty() {
                ui::field("Tags", &item.tags.join(", "));
            }
            if item.is_serialized {
                ui::field("Serialized", "yes");
            }
            if item.is_hazardous {
                ui::field("Hazardous", "yes");
            }
            if let Some(d) = item.received_at {
                ui::field("Received", &d.to_string());
            }
            if let Some(d) = item.expires_at {
                ui::field("Expires", &ui::expiry(d, Utc::now().date_naive()));
            }
            if let Some(image) = store.get_image(id)? {
                ui::field("Image", &format!("{} bytes", image.len()));
            }
            ui::field(
                "Created",
                &ui::faint(&format!("{} by {}", item.created_at.format("%Y-%m-%d %H:%M"), item.created_by)),
            );
            ui::field(
                "Updated",
                &ui::faint(&format!("{} by {}", item.updated_at.format("%Y-%m-%d %H:%M"), item.updated_by)),
            );
            if let Some(record) = store.get_history(id)? {
                if let Some(last) = record.latest()? {
                    ui::section("Last change");
                    ui::field(&last.date, &format!("{} ({})", last.comment, last.user));
                }
            }
        }

        ItemCommand::List { kind, value } => {
            let store = ctx.open_store()?;
            let items = match (kind, value) {
                (Some(kind), Some(value)) => store.items_by(&ItemFilter::new(kind.parse()?, value))?,
                _ => store.list_items()?,
            };
            print_items(ctx, &items)?;
        }

        ItemCommand::Search { query, limit } => {
            let store = ctx.open_store()?;
            if !ctx.json {
                println!("{} Searching for: '{}' (limit: {})...", Icons::SEARCH, query, limit);
            }
            let items = store.search_items(&query, limit)?;
            print_items(ctx, &items)?;
        }

        ItemCommand::Update { id, name, fields } => {
            let store = ctx.open_store()?;
            let Some(existing) = store.get_item(id)? else {
                anyhow::bail!("Item not found: {}", id);
            };
            let mut form = existing.to_new_item();
            if let Some(name) = name {
                form.name = name;
            }
            let form = fields.apply(form)?;
            store.update_item(id, &form, &ctx.user)?;
            store.record_change(id, "Updated", &ctx.user)?;
            ui::done(&format!("Updated item {}", id));
        }

        ItemCommand::Delete { id } => {
            let store = ctx.open_store()?;
            if store.delete_item(id)? {
                ui::done(&format!("Deleted item {}", id));
                if store.get_history(id)?.is_some() {
                    ui::marked(Icons::INFO, "History kept", "use `item purge` to remove both");
                }
            } else {
                anyhow::bail!("Item not found: {}", id);
            }
        }

        ItemCommand::Purge { id } => {
            let mut store = ctx.open_store()?;
            if store.purge_item(id)? {
                ui::done(&format!("Purged item {} and its history", id));
            } else {
                anyhow::bail!("Item not found: {}", id);
            }
        }

        ItemCommand::Qty { id, set, adjust } => {
            let store = ctx.open_store()?;
            let (quantity, comment) = match (set, adjust) {
                (Some(q), None) => {
                    if !store.set_quantity(id, q, &ctx.user)? {
                        anyhow::bail!("Item not found: {}", id);
                    }
                    (q, format!("Quantity set to {}", q))
                }
                (None, Some(d)) => {
                    let q = store.adjust_quantity(id, d, &ctx.user)?;
                    (q, format!("Quantity adjusted by {:+}", d))
                }
                _ => anyhow::bail!("pass either --set or --adjust"),
            };
            store.record_change(id, &comment, &ctx.user)?;
            if !ctx.emit(&serde_json::json!({ "id": id, "quantity": quantity }))? {
                ui::done(&format!("Item {} quantity: {}", id, ui::quantity(quantity)));
            }
        }

        ItemCommand::Scan { barcode } => {
            let store = ctx.open_store()?;
            match store.find_item_by_barcode(&barcode)? {
                Some(item) => {
                    if !ctx.emit(&item)? {
                        println!("{} {}", Icons::BARCODE, item.short_description());
                    }
                }
                None => anyhow::bail!("No item with barcode {}", barcode),
            }
        }

        ItemCommand::Image { id, set, export, clear } => {
            let store = ctx.open_store()?;
            if let Some(path) = set {
                let bytes = std::fs::read(&path)?;
                if !store.set_image(id, Some(bytes.as_slice()), &ctx.user)? {
                    anyhow::bail!("Item not found: {}", id);
                }
                ui::done(&format!("Attached {} ({} bytes)", path.display(), bytes.len()));
            } else if clear {
                if !store.set_image(id, None, &ctx.user)? {
                    anyhow::bail!("Item not found: {}", id);
                }
                ui::done(&format!("Cleared image of item {}", id));
            } else if let Some(path) = export {
                let Some(bytes) = store.get_image(id)? else {
                    anyhow::bail!("Item {} has no image", id);
                };
                std::fs::write(&path, &bytes)?;
                ui::done(&format!("Wrote {} ({} bytes)", path.display(), bytes.len()));
            } else {
                match store.get_image(id)? {
                    Some(bytes) => ui::marked(Icons::INFO, "Image", &format!("{} bytes", bytes.len())),
                    None => println!("{} No image.", Icons::EMPTY),
                }
            }
        }

        ItemCommand::Expired { on } => {
            let store = ctx.open_store()?;
            let today = on.unwrap_or_else(|| Utc::now().date_naive());
            let items = store.expired_items(today)?;
            print_items(ctx, &items)?;
        }
    }
    Ok(())
}

fn print_items(ctx: &Context, items: &[aerostock::Item]) -> anyhow::Result<()> {
    if ctx.emit(&items)? {
        return Ok(());
    }
    if items.is_empty() {
        println!("{} No items found.", Icons::EMPTY);
    } else {
        println!("{}", ui::item_table(items));
        println!("{}", ui::faint(&format!("{} item(s)", items.len())));
        let out = items.iter().filter(|i| i.stock_level() == StockLevel::Out).count();
        if out > 0 {
            ui::caution(&format!("{} item(s) out of stock", out));
        }
    }
    Ok(())
}

fn run_sku(ctx: &Context, cmd: SkuCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match cmd {
        SkuCommand::Add { item, sku } => {
            let skus = store.add_sku(item, &sku, &ctx.user)?;
            store.record_change(item, &format!("Added SKU {}", sku.trim()), &ctx.user)?;
            if !ctx.emit(&skus)? {
                ui::done(&format!("Item {} SKUs: {}", item, skus));
            }
        }
        SkuCommand::Remove { item, sku } => {
            if !store.remove_sku(item, &sku, &ctx.user)? {
                anyhow::bail!("Item {} has no SKU {}", item, sku);
            }
            store.record_change(item, &format!("Removed SKU {}", sku.trim()), &ctx.user)?;
            ui::done(&format!("Removed SKU {} from item {}", sku, item));
        }
        SkuCommand::Find { sku } => match store.find_item_by_sku(&sku)? {
            Some(item) => {
                if !ctx.emit(&item)? {
                    println!("{} {}", Icons::BOX, item.short_description());
                }
            }
            None => anyhow::bail!("No item carries SKU {}", sku),
        },
    }
    Ok(())
}

fn run_history(ctx: &Context, cmd: HistoryCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match cmd {
        HistoryCommand::Show { item } => {
            let entries = store.history_entries(item)?;
            if ctx.emit(&entries)? {
                return Ok(());
            }
            if entries.is_empty() {
                println!("{} No history for item {}.", Icons::EMPTY, item);
            } else {
                println!("{} History of item {}", Icons::CLOCK, item);
                println!("{}", ui::history_table(&entries));
            }
        }
        HistoryCommand::Note { item, comment } => {
            let entry = store.record_change(item, &comment, &ctx.user)?;
            if !ctx.emit(&entry)? {
                ui::marked(Icons::NOTE, &entry.date, &entry.comment);
            }
        }
        HistoryCommand::Orphans { clean } => {
            let orphans = store.orphaned_history()?;
            if clean {
                for id in &orphans {
                    store.delete_history(*id)?;
                }
            }
            if ctx.emit(&orphans)? {
                return Ok(());
            }
            if orphans.is_empty() {
                ui::done("No orphaned history.");
            } else if clean {
                ui::done(&format!("Deleted {} orphaned history record(s)", orphans.len()));
            } else {
                let ids: Vec<String> = orphans.iter().map(i64::to_string).collect();
                ui::caution(&format!("Orphaned history for item ids: {}", ids.join(", ")));
            }
        }
        HistoryCommand::Clear { item } => {
            if store.delete_history(item)? {
                ui::done(&format!("Cleared history of item {}", item));
            } else {
                println!("{} No history for item {}.", Icons::EMPTY, item);
            }
        }
    }
    Ok(())
}

fn run_catalog(ctx: &Context, cmd: CatalogCommand) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match cmd {
        CatalogCommand::Add { kind, name, detail } => {
            let kind: CatalogKind = kind.parse()?;
            let entry = store.insert_catalog(kind, &name, detail.as_deref())?;
            if !ctx.emit(&entry)? {
                ui::done(&format!("Added {} #{} {}", kind, entry.id, entry.name));
            }
        }
        CatalogCommand::List { kind } => {
            let kind: CatalogKind = kind.parse()?;
            let entries = store.list_catalog(kind)?;
            if ctx.emit(&entries)? {
                return Ok(());
            }
            if entries.is_empty() {
                println!("{} No {} entries.", Icons::EMPTY, kind);
                return Ok(());
            }
            println!("{}", ui::catalog_table(&entries));
            for entry in &entries {
                let used = store.catalog_usage(kind, &entry.name)?;
                ui::field(&entry.name, &format!("{} item(s)", used));
            }
        }
        CatalogCommand::Rename { kind, id, name, detail } => {
            let kind: CatalogKind = kind.parse()?;
            let Some(old) = store.get_catalog(kind, id)? else {
                anyhow::bail!("No {} with id {}", kind, id);
            };
            store.update_catalog(kind, id, &name, detail.as_deref())?;
            ui::done(&format!("Renamed {} {:?} to {:?}", kind, old.name, name.trim()));
            let stale = store.catalog_usage(kind, &old.name)?;
            if stale > 0 {
                ui::caution(&format!("{} item(s) still refer to {:?}", stale, old.name));
            }
        }
        CatalogCommand::Delete { kind, id } => {
            let kind: CatalogKind = kind.parse()?;
            if !store.delete_catalog(kind, id)? {
                anyhow::bail!("No {} with id {}", kind, id);
            }
            ui::done(&format!("Deleted {} {}", kind, id));
        }
    }
    Ok(())
}
