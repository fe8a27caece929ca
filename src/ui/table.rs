use crate::catalog::CatalogEntry;
use crate::history::HistoryEntry;
use crate::item::Item;
use crate::storage::{DbStats, GroupTotal};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Part No.")]
    part_number: String,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
}

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    key: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Units")]
    quantity: i64,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

pub fn item_table(items: &[Item]) -> String {
    render(
        items
            .iter()
            .map(|item| ItemRow {
                id: item.id,
                name: item.name.clone(),
                part_number: or_dash(&item.part_number),
                quantity: item.quantity,
                manufacturer: or_dash(&item.manufacturer),
                status: or_dash(&item.status),
                location: or_dash(&item.location),
            })
            .collect(),
    )
}

pub fn catalog_table(entries: &[CatalogEntry]) -> String {
    render(
        entries
            .iter()
            .map(|entry| CatalogRow {
                id: entry.id,
                name: entry.name.clone(),
                detail: or_dash(&entry.detail),
            })
            .collect(),
    )
}

pub fn history_table(entries: &[HistoryEntry]) -> String {
    render(
        entries
            .iter()
            .enumerate()
            .map(|(i, e)| HistoryRow {
                index: i + 1,
                date: e.date.clone(),
                user: e.user.clone(),
                name: e.name.clone(),
                status: e.status.clone(),
                comment: e.comment.clone(),
            })
            .collect(),
    )
}

pub fn group_table(groups: &[GroupTotal]) -> String {
    render(
        groups
            .iter()
            .map(|g| GroupRow {
                key: g.key.clone(),
                items: g.items,
                quantity: g.quantity,
            })
            .collect(),
    )
}

pub fn stats_table(stats: &DbStats) -> String {
    let rows = [
        ("Items", stats.items.to_string()),
        ("Units on hand", stats.units.to_string()),
        ("History records", stats.history.to_string()),
        ("Orphaned history", stats.orphaned_history.to_string()),
        ("Manufacturers", stats.manufacturers.to_string()),
        ("Clients", stats.clients.to_string()),
        ("Statuses", stats.statuses.to_string()),
        ("Countries", stats.countries.to_string()),
        ("Tags", stats.tags.to_string()),
    ];
    render(
        rows.into_iter()
            .map(|(metric, value)| MetricRow { metric, value })
            .collect(),
    )
}
