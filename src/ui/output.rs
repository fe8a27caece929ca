//! Line-oriented terminal output for the CLI

use crate::item::StockLevel;
use crate::ui::{palette, Icons, Palette};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

pub fn banner(title: &str) {
    println!("{} {}", Icons::PLANE, title.style(palette().title));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(palette().title));
}

pub fn done(message: &str) {
    println!("{} {}", Icons::CHECK, message.style(palette().ok));
}

pub fn failed(message: &str) {
    eprintln!("{} {}", Icons::CROSS, message.style(palette().fault));
}

pub fn caution(message: &str) {
    eprintln!("{} {}", Icons::WARN, message.style(palette().caution));
}

/// Indented `label value` line of a detail view
pub fn field(label: &str, value: &str) {
    println!("  {} {}", label.style(palette().label), value);
}

/// Detail line led by an icon
pub fn marked(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(palette().label), value);
}

pub fn faint(text: &str) -> String {
    text.style(palette().faint).to_string()
}

/// Quantity with its stock band spelled out and colored
pub fn quantity(units: i64) -> String {
    quantity_with(palette(), units)
}

/// Date with an `(expired)` marker when it falls before `today`
pub fn expiry(date: NaiveDate, today: NaiveDate) -> String {
    expiry_with(palette(), date, today)
}

fn quantity_with(p: &Palette, units: i64) -> String {
    let level = StockLevel::of(units);
    let text = match level {
        StockLevel::Out => format!("{} (out of stock)", units),
        StockLevel::Low => format!("{} (low)", units),
        StockLevel::Available => units.to_string(),
    };
    text.style(p.stock(level)).to_string()
}

fn expiry_with(p: &Palette, date: NaiveDate, today: NaiveDate) -> String {
    if date < today {
        format!("{} (expired)", date).style(p.expired).to_string()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_marks_stock_band() {
        let plain = Palette::plain();
        assert_eq!(quantity_with(&plain, 0), "0 (out of stock)");
        assert_eq!(quantity_with(&plain, 1), "1 (low)");
        assert_eq!(quantity_with(&plain, 40), "40");
    }

    #[test]
    fn test_expiry_marks_past_dates() {
        let plain = Palette::plain();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(expiry_with(&plain, past, today), "2024-05-31 (expired)");
        assert_eq!(expiry_with(&plain, today, today), "2024-06-01");
    }

    #[test]
    fn test_colored_quantity_differs_by_band() {
        let colored = Palette::colored();
        let out = quantity_with(&colored, 0);
        let low = quantity_with(&colored, 2);
        assert!(out.contains("out of stock"));
        assert_ne!(out.replace("0 (out of stock)", ""), low.replace("2 (low)", ""));
    }
}
