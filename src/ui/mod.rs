pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, caution, done, expiry, failed, faint, field, marked, quantity, section};
pub use table::{catalog_table, group_table, history_table, item_table, stats_table};
pub use theme::{palette, Palette};
