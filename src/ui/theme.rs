use crate::item::StockLevel;
use owo_colors::Style;
use std::sync::OnceLock;

static PALETTE: OnceLock<Palette> = OnceLock::new();

/// Terminal styles keyed by what they mark in the inventory
#[derive(Debug, Clone)]
pub struct Palette {
    pub title: Style,
    pub ok: Style,
    pub fault: Style,
    pub caution: Style,
    pub label: Style,
    pub faint: Style,
    pub in_stock: Style,
    pub low_stock: Style,
    pub out_of_stock: Style,
    pub expired: Style,
}

impl Palette {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() || !console::Term::stdout().is_term() {
            Self::plain()
        } else {
            Self::colored()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            ok: Style::new().green().bold(),
            fault: Style::new().red().bold(),
            caution: Style::new().yellow().bold(),
            label: Style::new().white().dimmed(),
            faint: Style::new().bright_black(),
            in_stock: Style::new().green(),
            low_stock: Style::new().yellow(),
            out_of_stock: Style::new().red().bold(),
            expired: Style::new().red().underline(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            title: none,
            ok: none,
            fault: none,
            caution: none,
            label: none,
            faint: none,
            in_stock: none,
            low_stock: none,
            out_of_stock: none,
            expired: none,
        }
    }

    pub fn stock(&self, level: StockLevel) -> Style {
        match level {
            StockLevel::Out => self.out_of_stock,
            StockLevel::Low => self.low_stock,
            StockLevel::Available => self.in_stock,
        }
    }
}

pub fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::detect)
}
