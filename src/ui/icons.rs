pub struct Icons;

impl Icons {
    pub const BOX: &str = "📦";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const BARCODE: &str = "🏷️";
    pub const CLOCK: &str = "⏱️";
    pub const PERSON: &str = "👤";
    pub const DATABASE: &str = "🗄️";
    pub const NOTE: &str = "📝";
    pub const PLANE: &str = "✈️";
    pub const EMPTY: &str = "∅";
}
