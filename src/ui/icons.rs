pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const QUOTE: &str = "💬";
    pub const FILM: &str = "🎬";
    pub const EYE: &str = "👀";
    pub const LIKE: &str = "👍";
    pub const DISLIKE: &str = "👎";
    pub const WEIGHT: &str = "⚖️";
    pub const DEL: &str = "🗑️";
    pub const EMPTY: &str = "∅";
}
