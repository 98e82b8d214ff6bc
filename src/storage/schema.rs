//! Database schema definitions

/// SQL to create the quotes table.
///
/// The UNIQUE and CHECK constraints mirror the validation done in the store
/// and catch anything that reaches the table without going through it.
pub const CREATE_QUOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    source TEXT NOT NULL,
    weight INTEGER NOT NULL CHECK (weight BETWEEN 1 AND 2147483647),
    views INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
    likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
    dislikes INTEGER NOT NULL DEFAULT 0 CHECK (dislikes >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(text, source)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_quotes_source ON quotes(source)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_popularity ON quotes(likes DESC, views DESC)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_weight ON quotes(weight DESC)",
];

/// Connection pragmas, applied before the schema
pub const PRAGMAS: &str = r#"
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;
"#;

/// Columns selected whenever a full quote row is read, in `row_to_quote` order
pub const QUOTE_COLUMNS: &str =
    "id, text, source, weight, views, likes, dislikes, created_at, updated_at";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_QUOTES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
