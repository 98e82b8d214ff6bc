pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    error, header, info, muted, quote_card, section, success, summary_row, validation_error, warn,
};
pub use table::{TableBuilder, quotes_table, sources_table, stats_table};
pub use theme::{theme, Theme};
