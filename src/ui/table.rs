use tabled::{settings::Style, Table, Tabled};

use crate::quote::Quote;
use crate::storage::{DbStats, SourceCount};

/// Characters of quote text shown in a table cell
const TEXT_COLUMN_WIDTH: usize = 60;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Weight")]
    weight: i64,
    #[tabled(rename = "Views")]
    views: i64,
    #[tabled(rename = "Likes")]
    likes: i64,
    #[tabled(rename = "Dislikes")]
    dislikes: i64,
}

impl From<&Quote> for QuoteRow {
    fn from(quote: &Quote) -> Self {
        let mut text = quote.short_text(TEXT_COLUMN_WIDTH);
        if quote.text.chars().count() > TEXT_COLUMN_WIDTH {
            text.push('…');
        }
        Self {
            id: quote.id,
            source: quote.source.clone(),
            text,
            weight: quote.weight,
            views: quote.views,
            likes: quote.likes,
            dislikes: quote.dislikes,
        }
    }
}

pub fn quotes_table(quotes: &[Quote]) -> String {
    if quotes.is_empty() {
        return String::new();
    }
    let rows: Vec<QuoteRow> = quotes.iter().map(QuoteRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Quotes")]
    count: i64,
}

pub fn sources_table(sources: &[SourceCount]) -> String {
    if sources.is_empty() {
        return String::new();
    }
    let rows: Vec<SourceRow> = sources
        .iter()
        .map(|s| SourceRow { source: s.source.clone(), count: s.count })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Quotes", &stats.quotes.to_string());
    builder.add_row("Sources", &stats.sources.to_string());
    builder.add_row("Total weight", &stats.total_weight.to_string());
    builder.add_row("Views", &stats.views.to_string());
    builder.add_row("Likes", &stats.likes.to_string());
    builder.add_row("Dislikes", &stats.dislikes.to_string());
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(text: &str) -> Quote {
        let now = Utc::now();
        Quote {
            id: 7,
            text: text.to_string(),
            source: "Casablanca".to_string(),
            weight: 2,
            views: 10,
            likes: 4,
            dislikes: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_quotes_table_contains_fields() {
        let table = quotes_table(&[quote("Here's looking at you, kid.")]);
        assert!(table.contains("Casablanca"));
        assert!(table.contains("Here's looking at you, kid."));
        assert!(table.contains("Dislikes"));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let table = quotes_table(&[quote(&"y".repeat(200))]);
        assert!(table.contains('…'));
        assert!(!table.contains(&"y".repeat(61)));
    }

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(quotes_table(&[]).is_empty());
        assert!(sources_table(&[]).is_empty());
        assert!(TableBuilder::new().build().is_empty());
    }
}
