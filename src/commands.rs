use owo_colors::OwoColorize;
use quotebook::output::{OutputMode, emit_success};
use quotebook::ui::{self, Icons};
use quotebook::{NewQuote, Quote, QuoteEngine};

pub fn run_add(engine: &QuoteEngine, mode: OutputMode, text: String, source: String, weight: i64) -> anyhow::Result<()> {
    let quote = engine.add_quote(&NewQuote::new(text, source, weight))?;
    if mode.is_human() {
        ui::success(&format!("Added quote #{}", quote.id));
        ui::quote_card(&quote);
    }
    emit_success(mode, "add", &quote)
}

/// Edit a quote; fields left out keep their current value
pub fn run_edit(
    engine: &QuoteEngine,
    mode: OutputMode,
    id: i64,
    text: Option<String>,
    source: Option<String>,
    weight: Option<i64>,
) -> anyhow::Result<()> {
    let current = engine.get_quote(id)?;
    let new = NewQuote::new(
        text.unwrap_or(current.text),
        source.unwrap_or(current.source),
        weight.unwrap_or(current.weight),
    );

    let quote = engine.edit_quote(id, &new)?;
    if mode.is_human() {
        ui::success(&format!("Updated quote #{}", quote.id));
        ui::quote_card(&quote);
    }
    emit_success(mode, "edit", &quote)
}

pub fn run_show(engine: &QuoteEngine, mode: OutputMode, id: i64) -> anyhow::Result<()> {
    let quote = engine.get_quote(id)?;
    if mode.is_human() {
        ui::quote_card(&quote);
        ui::summary_row("Created:", &quote.created_at.to_rfc3339());
        ui::summary_row("Updated:", &quote.updated_at.to_rfc3339());
    }
    emit_success(mode, "show", &quote)
}

/// Pick a weighted random quote and count the view, like the landing page does
pub fn run_random(engine: &QuoteEngine, mode: OutputMode) -> anyhow::Result<()> {
    let quote = engine.display_random_quote()?;
    if mode.is_human() {
        match &quote {
            Some(q) => ui::quote_card(q),
            None => println!("{} No quotes available. Add one with `quotebook add`.", Icons::EMPTY),
        }
    }
    emit_success(mode, "random", &quote)
}

pub fn run_vote(engine: &QuoteEngine, mode: OutputMode, id: i64, like: bool) -> anyhow::Result<()> {
    let (quote, command, icon) = if like {
        (engine.like_quote(id)?, "like", Icons::LIKE)
    } else {
        (engine.dislike_quote(id)?, "dislike", Icons::DISLIKE)
    };

    if mode.is_human() {
        println!(
            "{} #{} now has {} likes and {} dislikes",
            icon,
            quote.id,
            quote.likes.bold(),
            quote.dislikes.bold()
        );
    }
    emit_success(mode, command, &quote)
}

pub fn run_delete(engine: &QuoteEngine, mode: OutputMode, id: i64) -> anyhow::Result<()> {
    engine.delete_quote(id)?;
    if mode.is_human() {
        println!("{} Deleted quote #{}", Icons::DEL, id);
    }
    emit_success(mode, "delete", serde_json::json!({ "id": id }))
}

pub fn run_popular(engine: &QuoteEngine, mode: OutputMode, source: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let quotes = engine.list_popular(source, limit)?;
    if mode.is_human() {
        let title = match source {
            Some(s) => format!("Most popular from {}", s),
            None => "Most popular".to_string(),
        };
        ui::section(&title);
        print_quotes(&quotes);
    }
    emit_success(mode, "popular", &quotes)
}

pub fn run_sources(engine: &QuoteEngine, mode: OutputMode) -> anyhow::Result<()> {
    let sources = engine.sources()?;
    if mode.is_human() {
        if sources.is_empty() {
            println!("{} No sources yet.", Icons::EMPTY);
        } else {
            println!("{}", ui::sources_table(&sources));
        }
    }
    emit_success(mode, "sources", &sources)
}

pub fn run_search(engine: &QuoteEngine, mode: OutputMode, query: &str, limit: usize) -> anyhow::Result<()> {
    let quotes = engine.search(query, limit)?;
    if mode.is_human() {
        println!("{} Searching for: '{}' (limit: {})...", Icons::SEARCH, query, limit);
        print_quotes(&quotes);
    }
    emit_success(mode, "search", &quotes)
}

pub fn run_stats(engine: &QuoteEngine, mode: OutputMode, database: &str) -> anyhow::Result<()> {
    let stats = engine.stats()?;
    if mode.is_human() {
        println!("{} Quotebook Statistics ({})", Icons::STATS, database);
        println!("{}", ui::stats_table(&stats));
    }
    emit_success(mode, "stats", &stats)
}

fn print_quotes(quotes: &[Quote]) {
    if quotes.is_empty() {
        println!("{} No quotes found.", Icons::EMPTY);
    } else {
        println!("{}", ui::quotes_table(quotes));
    }
}
