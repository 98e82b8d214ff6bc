use crate::quote::{Quote, ValidationError};
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().label.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}

/// Field-level message for a rejected form, e.g. `weight: must be >= 1`
pub fn validation_error(err: &ValidationError) {
    match err.field() {
        Some(field) => error(&format!("{}: {}", field, err)),
        None => error(&err.to_string()),
    }
}

/// A quote as shown by `random`, `show`, `like` and friends
pub fn quote_card(quote: &Quote) {
    println!();
    println!("  {} {}", Icons::QUOTE, format!("\"{}\"", quote.text).style(theme().quote.clone()));
    println!("     {} {}", Icons::FILM, quote.source.style(theme().source.clone()));
    println!(
        "     {}",
        muted(&format!(
            "#{}  {} {}  {} {}  {} {}  {} {}",
            quote.id,
            Icons::WEIGHT,
            quote.weight,
            Icons::EYE,
            quote.views,
            Icons::LIKE,
            quote.likes,
            Icons::DISLIKE,
            quote.dislikes
        ))
    );
    println!();
}
