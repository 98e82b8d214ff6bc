//! Terminal styles for CLI output

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// One style per role a piece of CLI output can play
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub label: Style,
    pub muted: Style,
    pub quote: Style,
    pub source: Style,
}

impl Theme {
    /// Colored only when stdout is a terminal and `NO_COLOR` / `CLICOLOR` allow it
    pub fn detect() -> Self {
        Self::new(console::colors_enabled())
    }

    pub fn new(colors: bool) -> Self {
        let paint = |style: Style| if colors { style } else { Style::new() };
        Self {
            header: paint(Style::new().cyan().bold()),
            success: paint(Style::new().green().bold()),
            error: paint(Style::new().red().bold()),
            warn: paint(Style::new().yellow().bold()),
            info: paint(Style::new().magenta()),
            label: paint(Style::new().white().dimmed()),
            muted: paint(Style::new().bright_black()),
            quote: paint(Style::new().bright_white().italic()),
            source: paint(Style::new().cyan()),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_adds_no_escapes() {
        let plain = Theme::new(false);
        assert_eq!("Casablanca".style(plain.source).to_string(), "Casablanca");
        assert_eq!("Added".style(plain.success).to_string(), "Added");

        let colored = Theme::new(true);
        assert!("Added".style(colored.success).to_string().contains('\u{1b}'));
    }
}
