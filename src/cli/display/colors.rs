//! Color mapping for scores and answers.
//!
//! Styling is disabled automatically when stdout is not a terminal.

use console::{style, StyledObject};

/// Color a mean in `[0, 1]`: green when strong, red when weak.
pub fn colorize_mean(mean: f64) -> StyledObject<String> {
    let text = format!("{mean:.4}");
    if mean >= 0.7 {
        style(text).green().bold()
    } else if mean >= 0.4 {
        style(text).yellow()
    } else {
        style(text).red()
    }
}

pub fn action_success(message: &str) -> String {
    format!("{} {message}", style("\u{2713}").green().bold())
}

pub fn action_failure(message: &str) -> String {
    format!("{} {message}", style("\u{2717}").red().bold())
}
