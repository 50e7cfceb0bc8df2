//! Terminal colors for scores and deltas

use crate::core::constants::scoring;
use crate::scoring::ComparisonRecord;

pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const CYAN: &'static str = "\x1b[36m";
    pub const BRIGHT_BLACK: &'static str = "\x1b[90m";
}

/// Apply color to text if terminal supports it
pub fn colorize(text: &str, color: &str) -> String {
    if supports_formatting() {
        format!("{}{}{}", color, text, Colors::RESET)
    } else {
        text.to_string()
    }
}

/// Bold and colored text, or plain text when formatting is unsupported
pub fn emphasize(text: &str, color: &str) -> String {
    if supports_formatting() {
        format!("{}{}{}{}", Colors::BOLD, color, text, Colors::RESET)
    } else {
        text.to_string()
    }
}

/// Color of a performance score: green when good, yellow when it needs
/// improvement, red when poor
pub fn score_color(score: Option<u8>) -> &'static str {
    match score {
        Some(s) if s >= scoring::GOOD_THRESHOLD => Colors::GREEN,
        Some(s) if s >= scoring::NEEDS_IMPROVEMENT_THRESHOLD => Colors::YELLOW,
        Some(_) => Colors::RED,
        None => Colors::BRIGHT_BLACK,
    }
}

/// Color of a change: every metric is smaller-is-better
pub fn delta_color(record: &ComparisonRecord) -> &'static str {
    if record.is_regression() {
        Colors::RED
    } else if record.is_improvement() {
        Colors::GREEN
    } else {
        Colors::DIM
    }
}

/// Terminal capability detection
pub fn supports_formatting() -> bool {
    use std::env;
    use std::io::IsTerminal;

    if env::var("NO_COLOR").is_ok() || env::var("FORCE_COLOR").as_deref() == Ok("0") {
        return false;
    }

    if env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    // Disable formatting when running tests
    if cfg!(test) || env::var("RUST_TEST_TIME_UNIT").is_ok() {
        return false;
    }

    if !std::io::stdout().is_terminal() {
        return false;
    }

    match env::var("TERM") {
        Ok(term) => !(term.is_empty() || term == "dumb"),
        Err(_) => env::var("TERM_PROGRAM").is_ok(),
    }
}
