//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;

use crate::config::DisplayConfig;
use crate::domain::EPSILON;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print caution status (yellow !, indented)
pub fn caution(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "!".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data output)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Format an amount with currency prefix, thousands separators and fixed decimals.
///
/// Values within one cent below zero, or rounding to zero, print without a sign.
pub fn format_money(value: f64, display: &DisplayConfig) -> String {
    let value = if value < 0.0 && value > -EPSILON { 0.0 } else { value };
    let formatted = format!("{:.*}", display.decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let grouped = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .join(",");

    let rounds_to_zero = formatted.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !rounds_to_zero { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{}{grouped}.{frac}", display.currency),
        None => format!("{sign}{}{grouped}", display.currency),
    }
}

/// Format a 0.0-1.0 fraction as percent with one decimal.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
