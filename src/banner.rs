//! Colored banner lines marking device sequence boundaries and failures.

use colored::Colorize;

const BANNER_WIDTH: usize = 60;

/// Center `text` in a field of `fill` characters.
fn padded(text: &str, fill: char) -> String {
    let len = text.chars().count();
    if len >= BANNER_WIDTH {
        return text.to_string();
    }
    let total = BANNER_WIDTH - len;
    let before = total / 2;
    let after = total - before;
    format!(
        "{}{}{}",
        fill.to_string().repeat(before),
        text,
        fill.to_string().repeat(after)
    )
}

/// Announce the start of a device's execution sequence.
pub fn start(text: &str) {
    println!("{}", padded(text, '*').red().on_yellow());
}

/// Announce the end of a device's execution sequence.
pub fn end(text: &str) {
    println!("\n{}", padded(text, '*').red().on_cyan());
}

/// Highlight a caught failure.
pub fn error(text: &str) {
    eprintln!("{}", padded(&text.to_uppercase(), '>').red().on_blue());
}
