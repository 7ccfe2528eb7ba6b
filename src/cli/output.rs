//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::Progress;

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

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print an answer option as `[index] label`
pub fn option(index: usize, label: &str) {
    println!("  {} {}", format!("[{index}]").cyan(), label);
}

/// Render a text progress bar, e.g. `[#####-----] 2/4`.
pub fn progress_bar(progress: &Progress, width: usize) -> String {
    let filled = (progress.fraction() * width as f64).round() as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled)),
        progress.current,
        progress.total
    )
}

/// Print the progress bar (dimmed)
pub fn progress(progress: &Progress) {
    println!("{}", progress_bar(progress, 20).dimmed());
}
