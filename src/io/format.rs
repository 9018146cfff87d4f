//! Formatting of the progress report written to the `dfcoef-output` log target.

use std::fmt;

use log;

#[cfg(test)]
#[path = "format_tests.rs"]
mod format_tests;

/// Inner width of a boxed title.
const TITLE_WIDTH: usize = 73;

/// Logs a failure to the diagnostic logger.
macro_rules! dfcoef_error {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::error!($fmt, $($($arg)*)?) }
}

/// Logs a warning that belongs to the progress report.
macro_rules! dfcoef_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "dfcoef-output", $fmt, $($($arg)*)?) }
}

/// Logs one line of the progress report.
macro_rules! dfcoef_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "dfcoef-output", $fmt, $($($arg)*)?) }
}

pub(crate) use {dfcoef_error, dfcoef_output, dfcoef_warn};

/// Returns `title` centred in a three-line box at least [`TITLE_WIDTH`] characters wide.
fn boxed_title(title: &str) -> [String; 3] {
    let width = title.chars().count().max(TITLE_WIDTH);
    let bar = "─".repeat(width + 4);
    [
        format!("┌{bar}┐"),
        format!("│§ {title:^width$} §│"),
        format!("└{bar}┘"),
    ]
}

/// Writes a boxed section title.
pub(crate) fn write_title(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    boxed_title(title)
        .iter()
        .try_for_each(|line| writeln!(f, "{line}"))
}

/// Logs a boxed section title.
pub(crate) fn log_title(title: &str) {
    for line in boxed_title(title) {
        dfcoef_output!("{line}");
    }
}

/// Logs an underlined subtitle.
pub(crate) fn log_subtitle(subtitle: &str) {
    dfcoef_output!("{subtitle}");
    dfcoef_output!("{}", "═".repeat(subtitle.chars().count()));
}

/// Spells a flag as `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// Logging of multi-line `Display` output, one record per line.
pub(crate) trait DfcoefOutput: fmt::Debug + fmt::Display {
    /// Logs the display output of `self` to the progress report.
    fn log_output_display(&self) {
        self.to_string()
            .lines()
            .for_each(|line| dfcoef_output!("{line}"));
    }
}

impl<T> DfcoefOutput for T where T: fmt::Debug + fmt::Display {}
