//! Recognition of the DIRAC input file echoed at the top of every report.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SECTION_RE: Regex = Regex::new(r"^\*{1,2}[0-9A-Z]+").expect("Regex pattern invalid.");
    static ref TOP_SECTION_RE: Regex = Regex::new(r"^\*\*[0-9A-Z]+").expect("Regex pattern invalid.");
    static ref KEYWORD_RE: Regex = Regex::new(r"^\.[0-9A-Z]+").expect("Regex pattern invalid.");
}

/// Returns `true` if the line opens the echoed input file.
pub fn is_echo_start(line: &str) -> bool {
    line.contains("Contents of the input file")
}

/// Returns `true` if the line closes the echoed input file.
pub fn is_echo_end(line: &str) -> bool {
    line.contains("Contents of the molecule file")
}

/// Returns `true` if the word opens a comment line in a DIRAC input.
pub fn is_comment(word: &str) -> bool {
    word.starts_with('!') || word.starts_with('#')
}

/// Removes a trailing comment from an input line.
pub fn strip_comment(line: &str) -> &str {
    match line.find(|c| c == '!' || c == '#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Returns `true` if the (upper-cased) word is a `*SECTION` or `**SECTION` header.
pub fn is_section(word: &str) -> bool {
    SECTION_RE.is_match(word)
}

/// Returns `true` if the (upper-cased) word is a `**SECTION` header.
pub fn is_top_section(word: &str) -> bool {
    TOP_SECTION_RE.is_match(word)
}

/// Returns `true` if the (upper-cased) word is a `*SECTION` header but not a `**SECTION` one.
pub fn is_subsection(word: &str) -> bool {
    is_section(word) && !is_top_section(word)
}

/// Returns `true` if the (upper-cased) word is a `.KEYWORD`.
pub fn is_keyword(word: &str) -> bool {
    KEYWORD_RE.is_match(word)
}

/// Splits an echoed input line into upper-cased words with any trailing comment removed.
pub fn input_words(line: &str) -> Vec<String> {
    super::split_words(strip_comment(line))
        .into_iter()
        .map(str::to_uppercase)
        .collect()
}
