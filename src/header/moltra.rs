//! Active orbital ranges of the four-index transformation (`**MOLTRA`).

use std::io::{BufRead, Seek};

use serde::{Deserialize, Serialize};

use crate::report::input_echo::{
    input_words, is_comment, is_echo_end, is_echo_start, is_keyword, is_section, is_top_section,
    strip_comment,
};
use crate::report::{split_words, DiracReport, ReportError};

/// The `.ACTIVE` settings of the `**MOLTRA` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoltraInfo {
    /// One range specification per symmetry, *e.g.* `energy -20 10 2` or `10..180`. Empty if
    /// `.ACTIVE` was not given, in which case every electronic orbital is active.
    pub ranges: Vec<String>,
}

impl MoltraInfo {
    /// Returns `true` if the default active space is used.
    pub fn is_default(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Reads the `.ACTIVE` lines of the `**MOLTRA` section from the echoed DIRAC input.
pub fn read_moltra<R: BufRead + Seek>(report: &mut DiracReport<R>) -> Result<MoltraInfo, ReportError> {
    let mut info = MoltraInfo::default();
    let mut in_echo = false;
    let mut in_moltra = false;
    let mut active_next = false;
    for line in report.scan()? {
        let line = line?;
        if !in_echo {
            in_echo = is_echo_start(&line);
            continue;
        }
        if is_echo_end(&line) {
            break;
        }
        match split_words(&line).first() {
            Some(word) if !is_comment(word) => {}
            _ => continue,
        }
        let words = input_words(&line);
        let Some(first) = words.first().map(String::as_str) else {
            continue;
        };

        if active_next {
            if is_section(first) || is_keyword(first) {
                break;
            }
            info.ranges.push(strip_comment(&line).trim().to_string());
            continue;
        }
        if is_top_section(first) {
            in_moltra = first.starts_with("**MOLTRA");
            continue;
        }
        if in_moltra && first.starts_with(".ACTIVE") {
            active_next = true;
        }
    }
    Ok(info)
}
