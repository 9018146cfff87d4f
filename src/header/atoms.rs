//! The `Atoms and basis sets` summary.

use std::fmt;
use std::io::{BufRead, Seek};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::report::{split_words, DiracReport, ReportError};

/// Atom labels and atom counts printed in the `Atoms and basis sets` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomSummary {
    /// Number of atoms keyed by atom label, in printing order.
    pub atoms: IndexMap<String, usize>,
}

impl AtomSummary {
    /// Returns the number of atom types.
    pub fn number_of_atom_types(&self) -> usize {
        self.atoms.len()
    }

    /// Returns the total number of atoms.
    pub fn total_number_of_atoms(&self) -> usize {
        self.atoms.values().sum()
    }
}

impl fmt::Display for AtomSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .atoms
            .keys()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(5)
            .max(5);
        writeln!(f, "{:<width$} {:>6}", "Label", "Atoms")?;
        for (label, count) in self.atoms.iter() {
            writeln!(f, "{label:<width$} {count:>6}")?;
        }
        writeln!(
            f,
            "{} atom type(s), {} atom(s) in total",
            self.number_of_atom_types(),
            self.total_number_of_atoms()
        )?;
        Ok(())
    }
}

fn is_section_start(words: &[&str]) -> bool {
    words.len() >= 4 && words[..4] == ["Atoms", "and", "basis", "sets"]
}

fn is_section_end(words: &[&str]) -> bool {
    words.len() == 5
        && words[0] == "total:"
        && words[1..]
            .iter()
            .all(|word| !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()))
}

/// Parses `<label> <atoms> <charge> <prim> <cont> ...`.
fn parse_label_line(words: &[&str]) -> Option<(String, usize)> {
    if words.len() < 5 {
        return None;
    }
    let atoms = words[1].parse::<usize>().ok()?;
    words[2..5]
        .iter()
        .all(|word| word.parse::<i64>().is_ok())
        .then(|| (words[0].to_string(), atoms))
}

/// Reads the `Atoms and basis sets` section of a DIRAC report.
///
/// A report without this section yields an empty summary.
///
/// # Errors
///
/// Errors with [`ReportError::Consistency`] if the printed number of atom types or total number
/// of atoms disagrees with the label table.
pub fn read_atoms_and_basis_sets<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<AtomSummary, ReportError> {
    let mut summary = AtomSummary::default();
    let mut in_section = false;
    let mut printed_types = 0;
    let mut printed_total = 0;
    for line in report.scan()? {
        let line = line?;
        let words = split_words(&line);
        if !in_section {
            in_section = is_section_start(&words);
            continue;
        }
        if is_section_end(&words) {
            break;
        }
        if let Some((label, atoms)) = parse_label_line(&words) {
            summary.atoms.insert(label, atoms);
        }
        if line.contains("Number of atom types") {
            printed_types = parse_last(&words, &line)?;
        } else if line.contains("Total number of atoms") {
            printed_total = parse_last(&words, &line)?;
        }
    }

    if printed_types != 0 && summary.number_of_atom_types() != printed_types {
        return Err(ReportError::Consistency(format!(
            "Number of atom types ({printed_types}) is not equal to the number of labels ({}) \
            in the Atoms and basis sets section. The output file may be truncated or written \
            by an unsupported DIRAC version.",
            summary.number_of_atom_types()
        )));
    }
    if printed_total != 0 && summary.total_number_of_atoms() != printed_total {
        return Err(ReportError::Consistency(format!(
            "Total number of atoms ({printed_total}) is not equal to the sum of atoms ({}) in \
            the Atoms and basis sets section. The output file may be truncated or written by an \
            unsupported DIRAC version.",
            summary.total_number_of_atoms()
        )));
    }
    Ok(summary)
}

fn parse_last(words: &[&str], line: &str) -> Result<usize, ReportError> {
    words
        .last()
        .and_then(|word| word.parse::<usize>().ok())
        .ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "Expected an integer at the end of `{}`.",
                line.trim()
            ))
        })
}
