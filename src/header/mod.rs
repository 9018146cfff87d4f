//! Auxiliary information read ahead of the coefficients: atoms, electron count, eigenvalues and
//! active orbital ranges.

use std::fmt;
use std::io::{BufRead, Seek};

use serde::{Deserialize, Serialize};

pub mod atoms;
pub mod eigenvalues;
pub mod input;
pub mod moltra;

pub use atoms::{read_atoms_and_basis_sets, AtomSummary};
pub use eigenvalues::{read_eigenvalues, Eigenvalues, ShellCounts, ShellKind};
pub use input::{read_electron_count, validate_eigpri};
pub use moltra::{read_moltra, MoltraInfo};

use crate::report::{DiracReport, ReportError};


/// Information from the header parts of a DIRAC report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// Number of electrons.
    pub electrons: usize,

    /// Orbital energies and shell occupations.
    pub eigenvalues: Eigenvalues,

    /// Active orbital ranges.
    pub moltra: MoltraInfo,
}

impl HeaderInfo {
    /// Returns the active orbital range of every symmetry, in printing order.
    ///
    /// Without explicit `.ACTIVE` ranges, every electronic Kramers pair is active.
    pub fn active_ranges(&self) -> Vec<(String, String)> {
        if self.moltra.is_default() {
            self.eigenvalues
                .shell_counts
                .iter()
                .map(|(symmetry, counts)| {
                    (symmetry.clone(), format!("1..{}", counts.electronic() / 2))
                })
                .collect()
        } else {
            self.eigenvalues
                .shell_counts
                .keys()
                .cloned()
                .zip(self.moltra.ranges.iter().cloned())
                .collect()
        }
    }
}

impl fmt::Display for HeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of electrons: {}", self.electrons)?;
        write!(f, "{}", self.eigenvalues)?;
        if self.moltra.is_default() {
            writeln!(f, "Active space: default")?;
        } else {
            writeln!(f, "Active space: {}", self.moltra.ranges.join(" | "))?;
        }
        Ok(())
    }
}

/// Reads the electron count, the eigenvalues and the active orbital ranges.
///
/// # Errors
///
/// Errors if any of the individual readers fails, with [`ReportError::MissingSection`] if no
/// eigenvalues are printed, and with [`ReportError::Consistency`] if the number of `.ACTIVE`
/// ranges differs from the number of symmetries with eigenvalues.
pub fn read_header_info<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<HeaderInfo, ReportError> {
    let electrons = read_electron_count(report)?;
    let eigenvalues = read_eigenvalues(report)?;
    if eigenvalues.is_empty() {
        return Err(ReportError::MissingSection(
            "No SCF eigenvalues are printed in the DIRAC output file. Use the --no-scf option \
            to skip reading eigenvalue information."
                .to_string(),
        ));
    }
    let moltra = read_moltra(report)?;
    if !moltra.is_default() && moltra.ranges.len() != eigenvalues.shell_counts.len() {
        return Err(ReportError::Consistency(format!(
            "The number of lines in the MOLTRA .ACTIVE section is not equal to the number of \
            symmetries in the Eigenvalues section.\nSymmetries: {:?}\n.ACTIVE lines: {:?}",
            eigenvalues.shell_counts.keys().collect::<Vec<_>>(),
            moltra.ranges
        )));
    }
    Ok(HeaderInfo {
        electrons,
        eigenvalues,
        moltra,
    })
}
