//! The plain-text summary file.

use std::io::Write;

use anyhow::{self, Context};
use itertools::Itertools;

use crate::drivers::summary::SummaryParams;
use crate::header::HeaderInfo;
use crate::mo::{MoCollection, MoRecord};

/// Writes the two header lines: the electron count with the active range of every symmetry, and
/// the shell counts of every symmetry.
fn write_header<W: Write>(out: &mut W, header: &HeaderInfo) -> Result<(), anyhow::Error> {
    let ranges = header
        .active_ranges()
        .iter()
        .map(|(symmetry, range)| format!("{symmetry} {range}"))
        .join(" ");
    writeln!(out, "electron_num {} {ranges}", header.electrons)?;
    let counts = header
        .eigenvalues
        .shell_counts
        .iter()
        .map(|(symmetry, counts)| {
            format!(
                "{symmetry} closed {} open {} virtual {}",
                counts.closed, counts.open, counts.virt
            )
        })
        .join(" ");
    writeln!(out, "{counts}")?;
    Ok(())
}

/// Writes one orbital.
///
/// Every retained coefficient is written once per degenerate instance of its group, so the
/// printed percentages of an orbital add up to the retained share of its norm.
fn write_mo<W: Write>(
    out: &mut W,
    mo: &MoRecord,
    params: &SummaryParams,
) -> Result<(), anyhow::Error> {
    let dp = params.decimal_places;
    if params.compress {
        write!(
            out,
            "{} {} {:.dp$}",
            mo.symmetry,
            mo.irrep_index.unwrap_or(mo.number),
            mo.energy
        )?;
        for coefficient in mo.retained() {
            let percentage = mo.percentage(coefficient);
            for _ in 0..coefficient.multiplicity {
                write!(out, " {} {percentage:.dp$}", coefficient.display_label())?;
            }
        }
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "{} no. {} {} {:.dp$}",
            if mo.is_electronic {
                "Electronic"
            } else {
                "Positronic"
            },
            mo.number,
            mo.symmetry,
            mo.energy
        )?;
        let width = dp + 4;
        for coefficient in mo.retained() {
            let percentage = mo.percentage(coefficient);
            for _ in 0..coefficient.multiplicity {
                writeln!(
                    out,
                    "{:<11} {percentage:>width$.dp$} %",
                    coefficient.display_label()
                )?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes a summary of all orbitals.
///
/// The positronic block is written if [`SummaryParams::all_write`] or
/// [`SummaryParams::positronic_write`] is set, followed by a blank line. The electronic block is
/// written unless only positronic orbitals are requested. Orbitals are written in the order they
/// appear in `mos`.
///
/// # Arguments
///
/// * `out` - The destination.
/// * `params` - The formatting and selection parameters.
/// * `header` - Header information to be written ahead of the orbitals, if any.
/// * `mos` - The finalised orbitals.
///
/// # Errors
///
/// Errors if writing to `out` fails.
pub fn write_summary<W: Write>(
    out: &mut W,
    params: &SummaryParams,
    header: Option<&HeaderInfo>,
    mos: &MoCollection,
) -> Result<(), anyhow::Error> {
    if let Some(header) = header {
        write_header(out, header).context("Unable to write the summary header")?;
    }
    if params.all_write || params.positronic_write {
        for mo in mos.positronic.iter() {
            write_mo(out, mo, params).context("Unable to write a positronic orbital")?;
        }
        writeln!(out)?;
    }
    if params.all_write || !params.positronic_write {
        for mo in mos.electronic.iter() {
            write_mo(out, mo, params).context("Unable to write an electronic orbital")?;
        }
    }
    out.flush()?;
    Ok(())
}
