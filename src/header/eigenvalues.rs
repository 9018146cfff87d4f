//! Orbital energies and shell occupations printed after SCF convergence.

use std::fmt;
use std::io::{BufRead, Seek};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::report::{split_words, DiracReport, ReportError};

lazy_static! {
    /// Matches `-775.202926514  ( 2)`, capturing the energy and the number of spinors.
    static ref EIGENVALUE_RE: Regex =
        Regex::new(r"(-?[0-9]+\.?[0-9]+)\s*\(\s*([0-9]+)\)").expect("Regex pattern invalid.");
}

/// Shell kinds named in the occupation table of supersymmetry printouts.
static OCCUPATION_KINDS: phf::Map<&'static str, ShellKind> = phf_map! {
    "inactive" => ShellKind::Closed,
    "active" => ShellKind::Open,
    "virtual" => ShellKind::Virtual,
};

// ==================
// Struct definitions
// ==================

/// An enumerated type for the energy categories of spinors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellKind {
    /// Variant for closed-shell spinors.
    Closed,

    /// Variant for open-shell spinors.
    Open,

    /// Variant for virtual spinors.
    Virtual,

    /// Variant for negative-energy spinors (atoms and linear molecules).
    Negative,

    /// Variant for positronic spinors.
    Positronic,
}

impl ShellKind {
    /// Recognises the sub-header introducing a list of eigenvalues, *e.g.*
    /// `* Closed shell, f = 1.0000`.
    fn from_header(words: &[&str]) -> Option<Self> {
        if words.len() < 3 || words[0] != "*" {
            return None;
        }
        match (words[1], words[2]) {
            ("Closed", "shell,") => Some(ShellKind::Closed),
            ("Open", "shell") => Some(ShellKind::Open),
            ("Virtual", "eigenvalues,") => Some(ShellKind::Virtual),
            ("Negative", "energy") if words.get(3) == Some(&"eigenvalues,") => {
                Some(ShellKind::Negative)
            }
            ("Positronic", "eigenvalues,") => Some(ShellKind::Positronic),
            _ => None,
        }
    }
}

/// Numbers of spinors per energy category in one symmetry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellCounts {
    /// Closed-shell spinors.
    pub closed: usize,

    /// Open-shell spinors.
    pub open: usize,

    /// Virtual spinors.
    #[serde(rename = "virtual")]
    pub virt: usize,

    /// Negative-energy spinors.
    pub negative: usize,

    /// Positronic spinors.
    pub positronic: usize,
}

impl ShellCounts {
    fn add(&mut self, kind: ShellKind, count: usize) {
        match kind {
            ShellKind::Closed => self.closed += count,
            ShellKind::Open => self.open += count,
            ShellKind::Virtual => self.virt += count,
            ShellKind::Negative => self.negative += count,
            ShellKind::Positronic => self.positronic += count,
        }
    }

    /// Returns the number of electronic (closed, open and virtual) spinors.
    pub fn electronic(&self) -> usize {
        self.closed + self.open + self.virt
    }
}

/// Orbital energies and shell occupations per symmetry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Eigenvalues {
    /// Spinor counts keyed by symmetry label, in printing order.
    pub shell_counts: IndexMap<String, ShellCounts>,

    /// Orbital energies keyed by symmetry label. Each Kramers pair contributes one energy.
    pub energies: IndexMap<String, Vec<f64>>,
}

impl Eigenvalues {
    fn ensure_symmetry(&mut self, symmetry: &str) {
        self.shell_counts.entry(symmetry.to_string()).or_default();
        self.energies.entry(symmetry.to_string()).or_default();
    }

    /// Returns `true` if no symmetry blocks have been read.
    pub fn is_empty(&self) -> bool {
        self.shell_counts.is_empty()
    }
}

impl fmt::Display for Eigenvalues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:>7} {:>7} {:>8} {:>9} {:>11} {:>9}",
            "Symmetry", "Closed", "Open", "Virtual", "Negative", "Positronic", "Energies"
        )?;
        for (symmetry, counts) in self.shell_counts.iter() {
            writeln!(
                f,
                "{symmetry:<8} {:>7} {:>7} {:>8} {:>9} {:>11} {:>9}",
                counts.closed,
                counts.open,
                counts.virt,
                counts.negative,
                counts.positronic,
                self.energies.get(symmetry).map(Vec::len).unwrap_or(0)
            )?;
        }
        Ok(())
    }
}

// ----------------
// Reader internals
// ----------------

/// The layout in which eigenvalues are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PrintType {
    /// Not yet determined.
    Undetermined,

    /// Blocks headed by `* Fermion symmetry <sym>`.
    Standard,

    /// Blocks headed by `* Block <n> in <sym>: <omega>`, used for atoms and linear molecules.
    Supersymmetry,
}

/// Where the reader is relative to the eigenvalue printout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EigenvalueStage {
    /// Before the SCF iterations.
    BeforeScf,

    /// Inside the SCF iterations, before the `Eigenvalues` header.
    ScfCycle,

    /// After the `Eigenvalues` header.
    Eigenvalues,
}

/// Working state of a supersymmetry printout.
#[derive(Debug, Default)]
struct SupersymmetryState {
    /// Whether the blocks are labelled by atomic `j; mj` values.
    atomic: bool,

    /// Energies keyed by symmetry and then by omega label.
    omega: IndexMap<String, IndexMap<String, Vec<f64>>>,

    /// The omega label of the current block.
    omega_label: String,

    /// Whether the reader is inside an `Occupation in fermion symmetry` table.
    in_occupation: bool,

    /// How many energies of each omega label have been redistributed.
    occupation_index: IndexMap<String, usize>,

    /// Omega labels of the current occupation row.
    omega_list: Vec<String>,
}

fn is_standard_header(words: &[&str]) -> bool {
    words.len() >= 4 && words[0] == "*" && words[1].contains("Fermion") && words[2].contains("symmetry")
}

fn is_block_header(line: &str) -> bool {
    line.contains("* Block")
}

/// Extracts `E1u` from `* Block   3 in E1u:  Omega =  5/2`.
///
/// The block number may overflow into asterisks, so the symmetry is located after `in`.
fn block_symmetry(words: &[&str], line: &str) -> Result<String, ReportError> {
    words
        .iter()
        .position(|&word| word == "in")
        .and_then(|idx| words.get(idx + 1))
        .map(|word| word.trim_end_matches(':').to_string())
        .ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "Cannot find the symmetry of the eigenvalue block `{}`.",
                line.trim()
            ))
        })
}

/// Extracts `5/2` from `... Omega =  5/2`, or `p 3/2 -3/2` from `... E1u:  p 3/2; -3/2`.
fn block_omega(words: &[&str], line: &str) -> Result<String, ReportError> {
    if line.contains("Omega") {
        return Ok(words
            .last()
            .map(|word| word.replace('=', "").trim().to_string())
            .unwrap_or_default());
    }
    let colon = line.find(':').ok_or_else(|| {
        ReportError::FormatMismatch(format!(
            "Cannot find the omega label of the eigenvalue block `{}`.",
            line.trim()
        ))
    })?;
    let omega = line[colon + 1..].trim();
    Ok(match omega.split_once(';') {
        Some((j, mj)) => format!("{} {}", j.trim(), mj.trim()),
        None => omega.to_string(),
    })
}

/// Splits `s 1/2 d 3/2 s 1/2` into `["s 1/2", "d 3/2", "s 1/2"]`.
fn split_by_half(line: &str) -> Vec<String> {
    line.split("/2")
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| format!("{item}/2"))
        .collect()
}

impl SupersymmetryState {
    /// Moves the next energy of each omega label in the current occupation row into the
    /// per-symmetry energy list.
    fn redistribute(&mut self, symmetry: &str, eigenvalues: &mut Eigenvalues) -> Result<(), ReportError> {
        let energies = eigenvalues.energies.entry(symmetry.to_string()).or_default();
        for item in self.omega_list.iter() {
            let idx = self.occupation_index.get_mut(item).ok_or_else(|| {
                ReportError::FormatMismatch(format!(
                    "Omega label `{item}` of the occupation table of {symmetry} does not match \
                    any eigenvalue block."
                ))
            })?;
            let value = self
                .omega
                .get(symmetry)
                .and_then(|blocks| blocks.get(item))
                .and_then(|values| values.get(*idx))
                .ok_or_else(|| {
                    ReportError::Consistency(format!(
                        "The occupation table of {symmetry} lists more `{item}` orbitals than \
                        were printed."
                    ))
                })?;
            energies.push(*value);
            *idx += 1;
        }
        Ok(())
    }
}

/// Reads the eigenvalue printout following SCF convergence.
///
/// Both the standard layout and the supersymmetry layout of atoms and linear molecules are
/// understood. Reading stops at the `HOMO - LUMO` gap line.
///
/// # Errors
///
/// Errors with [`ReportError::FormatMismatch`] if an eigenvalue appears outside a recognised
/// block, and with [`ReportError::Consistency`] if the occupation table of a supersymmetry
/// printout disagrees with its blocks.
pub fn read_eigenvalues<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<Eigenvalues, ReportError> {
    let mut eigenvalues = Eigenvalues::default();
    let mut stage = EigenvalueStage::BeforeScf;
    let mut print_type = PrintType::Undetermined;
    let mut symmetry: Option<String> = None;
    let mut kind: Option<ShellKind> = None;
    let mut supersym = SupersymmetryState::default();

    for line in report.scan()? {
        let line = line?;
        let words = split_words(&line);
        if words.is_empty() {
            continue;
        }
        match stage {
            EigenvalueStage::BeforeScf => {
                if line.contains("SCF - CYCLE") {
                    stage = EigenvalueStage::ScfCycle;
                }
                continue;
            }
            EigenvalueStage::ScfCycle => {
                if words[0] == "Eigenvalues" {
                    stage = EigenvalueStage::Eigenvalues;
                }
                continue;
            }
            EigenvalueStage::Eigenvalues => {}
        }

        if print_type == PrintType::Undetermined {
            if is_standard_header(&words) {
                print_type = PrintType::Standard;
                let sym = words[3].to_string();
                eigenvalues.ensure_symmetry(&sym);
                symmetry = Some(sym);
            } else if is_block_header(&line) {
                print_type = PrintType::Supersymmetry;
                supersym.atomic = line.contains(';');
                open_block(&words, &line, &mut eigenvalues, &mut supersym, &mut symmetry)?;
            }
            continue;
        }

        if print_type == PrintType::Standard && is_standard_header(&words) {
            let sym = words[3].to_string();
            eigenvalues.ensure_symmetry(&sym);
            symmetry = Some(sym);
        } else if print_type == PrintType::Supersymmetry && is_block_header(&line) {
            open_block(&words, &line, &mut eigenvalues, &mut supersym, &mut symmetry)?;
        } else if let Some(new_kind) = ShellKind::from_header(&words) {
            kind = Some(new_kind);
        } else if line.contains("HOMO - LUMO") {
            break;
        } else if print_type == PrintType::Supersymmetry
            && line.contains("Occupation in fermion symmetry")
        {
            let sym = words.last().copied().unwrap_or_default().to_string();
            supersym.in_occupation = true;
            supersym.occupation_index = supersym
                .omega
                .get(&sym)
                .map(|blocks| blocks.keys().map(|key| (key.clone(), 0)).collect())
                .unwrap_or_default();
            symmetry = Some(sym);
        } else if supersym.in_occupation {
            let sym = symmetry.clone().unwrap_or_default();
            if line.contains("Occupation of") {
                supersym.in_occupation = false;
            } else if line.contains("orbitals") {
                let occupation = words.get(1).map(|word| word.to_lowercase()).unwrap_or_default();
                kind = Some(*OCCUPATION_KINDS.get(occupation.as_str()).ok_or_else(|| {
                    ReportError::FormatMismatch(format!(
                        "Unknown orbital occupation `{occupation}` in `{}`.",
                        line.trim()
                    ))
                })?);
            } else if line.contains("Mj") {
                let mj_list = split_by_half(&line.replace("Mj", ""));
                if mj_list.len() != supersym.omega_list.len() {
                    return Err(ReportError::FormatMismatch(format!(
                        "The Mj row of the occupation table of {sym} has {} entries, but the \
                        preceding row has {}.\nMj row: {mj_list:?}\nPreceding row: {:?}",
                        mj_list.len(),
                        supersym.omega_list.len(),
                        supersym.omega_list
                    )));
                }
                supersym.omega_list = supersym
                    .omega_list
                    .iter()
                    .zip(mj_list.iter())
                    .map(|(omega, mj)| format!("{omega} {mj}"))
                    .collect();
                supersym.redistribute(&sym, &mut eigenvalues)?;
            } else if supersym.atomic {
                supersym.omega_list = split_by_half(&line);
            } else {
                supersym.omega_list = split_by_half(&line);
                supersym.redistribute(&sym, &mut eigenvalues)?;
            }
        } else {
            for captures in EIGENVALUE_RE.captures_iter(&line) {
                let (Some(sym), Some(kind)) = (symmetry.as_deref(), kind) else {
                    return Err(ReportError::FormatMismatch(format!(
                        "Eigenvalue outside a symmetry block or shell category: `{}`.",
                        line.trim()
                    )));
                };
                let value = captures[1].parse::<f64>().map_err(|_| {
                    ReportError::FormatMismatch(format!(
                        "Cannot parse the eigenvalue `{}`.",
                        &captures[1]
                    ))
                })?;
                let count = captures[2].parse::<usize>().map_err(|_| {
                    ReportError::FormatMismatch(format!(
                        "Cannot parse the degeneracy `{}`.",
                        &captures[2]
                    ))
                })?;
                if let Some(counts) = eigenvalues.shell_counts.get_mut(sym) {
                    counts.add(kind, count);
                }
                let pairs = (count + 1) / 2;
                match print_type {
                    PrintType::Standard => {
                        let energies = eigenvalues.energies.entry(sym.to_string()).or_default();
                        energies.extend(std::iter::repeat(value).take(pairs));
                    }
                    PrintType::Supersymmetry => {
                        let values = supersym
                            .omega
                            .entry(sym.to_string())
                            .or_default()
                            .entry(supersym.omega_label.clone())
                            .or_default();
                        values.extend(std::iter::repeat(value).take(pairs));
                    }
                    PrintType::Undetermined => {}
                }
            }
        }
    }

    log::debug!("Eigenvalues read for {} symmetries.", eigenvalues.shell_counts.len());
    Ok(eigenvalues)
}

fn open_block(
    words: &[&str],
    line: &str,
    eigenvalues: &mut Eigenvalues,
    supersym: &mut SupersymmetryState,
    symmetry: &mut Option<String>,
) -> Result<(), ReportError> {
    let sym = block_symmetry(words, line)?;
    let omega = block_omega(words, line)?;
    eigenvalues.ensure_symmetry(&sym);
    supersym
        .omega
        .entry(sym.clone())
        .or_default()
        .entry(omega.clone())
        .or_default();
    supersym.omega_label = omega;
    *symmetry = Some(sym);
    Ok(())
}
