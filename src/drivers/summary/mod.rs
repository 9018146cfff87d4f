//! Summarising the molecular-orbital coefficients of a DIRAC report.

use std::fmt;
use std::io::{BufRead, Seek};
use std::path::PathBuf;

use anyhow::{self, bail, format_err, Context};
use derive_builder::Builder;
use log;
use serde::{Deserialize, Serialize};

use crate::basis::{read_basis_catalog, BasisCatalog};
use crate::drivers::DfcoefDriver;
use crate::header::{
    read_atoms_and_basis_sets, read_header_info, validate_eigpri, AtomSummary, HeaderInfo,
};
use crate::io::format::{
    dfcoef_output, dfcoef_warn, log_subtitle, log_title, nice_bool, write_title, DfcoefOutput,
};
use crate::mo::MoCollection;
use crate::privec::read_mo_coefficients;
use crate::report::DiracReport;

#[cfg(test)]
#[path = "summary_tests.rs"]
mod summary_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_threshold() -> f64 {
    0.1
}

fn default_decimal_places() -> usize {
    5
}

/// A structure containing control parameters for summarising molecular-orbital coefficients.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SummaryParams {
    /// Percentage below which a basis-function contribution is not reported.
    #[builder(default = "default_threshold()")]
    pub threshold: f64,

    /// Number of decimal places of percentages and energies in the summary.
    #[builder(default = "default_decimal_places()")]
    pub decimal_places: usize,

    /// Boolean indicating if each orbital is to be written on a single line.
    #[builder(default = "false")]
    pub compress: bool,

    /// Boolean indicating if orbitals are to be kept in reading order rather than sorted by
    /// energy.
    #[builder(default = "false")]
    pub no_sort: bool,

    /// Boolean indicating if both electronic and positronic orbitals are to be written.
    #[builder(default = "false")]
    pub all_write: bool,

    /// Boolean indicating if only positronic orbitals are to be written. Ignored if
    /// [`Self::all_write`] is set.
    #[builder(default = "false")]
    pub positronic_write: bool,

    /// Boolean indicating if the electron count, the eigenvalues and the active space are not to
    /// be read.
    #[builder(default = "false")]
    pub no_scf: bool,

    /// Boolean indicating if per-orbital normalisation diagnostics are to be logged.
    #[builder(default = "false")]
    pub debug: bool,
}

impl SummaryParams {
    /// Returns a builder to construct a [`SummaryParams`] structure.
    pub fn builder() -> SummaryParamsBuilder {
        SummaryParamsBuilder::default()
    }

    /// Checks parameters that may have bypassed the builder, *e.g.* those read from YAML.
    ///
    /// # Errors
    ///
    /// Errors if the threshold is negative or not finite, or if the number of decimal places lies
    /// outside `1..=15`.
    pub fn check(&self) -> Result<(), anyhow::Error> {
        check_threshold(self.threshold).map_err(|err| format_err!(err))?;
        check_decimal_places(self.decimal_places).map_err(|err| format_err!(err))?;
        Ok(())
    }
}

fn check_threshold(threshold: f64) -> Result<(), String> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(format!(
            "The threshold must be a non-negative percentage, but {threshold} was given."
        ))
    }
}

fn check_decimal_places(decimal_places: usize) -> Result<(), String> {
    if (1..=15).contains(&decimal_places) {
        Ok(())
    } else {
        Err(format!(
            "The number of decimal places must be between 1 and 15, but {decimal_places} was \
            given."
        ))
    }
}

impl SummaryParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(threshold) = self.threshold {
            check_threshold(threshold)?;
        }
        if let Some(decimal_places) = self.decimal_places {
            check_decimal_places(decimal_places)?;
        }
        Ok(())
    }
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            decimal_places: default_decimal_places(),
            compress: false,
            no_sort: false,
            all_write: false,
            positronic_write: false,
            no_scf: false,
            debug: false,
        }
    }
}

impl fmt::Display for SummaryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contribution threshold: {} %", self.threshold)?;
        writeln!(f, "Decimal places: {}", self.decimal_places)?;
        writeln!(f, "Compressed output: {}", nice_bool(self.compress))?;
        writeln!(f, "Sort orbitals by energy: {}", nice_bool(!self.no_sort))?;
        writeln!(
            f,
            "Orbitals written: {}",
            if self.all_write {
                "electronic and positronic"
            } else if self.positronic_write {
                "positronic"
            } else {
                "electronic"
            }
        )?;
        writeln!(f, "Read SCF header information: {}", nice_bool(!self.no_scf))?;
        writeln!(f, "Normalisation diagnostics: {}", nice_bool(self.debug))?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain the summary of a DIRAC report.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct SummaryResult {
    /// The control parameters used to obtain this summary.
    pub parameters: SummaryParams,

    /// The atoms of the molecule.
    pub atoms: AtomSummary,

    /// Electron count, eigenvalues and active space, unless [`SummaryParams::no_scf`] is set.
    #[builder(default = "None")]
    pub header: Option<HeaderInfo>,

    /// The basis-function catalog.
    pub catalog: BasisCatalog,

    /// The finalised orbitals, sorted by energy unless [`SummaryParams::no_sort`] is set.
    pub mos: MoCollection,
}

impl SummaryResult {
    /// Returns a builder to construct a [`SummaryResult`] structure.
    fn builder() -> SummaryResultBuilder {
        SummaryResultBuilder::default()
    }
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, "Summary")?;
        writeln!(f, "{}", self.atoms)?;
        if let Some(header) = self.header.as_ref() {
            write!(f, "{header}")?;
        }
        writeln!(f, "Basis-function groups: {}", self.catalog.len())?;
        writeln!(f, "Electronic orbitals: {}", self.mos.electronic.len())?;
        writeln!(f, "Positronic orbitals: {}", self.mos.positronic.len())?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for summarising the molecular-orbital coefficients of a DIRAC report.
#[derive(Clone, Builder)]
pub struct SummaryDriver<'a> {
    /// The control parameters for the summary.
    parameters: &'a SummaryParams,

    /// A path to a DIRAC output file. Only one of this or [`Self::report_text`] should be
    /// specified.
    #[builder(default = "None")]
    dirac_output: Option<PathBuf>,

    /// The text of a DIRAC output. Only one of this or [`Self::dirac_output`] should be
    /// specified.
    #[builder(default = "None")]
    report_text: Option<&'a str>,

    /// The result of the summary.
    #[builder(setter(skip), default = "None")]
    result: Option<SummaryResult>,
}

impl<'a> SummaryDriver<'a> {
    /// Returns a builder to construct a [`SummaryDriver`] structure.
    pub fn builder() -> SummaryDriverBuilder<'a> {
        SummaryDriverBuilder::default()
    }

    /// Executes the summary.
    fn summarise(&mut self) -> Result<(), anyhow::Error> {
        log_title("DIRAC Coefficient Summary");
        dfcoef_output!("");
        let params = self.parameters;
        params.check()?;
        params.log_output_display();

        let result = match (self.dirac_output.as_ref(), self.report_text) {
            (Some(path), None) => {
                let mut report = DiracReport::from_file(path).with_context(|| {
                    format!("Unable to open the DIRAC output file `{}`", path.display())
                })?;
                summarise_report(&mut report, params)?
            }
            (None, Some(text)) => {
                let mut report = DiracReport::from_text(text);
                summarise_report(&mut report, params)?
            }
            _ => bail!("Neither or both `dirac_output` and `report_text` are specified."),
        };
        result.log_output_display();
        self.result = Some(result);
        Ok(())
    }
}

impl DfcoefDriver for SummaryDriver<'_> {
    type Params = SummaryParams;

    type Outcome = SummaryResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No coefficient summary found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.summarise()
    }
}

// =========
// Functions
// =========

/// Reads every section needed for the summary from a report.
fn summarise_report<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
    params: &SummaryParams,
) -> Result<SummaryResult, anyhow::Error> {
    log_subtitle("Atoms and basis sets");
    let atoms = read_atoms_and_basis_sets(report)?;
    atoms.log_output_display();
    dfcoef_output!("");

    let header = if params.no_scf {
        None
    } else {
        log_subtitle("SCF header information");
        validate_eigpri(report)?;
        let header = read_header_info(report)?;
        header.log_output_display();
        dfcoef_output!("");
        Some(header)
    };

    let catalog = read_basis_catalog(report)?;
    if catalog.orbital_counts.total.is_none() {
        dfcoef_warn!("The number of orbitals in each symmetry is not printed or has overflowed.");
    }
    log::debug!("Basis-function groups: {}", catalog.len());

    let mut mos = read_mo_coefficients(report, &catalog, params.threshold)?;
    if mos.is_empty() {
        dfcoef_warn!(
            "No molecular-orbital coefficients are found. Is `*PRIVEC` with `.VECPRI` set in the \
            `**ANALYZE` section of the DIRAC input?"
        );
    }
    if let Some(header) = header.as_ref() {
        mos.assign_irrep_indices(&header.eigenvalues);
    }
    if !params.no_sort {
        mos.sort_by_energy();
    }

    if params.debug {
        log_subtitle("Normalisation diagnostics");
        for mo in mos.electronic.iter().chain(mos.positronic.iter()) {
            dfcoef_output!(
                "{} no. {} {}: normalisation constant {:.dp$}, sum of coefficients {:.dp$}",
                if mo.is_electronic {
                    "Electronic"
                } else {
                    "Positronic"
                },
                mo.number,
                mo.symmetry,
                mo.norm_const_sum,
                mo.normalisation(),
                dp = params.decimal_places
            );
        }
        dfcoef_output!("");
    }

    SummaryResult::builder()
        .parameters(params.clone())
        .atoms(atoms)
        .header(header)
        .catalog(catalog)
        .mos(mos)
        .build()
        .map_err(|err| format_err!(err))
}
