//! The molecular-orbital coefficient stream of the `Vector print` section.

use std::fmt;
use std::io::{BufRead, Seek};

use indexmap::IndexMap;

use crate::basis::{BasisCatalog, BasisFunctionGroup, GroupKey};
use crate::mo::{MoCollection, MoRecord};
use crate::report::{split_words, DiracReport, ReportError};

pub mod row;

use row::{decode_row, is_coefficient_row, CoefficientRow};

#[cfg(test)]
#[path = "privec_tests.rs"]
mod privec_tests;

// ==================
// Struct definitions
// ==================

/// An enumerated type for the stages of reading the `Vector print` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorPrintStage {
    /// Before the `Vector print` banner.
    Init,

    /// After the banner, before the first fermion irrep.
    VectorPrint,

    /// Between orbitals.
    WaitEndReadingCoef,

    /// After an orbital header, before its first coefficient row.
    MoCoef,

    /// Inside the coefficient rows of an orbital.
    ReadingCoef,

    /// After the section.
    End,
}

impl fmt::Display for VectorPrintStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VectorPrintStage::Init => "INIT",
            VectorPrintStage::VectorPrint => "VECTOR_PRINT",
            VectorPrintStage::WaitEndReadingCoef => "WAIT_END_READING_COEF",
            VectorPrintStage::MoCoef => "MO_COEF",
            VectorPrintStage::ReadingCoef => "READING_COEF",
            VectorPrintStage::End => "END",
        };
        write!(f, "{name}")
    }
}

/// The header of one orbital, *e.g.* `* Electronic eigenvalue no. 22: -2.8417809384721`.
#[derive(Clone, Debug, PartialEq)]
pub struct MoHeader {
    /// Whether the orbital is electronic rather than positronic.
    pub is_electronic: bool,

    /// The sequence number, or `None` if it overflowed.
    pub number: Option<usize>,

    /// The orbital energy.
    pub energy: f64,
}

/// Returns `true` for `****** Vector print ******`.
fn is_vector_print_banner(words: &[&str]) -> bool {
    words.len() >= 4 && words[1] == "Vector" && words[2] == "print"
}

/// Returns the irrep of `Fermion ircop E1g`.
fn fermion_ircop<'a>(words: &[&'a str]) -> Option<&'a str> {
    (words.len() == 3 && words[0] == "Fermion" && words[1] == "ircop").then(|| words[2])
}

/// Parses an orbital header.
///
/// Returns `Ok(None)` if the words are not those of an orbital header. The number and the colon
/// may be fused with `no.` (`no.122:`); a number overflowing into asterisks yields `None`.
///
/// # Errors
///
/// Errors with [`ReportError::FormatMismatch`] if the energy cannot be read.
pub fn parse_mo_header(words: &[&str]) -> Result<Option<MoHeader>, ReportError> {
    if words.len() < 5
        || !matches!(words[1], "Electronic" | "Positronic")
        || words[2] != "eigenvalue"
        || !words[3].contains("no.")
    {
        return Ok(None);
    }
    let is_electronic = words[1] == "Electronic";
    let number_word = words[words.len() - 2];
    let number = number_word
        .strip_suffix(':')
        .unwrap_or(number_word)
        .replace("no.", "")
        .parse::<usize>()
        .ok();
    let energy_word = words[words.len() - 1];
    let energy = energy_word.parse::<f64>().map_err(|_| {
        ReportError::FormatMismatch(format!(
            "Cannot read the orbital energy `{energy_word}` of `{}`.",
            words.join(" ")
        ))
    })?;
    Ok(Some(MoHeader {
        is_electronic,
        number,
        energy,
    }))
}

/// Resolves coefficient rows to basis-function groups within one orbital.
#[derive(Debug, Default)]
struct GroupResolver {
    /// The group in use, with its remaining function counts.
    current: Option<BasisFunctionGroup>,

    /// The last group taken from each bucket.
    last_used: IndexMap<GroupKey, (usize, usize)>,
}

impl GroupResolver {
    fn reset(&mut self) {
        self.current = None;
        self.last_used.clear();
    }

    /// Returns the group a row belongs to, consuming one of its functions.
    ///
    /// The next group of a bucket is taken when the row's bucket differs from the group in use
    /// or when the group in use has no functions of the row's type left.
    fn resolve(
        &mut self,
        catalog: &BasisCatalog,
        row: &CoefficientRow,
    ) -> Result<&BasisFunctionGroup, ReportError> {
        let key = GroupKey::new(row.component, &row.symmetry, &row.element);
        let exhausted = match &self.current {
            Some(group) => group.key() != key || group.remaining(&row.gto).unwrap_or(0) == 0,
            None => true,
        };
        if exhausted {
            let start_index = self
                .last_used
                .get(&key)
                .map(|(start, multiplicity)| start + multiplicity)
                .unwrap_or(1);
            let group = catalog.get(&key, start_index)?.clone();
            self.last_used
                .insert(key, (group.start_index, group.multiplicity));
            self.current = Some(group);
        }
        let group = self.current.as_mut().ok_or_else(|| {
            ReportError::Consistency("No basis-function group is in use.".to_string())
        })?;
        group.decrement(&row.gto)?;
        Ok(&*group)
    }
}

/// The state machine reading the `Vector print` section.
#[derive(Debug)]
pub struct MoCoefficientReader<'c> {
    /// The basis-function catalog of the report.
    catalog: &'c BasisCatalog,

    /// The percentage threshold below which contributions are dropped.
    threshold: f64,

    /// The current stage.
    stage: VectorPrintStage,

    /// The current fermion irrep.
    symmetry: String,

    /// The sequence number of the last orbital header.
    previous_number: usize,

    /// The orbital being read.
    current: Option<MoRecord>,

    /// Row-to-group resolution state of the orbital being read.
    resolver: GroupResolver,

    /// The finalised orbitals.
    collection: MoCollection,
}

impl<'c> MoCoefficientReader<'c> {
    /// Creates a reader resolving rows against `catalog` and dropping contributions below
    /// `threshold` percent.
    pub fn new(catalog: &'c BasisCatalog, threshold: f64) -> Self {
        Self {
            catalog,
            threshold,
            stage: VectorPrintStage::Init,
            symmetry: String::new(),
            previous_number: 0,
            current: None,
            resolver: GroupResolver::default(),
            collection: MoCollection::default(),
        }
    }

    /// Returns the current stage.
    pub fn stage(&self) -> VectorPrintStage {
        self.stage
    }

    fn transition(&mut self, stage: VectorPrintStage) {
        log::trace!("Vector print stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Feeds one line of the report.
    ///
    /// # Errors
    ///
    /// Errors if an orbital header or a coefficient row is malformed, or if a row cannot be
    /// resolved against the catalog.
    pub fn feed(&mut self, line: &str) -> Result<(), ReportError> {
        if self.stage == VectorPrintStage::End {
            return Ok(());
        }
        let words = split_words(line);
        if words.len() <= 1 {
            if self.stage == VectorPrintStage::ReadingCoef {
                self.finish_mo();
                self.transition(VectorPrintStage::WaitEndReadingCoef);
            }
            return Ok(());
        }

        match self.stage {
            VectorPrintStage::Init => {
                if is_vector_print_banner(&words) {
                    self.transition(VectorPrintStage::VectorPrint);
                }
            }
            VectorPrintStage::VectorPrint => {
                if let Some(symmetry) = fermion_ircop(&words) {
                    self.symmetry = symmetry.to_string();
                    self.transition(VectorPrintStage::WaitEndReadingCoef);
                } else if let Some(header) = parse_mo_header(&words)? {
                    self.start_mo(header);
                    self.transition(VectorPrintStage::MoCoef);
                }
            }
            VectorPrintStage::WaitEndReadingCoef => {
                if let Some(symmetry) = fermion_ircop(&words) {
                    self.symmetry = symmetry.to_string();
                } else if let Some(header) = parse_mo_header(&words)? {
                    self.start_mo(header);
                    self.transition(VectorPrintStage::MoCoef);
                } else {
                    self.transition(VectorPrintStage::End);
                }
            }
            VectorPrintStage::MoCoef => {
                if is_coefficient_row(&words) {
                    self.add_row(line)?;
                    self.transition(VectorPrintStage::ReadingCoef);
                }
            }
            VectorPrintStage::ReadingCoef => {
                if is_coefficient_row(&words) {
                    self.add_row(line)?;
                }
            }
            VectorPrintStage::End => {}
        }
        Ok(())
    }

    fn start_mo(&mut self, header: MoHeader) {
        let number = header.number.unwrap_or(self.previous_number + 1);
        self.previous_number = number;
        self.current = Some(MoRecord::new(
            header.is_electronic,
            number,
            header.energy,
            &self.symmetry,
        ));
        self.resolver.reset();
    }

    fn add_row(&mut self, line: &str) -> Result<(), ReportError> {
        let row = decode_row(line)?;
        let group = self.resolver.resolve(self.catalog, &row)?;
        let (start_index, multiplicity) = (group.start_index, group.multiplicity);
        let record = self.current.as_mut().ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "Coefficient row outside an orbital: `{}`.",
                line.trim()
            ))
        })?;
        record.add(
            row.vector_num,
            &row.function_label(),
            row.value(),
            start_index,
            multiplicity,
        );
        Ok(())
    }

    fn finish_mo(&mut self) {
        if let Some(mut record) = self.current.take() {
            record.finalise(self.threshold);
            log::debug!("End of reading orbital {} ({}).", record.number, record.symmetry);
            self.collection.push(record);
        }
    }

    /// Completes reading, finalising an orbital still in progress, and returns all orbitals in
    /// reading order.
    pub fn finish(mut self) -> MoCollection {
        if self.stage == VectorPrintStage::ReadingCoef {
            self.finish_mo();
        }
        self.collection
    }
}

/// Reads all molecular orbitals of the `Vector print` section.
///
/// Orbitals are returned in reading order; see [`MoCollection::sort_by_energy`].
///
/// # Errors
///
/// Errors if the section is malformed or inconsistent with `catalog`.
pub fn read_mo_coefficients<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
    catalog: &BasisCatalog,
    threshold: f64,
) -> Result<MoCollection, ReportError> {
    let mut reader = MoCoefficientReader::new(catalog, threshold);
    for line in report.scan()? {
        reader.feed(&line?)?;
        if reader.stage() == VectorPrintStage::End {
            break;
        }
    }
    let collection = reader.finish();
    log::debug!(
        "Read {} electronic and {} positronic orbitals.",
        collection.electronic.len(),
        collection.positronic.len()
    );
    Ok(collection)
}
