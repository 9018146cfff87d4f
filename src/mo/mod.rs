//! Per-orbital aggregation of basis-function contributions.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use approx::abs_diff_eq;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::header::Eigenvalues;


/// Absolute tolerance for matching orbital energies against the eigenvalue printout.
pub const ENERGY_MATCH_THRESHOLD: f64 = 1e-6;

// ==================
// Struct definitions
// ==================

/// The contribution of one basis function to one molecular orbital.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// The serial number of the first coefficient row contributing to this function.
    pub vector_num: usize,

    /// The function label, *i.e.* symmetry, element and Gaussian type, *e.g.* `AgCs`.
    pub function_label: String,

    /// The accumulated squared magnitude of all coefficients of this function.
    pub value: f64,

    /// The starting index of the basis-function group of this function.
    pub start_index: usize,

    /// The multiplicity of the basis-function group of this function.
    pub multiplicity: usize,

    /// Whether the label must be suffixed with the starting index to be unambiguous.
    pub need_identifier: bool,
}

impl Coefficient {
    /// Returns the contribution of this function to the normalisation constant.
    pub fn contribution(&self) -> f64 {
        self.value * self.multiplicity as f64
    }

    /// Returns the label to print, *e.g.* `AgCs` or, if disambiguation is needed, `AgCs(3)`.
    pub fn display_label(&self) -> String {
        if self.need_identifier {
            format!("{}({})", self.function_label, self.start_index)
        } else {
            self.function_label.clone()
        }
    }
}

/// One molecular orbital with its aggregated coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoRecord {
    /// Whether the orbital is electronic rather than positronic.
    pub is_electronic: bool,

    /// The sequence number of the orbital.
    pub number: usize,

    /// The orbital energy.
    pub energy: f64,

    /// The fermion irrep of the orbital.
    pub symmetry: String,

    /// The 1-based position of the orbital energy within its symmetry in the eigenvalue
    /// printout, if it could be matched.
    pub irrep_index: Option<usize>,

    /// The sum of all contributions.
    pub norm_const_sum: f64,

    /// All accumulated coefficients keyed by function label and starting index.
    coefficients: IndexMap<(String, usize), Coefficient>,

    /// The coefficients retained by [`Self::finalise`], in printing order.
    retained: Vec<Coefficient>,
}

impl MoRecord {
    /// Starts an orbital with no coefficients.
    pub fn new(is_electronic: bool, number: usize, energy: f64, symmetry: &str) -> Self {
        Self {
            is_electronic,
            number,
            energy,
            symmetry: symmetry.to_string(),
            irrep_index: None,
            norm_const_sum: 0.0,
            coefficients: IndexMap::new(),
            retained: Vec::new(),
        }
    }

    /// Accumulates one coefficient row.
    ///
    /// Rows of the same function and group, *e.g.* the large and small components, are summed.
    pub fn add(
        &mut self,
        vector_num: usize,
        function_label: &str,
        value: f64,
        start_index: usize,
        multiplicity: usize,
    ) {
        self.norm_const_sum += value * multiplicity as f64;
        self.coefficients
            .entry((function_label.to_string(), start_index))
            .and_modify(|coefficient| coefficient.value += value)
            .or_insert_with(|| Coefficient {
                vector_num,
                function_label: function_label.to_string(),
                value,
                start_index,
                multiplicity,
                need_identifier: false,
            });
    }

    /// Returns all accumulated coefficients.
    pub fn coefficients(&self) -> impl Iterator<Item = &Coefficient> {
        self.coefficients.values()
    }

    /// Returns the coefficients retained by [`Self::finalise`].
    pub fn retained(&self) -> &[Coefficient] {
        &self.retained
    }

    /// Returns the percentage contribution of one instance of a coefficient's function.
    pub fn percentage(&self, coefficient: &Coefficient) -> f64 {
        if self.norm_const_sum == 0.0 {
            0.0
        } else {
            coefficient.value * 100.0 / self.norm_const_sum
        }
    }

    /// Returns the sum of all contributions divided by the normalisation constant.
    pub fn normalisation(&self) -> f64 {
        if self.norm_const_sum == 0.0 {
            return 0.0;
        }
        self.coefficients
            .values()
            .map(Coefficient::contribution)
            .sum::<f64>()
            / self.norm_const_sum
    }

    /// Filters and orders the accumulated coefficients.
    ///
    /// Coefficients whose percentage falls below `threshold` in magnitude are dropped. The rest
    /// are ordered by decreasing value and then by increasing vector serial number. A label
    /// shared by several groups is marked for disambiguation.
    pub fn finalise(&mut self, threshold: f64) {
        if self.norm_const_sum == 0.0 {
            log::warn!(
                "Orbital {} ({}) has a vanishing normalisation constant; all of its \
                contributions are reported as zero.",
                self.number,
                self.symmetry
            );
        }

        let mut starts_per_label: HashMap<&str, HashSet<usize>> = HashMap::new();
        for (label, start) in self.coefficients.keys() {
            starts_per_label.entry(label.as_str()).or_default().insert(*start);
        }
        let ambiguous = starts_per_label
            .into_iter()
            .filter(|(_, starts)| starts.len() > 1)
            .map(|(label, _)| label.to_string())
            .collect::<HashSet<_>>();
        for coefficient in self.coefficients.values_mut() {
            coefficient.need_identifier = ambiguous.contains(&coefficient.function_label);
        }

        let mut retained = self
            .coefficients
            .values()
            .filter(|coefficient| self.percentage(coefficient).abs() >= threshold)
            .cloned()
            .collect::<Vec<_>>();
        retained.sort_by(|a, b| compare_coefficients(a, b));
        self.retained = retained;
        log::debug!(
            "Orbital {} ({}): normalisation constant {}, coefficient sum {}, {} of {} \
            function(s) retained.",
            self.number,
            self.symmetry,
            self.norm_const_sum,
            self.normalisation(),
            self.retained.len(),
            self.coefficients.len()
        );
    }
}

/// Orders coefficients by decreasing value, breaking ties by increasing vector serial number.
fn compare_coefficients(a: &Coefficient, b: &Coefficient) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.vector_num.cmp(&b.vector_num))
}

impl fmt::Display for MoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} no. {} {} {}",
            if self.is_electronic {
                "Electronic"
            } else {
                "Positronic"
            },
            self.number,
            self.symmetry,
            self.energy
        )?;
        for coefficient in self.retained.iter() {
            writeln!(
                f,
                "  {:<11} {:>9.5} % (x{})",
                coefficient.display_label(),
                self.percentage(coefficient),
                coefficient.multiplicity
            )?;
        }
        Ok(())
    }
}

/// All molecular orbitals read from a report, partitioned into electronic and positronic ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoCollection {
    /// Electronic orbitals.
    pub electronic: Vec<MoRecord>,

    /// Positronic orbitals.
    pub positronic: Vec<MoRecord>,
}

impl MoCollection {
    /// Appends a finalised orbital to the appropriate partition.
    pub fn push(&mut self, record: MoRecord) {
        if record.is_electronic {
            self.electronic.push(record);
        } else {
            self.positronic.push(record);
        }
    }

    /// Returns the total number of orbitals.
    pub fn len(&self) -> usize {
        self.electronic.len() + self.positronic.len()
    }

    /// Returns `true` if no orbitals have been read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Orders each partition by increasing energy, keeping reading order among equal energies.
    pub fn sort_by_energy(&mut self) {
        self.electronic
            .sort_by(|a, b| a.energy.total_cmp(&b.energy));
        self.positronic
            .sort_by(|a, b| a.energy.total_cmp(&b.energy));
    }

    /// Matches electronic orbital energies against the eigenvalue printout.
    ///
    /// Each printed eigenvalue is claimed by at most one orbital, so degenerate Kramers pairs
    /// printed more than once receive consecutive indices.
    pub fn assign_irrep_indices(&mut self, eigenvalues: &Eigenvalues) {
        let mut claimed: HashMap<&str, Vec<bool>> = eigenvalues
            .energies
            .iter()
            .map(|(symmetry, energies)| (symmetry.as_str(), vec![false; energies.len()]))
            .collect();
        for record in self.electronic.iter_mut() {
            let (Some(energies), Some(used)) = (
                eigenvalues.energies.get(&record.symmetry),
                claimed.get_mut(record.symmetry.as_str()),
            ) else {
                continue;
            };
            record.irrep_index = energies
                .iter()
                .zip(used.iter_mut())
                .position(|(energy, used)| {
                    if !*used && abs_diff_eq!(*energy, record.energy, epsilon = ENERGY_MATCH_THRESHOLD) {
                        *used = true;
                        true
                    } else {
                        false
                    }
                })
                .map(|idx| idx + 1);
            if record.irrep_index.is_none() {
                log::warn!(
                    "Energy {} of electronic orbital {} ({}) does not match any printed \
                    eigenvalue.",
                    record.energy,
                    record.number,
                    record.symmetry
                );
            }
        }
    }
}
