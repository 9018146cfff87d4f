//! Basis-function bookkeeping for DIRAC symmetry orbitals.
//!
//! DIRAC prints, for every component and every symmetry, how many functions of each Gaussian type
//! sit on each atom. The same element label may denote several physical atoms, so each
//! contiguous run of declarations is grouped into a [`BasisFunctionGroup`] whose starting index
//! identifies the atom occurrence within its (component, symmetry, element) bucket.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::report::ReportError;

mod catalog_reader;

pub use catalog_reader::read_basis_catalog;

#[cfg(test)]
#[path = "basis_tests.rs"]
mod basis_tests;

/// Subshell labels in increasing order of angular momentum.
pub static SUBSHELL_LABELS: [char; 21] = [
    's', 'p', 'd', 'f', 'g', 'h', 'i', 'k', 'l', 'm', 'n', 'o', 'q', 'r', 't', 'u', 'v', 'w', 'x',
    'y', 'z',
];

/// Angular momenta of subshell labels.
pub static SUBSHELL_INDICES: phf::Map<char, u32> = phf_map! {
    's' => 0,
    'p' => 1,
    'd' => 2,
    'f' => 3,
    'g' => 4,
    'h' => 5,
    'i' => 6,
    'k' => 7,
    'l' => 8,
    'm' => 9,
    'n' => 10,
    'o' => 11,
    'q' => 12,
    'r' => 13,
    't' => 14,
    'u' => 15,
    'v' => 16,
    'w' => 17,
    'x' => 18,
    'y' => 19,
    'z' => 20,
};

lazy_static! {
    /// Gaussian-type labels of every subshell, in the order DIRAC prints them.
    static ref GTO_LABELS: Vec<Vec<String>> = SUBSHELL_LABELS
        .iter()
        .enumerate()
        .map(|(l, &subshell)| gto_labels(subshell, l as u32))
        .collect();
}

/// Generates the Cartesian Gaussian-type labels of a subshell.
///
/// Labels are ordered by decreasing power of $`x`$ and then decreasing power of $`y`$. Up to
/// $`f`$ the powers are spelt out (`dxy`, `fxxz`), above that they are written as digits
/// (`g400`, `g310`).
fn gto_labels(subshell: char, l: u32) -> Vec<String> {
    if l == 0 {
        return vec![subshell.to_string()];
    }
    (0..=l)
        .rev()
        .flat_map(|nx| (0..=(l - nx)).rev().map(move |ny| (nx, ny, l - nx - ny)))
        .map(|(nx, ny, nz)| {
            if l <= 3 {
                format!(
                    "{subshell}{}{}{}",
                    "x".repeat(nx as usize),
                    "y".repeat(ny as usize),
                    "z".repeat(nz as usize)
                )
            } else {
                format!("{subshell}{nx}{ny}{nz}")
            }
        })
        .collect()
}

/// Returns the position of a Gaussian-type label within its subshell, if the label is known.
pub fn gto_position(subshell: char, gto: &str) -> Option<usize> {
    let l = *SUBSHELL_INDICES.get(&subshell)? as usize;
    GTO_LABELS.get(l)?.iter().position(|label| label == gto)
}

// ==================
// Struct definitions
// ==================

/// An enumerated type for the two components of a four-component spinor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    /// Variant for the large component.
    Large,

    /// Variant for the small component.
    Small,
}

impl Component {
    /// Parses the one-letter component flag printed in coefficient rows.
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'L' => Some(Component::Large),
            'S' => Some(Component::Small),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Large => write!(f, "large"),
            Component::Small => write!(f, "small"),
        }
    }
}

/// The key of a bucket of basis-function groups.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    /// The spinor component.
    pub component: Component,

    /// The symmetry label, *e.g.* `Ag`.
    pub symmetry: String,

    /// The element label, *e.g.* `Cl`.
    pub element: String,
}

impl GroupKey {
    /// Constructs a new bucket key.
    pub fn new(component: Component, symmetry: &str, element: &str) -> Self {
        Self {
            component,
            symmetry: symmetry.to_string(),
            element: element.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.component, self.symmetry, self.element)
    }
}

/// A contiguous run of basis functions on one physical atom occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisFunctionGroup {
    /// The spinor component of the functions.
    pub component: Component,

    /// The symmetry label of the functions.
    pub symmetry: String,

    /// The element label of the atom.
    pub element: String,

    /// The 1-based occurrence of this atom within its bucket.
    pub occurrence: usize,

    /// The 1-based starting index of this group within its bucket.
    pub start_index: usize,

    /// The number of symmetry-equivalent atoms combined into each function.
    pub multiplicity: usize,

    /// Remaining function counts keyed by Gaussian-type label.
    functions: IndexMap<String, usize>,
}

impl BasisFunctionGroup {
    fn new(key: &GroupKey, occurrence: usize, start_index: usize, multiplicity: usize) -> Self {
        Self {
            component: key.component,
            symmetry: key.symmetry.clone(),
            element: key.element.clone(),
            occurrence,
            start_index,
            multiplicity,
            functions: IndexMap::new(),
        }
    }

    /// Returns the bucket key of this group.
    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.component, &self.symmetry, &self.element)
    }

    /// Returns the function counts keyed by Gaussian-type label.
    pub fn functions(&self) -> &IndexMap<String, usize> {
        &self.functions
    }

    fn add_functions(&mut self, gto: &str, count: usize) {
        *self.functions.entry(gto.to_string()).or_insert(0) += count;
    }

    /// Returns the number of functions of a Gaussian type not yet consumed, or `None` if the
    /// group has no such functions at all.
    pub fn remaining(&self, gto: &str) -> Option<usize> {
        self.functions.get(gto).copied()
    }

    /// Returns the total number of functions not yet consumed.
    pub fn total_remaining(&self) -> usize {
        self.functions.values().sum()
    }

    /// Consumes one function of a Gaussian type.
    ///
    /// # Errors
    ///
    /// Errors if the group has no functions of this type, or if all of them have already been
    /// consumed.
    pub fn decrement(&mut self, gto: &str) -> Result<(), ReportError> {
        match self.functions.get_mut(gto) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(())
            }
            Some(_) => Err(ReportError::Consistency(format!(
                "Too many `{gto}` coefficients for atom {} (start index {}) in {} {}.",
                self.element, self.start_index, self.component, self.symmetry
            ))),
            None => Err(ReportError::Consistency(format!(
                "Function type `{gto}` is not declared for atom {} (start index {}) in {} {}. \
                Declared types: {:?}.",
                self.element,
                self.start_index,
                self.component,
                self.symmetry,
                self.functions.keys().collect::<Vec<_>>()
            ))),
        }
    }
}

/// Counts printed in the `Number of ... orbitals in each symmetry` table.
///
/// A count is `None` when DIRAC overflowed the field with asterisks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrbitalCounts {
    /// Total number of orbitals.
    pub total: Option<usize>,

    /// Number of large-component orbitals.
    pub large: Option<usize>,

    /// Number of small-component orbitals.
    pub small: Option<usize>,
}

/// The catalog of basis-function groups read from the `Symmetry Orbitals` section.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BasisCatalog {
    /// Groups keyed by bucket and then by starting index.
    buckets: IndexMap<GroupKey, IndexMap<usize, BasisFunctionGroup>>,

    /// The orbital counts of the section header.
    pub orbital_counts: OrbitalCounts,
}

impl BasisCatalog {
    /// Returns the group of a bucket with a given starting index.
    ///
    /// # Errors
    ///
    /// Errors if no such group has been catalogued.
    pub fn get(&self, key: &GroupKey, start_index: usize) -> Result<&BasisFunctionGroup, ReportError> {
        self.buckets
            .get(key)
            .and_then(|groups| groups.get(&start_index))
            .ok_or_else(|| {
                ReportError::Consistency(format!(
                    "Start index {start_index} is not found for {key} in the Symmetry Orbitals \
                    section. The coefficient block and the basis declarations disagree."
                ))
            })
    }

    /// Returns all groups of a bucket ordered by starting index.
    pub fn bucket(&self, key: &GroupKey) -> Option<&IndexMap<usize, BasisFunctionGroup>> {
        self.buckets.get(key)
    }

    /// Returns an iterator over all bucket keys.
    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.buckets.keys()
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.buckets.values().map(IndexMap::len).sum()
    }

    /// Returns `true` if no groups have been catalogued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the starting index a new group of a bucket should receive.
    fn next_start_index(&self, key: &GroupKey) -> usize {
        self.buckets
            .get(key)
            .and_then(|groups| groups.last())
            .map(|(start, group)| start + group.multiplicity)
            .unwrap_or(1)
    }

    /// Opens a new group in a bucket and returns its starting index.
    fn open_group(&mut self, key: &GroupKey, multiplicity: usize) -> usize {
        let start_index = self.next_start_index(key);
        let groups = self.buckets.entry(key.clone()).or_default();
        let occurrence = groups.len() + 1;
        groups.insert(
            start_index,
            BasisFunctionGroup::new(key, occurrence, start_index, multiplicity),
        );
        log::debug!("Opened basis-function group {key} #{occurrence} at start index {start_index}.");
        start_index
    }

    /// Adds functions to an existing group.
    fn add_functions(
        &mut self,
        key: &GroupKey,
        start_index: usize,
        gto: &str,
        count: usize,
    ) -> Result<(), ReportError> {
        self.buckets
            .get_mut(key)
            .and_then(|groups| groups.get_mut(&start_index))
            .ok_or_else(|| {
                ReportError::Consistency(format!(
                    "No open basis-function group for {key} at start index {start_index}."
                ))
            })?
            .add_functions(gto, count);
        Ok(())
    }
}

// ----------------
// Boundary tracking
// ----------------

/// One declared atomic-orbital type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtomicOrbital {
    /// The element label.
    pub element: String,

    /// The subshell letter.
    pub subshell: char,

    /// The Gaussian-type label.
    pub gto: String,
}

impl AtomicOrbital {
    /// Returns `true` if `self` comes after `other` in canonical subshell order.
    ///
    /// Labels that cannot be ranked never compare as out of order.
    fn comes_after(&self, other: &AtomicOrbital) -> bool {
        let (Some(l_self), Some(l_other)) = (
            SUBSHELL_INDICES.get(&self.subshell),
            SUBSHELL_INDICES.get(&other.subshell),
        ) else {
            return false;
        };
        if l_self != l_other {
            return l_self > l_other;
        }
        match (
            gto_position(self.subshell, &self.gto),
            gto_position(other.subshell, &other.gto),
        ) {
            (Some(p_self), Some(p_other)) => p_self > p_other,
            _ => false,
        }
    }
}

/// Transient state detecting where one atom's declarations end and the next atom's begin.
#[derive(Clone, Debug, Default)]
pub struct AtomOrbitalCursor {
    /// The previously declared orbital type.
    previous: Option<AtomicOrbital>,

    /// Function labels already declared for the atom occurrence in progress.
    seen_labels: HashSet<String>,
}

impl AtomOrbitalCursor {
    /// Creates a cursor with no atom in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the atom in progress so that the next declaration opens a new occurrence.
    pub fn reset(&mut self) {
        self.previous = None;
        self.seen_labels.clear();
    }

    /// Records a declaration and returns `true` if it belongs to a new atom occurrence.
    ///
    /// A new occurrence starts when the element label changes, when `function_label` has
    /// already been declared for the occurrence in progress, or when the subshell order goes
    /// backwards (*e.g.* `p` followed by `s`).
    pub fn advance(&mut self, orbital: AtomicOrbital, function_label: &str) -> bool {
        let boundary = match &self.previous {
            None => true,
            Some(prev) => {
                prev.element != orbital.element
                    || self.seen_labels.contains(function_label)
                    || prev.comes_after(&orbital)
            }
        };
        if boundary {
            self.seen_labels.clear();
        }
        self.seen_labels.insert(function_label.to_string());
        self.previous = Some(orbital);
        boundary
    }
}
