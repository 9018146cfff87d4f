//! Fixed-width decoding of coefficient rows.
//!
//! DIRAC writes each row with `FORMAT(3X,I5,2X,A12,2X,4F14.10)`: a vector serial number, a
//! twelve-character label made of the component flag, the symmetry, the atom and the Gaussian
//! type, and the real and imaginary parts of the two spinor components.

use std::ops::Range;

use crate::basis::Component;
use crate::report::ReportError;

/// Offset of the component flag (`L` or `S`).
pub const COMPONENT_OFFSET: usize = 10;

/// Columns of the symmetry label.
pub const SYMMETRY_FIELD: Range<usize> = 12..15;

/// Columns of the atom label.
pub const ATOM_FIELD: Range<usize> = 15..18;

/// Columns of the Gaussian-type label.
pub const GTO_FIELD: Range<usize> = 18..22;

/// Offset of the first coefficient field.
pub const COEFFICIENT_OFFSET: usize = 24;

/// Width of each coefficient field.
pub const COEFFICIENT_WIDTH: usize = 14;

/// Number of coefficient fields.
pub const COEFFICIENT_FIELDS: usize = 4;

/// Minimum length of a coefficient row, up to the end of the last coefficient field.
pub const ROW_LENGTH: usize = COEFFICIENT_OFFSET + COEFFICIENT_FIELDS * COEFFICIENT_WIDTH;

/// Value substituted for a coefficient field that cannot be read.
pub const SENTINEL: f64 = -100.0;

/// One decoded coefficient row.
#[derive(Clone, Debug, PartialEq)]
pub struct CoefficientRow {
    /// The vector serial number.
    pub vector_num: usize,

    /// The spinor component.
    pub component: Component,

    /// The symmetry label, *e.g.* `Ag`.
    pub symmetry: String,

    /// The atom label, *e.g.* `Cm`.
    pub element: String,

    /// The Gaussian-type label, *e.g.* `g400`.
    pub gto: String,

    /// The four coefficient fields.
    pub fields: [f64; COEFFICIENT_FIELDS],
}

impl CoefficientRow {
    /// Returns the sum of squares of the four coefficient fields.
    pub fn value(&self) -> f64 {
        self.fields.iter().map(|x| x * x).sum()
    }

    /// Returns the function label, *e.g.* `AgCms`.
    pub fn function_label(&self) -> String {
        format!("{}{}{}", self.symmetry, self.element, self.gto)
    }
}

/// Returns `true` if the words of a line are those of a coefficient row: between five and nine
/// words with an unsigned integer first.
pub fn is_coefficient_row(words: &[&str]) -> bool {
    (5..=9).contains(&words.len())
        && words
            .first()
            .map_or(false, |word| word.bytes().all(|b| b.is_ascii_digit()))
}

fn field<'a>(line: &'a str, range: Range<usize>, name: &str) -> Result<&'a str, ReportError> {
    line.get(range.clone()).map(str::trim).ok_or_else(|| {
        ReportError::FormatMismatch(format!(
            "The {name} field (columns {}..{}) is missing from the coefficient row `{line}`.",
            range.start, range.end
        ))
    })
}

fn coefficient(line: &str, idx: usize) -> Result<f64, ReportError> {
    let start = COEFFICIENT_OFFSET + idx * COEFFICIENT_WIDTH;
    let end = start + COEFFICIENT_WIDTH;
    let text = field(line, start..end, "coefficient")?;
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => {
            log::warn!(
                "Coefficient field `{text}` cannot be read; it is replaced by {SENTINEL} in row \
                `{}`.",
                line.trim()
            );
            Ok(SENTINEL)
        }
    }
}

/// Decodes a coefficient row.
///
/// A coefficient field that is not a finite number, such as an overflow of asterisks, is
/// replaced by [`SENTINEL`] so that the anomaly stands out in the summary.
///
/// # Errors
///
/// Errors with [`ReportError::FormatMismatch`] if the row is too short, if its component flag is
/// neither `L` nor `S`, or if its serial number is not an integer.
pub fn decode_row(line: &str) -> Result<CoefficientRow, ReportError> {
    if line.len() < ROW_LENGTH {
        return Err(ReportError::FormatMismatch(format!(
            "The coefficient row `{line}` is {} columns long; at least {ROW_LENGTH} are needed \
            to hold all {COEFFICIENT_FIELDS} coefficient fields.",
            line.len()
        )));
    }
    let vector_num = line
        .split(' ')
        .find(|word| !word.is_empty())
        .and_then(|word| word.parse::<usize>().ok())
        .ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "The serial number of the coefficient row `{line}` is not an integer."
            ))
        })?;
    let flag = field(line, COMPONENT_OFFSET..COMPONENT_OFFSET + 1, "component")?;
    let component = flag
        .chars()
        .next()
        .and_then(Component::from_flag)
        .ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "Unknown component flag `{flag}` in the coefficient row `{line}`."
            ))
        })?;
    let symmetry = field(line, SYMMETRY_FIELD, "symmetry")?.to_string();
    let element = field(line, ATOM_FIELD, "atom")?.to_string();
    let gto = field(line, GTO_FIELD, "Gaussian type")?.to_string();
    let mut fields = [0.0; COEFFICIENT_FIELDS];
    for (idx, value) in fields.iter_mut().enumerate() {
        *value = coefficient(line, idx)?;
    }
    Ok(CoefficientRow {
        vector_num,
        component,
        symmetry,
        element,
        gto,
        fields,
    })
}
