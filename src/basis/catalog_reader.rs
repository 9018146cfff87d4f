use std::io::{BufRead, Seek};

use crate::basis::{
    gto_position, AtomOrbitalCursor, AtomicOrbital, BasisCatalog, Component, GroupKey,
    SUBSHELL_INDICES,
};
use crate::report::{split_words, DiracReport, ReportError};

/// Where the reader is within the `Symmetry Orbitals` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CatalogStage {
    /// Before the `Symmetry Orbitals` banner.
    Searching,

    /// After the banner, before the orbital-count table.
    Banner,

    /// Inside the orbital-count table.
    Counts,

    /// Inside the per-symmetry declarations.
    Declarations,
}

/// One parsed `<count> functions: <label> <multiplicity chain>` line.
#[derive(Debug)]
struct Declaration {
    count: usize,
    orbital: AtomicOrbital,
    plabel: String,
    multiplicity: usize,
}

/// Reads the `Symmetry Orbitals` section of a DIRAC report into a [`BasisCatalog`].
///
/// # Errors
///
/// Errors with [`ReportError::MissingSection`] if the section is absent and with
/// [`ReportError::FormatMismatch`] if a declaration line is malformed.
pub fn read_basis_catalog<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<BasisCatalog, ReportError> {
    let mut catalog = BasisCatalog::default();
    let mut stage = CatalogStage::Searching;
    let mut component: Option<Component> = None;
    let mut symmetry: Option<String> = None;
    let mut cursor = AtomOrbitalCursor::new();
    let mut open_start: Option<usize> = None;

    for line in report.scan()? {
        let line = line?;
        let words = split_words(&line);
        match stage {
            CatalogStage::Searching => {
                if words.len() == 2 && words[0] == "Symmetry" && words[1] == "Orbitals" {
                    log::debug!("Found the Symmetry Orbitals section.");
                    stage = CatalogStage::Banner;
                }
                continue;
            }
            CatalogStage::Banner => {
                if is_count_header(&words) {
                    catalog.orbital_counts.total = sum_counts(&words[6..]);
                    stage = CatalogStage::Counts;
                    continue;
                }
                if !line.contains("component functions") {
                    continue;
                }
                // No count table has been printed.
                stage = CatalogStage::Declarations;
            }
            CatalogStage::Counts => {
                if line.contains("Number of") {
                    if words.len() > 7 {
                        if line.contains("large") {
                            catalog.orbital_counts.large = sum_counts(&words[7..]);
                        } else if line.contains("small") {
                            catalog.orbital_counts.small = sum_counts(&words[7..]);
                        }
                    }
                    continue;
                }
                stage = CatalogStage::Declarations;
                continue;
            }
            CatalogStage::Declarations => {}
        }

        if line.contains("component functions") {
            component = if line.contains("Large") {
                Some(Component::Large)
            } else if line.contains("Small") {
                Some(Component::Small)
            } else {
                return Err(ReportError::FormatMismatch(format!(
                    "Unknown component in the Symmetry Orbitals section: `{}`.",
                    line.trim()
                )));
            };
            cursor.reset();
            open_start = None;
        } else if line.contains("Symmetry") {
            let label = words.get(1).ok_or_else(|| {
                ReportError::FormatMismatch(format!(
                    "Symmetry header without a label in the Symmetry Orbitals section: `{}`.",
                    line.trim()
                ))
            })?;
            let label = label.split('(').next().unwrap_or(label);
            symmetry = Some(label.to_string());
            cursor.reset();
            open_start = None;
        } else if line.contains("functions") {
            let (Some(component), Some(symmetry)) = (component, symmetry.as_deref()) else {
                return Err(ReportError::FormatMismatch(format!(
                    "Function declaration before any component or symmetry header: `{}`.",
                    line.trim()
                )));
            };
            let declaration = parse_declaration(&line, &words)?;
            let key = GroupKey::new(component, symmetry, &declaration.orbital.element);
            let function_label = format!("{symmetry}{}", declaration.plabel);
            let boundary = cursor.advance(declaration.orbital.clone(), &function_label);
            let start_index = match open_start {
                Some(start) if !boundary => start,
                _ => catalog.open_group(&key, declaration.multiplicity),
            };
            open_start = Some(start_index);
            catalog.add_functions(&key, start_index, &declaration.orbital.gto, declaration.count)?;
        } else if is_separator(&line) {
            break;
        }
    }

    if stage == CatalogStage::Searching {
        return Err(ReportError::MissingSection(
            "The \"Symmetry Orbitals\" section is not in the DIRAC output file. It is required \
            to identify basis functions. Perhaps the .PRINT option was set to a negative number \
            in one of the sections of the DIRAC input?"
                .to_string(),
        ));
    }
    log::debug!("Catalogued {} basis-function groups.", catalog.len());
    Ok(catalog)
}

fn is_count_header(words: &[&str]) -> bool {
    words.len() >= 6 && words[..6] == ["Number", "of", "orbitals", "in", "each", "symmetry:"]
}

/// Sums the integers of a count table row; `None` if any of them overflowed.
fn sum_counts(words: &[&str]) -> Option<usize> {
    words
        .iter()
        .map(|word| word.parse::<usize>().ok())
        .sum::<Option<usize>>()
}

/// Returns `true` for a line made only of asterisks and spaces with at least one asterisk.
fn is_separator(line: &str) -> bool {
    line.contains('*') && line.chars().all(|c| c == '*' || c == ' ')
}

/// Width of a function label laid out in columns, *e.g.* `Cm g400`.
const LABEL_WIDTH: usize = 7;

/// Parses a line such as `  10 functions:    Cm g400 1+2+3+4`.
///
/// A label filling [`LABEL_WIDTH`] columns is read by position, since a long Gaussian-type
/// label can run into the multiplicity chain. A shorter label, *e.g.* `C s`, is read as an
/// element word followed by a Gaussian-type word.
fn parse_declaration(line: &str, words: &[&str]) -> Result<Declaration, ReportError> {
    let count = words
        .first()
        .and_then(|word| word.parse::<usize>().ok())
        .ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "The function count of `{}` is not an integer.",
                line.trim()
            ))
        })?;
    let after = line
        .find("functions:")
        .map(|idx| line[idx + "functions:".len()..].trim())
        .ok_or_else(|| {
            ReportError::FormatMismatch(format!(
                "Expected `functions:` in the declaration `{}`.",
                line.trim()
            ))
        })?;
    let chars = after.chars().collect::<Vec<_>>();
    let (element, gto, chain) = if chars.len() >= LABEL_WIDTH && chars[2] == ' ' {
        (
            chars[..2].iter().collect::<String>().trim().to_string(),
            chars[3..LABEL_WIDTH].iter().collect::<String>().trim().to_string(),
            chars[LABEL_WIDTH..].iter().collect::<String>(),
        )
    } else {
        let label_words = split_words(after);
        match label_words.as_slice() {
            [element, gto, rest @ ..] => (element.to_string(), gto.to_string(), rest.join(" ")),
            _ => {
                return Err(ReportError::FormatMismatch(format!(
                    "The function label of `{}` is too short.",
                    line.trim()
                )))
            }
        }
    };
    let subshell = gto.chars().next().ok_or_else(|| {
        ReportError::FormatMismatch(format!(
            "The Gaussian type of `{}` is empty.",
            line.trim()
        ))
    })?;
    if !SUBSHELL_INDICES.contains_key(&subshell) || gto_position(subshell, &gto).is_none() {
        log::warn!("Gaussian type `{gto}` cannot be ranked; its ordering is not checked.");
    }
    let multiplicity = chain.chars().filter(|&c| c == '+' || c == '-').count() + 1;
    Ok(Declaration {
        count,
        orbital: AtomicOrbital {
            element: element.clone(),
            subshell,
            gto: gto.clone(),
        },
        plabel: format!("{element}{gto}"),
        multiplicity,
    })
}
