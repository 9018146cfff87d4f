//! Settings recovered from the DIRAC input echoed in the report.

use std::io::{BufRead, Seek};

use lazy_static::lazy_static;
use regex::Regex;

use crate::report::input_echo::{
    input_words, is_comment, is_echo_end, is_echo_start, is_keyword, is_section, is_subsection,
};
use crate::report::{split_words, DiracReport, ReportError};

lazy_static! {
    static ref INTEGER_RE: Regex = Regex::new(r"[0-9]+").expect("Regex pattern invalid.");
}

/// Lines of the echoed input, each paired with its upper-cased, comment-free words.
///
/// Blank and comment-only lines are skipped.
fn echoed_input<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<Vec<(String, Vec<String>)>, ReportError> {
    let mut lines = Vec::new();
    let mut in_echo = false;
    for line in report.scan()? {
        let line = line?;
        if !in_echo {
            in_echo = is_echo_start(&line);
            continue;
        }
        if is_echo_end(&line) {
            break;
        }
        let Some(first) = split_words(&line).first().copied() else {
            continue;
        };
        if is_comment(first) {
            continue;
        }
        let words = input_words(&line);
        if !words.is_empty() {
            lines.push((line, words));
        }
    }
    Ok(lines)
}

/// Checks that the `.EIGPRI` option of the `*SCF` section leaves positive-energy eigenvalues
/// printed.
///
/// # Errors
///
/// Errors with [`ReportError::Configuration`] if the first `.EIGPRI` argument is `0`.
pub fn validate_eigpri<R: BufRead + Seek>(report: &mut DiracReport<R>) -> Result<(), ReportError> {
    let mut scf_requested = false;
    let mut in_scf_section = false;
    let mut eigpri_next = false;
    for (line, words) in echoed_input(report)? {
        let first = words[0].as_str();
        if is_keyword(first) && first.starts_with(".SCF") {
            scf_requested = true;
            continue;
        }
        if !scf_requested {
            continue;
        }
        if is_subsection(first) {
            in_scf_section = first.contains("*SCF");
            eigpri_next = false;
            continue;
        }
        if !in_scf_section {
            continue;
        }
        if is_keyword(first) {
            eigpri_next = first.starts_with(".EIGPRI");
            continue;
        }
        if eigpri_next
            && words.len() == 2
            && words.iter().all(|word| word.bytes().all(|b| b.is_ascii_digit()))
            && words[0].parse::<u32>().ok() == Some(0)
        {
            return Err(ReportError::Configuration(format!(
                "Your .EIGPRI option in your DIRAC input file is invalid!\n\
                .EIGPRI\n{}\n\
                Positive-energy eigenvalues are not printed with this setting, so they cannot be \
                read. Use the --no-scf option to skip reading eigenvalue information, or enable \
                the printout of positive-energy eigenvalues \
                (https://diracprogram.org/doc/master/manual/wave_function/scf.html#eigpri).",
                line.trim()
            )));
        }
    }
    Ok(())
}

/// Reads the number of electrons.
///
/// The `.CLOSED SHELL` and `.OPEN SHELL` occupations of the `*SCF` section are summed. If none
/// are given, the `i.e. no. of electrons =` line of the wave function module is used instead.
///
/// # Errors
///
/// Errors with [`ReportError::Configuration`] if no SCF calculation was requested, if the
/// `*SCF` `.PRINT` level suppresses electronic eigenvalues, or if the electron count cannot be
/// found at all.
pub fn read_electron_count<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<usize, ReportError> {
    let electrons = electron_count_from_input(report)?;
    if electrons > 0 {
        return Ok(electrons);
    }
    electron_count_from_scf_field(report)
}

fn electron_count_from_input<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<usize, ReportError> {
    let mut electrons = 0;
    let mut scf_requested = false;
    let mut in_scf_section = false;
    let mut occupation_next = false;
    let mut print_next = false;
    for (line, words) in echoed_input(report)? {
        let first = words[0].as_str();
        if first.starts_with(".SCF") {
            scf_requested = true;
        }
        if is_section(first) {
            in_scf_section = first.contains("*SCF");
        }
        if !in_scf_section {
            continue;
        }

        if occupation_next {
            electrons += INTEGER_RE
                .find_iter(&words.join(" "))
                .map(|m| m.as_str().parse::<usize>())
                .sum::<Result<usize, _>>()
                .map_err(|_| {
                    ReportError::FormatMismatch(format!(
                        "Cannot read the occupation `{}`.",
                        line.trim()
                    ))
                })?;
            occupation_next = false;
        }
        if print_next {
            let level = INTEGER_RE
                .find(first)
                .and_then(|m| m.as_str().parse::<u32>().ok());
            if matches!(level, Some(0) | Some(2)) {
                return Err(ReportError::Configuration(
                    ".PRINT setting in the *SCF section with value 0 or 2 is not supported. \
                    0 means no eigenvalue printout and 2 means only positronic eigenvalues are \
                    written out, so the electron count and orbital energies cannot be read. \
                    Please check your DIRAC input file and try again."
                        .to_string(),
                ));
            }
            print_next = false;
        }
        if first.starts_with(".PRINT") {
            print_next = true;
        }
        if (first == ".CLOSED" || first == ".OPEN")
            && words.get(1).map_or(false, |word| word.contains("SHELL"))
        {
            occupation_next = true;
        }
    }

    if !scf_requested {
        return Err(ReportError::Configuration(
            "Cannot find SCF calculation settings in the DIRAC input echoed in the output file. \
            The electron count and orbital energies cannot be read without an SCF calculation. \
            Please check your DIRAC input file, or use the --no-scf option."
                .to_string(),
        ));
    }
    Ok(electrons)
}

fn electron_count_from_scf_field<R: BufRead + Seek>(
    report: &mut DiracReport<R>,
) -> Result<usize, ReportError> {
    let mut in_wave_function_module = false;
    for line in report.scan()? {
        let line = line?;
        if line.contains("Wave function module") {
            in_wave_function_module = true;
            continue;
        }
        if in_wave_function_module && line.contains("i.e. no. of electrons") {
            let words = split_words(&line);
            return words
                .iter()
                .skip_while(|&&word| word != "=")
                .nth(1)
                .and_then(|word| word.parse::<usize>().ok())
                .ok_or_else(|| {
                    ReportError::FormatMismatch(format!(
                        "Cannot read the number of electrons from `{}`.",
                        line.trim()
                    ))
                });
        }
    }
    Err(ReportError::Configuration(
        "Cannot find the number of electrons in the DIRAC output file. Please check the SCF \
        settings of your DIRAC input file, or use the --no-scf option."
            .to_string(),
    ))
}
