use std::error::Error;
use std::io;

use crate::report::input_echo::{
    input_words, is_comment, is_keyword, is_section, is_subsection, is_top_section,
    strip_comment,
};
use crate::report::{split_words, DiracReport, ReportError};

#[test]
fn test_report_split_words() {
    assert_eq!(
        split_words("  * Electronic eigenvalue no.122: -2.84  "),
        vec!["*", "Electronic", "eigenvalue", "no.122:", "-2.84"]
    );
    assert!(split_words("").is_empty());
    assert!(split_words("      ").is_empty());
}

#[test]
fn test_report_scan_strips_terminators_and_rewinds() {
    let mut report = DiracReport::from_text("first\r\nsecond\n\nlast");
    let lines = report
        .scan()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(lines, vec!["first", "second", "", "last"]);

    // A second scan starts again from the top.
    let first = report.scan().unwrap().next().unwrap().unwrap();
    assert_eq!(first, "first");
}

#[test]
fn test_report_error_kinds() {
    let err = ReportError::MissingSection("no Symmetry Orbitals".to_string());
    assert_eq!(err.kind(), "missing section");
    assert!(err.to_string().contains("no Symmetry Orbitals"));
    assert!(err.source().is_none());

    let err = ReportError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
    assert_eq!(err.kind(), "I/O");
    assert!(err.source().is_some());
}

#[test]
fn test_report_input_echo_recognition() {
    assert!(is_section("**DIRAC"));
    assert!(is_section("*SCF"));
    assert!(!is_section(".SCF"));
    assert!(is_top_section("**MOLTRA"));
    assert!(!is_top_section("*SCF"));
    assert!(is_subsection("*SCF"));
    assert!(!is_subsection("**WAVE"));
    assert!(is_keyword(".CLOSED"));
    assert!(!is_keyword("CLOSED"));
    assert!(is_comment("!.PRINT"));
    assert!(is_comment("#"));
    assert_eq!(strip_comment(".EIGPRI ! print all"), ".EIGPRI ");
    assert_eq!(input_words(" .closed shell # comment"), vec![".CLOSED", "SHELL"]);
}
