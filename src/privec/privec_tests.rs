use approx::assert_abs_diff_eq;

use crate::basis::{read_basis_catalog, BasisCatalog, Component};
use crate::privec::row::{decode_row, is_coefficient_row, ROW_LENGTH, SENTINEL};
use crate::privec::{parse_mo_header, read_mo_coefficients, MoCoefficientReader, VectorPrintStage};
use crate::report::{split_words, DiracReport, ReportError};

/// Formats a coefficient row the way DIRAC does with `(3X,I5,2X,A12,2X,4F14.10)`.
fn coefficient_row(
    vector_num: usize,
    flag: char,
    symmetry: &str,
    element: &str,
    gto: &str,
    fields: [f64; 4],
) -> String {
    format!(
        "   {vector_num:5}  {flag} {symmetry:<3}{element:<3}{gto:<4}  {:14.10}{:14.10}{:14.10}{:14.10}",
        fields[0], fields[1], fields[2], fields[3]
    )
}

fn catalog_from(declarations: &str) -> BasisCatalog {
    let text = format!(
        "\
                                Symmetry Orbitals
                                *****************

  Number of orbitals in each symmetry:          4

{declarations}
 *************************************************************************
"
    );
    let mut report = DiracReport::from_text(&text);
    read_basis_catalog(&mut report).unwrap()
}

#[test]
fn test_privec_row_offsets() {
    let line = coefficient_row(12, 'S', "B1u", "Cm", "g400", [0.1, -0.2, 0.0, 0.3]);
    assert_eq!(&line[10..11], "S");
    assert_eq!(&line[12..15], "B1u");
    assert_eq!(&line[15..18], "Cm ");
    assert_eq!(&line[18..22], "g400");
    assert_eq!(line.len(), 24 + 4 * 14);
    assert!(is_coefficient_row(&split_words(&line)));

    let row = decode_row(&line).unwrap();
    assert_eq!(row.vector_num, 12);
    assert_eq!(row.component, Component::Small);
    assert_eq!(row.function_label(), "B1uCmg400");
    assert_abs_diff_eq!(row.value(), 0.14, epsilon = 1e-12);
}

#[test]
fn test_privec_row_anomalies() {
    let mut line = coefficient_row(3, 'L', "Ag", "C", "s", [0.5, 0.0, 0.0, 0.0]);
    line.replace_range(24..38, "**************");
    let row = decode_row(&line).unwrap();
    assert_eq!(row.fields[0], SENTINEL);
    assert_eq!(row.fields[1], 0.0);

    let truncated = &coefficient_row(3, 'L', "Ag", "C", "s", [0.5, 0.0, 0.0, 0.0])[..40];
    assert!(matches!(
        decode_row(truncated),
        Err(ReportError::FormatMismatch(_))
    ));

    let flagged = coefficient_row(3, 'X', "Ag", "C", "s", [0.5, 0.0, 0.0, 0.0]);
    assert!(matches!(
        decode_row(&flagged),
        Err(ReportError::FormatMismatch(_))
    ));

    assert!(!is_coefficient_row(&split_words("  Fermion ircop Ag")));
    assert!(!is_coefficient_row(&split_words(
        "  1a L Ag C  s     0.5 0.0 0.0 0.0"
    )));
}

#[test]
fn test_privec_mo_header() {
    let words = split_words("* Electronic eigenvalue no. 22: -2.8417809384721");
    let header = parse_mo_header(&words).unwrap().unwrap();
    assert!(header.is_electronic);
    assert_eq!(header.number, Some(22));
    assert_abs_diff_eq!(header.energy, -2.8417809384721, epsilon = 1e-14);

    let words = split_words("* Positronic eigenvalue no.122: -1.0");
    let header = parse_mo_header(&words).unwrap().unwrap();
    assert!(!header.is_electronic);
    assert_eq!(header.number, Some(122));

    let words = split_words("* Electronic eigenvalue no.****: 3.5");
    assert_eq!(parse_mo_header(&words).unwrap().unwrap().number, None);

    let words = split_words("* Electronic eigenvalue no. 3: abc");
    assert!(matches!(
        parse_mo_header(&words),
        Err(ReportError::FormatMismatch(_))
    ));

    assert!(parse_mo_header(&split_words("* Electronic eigenvalues"))
        .unwrap()
        .is_none());
}

#[test]
fn test_privec_single_function_end_to_end() {
    let catalog = catalog_from(
        "\
  * Large component functions

  Symmetry  Ag(1)

     2 functions:    C  s
",
    );
    let text = format!(
        "
 *************************** Vector print ***************************

 Fermion ircop Ag

* Electronic eigenvalue no.  1: -1.0

{}

 Total CPU time used in DIRAC
",
        coefficient_row(1, 'L', "Ag", "C", "s", [1.0, 0.0, 0.0, 0.0])
    );
    let mut report = DiracReport::from_text(&text);
    let mos = read_mo_coefficients(&mut report, &catalog, 0.1).unwrap();
    assert_eq!(mos.electronic.len(), 1);
    assert!(mos.positronic.is_empty());

    let mo = &mos.electronic[0];
    assert_eq!(mo.number, 1);
    assert_eq!(mo.symmetry, "Ag");
    assert_abs_diff_eq!(mo.energy, -1.0);
    assert_eq!(mo.retained().len(), 1);
    assert_eq!(mo.retained()[0].display_label(), "AgCs");
    assert_abs_diff_eq!(mo.percentage(&mo.retained()[0]), 100.0, epsilon = 1e-10);
}

#[test]
fn test_privec_repeated_atom_groups() {
    let catalog = catalog_from(
        "\
  * Large component functions

  Symmetry  Ag(1)

     1 functions:    H  s   1+2
     1 functions:    H  s
     1 functions:    O  s

  * Small component functions

  Symmetry  Ag(1)

     1 functions:    O  px
",
    );
    let text = format!(
        "
 ****** Vector print ******
 Fermion ircop Ag
* Electronic eigenvalue no.  1: -0.5
{}
{}
{}
{}

* Electronic eigenvalue no.***: 0.25
{}

* Positronic eigenvalue no.  1: -2000.0
{}
",
        coefficient_row(1, 'L', "Ag", "H", "s", [0.5, 0.0, 0.0, 0.0]),
        coefficient_row(2, 'L', "Ag", "H", "s", [0.0, 0.5, 0.0, 0.0]),
        coefficient_row(3, 'L', "Ag", "O", "s", [0.0, 0.0, 0.0, 0.0]),
        coefficient_row(4, 'S', "Ag", "O", "px", [0.0, 0.0, 0.5, 0.0]),
        coefficient_row(1, 'L', "Ag", "H", "s", [1.0, 0.0, 0.0, 0.0]),
        coefficient_row(4, 'S', "Ag", "O", "px", [0.0, 0.0, 0.0, 1.0]),
    );
    let mut report = DiracReport::from_text(&text);
    let mos = read_mo_coefficients(&mut report, &catalog, 0.1).unwrap();
    assert_eq!(mos.electronic.len(), 2);
    assert_eq!(mos.positronic.len(), 1);

    // 0.25 * 2 + 0.25 + 0.0 + 0.25
    let mo = &mos.electronic[0];
    assert_abs_diff_eq!(mo.norm_const_sum, 1.0, epsilon = 1e-12);
    let labels = mo
        .retained()
        .iter()
        .map(|coefficient| coefficient.display_label())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["AgHs(1)", "AgHs(3)", "AgOpx"]);
    assert_eq!(mo.retained()[0].multiplicity, 2);
    assert_abs_diff_eq!(mo.normalisation(), 1.0, epsilon = 1e-12);

    // Overflowed numbers continue from the previous header.
    assert_eq!(mos.electronic[1].number, 2);
    assert_eq!(mos.electronic[1].retained()[0].display_label(), "AgHs");
    assert_eq!(mos.positronic[0].retained()[0].display_label(), "AgOpx");
}

#[test]
fn test_privec_undeclared_rows() {
    let catalog = catalog_from(
        "\
  * Large component functions

  Symmetry  Ag(1)

     1 functions:    C  s
",
    );
    let text = format!(
        " ****** Vector print ******\n Fermion ircop Ag\n\
        * Electronic eigenvalue no.  1: -1.0\n{}\n{}\n",
        coefficient_row(1, 'L', "Ag", "C", "s", [1.0, 0.0, 0.0, 0.0]),
        coefficient_row(2, 'L', "Ag", "C", "s", [1.0, 0.0, 0.0, 0.0]),
    );
    let mut report = DiracReport::from_text(&text);
    assert!(matches!(
        read_mo_coefficients(&mut report, &catalog, 0.1),
        Err(ReportError::Consistency(_))
    ));
}

#[test]
fn test_privec_reader_stages() {
    let catalog = catalog_from(
        "\
  * Large component functions

  Symmetry  Ag(1)

     1 functions:    C  s
",
    );
    let mut reader = MoCoefficientReader::new(&catalog, 0.1);
    assert_eq!(reader.stage(), VectorPrintStage::Init);
    // Orbital headers before the banner are ignored.
    reader
        .feed("* Electronic eigenvalue no.  1: -1.0")
        .unwrap();
    assert_eq!(reader.stage(), VectorPrintStage::Init);
    reader.feed(" ****** Vector print ******").unwrap();
    assert_eq!(reader.stage(), VectorPrintStage::VectorPrint);
    reader.feed(" Fermion ircop Ag").unwrap();
    assert_eq!(reader.stage(), VectorPrintStage::WaitEndReadingCoef);
    reader
        .feed("* Electronic eigenvalue no.  1: -1.0")
        .unwrap();
    assert_eq!(reader.stage(), VectorPrintStage::MoCoef);
    reader.feed("").unwrap();
    assert_eq!(reader.stage(), VectorPrintStage::MoCoef);
    reader
        .feed(&coefficient_row(1, 'L', "Ag", "C", "s", [0.3, 0.4, 0.0, 0.0]))
        .unwrap();
    assert_eq!(reader.stage(), VectorPrintStage::ReadingCoef);

    // The orbital in progress is finalised at the end of input.
    let mos = reader.finish();
    assert_eq!(mos.electronic.len(), 1);
    assert_abs_diff_eq!(mos.electronic[0].norm_const_sum, 0.25, epsilon = 1e-12);
}

#[test]
fn test_privec_row_cut_inside_last_field() {
    let line = coefficient_row(7, 'L', "Ag", "C", "s", [0.0, 0.0, 0.0, 0.987654321]);
    assert_eq!(line.len(), ROW_LENGTH);
    assert_abs_diff_eq!(decode_row(&line).unwrap().fields[3], 0.987654321, epsilon = 1e-10);

    let cut = &line[..line.len() - 8];
    assert!(cut.ends_with("0.98"));
    assert!(matches!(decode_row(cut), Err(ReportError::FormatMismatch(_))));
}
