use std::fs;

use approx::assert_abs_diff_eq;

use dfcoef::basis::read_basis_catalog;
use dfcoef::drivers::summary::{SummaryDriver, SummaryParams, SummaryResult};
use dfcoef::drivers::DfcoefDriver;
use dfcoef::io::writer::write_summary;
use dfcoef::privec::read_mo_coefficients;
use dfcoef::report::{DiracReport, ReportError};

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn summarise_water(params: &SummaryParams) -> String {
    let mut driver = SummaryDriver::builder()
        .parameters(params)
        .dirac_output(Some(format!("{ROOT}/tests/reports/water_privec.out").into()))
        .build()
        .unwrap();
    driver.run().unwrap();
    let result: &SummaryResult = driver.result().unwrap();
    let mut out = Vec::new();
    write_summary(&mut out, params, result.header.as_ref(), &result.mos).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_single_function_orbital() {
    init();
    let text = "\
                                Symmetry Orbitals
                                *****************

  Number of orbitals in each symmetry:          2

  * Large component functions

  Symmetry  Ag(1)

     2 functions: C s

 *************************************************************************

 *************************** Vector print ***************************

 Fermion ircop Ag

* Electronic eigenvalue no.  1: -1.0

       1  L Ag C  s       1.0000000000  0.0000000000  0.0000000000  0.0000000000

 Total CPU time used in DIRAC
";
    let mut report = DiracReport::from_text(text);
    let catalog = read_basis_catalog(&mut report).unwrap();
    let mos = read_mo_coefficients(&mut report, &catalog, 0.1).unwrap();
    assert_eq!(mos.electronic.len(), 1);
    let mo = &mos.electronic[0];
    assert_eq!(mo.retained().len(), 1);
    assert_eq!(mo.retained()[0].display_label(), "AgCs");
    assert_abs_diff_eq!(mo.percentage(&mo.retained()[0]), 100.0, epsilon = 1e-10);
}

#[test]
fn test_water_normal_summary() {
    init();
    let params = SummaryParams::default();
    let expected =
        fs::read_to_string(format!("{ROOT}/tests/reports/water_privec.expected")).unwrap();
    assert_eq!(summarise_water(&params), expected);
}

#[test]
fn test_water_compressed_summary() {
    init();
    let params = SummaryParams::builder()
        .compress(true)
        .decimal_places(3)
        .build()
        .unwrap();
    let expected = "\
electron_num 4 E1 1..3
E1 closed 4 open 0 virtual 2
E1 1 -20.500 A1Os 98.795 A1Opx 1.205
E1 2 -1.300 A1Opz 100.000
E1 3 0.200 A1Hs 25.000 A1Hs 25.000 B1Hs 25.000 B1Hs 25.000
";
    assert_eq!(summarise_water(&params), expected);
}

#[test]
fn test_water_positronic_summary() {
    init();
    let params = SummaryParams::builder()
        .positronic_write(true)
        .no_scf(true)
        .build()
        .unwrap();
    let expected = "\
Positronic no. 1 E1 -2000.00000
A1Opx       100.00000 %


";
    assert_eq!(summarise_water(&params), expected);
}

#[test]
fn test_missing_symmetry_orbitals() {
    init();
    let text = "\
 *************************** Vector print ***************************

 Total CPU time used in DIRAC
";
    let mut report = DiracReport::from_text(text);
    assert!(matches!(
        read_basis_catalog(&mut report),
        Err(ReportError::MissingSection(_))
    ));
}
