use approx::assert_abs_diff_eq;

use crate::drivers::summary::{SummaryDriver, SummaryParams};
use crate::drivers::DfcoefDriver;
use crate::report::ReportError;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_drivers_summary_params() {
    let params = SummaryParams::builder().build().unwrap();
    assert_eq!(params, SummaryParams::default());
    assert_eq!(params.threshold, 0.1);
    assert_eq!(params.decimal_places, 5);

    assert!(SummaryParams::builder().threshold(-1.0).build().is_err());
    assert!(SummaryParams::builder().threshold(f64::NAN).build().is_err());
    assert!(SummaryParams::builder().decimal_places(0).build().is_err());
    assert!(SummaryParams::builder().decimal_places(16).build().is_err());
    assert!(SummaryParams::builder()
        .decimal_places(15)
        .all_write(true)
        .positronic_write(true)
        .build()
        .is_ok());

    let params = SummaryParams {
        decimal_places: 20,
        ..SummaryParams::default()
    };
    assert!(params.check().is_err());

    let display = SummaryParams::default().to_string();
    assert!(display.contains("Orbitals written: electronic"));
    assert!(display.contains("Sort orbitals by energy: yes"));
}

#[test]
fn test_drivers_summary_water() {
    let path = format!("{ROOT}/tests/reports/water_privec.out");
    let params = SummaryParams::builder().build().unwrap();
    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .dirac_output(Some(path.into()))
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    driver.run().unwrap();
    let result = driver.result().unwrap();

    assert_eq!(result.atoms.total_number_of_atoms(), 3);
    let header = result.header.as_ref().unwrap();
    assert_eq!(header.electrons, 4);
    assert_eq!(
        header.active_ranges(),
        vec![("E1".to_string(), "1..3".to_string())]
    );
    assert_eq!(result.catalog.len(), 4);

    let numbers = result
        .mos
        .electronic
        .iter()
        .map(|mo| (mo.number, mo.irrep_index))
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec![(1, Some(1)), (2, Some(2)), (3, Some(3))]);
    assert_eq!(result.mos.positronic.len(), 1);

    let first = &result.mos.electronic[0];
    assert_abs_diff_eq!(
        first.percentage(&first.retained()[0]),
        82.0 / 0.83,
        epsilon = 1e-9
    );
}

#[test]
fn test_drivers_summary_no_sort_no_scf() {
    let path = format!("{ROOT}/tests/reports/water_privec.out");
    let params = SummaryParams::builder()
        .no_sort(true)
        .no_scf(true)
        .build()
        .unwrap();
    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .dirac_output(Some(path.into()))
        .build()
        .unwrap();
    driver.run().unwrap();
    let result = driver.result().unwrap();
    assert!(result.header.is_none());
    assert_eq!(
        result
            .mos
            .electronic
            .iter()
            .map(|mo| (mo.number, mo.irrep_index))
            .collect::<Vec<_>>(),
        vec![(1, None), (3, None), (2, None)]
    );
}

#[test]
fn test_drivers_summary_missing_catalog() {
    let text = "\
 Some DIRAC output without any basis information

 *************************** Vector print ***************************
";
    let params = SummaryParams::builder().no_scf(true).build().unwrap();
    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .report_text(Some(text))
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReportError>(),
        Some(ReportError::MissingSection(_))
    ));
    assert!(driver.result().is_err());
}

#[test]
fn test_drivers_summary_source_selection() {
    let params = SummaryParams::default();
    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(driver.run().is_err());

    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .dirac_output(Some(format!("{ROOT}/tests/reports/does_not_exist.out").into()))
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReportError>(),
        Some(ReportError::Io(_))
    ));
}

#[test]
fn test_drivers_summary_debug_diagnostics() {
    let path = format!("{ROOT}/tests/reports/water_privec.out");
    let params = SummaryParams::builder().debug(true).build().unwrap();
    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .dirac_output(Some(path.into()))
        .build()
        .unwrap();
    driver.run().unwrap();
    let result = driver.result().unwrap();
    for mo in result.mos.electronic.iter().chain(result.mos.positronic.iter()) {
        assert_abs_diff_eq!(mo.normalisation(), 1.0, epsilon = 1e-10);
    }
}
