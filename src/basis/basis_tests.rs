use crate::basis::{
    gto_labels, gto_position, read_basis_catalog, AtomOrbitalCursor, AtomicOrbital,
    BasisFunctionGroup, Component, GroupKey,
};
use crate::report::{DiracReport, ReportError};

const CATALOG_HEADER: &str = "\
                                Symmetry Orbitals
                                *****************

  Number of orbitals in each symmetry:          8    4
  Number of large orbitals in each symmetry:    5    3
  Number of small orbitals in each symmetry:    3    1

";

fn orbital(element: &str, gto: &str) -> AtomicOrbital {
    AtomicOrbital {
        element: element.to_string(),
        subshell: gto.chars().next().unwrap(),
        gto: gto.to_string(),
    }
}

#[test]
fn test_basis_gto_labels() {
    assert_eq!(gto_labels('s', 0), vec!["s"]);
    assert_eq!(gto_labels('p', 1), vec!["px", "py", "pz"]);
    assert_eq!(
        gto_labels('d', 2),
        vec!["dxx", "dxy", "dxz", "dyy", "dyz", "dzz"]
    );
    let f = gto_labels('f', 3);
    assert_eq!(f.len(), 10);
    assert_eq!(f[0], "fxxx");
    assert_eq!(f[9], "fzzz");
    let g = gto_labels('g', 4);
    assert_eq!(g.len(), 15);
    assert_eq!(&g[..3], &["g400", "g310", "g301"]);
    assert_eq!(g[14], "g004");

    assert_eq!(gto_position('p', "pz"), Some(2));
    assert_eq!(gto_position('h', "h500"), Some(0));
    assert_eq!(gto_position('p', "g400"), None);
    assert_eq!(gto_position('j', "j"), None);
}

#[test]
fn test_basis_cursor_boundaries() {
    let mut cursor = AtomOrbitalCursor::new();
    assert!(cursor.advance(orbital("C", "s"), "AgCs"));
    assert!(!cursor.advance(orbital("C", "px"), "AgCpx"));
    assert!(!cursor.advance(orbital("C", "pz"), "AgCpz"));
    // Subshell regression.
    assert!(cursor.advance(orbital("C", "s"), "AgCs"));
    // Element change.
    assert!(cursor.advance(orbital("H", "s"), "AgHs"));
    // Repeated label without regression.
    assert!(cursor.advance(orbital("H", "s"), "AgHs"));
    // Regression within a subshell.
    assert!(!cursor.advance(orbital("H", "py"), "AgHpy"));
    assert!(cursor.advance(orbital("H", "px"), "AgHpx"));
    // Unrankable labels do not count as regressions.
    assert!(!cursor.advance(orbital("H", "pq"), "AgHpq"));

    cursor.reset();
    assert!(cursor.advance(orbital("H", "pz"), "B1uHpz"));
}

#[test]
fn test_basis_catalog_subshell_regression() {
    let text = format!(
        "{CATALOG_HEADER}\
  * Large component functions

  Symmetry  Ag(1)

     2 functions:    C  s
     1 functions:    C  px
     1 functions:    C  s

 *************************************************************************
"
    );
    let mut report = DiracReport::from_text(&text);
    let catalog = read_basis_catalog(&mut report).unwrap();
    let key = GroupKey::new(Component::Large, "Ag", "C");
    let bucket = catalog.bucket(&key).unwrap();
    assert_eq!(bucket.len(), 2);
    assert_eq!(bucket.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(bucket[&1].remaining("s"), Some(2));
    assert_eq!(bucket[&1].remaining("px"), Some(1));
    assert_eq!(bucket[&2].remaining("s"), Some(1));
    assert_eq!(bucket[&2].remaining("px"), None);
    assert_eq!(bucket[&2].occurrence, 2);
    assert_eq!(catalog.orbital_counts.total, Some(12));
    assert_eq!(catalog.orbital_counts.large, Some(8));
    assert_eq!(catalog.orbital_counts.small, Some(4));
}

#[test]
fn test_basis_catalog_multiplicity_and_components() {
    let text = format!(
        "{CATALOG_HEADER}\
  * Large component functions

  Symmetry  Ag(1)

     3 functions:    Cm g400
     2 functions:    H  s   1+2
     1 functions:    H  pz  1+2
     2 functions:    H  s   1-2
     1 functions:    O  s
     1 functions:    H  s

  Symmetry  B1u(2)

     2 functions:    H  s   1+2+3+4

  * Small component functions

  Symmetry  Ag(1)

     3 functions:    Cm h500
 ************************************************
     9 functions:    Xe s
"
    );
    let mut report = DiracReport::from_text(&text);
    let catalog = read_basis_catalog(&mut report).unwrap();

    let cm = catalog
        .get(&GroupKey::new(Component::Large, "Ag", "Cm"), 1)
        .unwrap();
    assert_eq!(cm.multiplicity, 1);
    assert_eq!(cm.remaining("g400"), Some(3));

    let h_key = GroupKey::new(Component::Large, "Ag", "H");
    let h = catalog.bucket(&h_key).unwrap();
    assert_eq!(h.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    assert_eq!(h[&1].multiplicity, 2);
    assert_eq!(h[&1].total_remaining(), 3);
    assert_eq!(h[&3].multiplicity, 2);
    assert_eq!(h[&5].multiplicity, 1);

    let h_b1u = catalog
        .get(&GroupKey::new(Component::Large, "B1u", "H"), 1)
        .unwrap();
    assert_eq!(h_b1u.multiplicity, 4);

    let cm_small = catalog
        .get(&GroupKey::new(Component::Small, "Ag", "Cm"), 1)
        .unwrap();
    assert_eq!(cm_small.remaining("h500"), Some(3));

    // Declarations after the closing separator are ignored.
    assert!(catalog
        .keys()
        .all(|key| key.element != "Xe"));
    assert_eq!(catalog.len(), 7);

    assert!(matches!(
        catalog.get(&h_key, 2),
        Err(ReportError::Consistency(_))
    ));
}

#[test]
fn test_basis_catalog_missing_section() {
    let mut report = DiracReport::from_text("Nothing to see here\n   1 functions:    C  s\n");
    let err = read_basis_catalog(&mut report).unwrap_err();
    assert!(matches!(err, ReportError::MissingSection(_)));
    assert!(err.to_string().contains(".PRINT"));
}

#[test]
fn test_basis_catalog_malformed_count() {
    let text = format!(
        "{CATALOG_HEADER}\
  * Large component functions

  Symmetry  Ag(1)

   *** functions:    C  s
"
    );
    let mut report = DiracReport::from_text(&text);
    assert!(matches!(
        read_basis_catalog(&mut report),
        Err(ReportError::FormatMismatch(_))
    ));
}

#[test]
fn test_basis_catalog_overflowed_counts() {
    let text = "\
                                Symmetry Orbitals
                                *****************

  Number of orbitals in each symmetry:      *****    4

  * Large component functions

  Symmetry  Ag(1)

     2 functions:    C  s
";
    let mut report = DiracReport::from_text(text);
    let catalog = read_basis_catalog(&mut report).unwrap();
    assert_eq!(catalog.orbital_counts.total, None);
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_basis_group_decrement() {
    let key = GroupKey::new(Component::Large, "Ag", "C");
    let mut group = BasisFunctionGroup::new(&key, 1, 1, 1);
    group.add_functions("s", 2);
    group.decrement("s").unwrap();
    group.decrement("s").unwrap();
    assert_eq!(group.remaining("s"), Some(0));
    assert!(matches!(
        group.decrement("s"),
        Err(ReportError::Consistency(_))
    ));
    assert!(matches!(
        group.decrement("px"),
        Err(ReportError::Consistency(_))
    ));
    assert_eq!(group.key(), key);
}

#[test]
fn test_basis_catalog_short_labels() {
    let text = format!(
        "{CATALOG_HEADER}\
  * Large component functions

  Symmetry  Ag(1)

     2 functions: C s
     1 functions: C px
     1 functions: H s 1+2
"
    );
    let mut report = DiracReport::from_text(&text);
    let catalog = read_basis_catalog(&mut report).unwrap();
    assert_eq!(catalog.len(), 2);

    let carbon = catalog
        .get(&GroupKey::new(Component::Large, "Ag", "C"), 1)
        .unwrap();
    assert_eq!(carbon.multiplicity, 1);
    assert_eq!(carbon.remaining("s"), Some(2));
    assert_eq!(carbon.remaining("px"), Some(1));

    let hydrogen = catalog
        .get(&GroupKey::new(Component::Large, "Ag", "H"), 1)
        .unwrap();
    assert_eq!(hydrogen.multiplicity, 2);

    let text = format!(
        "{CATALOG_HEADER}\
  * Large component functions

  Symmetry  Ag(1)

     2 functions: C
"
    );
    let mut report = DiracReport::from_text(&text);
    assert!(matches!(
        read_basis_catalog(&mut report),
        Err(ReportError::FormatMismatch(_))
    ));
}
