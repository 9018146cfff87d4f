//! # dfcoef: Summaries of DIRAC Molecular-Orbital Coefficients
//!
//! `dfcoef` reads the output of a [DIRAC](https://www.diracprogram.org/) calculation run with the
//! `*PRIVEC` (vector print) option and reduces the raw coefficient listing of every printed
//! molecular orbital to a short list of basis-function contributions, each expressed as a
//! percentage of the orbital's total weight. The program can:
//! - read the symmetry-orbital catalog to label every printed coefficient row,
//! - accumulate the contributions of each orbital and drop those below a threshold,
//! - read the electron count, the SCF eigenvalues and any MOLTRA active space,
//! - sort orbitals by energy and number them within their irreducible representation, and
//! - write the result in a normal or a compressed layout.
//!
//! This documentation details the public API of the `dfcoef` crate.
//!
//! ## Getting started
//!
//! The `dfcoef` binary is the usual entry point:
//!
//! ```text
//! dfcoef -i dirac.out -o sum_dirac_dfcoef.out -t 0.1 -d 5
//! ```
//!
//! Summary parameters can also be read from a YAML file given with `--config`. Flags passed on
//! the command line take precedence over the file.
//!
//! Within Rust, a summary is obtained through [`drivers::summary::SummaryDriver`] and written
//! with [`io::writer::write_summary`].
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions. The `tests/reports` directory holds a small DIRAC output together with the summary
//! expected from it.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod basis;
pub mod drivers;
pub mod header;
pub mod interfaces;
pub mod io;
pub mod mo;
pub mod privec;
pub mod report;
