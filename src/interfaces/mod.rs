//! Interfaces between `dfcoef` and its users.

pub mod cli;
