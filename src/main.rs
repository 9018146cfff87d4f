use std::process;

use clap::Parser;

use dfcoef::interfaces::cli::{init_logging, report_failure, run, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli) {
        eprintln!("Unable to set up logging: {err:#}");
        process::exit(1);
    }
    if let Err(err) = run(&cli) {
        process::exit(report_failure(&err));
    }
}
