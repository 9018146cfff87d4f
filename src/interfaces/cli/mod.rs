//! The `dfcoef` command-line interface.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{self, format_err, Context};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::drivers::summary::{SummaryDriver, SummaryParams};
use crate::drivers::DfcoefDriver;
use crate::io::format::{dfcoef_error, dfcoef_output};
use crate::io::read_dfcoef_yaml;
use crate::io::writer::write_summary;
use crate::report::ReportError;


const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Default name of the summary file.
pub const DEFAULT_OUTPUT: &str = "sum_dirac_dfcoef.out";

/// Logs a nicely formatted `dfcoef` heading to the `dfcoef-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        format!("v unknown")
    };
    dfcoef_output!("╭─────────────────────────────────────────────────────────────────────────────╮");
    dfcoef_output!("│     _  __                 __                                                │");
    dfcoef_output!("│  __| |/ _| ___ ___   ___ / _|    DIRAC molecular-orbital coefficients       │");
    dfcoef_output!("│ / _` | |_ / __/ _ \\ / _ \\ |_     summarised as basis-function contributions │");
    dfcoef_output!("│| (_| |  _| (_| (_) |  __/  _|                                               │");
    dfcoef_output!("│ \\__,_|_|  \\___\\___/ \\___|_|                                   {version:>13} │");
    dfcoef_output!("╰─────────────────────────────────────────────────────────────────────────────╯");
    dfcoef_output!("");
}

/// Summarise the coefficients of a DIRAC output file written with the `*PRIVEC` option.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// DIRAC output file.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Summary file to be written.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Write each orbital on a single line.
    #[arg(short, long)]
    pub compress: bool,

    /// Percentage below which contributions are not written [default: 0.1].
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Number of decimal places of percentages and energies [default: 5].
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=15))]
    pub decimal: Option<u8>,

    /// Write both electronic and positronic orbitals.
    #[arg(short, long)]
    pub all_write: bool,

    /// Write only positronic orbitals.
    #[arg(short, long)]
    pub positronic_write: bool,

    /// Keep orbitals in the order they are printed instead of sorting them by energy.
    #[arg(long)]
    pub no_sort: bool,

    /// Do not read the electron count, the eigenvalues or the active space.
    #[arg(long)]
    pub no_scf: bool,

    /// Log debug messages and per-orbital normalisation diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// YAML file with summary parameters. Flags given on the command line take precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// File to which the log is also written.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Assembles the summary parameters from the configuration file, if any, and the flags.
    ///
    /// # Errors
    ///
    /// Errors if the configuration file cannot be read or if the resulting parameters are
    /// invalid.
    pub fn params(&self) -> Result<SummaryParams, anyhow::Error> {
        let mut params = match self.config.as_ref() {
            Some(config) => read_dfcoef_yaml::<SummaryParams, _>(config).with_context(|| {
                format!("Unable to read the parameter file `{}`", config.display())
            })?,
            None => SummaryParams::default(),
        };
        if let Some(threshold) = self.threshold {
            params.threshold = threshold;
        }
        if let Some(decimal) = self.decimal {
            params.decimal_places = usize::from(decimal);
        }
        params.compress |= self.compress;
        params.all_write |= self.all_write;
        params.positronic_write |= self.positronic_write;
        params.no_sort |= self.no_sort;
        params.no_scf |= self.no_scf;
        params.debug |= self.debug;
        params
            .check()
            .map_err(|err| format_err!(ReportError::Configuration(err.to_string())))?;
        Ok(params)
    }
}

/// Configures `log4rs`.
///
/// Lines of the `dfcoef-output` target go to standard output; all other records go to standard
/// error. If a log file is requested, everything is also written there.
///
/// # Errors
///
/// Errors if the log file cannot be created or if a logger has already been set.
pub fn init_logging(cli: &Cli) -> Result<log4rs::Handle, anyhow::Error> {
    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let pattern = "{m}{n}";
    let stdout = ConsoleAppender::builder()
        .target(Target::Stdout)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {m}{n}")))
        .build();
    let mut config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut output_logger = Logger::builder().appender("stdout").additive(false);
    let mut root = Root::builder().appender("stderr");
    if let Some(log_file) = cli.log_file.as_ref() {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .append(false)
            .build(log_file)
            .with_context(|| format!("Unable to create the log file `{}`", log_file.display()))?;
        config = config.appender(Appender::builder().build("file", Box::new(file)));
        output_logger = output_logger.appender("file");
        root = root.appender("file");
    }
    let config = config
        .logger(output_logger.build("dfcoef-output", LevelFilter::Info))
        .build(root.build(level))?;
    Ok(log4rs::init_config(config)?)
}

/// Summarises the DIRAC output named on the command line and writes the summary file.
///
/// # Errors
///
/// Errors if the parameters are invalid, if the report cannot be summarised or if the summary
/// file cannot be written.
pub fn run(cli: &Cli) -> Result<(), anyhow::Error> {
    log_heading();
    let params = cli.params()?;
    let mut driver = SummaryDriver::builder()
        .parameters(&params)
        .dirac_output(Some(cli.input.clone()))
        .build()
        .map_err(|err| format_err!(err))?;
    driver.run()?;
    let result = driver.result()?;

    let file = File::create(&cli.output).with_context(|| {
        format!("Unable to create the summary file `{}`", cli.output.display())
    })?;
    let mut out = BufWriter::new(file);
    write_summary(&mut out, &params, result.header.as_ref(), &result.mos)?;
    dfcoef_output!("Summary written to `{}`.", cli.output.display());
    Ok(())
}

/// Returns the process exit status for an error.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ReportError>() {
        Some(ReportError::MissingSection(_)) => 2,
        Some(ReportError::FormatMismatch(_)) => 3,
        Some(ReportError::Consistency(_)) => 4,
        Some(ReportError::Configuration(_)) => 5,
        Some(ReportError::Io(_)) => 6,
        None => 1,
    }
}

/// Logs an error with its causes and returns the process exit status for it.
pub fn report_failure(err: &anyhow::Error) -> i32 {
    dfcoef_error!("{err:#}");
    exit_code(err)
}
