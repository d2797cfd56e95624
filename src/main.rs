//! variantgen CLI entry point.

mod cli;

use clap::Parser;
use cli::Cli;
use variantgen::diagnostics::report_error;
use variantgen::{GenerateError, SubstitutionTable, generate};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level())
        .init();

    let result = SubstitutionTable::mlkem1024()
        .map_err(GenerateError::from)
        .and_then(|table| generate(&cli.input, &cli.output, &table));

    if let Err(err) = result {
        report_error(&err);
        std::process::exit(1);
    }
}
