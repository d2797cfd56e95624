//! Command-line interface for the variant generator.

use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "variantgen")]
#[command(about = "Derive the ML-KEM-1024 Go source from the ML-KEM-768 template", long_about = None)]
pub struct Cli {
    /// Template Go file to read
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Generated Go file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
