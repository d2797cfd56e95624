//! Common test utilities for end-to-end tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

/// Write `source` to a temporary `.go` file.
#[allow(dead_code)]
pub fn template(source: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::with_suffix(".go").expect("Failed to create temp file");
    temp_file
        .write_all(source.as_bytes())
        .expect("Failed to write template");
    temp_file
}

/// Path for a generated file inside `dir`.
#[allow(dead_code)]
pub fn output_path(dir: &TempDir) -> PathBuf {
    dir.path().join("mlkem1024.go")
}

/// Run the `variantgen` binary.
#[allow(dead_code)]
pub fn run_cli(input: &Path, output: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_variantgen"))
        .arg("--input")
        .arg(input)
        .arg("--output")
        .arg(output)
        .output()
        .expect("Failed to execute variantgen")
}
