mod common;

use std::fs;
use std::path::Path;

use common::{output_path, run_cli, template};
use tempfile::TempDir;
use variantgen::errors::LoadError;
use variantgen::filter::filter_declarations;
use variantgen::syntax::DeclKind;
use variantgen::{GenerateErrorKind, SubstitutionTable, generate, generate_source, parse_source};

const HEADER: &str = "// Code generated by variantgen. DO NOT EDIT.\n\n";

const TEMPLATE: &str = "\
// Copyright 2024 The Go Authors. All rights reserved.

package mlkem

// This file implements ML-KEM-768.
import (
\t\"crypto/sha3\"
)

const (
\tCiphertextSize768       = 1088
\tEncapsulationKeySize768 = 1184
)

// kemKeyGen generates a key pair from the seed d.
func kemKeyGen(dk *DecapsulationKey768) {
\tk := 3
\tvar s []byte = make([]byte, k) // k bytes of key material
\t_ = sha3.New256()
\t_ = s
}

// encryptionKey is the parsed public key.
type encryptionKey struct {
\tt [k]ringElement // NTT representation
\ta [k * k]nttElement
}
";

const EXPECTED: &str = "\
// Code generated by variantgen. DO NOT EDIT.

package mlkem

import (
\t\"crypto/sha3\"
)

// kemKeyGen1024 generates a key pair from the seed d.
func kemKeyGen1024(dk *DecapsulationKey1024) {
\tk1024 := 3
\tvar s []byte = make([]byte, k1024) // k bytes of key material
\t_ = sha3.New256()
\t_ = s
}

// encryptionKey1024 is the parsed public key.
type encryptionKey1024 struct {
\tt [k1024]ringElement // NTT representation
\ta [k1024 * k1024]nttElement
}
";

fn table() -> SubstitutionTable {
    SubstitutionTable::mlkem1024().expect("Failed to build table")
}

#[test]
fn test_generate_mlkem1024() {
    let input = template(TEMPLATE);
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    generate(input.path(), &output, &table()).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), EXPECTED);
}

#[test]
fn test_generation_is_deterministic() {
    let input = template(TEMPLATE);
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.go");
    let second = dir.path().join("second.go");

    generate(input.path(), &first, &table()).unwrap();
    generate(input.path(), &second, &table()).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_header_precedes_any_input() {
    let sources = [
        "package p\n",
        "// Leading.\n\npackage p\n",
        "package p\n\nconst x = 1\n",
        "package p\n\n// Doc.\nfunc f() {}\n",
    ];
    for source in sources {
        let out = generate_source(Path::new("p.go"), source, &table()).unwrap();
        assert!(out.starts_with(HEADER), "{out:?}");
        assert!(!out[HEADER.len()..].starts_with('\n'), "{out:?}");
    }
}

#[test]
fn test_only_exact_names_are_renamed() {
    let source = "\
package p

func kemKeyGenFoo() string { return \"kemKeyGen\" }

func kemKeyGen() {}
";
    let out = generate_source(Path::new("p.go"), source, &table()).unwrap();
    assert_eq!(
        &out[HEADER.len()..],
        "\
package p

func kemKeyGenFoo() string { return \"kemKeyGen\" }

func kemKeyGen1024() {}
"
    );
}

#[test]
fn test_k_is_never_replaced_in_comments() {
    let source = "\
package p

// Each key has k rows; kemPCT checks the key.
func kemPCT(k int) int { return k }
";
    let out = generate_source(Path::new("p.go"), source, &table()).unwrap();
    assert_eq!(
        &out[HEADER.len()..],
        "\
package p

// Each key has k rows; kemPCT1024 checks the key.
func kemPCT1024(k1024 int) int { return k1024 }
"
    );
}

#[test]
fn test_retained_declarations_keep_their_order() {
    let source = "\
package p

import \"errors\"

const a = 1

var b = errors.New(\"b\")

const (
\tc = 2
)

func d() {}

type e int
";
    let original = parse_source(Path::new("p.go"), source).unwrap();
    let mut filtered = original.clone();
    filter_declarations(&mut filtered);

    let kinds: Vec<_> = filtered.decls.iter().map(|decl| decl.node.kind()).collect();
    assert_eq!(
        kinds,
        [
            "import_declaration",
            "var_declaration",
            "function_declaration",
            "type_declaration"
        ]
    );
    assert!(filtered.decls.iter().all(|decl| decl.kind != DeclKind::Const));

    let mut remaining = filtered.decls.iter();
    let mut next = remaining.next();
    for decl in &original.decls {
        if next == Some(decl) {
            next = remaining.next();
        }
    }
    assert_eq!(next, None, "retained declarations are not a subsequence");
}

#[test]
fn test_syntax_error_writes_nothing() {
    let input = template("package p\n\nfunc f( {\n");
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    let err = generate(input.path(), &output, &table()).unwrap_err();

    assert!(matches!(
        err.kind(),
        GenerateErrorKind::Load(LoadError::Syntax(_))
    ));
    assert!(err.syntax_error().is_some());
    assert!(!output.exists());
}

#[test]
fn test_missing_input_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.go");
    let output = output_path(&dir);

    let err = generate(&input, &output, &table()).unwrap_err();

    assert!(matches!(
        err.kind(),
        GenerateErrorKind::Load(LoadError::Read { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_output_directory_is_an_output_create_error() {
    let input = template(TEMPLATE);
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("no-such-dir").join("mlkem1024.go");

    let err = generate(input.path(), &output, &table()).unwrap_err();

    assert!(matches!(
        err.kind(),
        GenerateErrorKind::OutputCreate { .. }
    ));
}

#[test]
fn test_cli_writes_output() {
    let input = template(TEMPLATE);
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    let result = run_cli(input.path(), &output);

    assert!(
        result.status.success(),
        "variantgen failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert_eq!(fs::read_to_string(&output).unwrap(), EXPECTED);
}

#[test]
fn test_cli_fails_on_invalid_input() {
    let input = template("package p\n\nfunc f( {\n");
    let dir = TempDir::new().unwrap();
    let output = output_path(&dir);

    let result = run_cli(input.path(), &output);

    assert!(!result.status.success());
    assert!(!result.stderr.is_empty());
    assert!(!output.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_failure_is_fatal() {
    let input = template(TEMPLATE);

    let err = generate(input.path(), Path::new("/dev/full"), &table()).unwrap_err();

    assert!(
        matches!(err.kind(), GenerateErrorKind::Write { .. }),
        "{err}"
    );
}
