//! Generation pipeline.
//!
//! ```text
//! input path
//!     │
//!     ▼
//! stage_load ─► SourceTree
//!     │
//!     ▼
//! stage_filter ─► SourceTree (const blocks dropped, header/import comments detached)
//!     │
//!     ▼
//! stage_rename ─► SourceTree (table keys renamed in name tokens)
//!     │
//!     ▼
//! stage_rewrite_comments ─► SourceTree (table keys replaced in comment text)
//!     │
//!     ▼
//! stage_render ─► String (header + canonical Go source)
//!     │
//!     ▼
//! write_output ─► output path
//! ```
//!
//! Every stage either succeeds or aborts the run. The output file is only
//! created once rendering has succeeded.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::{GenerateError, GenerateResult};
use crate::filter::{FilterReport, filter_declarations};
use crate::render::{GENERATOR, render};
use crate::rewrite::{rename_identifiers, rewrite_comments};
use crate::source::{SourceTree, load, parse_source};
use crate::table::SubstitutionTable;

/// Stage 1: read and parse the template.
pub fn stage_load(input: &Path) -> GenerateResult<SourceTree> {
    let tree = load(input)?;
    tracing::info!(
        input = %input.display(),
        decls = tree.decls.len(),
        "Loaded template"
    );
    Ok(tree)
}

/// Stage 2: drop shared declarations and detach duplicated comments.
pub fn stage_filter(tree: &mut SourceTree) -> FilterReport {
    let report = filter_declarations(tree);
    tracing::info!(
        kept = report.kept,
        dropped = report.dropped,
        detached_groups = report.detached_groups,
        "Filtered declarations"
    );
    report
}

/// Stage 3: rename identifiers.
pub fn stage_rename(tree: &mut SourceTree, table: &SubstitutionTable) -> usize {
    let renamed = rename_identifiers(tree, table);
    tracing::info!(renamed, "Renamed identifiers");
    renamed
}

/// Stage 4: rewrite comment text.
pub fn stage_rewrite_comments(tree: &mut SourceTree, table: &SubstitutionTable) -> usize {
    let changed = rewrite_comments(tree, table);
    tracing::info!(changed, "Rewrote comments");
    changed
}

/// Stage 5: render the final source.
pub fn stage_render(tree: &SourceTree) -> GenerateResult<String> {
    let text = render(tree, GENERATOR)?;
    tracing::debug!(bytes = text.len(), "Rendered output");
    Ok(text)
}

/// Stages 2 to 5 on an already loaded tree.
pub fn transform(mut tree: SourceTree, table: &SubstitutionTable) -> GenerateResult<String> {
    stage_filter(&mut tree);
    stage_rename(&mut tree, table);
    stage_rewrite_comments(&mut tree, table);
    stage_render(&tree)
}

/// Run the whole pipeline on in-memory text; `path` is used in error messages.
pub fn generate_source(path: &Path, text: &str, table: &SubstitutionTable) -> GenerateResult<String> {
    let tree = parse_source(path, text)?;
    transform(tree, table)
}

/// Read `input`, derive the variant and write it to `output`.
pub fn generate(input: &Path, output: &Path, table: &SubstitutionTable) -> GenerateResult<()> {
    if input.as_os_str().is_empty() {
        return Err(GenerateError::missing_path("input"));
    }
    if output.as_os_str().is_empty() {
        return Err(GenerateError::missing_path("output"));
    }

    let tree = stage_load(input)?;
    let text = transform(tree, table)?;
    write_output(output, &text)?;
    tracing::info!(output = %output.display(), "Wrote generated file");
    Ok(())
}

/// Create `path` and write `text` to it.
pub fn write_output(path: &Path, text: &str) -> GenerateResult<()> {
    let mut file = File::create(path).map_err(|e| GenerateError::output_create(path, e))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| GenerateError::write(path, e))
}
