//! Error types for the generator pipeline

use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use derive_more::{Display, From};

pub type GenerateResult<T> = Result<T, GenerateError>;

#[derive(Display, Debug, From)]
#[display("{kind}")]
pub struct GenerateError {
    #[from]
    kind: Box<GenerateErrorKind>,
}

impl<E> From<E> for GenerateError
where
    GenerateErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        GenerateError {
            kind: Box::new(GenerateErrorKind::from(error)),
        }
    }
}

impl GenerateError {
    pub fn kind(&self) -> &GenerateErrorKind {
        &self.kind
    }

    pub(crate) fn output_create(path: &Path, source: io::Error) -> Self {
        GenerateErrorKind::OutputCreate {
            path: path.to_owned(),
            source,
        }
        .into()
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        GenerateErrorKind::Write {
            path: path.to_owned(),
            source,
        }
        .into()
    }

    pub(crate) fn missing_path(which: &'static str) -> Self {
        GenerateErrorKind::MissingPath(which).into()
    }

    /// The syntax error behind a load or render failure, if any.
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match &*self.kind {
            GenerateErrorKind::Load(LoadError::Syntax(e)) => Some(e),
            GenerateErrorKind::Render(RenderError::Invalid(e)) => Some(e),
            _ => None,
        }
    }
}

#[derive(Display, Debug)]
pub enum GenerateErrorKind {
    #[display("{_0}")]
    Load(LoadError),

    #[display("cannot create {}: {source}", path.display())]
    OutputCreate { path: PathBuf, source: io::Error },

    #[display("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[display("{_0}")]
    Render(RenderError),

    #[display("invalid substitution table: {_0}")]
    Table(TableError),

    #[display("missing {_0} path")]
    MissingPath(&'static str),
}

impl From<LoadError> for GenerateErrorKind {
    fn from(error: LoadError) -> Self {
        GenerateErrorKind::Load(error)
    }
}

impl From<RenderError> for GenerateErrorKind {
    fn from(error: RenderError) -> Self {
        GenerateErrorKind::Render(error)
    }
}

impl From<TableError> for GenerateErrorKind {
    fn from(error: TableError) -> Self {
        GenerateErrorKind::Table(error)
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            GenerateErrorKind::Load(e) => Some(e),
            GenerateErrorKind::OutputCreate { source, .. } => Some(source),
            GenerateErrorKind::Write { source, .. } => Some(source),
            GenerateErrorKind::Render(e) => Some(e),
            GenerateErrorKind::Table(e) => Some(e),
            GenerateErrorKind::MissingPath(_) => None,
        }
    }
}

#[derive(Display, Debug)]
pub enum LoadError {
    #[display("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[display("cannot load the Go grammar: {_0}")]
    Language(tree_sitter::LanguageError),

    #[display("{_0}")]
    Syntax(SyntaxError),
}

impl From<tree_sitter::LanguageError> for LoadError {
    fn from(error: tree_sitter::LanguageError) -> Self {
        LoadError::Language(error)
    }
}

impl From<SyntaxError> for LoadError {
    fn from(error: SyntaxError) -> Self {
        LoadError::Syntax(error)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Read { source, .. } => Some(source),
            LoadError::Language(e) => Some(e),
            LoadError::Syntax(e) => Some(e),
        }
    }
}

#[derive(Display, Debug)]
pub enum RenderError {
    #[display("rendered output is not valid Go: {_0}")]
    Invalid(SyntaxError),

    #[display("cannot load the Go grammar: {_0}")]
    Language(tree_sitter::LanguageError),
}

impl From<tree_sitter::LanguageError> for RenderError {
    fn from(error: tree_sitter::LanguageError) -> Self {
        RenderError::Language(error)
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Invalid(e) => Some(e),
            RenderError::Language(e) => Some(e),
        }
    }
}

/// A syntax error located in some Go text.
#[derive(Display, Debug, Clone, PartialEq, Eq, derive_more::Error)]
#[display("{}:{line}:{column}: {message}", path.display())]
pub struct SyntaxError {
    pub path: PathBuf,
    /// 1-based.
    pub line: usize,
    /// 1-based, in bytes.
    pub column: usize,
    pub span: Range<usize>,
    pub message: String,
    /// The text the span points into, kept for diagnostics.
    pub text: String,
}

#[derive(Display, Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub enum TableError {
    #[display("duplicate key `{_0}`")]
    DuplicateKey(#[error(not(source))] String),

    #[display("value `{value}` of key `{key}` is itself a key")]
    ValueIsKey { key: String, value: String },

    #[display("exact-only key `{_0}` is not in the table")]
    MissingExactOnlyKey(#[error(not(source))] String),
}
