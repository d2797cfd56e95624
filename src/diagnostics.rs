//! Diagnostic formatting for the generator CLI.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::errors::{GenerateError, GenerateErrorKind, SyntaxError};

/// Normalize a span to ensure end > start (required by ariadne).
pub fn normalize_span(start: usize, end: usize) -> (usize, usize) {
    (start, end.max(start + 1))
}

/// Label color for an error.
pub fn error_color(kind: &GenerateErrorKind) -> Color {
    match kind {
        GenerateErrorKind::Load(_) => Color::Red,
        GenerateErrorKind::Render(_) => Color::Magenta,
        _ => Color::Yellow,
    }
}

/// Print a syntax error using ariadne for pretty output.
pub fn print_syntax_error(error: &SyntaxError, color: Color) {
    let path = error.path.display().to_string();
    let (start, end) = normalize_span(error.span.start, error.span.end);

    Report::build(ReportKind::Error, (path.as_str(), start..end))
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(format!("syntax error: {}", error.message))
        .with_label(
            Label::new((path.as_str(), start..end))
                .with_message(&error.message)
                .with_color(color),
        )
        .finish()
        .eprint((path.as_str(), Source::from(error.text.as_str())))
        .ok();
}

/// Report a fatal error on stderr.
pub fn report_error(error: &GenerateError) {
    tracing::error!("{error}");
    if let Some(syntax) = error.syntax_error() {
        print_syntax_error(syntax, error_color(error.kind()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LoadError, RenderError, TableError};
    use std::path::PathBuf;

    fn syntax() -> SyntaxError {
        SyntaxError {
            path: PathBuf::from("bad.go"),
            line: 1,
            column: 1,
            span: 0..3,
            message: "unexpected `bad`".to_owned(),
            text: "bad".to_owned(),
        }
    }

    #[test]
    fn test_error_color() {
        assert_eq!(
            error_color(&GenerateErrorKind::Load(LoadError::Syntax(syntax()))),
            Color::Red
        );
        assert_eq!(
            error_color(&GenerateErrorKind::Render(RenderError::Invalid(syntax()))),
            Color::Magenta
        );
        assert_eq!(
            error_color(&GenerateErrorKind::Table(TableError::DuplicateKey("k".to_owned()))),
            Color::Yellow
        );
    }

    #[test]
    fn test_normalize_span_valid() {
        assert_eq!(normalize_span(0, 10), (0, 10));
    }

    #[test]
    fn test_normalize_span_zero_length() {
        assert_eq!(normalize_span(5, 5), (5, 6));
    }

    #[test]
    fn test_syntax_error_display() {
        assert_eq!(syntax().to_string(), "bad.go:1:1: unexpected `bad`");
    }
}
