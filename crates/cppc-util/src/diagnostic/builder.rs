//! Fluent construction of ad-hoc diagnostics, and source-line snippet
//! rendering for displaying them.
//!
//! Most diagnostics the lexer emits go through [`super::Handler::report`]
//! directly with a [`super::DiagnosticId`]. This builder exists for the
//! handful of call sites that need to attach an `extra` string built up
//! incrementally, or that want a rendered [`SourceSnippet`] alongside the
//! structured diagnostic (tests, and `FileManager`/`SourceManager` I/O
//! failures that don't have a natural `DiagnosticId` of their own).

use super::{DiagnosticId, Handler};
use crate::source_location::SourceLocation;

/// A source code snippet for display alongside a diagnostic: one line of
/// text plus a caret span under the relevant columns.
#[derive(Clone, Debug)]
pub struct SourceSnippet {
    pub line: String,
    pub line_number: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub label: Option<String>,
}

impl SourceSnippet {
    pub fn new(
        line: impl Into<String>,
        line_number: usize,
        start_column: usize,
        end_column: usize,
        label: Option<impl Into<String>>,
    ) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column,
            end_column,
            label: label.map(Into::into),
        }
    }

    /// A snippet with no highlighted range, just a point at `column`.
    pub fn point(line: impl Into<String>, line_number: usize, column: usize) -> Self {
        Self { line: line.into(), line_number, start_column: column, end_column: column, label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Renders the line, a caret line underneath the highlighted columns,
    /// and the label (if any).
    pub fn format(&self) -> String {
        let width = self.line_number.to_string().len().max(3);
        let mut out = format!("{:>width$} | {}\n", self.line_number, self.line, width = width);
        out.push_str(&format!("{:>width$} | ", "", width = width));
        out.push_str(&" ".repeat(self.start_column.saturating_sub(1)));
        out.push_str(&"^".repeat((self.end_column.saturating_sub(self.start_column)).max(1)));
        if let Some(label) = &self.label {
            out.push(' ');
            out.push_str(label);
        }
        out
    }
}

/// Fluent builder for a diagnostic, ending in [`Self::emit`] to report it
/// through a [`Handler`].
pub struct DiagnosticBuilder<'h> {
    handler: &'h Handler,
    location: SourceLocation,
    id: DiagnosticId,
    extra: String,
    snippet: Option<SourceSnippet>,
}

impl<'h> DiagnosticBuilder<'h> {
    pub fn new(handler: &'h Handler, location: SourceLocation, id: DiagnosticId) -> Self {
        Self { handler, location, id, extra: String::new(), snippet: None }
    }

    /// Sets (or replaces) the `extra` string substituted into the id's
    /// message template.
    pub fn arg(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippet = Some(snippet);
        self
    }

    /// Reports the diagnostic through the handler. Returns the rendered
    /// snippet, if one was attached, for callers that also want to print it.
    pub fn emit(self) -> Option<String> {
        self.handler.report(self.location, self.id, self.extra);
        self.snippet.map(|s| s.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::LangOptions;

    #[test]
    fn snippet_point_has_equal_columns() {
        let snippet = SourceSnippet::point("int x;", 1, 5);
        assert_eq!(snippet.start_column, snippet.end_column);
    }

    #[test]
    fn snippet_format_contains_line_and_caret() {
        let snippet = SourceSnippet::new("int x;", 1, 5, 6, Some("here"));
        let rendered = snippet.format();
        assert!(rendered.contains("int x;"));
        assert!(rendered.contains('^'));
        assert!(rendered.contains("here"));
    }

    #[test]
    fn builder_emits_through_handler() {
        let handler = Handler::new(LangOptions::new());
        handler
            .build(SourceLocation::INVALID, DiagnosticId::StrayCharacter)
            .arg("@")
            .emit();
        assert!(handler.has_errors());
        assert_eq!(handler.diagnostics()[0].extra, "@");
    }

    #[test]
    fn builder_returns_rendered_snippet() {
        let handler = Handler::new(LangOptions::new());
        let rendered = handler
            .build(SourceLocation::INVALID, DiagnosticId::UnterminatedString)
            .snippet(SourceSnippet::point("\"hello", 1, 1))
            .emit();
        assert!(rendered.is_some());
        assert!(rendered.unwrap().contains('^'));
    }
}
