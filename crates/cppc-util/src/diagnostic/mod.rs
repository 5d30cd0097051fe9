//! Diagnostic dispatch: the lexer's only channel for reporting problems.
//!
//! A diagnostic is the triple `(level, location, diagnostic_id, extra)`
//! described by the specification this crate implements. The level a
//! diagnostic is ultimately reported at is not fixed at the call site: it is
//! derived from the [`DiagnosticId`]'s static [`DiagnosticClass`] and the
//! active [`LangOptions`] policy, mirroring a C-family front-end's
//! `Extension`-resolves-via-flags, `Warning`-upgrades-to-`Error` behavior.

mod builder;
mod codes;
mod level;

pub use builder::{DiagnosticBuilder, SourceSnippet};
pub use codes::DiagnosticId;
pub use level::{DiagnosticClass, LabelStyle, Level};

use crate::source_location::SourceLocation;
use std::cell::RefCell;

/// Language feature flags and diagnostic policy consulted by the lexer.
///
/// Carries the eight feature flags the lexer's dispatch switch branches on,
/// plus the three policy flags that resolve `Extension`/`Warning`
/// classifications to a final [`Level`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LangOptions {
    pub trigraphs: bool,
    pub bcpl_comment: bool,
    pub dollar_idents: bool,
    pub digraphs: bool,
    pub cplusplus: bool,
    pub cpp_min_max: bool,
    pub objc1: bool,
    pub hex_floats: bool,

    pub warn_on_extensions: bool,
    pub error_on_extensions: bool,
    pub warnings_as_errors: bool,
}

impl LangOptions {
    /// C99-ish defaults: trigraphs and digraphs on, line comments on,
    /// extensions warned about but not errors.
    pub const fn new() -> Self {
        Self {
            trigraphs: true,
            bcpl_comment: true,
            dollar_idents: false,
            digraphs: true,
            cplusplus: false,
            cpp_min_max: false,
            objc1: false,
            hex_floats: false,
            warn_on_extensions: true,
            error_on_extensions: false,
            warnings_as_errors: false,
        }
    }

    pub const fn with_trigraphs(mut self, v: bool) -> Self {
        self.trigraphs = v;
        self
    }
    pub const fn with_bcpl_comment(mut self, v: bool) -> Self {
        self.bcpl_comment = v;
        self
    }
    pub const fn with_dollar_idents(mut self, v: bool) -> Self {
        self.dollar_idents = v;
        self
    }
    pub const fn with_digraphs(mut self, v: bool) -> Self {
        self.digraphs = v;
        self
    }
    pub const fn with_cplusplus(mut self, v: bool) -> Self {
        self.cplusplus = v;
        self
    }
    pub const fn with_cpp_min_max(mut self, v: bool) -> Self {
        self.cpp_min_max = v;
        self
    }
    pub const fn with_objc1(mut self, v: bool) -> Self {
        self.objc1 = v;
        self
    }
    pub const fn with_hex_floats(mut self, v: bool) -> Self {
        self.hex_floats = v;
        self
    }
    pub const fn with_warn_on_extensions(mut self, v: bool) -> Self {
        self.warn_on_extensions = v;
        self
    }
    pub const fn with_error_on_extensions(mut self, v: bool) -> Self {
        self.error_on_extensions = v;
        self
    }
    pub const fn with_warnings_as_errors(mut self, v: bool) -> Self {
        self.warnings_as_errors = v;
        self
    }

    /// Resolves a diagnostic id's static class to a final level under this
    /// policy. `Extension` becomes `Error`, `Warning`, or `Ignored`;
    /// `Warning` becomes `Error` when `warnings_as_errors` is set.
    pub fn diagnostic_level(&self, id: DiagnosticId) -> Level {
        match id.class() {
            DiagnosticClass::Note => Level::Note,
            DiagnosticClass::Fatal => Level::Fatal,
            DiagnosticClass::Error => Level::Error,
            DiagnosticClass::Extension => {
                if self.error_on_extensions {
                    Level::Error
                } else if self.warn_on_extensions {
                    Level::Warning
                } else {
                    Level::Ignored
                }
            }
            DiagnosticClass::Warning => {
                if self.warnings_as_errors {
                    Level::Error
                } else {
                    Level::Warning
                }
            }
        }
    }
}

impl Default for LangOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A single emitted diagnostic, resolved to its final level.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub location: SourceLocation,
    pub id: DiagnosticId,
    pub extra: String,
}

impl Diagnostic {
    /// Renders the id's message template, substituting `extra` into its
    /// `{}` slot if present.
    pub fn message(&self) -> String {
        let template = self.id.template();
        if template.contains("{}") {
            template.replacen("{}", &self.extra, 1)
        } else {
            template.to_string()
        }
    }
}

/// Collects diagnostics emitted while processing one translation unit.
///
/// Mirrors the single-threaded, process-scoped-per-translation-unit model:
/// a `Handler` is owned by whichever component drives the lexer (typically
/// the external preprocessor) and is never shared across threads.
pub struct Handler {
    lang_opts: LangOptions,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new(lang_opts: LangOptions) -> Self {
        Self {
            lang_opts,
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn lang_options(&self) -> &LangOptions {
        &self.lang_opts
    }

    /// Classifies and records a diagnostic. This is the primitive every
    /// other reporting path (including [`DiagnosticBuilder::emit`]) goes
    /// through.
    pub fn report(&self, location: SourceLocation, id: DiagnosticId, extra: impl Into<String>) {
        let level = self.lang_opts.diagnostic_level(id);
        if level == Level::Ignored {
            return;
        }
        self.diagnostics.borrow_mut().push(Diagnostic {
            level,
            location,
            id,
            extra: extra.into(),
        });
    }

    pub fn build(&self, location: SourceLocation, id: DiagnosticId) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder::new(self, location, id)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().iter().filter(|d| d.level.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_resolves_per_policy() {
        let ignore = LangOptions::new().with_warn_on_extensions(false);
        assert_eq!(ignore.diagnostic_level(DiagnosticId::DollarInIdentifier), Level::Ignored);

        let warn = LangOptions::new().with_warn_on_extensions(true);
        assert_eq!(warn.diagnostic_level(DiagnosticId::DollarInIdentifier), Level::Warning);

        let error = LangOptions::new()
            .with_warn_on_extensions(true)
            .with_error_on_extensions(true);
        assert_eq!(error.diagnostic_level(DiagnosticId::DollarInIdentifier), Level::Error);
    }

    #[test]
    fn warnings_as_errors_upgrades_warning() {
        let opts = LangOptions::new().with_warnings_as_errors(true);
        assert_eq!(opts.diagnostic_level(DiagnosticId::TrigraphIgnored), Level::Error);
    }

    #[test]
    fn errors_are_never_downgraded() {
        let opts = LangOptions::new();
        assert_eq!(opts.diagnostic_level(DiagnosticId::UnterminatedString), Level::Error);
    }

    #[test]
    fn handler_records_and_counts() {
        let handler = Handler::new(LangOptions::new());
        handler.report(SourceLocation::INVALID, DiagnosticId::UnterminatedString, "");
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn handler_drops_ignored_diagnostics() {
        let handler = Handler::new(LangOptions::new().with_warn_on_extensions(false));
        handler.report(SourceLocation::INVALID, DiagnosticId::LineCommentExtension, "");
        assert_eq!(handler.diagnostics().len(), 0);
    }

    #[test]
    fn message_substitutes_extra() {
        let diag = Diagnostic {
            level: Level::Warning,
            location: SourceLocation::INVALID,
            id: DiagnosticId::TrigraphConverted,
            extra: "#".to_string(),
        };
        assert_eq!(diag.message(), "trigraph converted to '#'");
    }

    #[test]
    fn handler_clear() {
        let handler = Handler::new(LangOptions::new());
        handler.report(SourceLocation::INVALID, DiagnosticId::UnterminatedString, "");
        handler.clear();
        assert!(!handler.has_errors());
    }
}
