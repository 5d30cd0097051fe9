//! Diagnostic severity levels and the classification they derive from.

use std::fmt;

/// The severity a diagnostic is actually reported at, after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Suppressed entirely; recorded for statistics only.
    Ignored,
    Note,
    Warning,
    Error,
    /// Unrecoverable; the caller should stop processing this translation unit.
    Fatal,
}

impl Level {
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Level::Ignored => "ignored",
            Level::Note => "note",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The class a diagnostic id is tagged with in the static table, independent
/// of the `LangOptions` policy that resolves it to a final [`Level`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticClass {
    Note,
    Warning,
    /// Resolves to `Ignored`, `Warning`, or `Error` depending on
    /// `warn_on_extensions` / `error_on_extensions`.
    Extension,
    Error,
    Fatal,
}

/// Style for span labels in multi-span diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

impl LabelStyle {
    #[inline]
    pub const fn underline_char(&self) -> char {
        match self {
            LabelStyle::Primary => '^',
            LabelStyle::Secondary => '-',
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LabelStyle::Primary => "^",
            LabelStyle::Secondary => "-",
        }
    }
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_error() {
        assert!(Level::Error.is_error());
        assert!(Level::Fatal.is_error());
        assert!(!Level::Warning.is_error());
        assert!(!Level::Ignored.is_error());
    }

    #[test]
    fn level_ordering() {
        assert!(Level::Fatal > Level::Error);
        assert!(Level::Error > Level::Warning);
        assert!(Level::Warning > Level::Note);
        assert!(Level::Note > Level::Ignored);
    }

    #[test]
    fn level_display() {
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Fatal), "fatal error");
    }

    #[test]
    fn label_style_chars() {
        assert_eq!(LabelStyle::Primary.underline_char(), '^');
        assert_eq!(LabelStyle::Secondary.underline_char(), '-');
    }
}
