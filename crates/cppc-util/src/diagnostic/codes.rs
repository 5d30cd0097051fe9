//! The closed set of lexical diagnostic ids and their static classification.
//!
//! Each [`DiagnosticId`] is tagged, once and for all, with a [`DiagnosticClass`]
//! and a message template carrying at most one `{}` slot for the diagnostic's
//! `extra` string. [`Handler`](super::Handler) resolves the class to a final
//! [`Level`](super::Level) using the active [`LangOptions`](super::LangOptions).

use super::level::DiagnosticClass;

/// One lexical diagnostic condition the core can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticId {
    // --- lexical warnings: lexing continues, token stream unaffected
    // except for `NeedsCleaning`.
    TrigraphIgnored,
    TrigraphConverted,
    BackslashNewlineSpace,
    MultiLineLineComment,
    NestedBlockComment,
    NoNewlineAtEof,
    DeprecatedMinMaxOperator,
    NullInFile,
    ExcessTokensAtDirectiveEnd,

    // --- lexical extensions: classification depends on LangOptions policy.
    LineCommentExtension,
    DollarInIdentifier,
    HexFloatRequiresExponentSign,

    // --- lexical errors: the lexer recovers and continues.
    UnterminatedString,
    UnterminatedChar,
    UnterminatedBlockComment,
    EmptyCharConstant,
    StrayCharacter,
    UnterminatedConditional,
    NullInString,
    NullInChar,
}

impl DiagnosticId {
    /// Static classification, independent of any `LangOptions` policy.
    pub const fn class(&self) -> DiagnosticClass {
        DIAGNOSTIC_TABLE[*self as usize].1
    }

    /// Message template; `{}` is replaced by the diagnostic's `extra` string,
    /// if the template contains one and `extra` is non-empty.
    pub const fn template(&self) -> &'static str {
        DIAGNOSTIC_TABLE[*self as usize].2
    }
}

type TableEntry = (DiagnosticId, DiagnosticClass, &'static str);

const DIAGNOSTIC_TABLE: [TableEntry; 20] = [
    (DiagnosticId::TrigraphIgnored, DiagnosticClass::Warning, "trigraph ignored"),
    (DiagnosticId::TrigraphConverted, DiagnosticClass::Warning, "trigraph converted to '{}'"),
    (
        DiagnosticId::BackslashNewlineSpace,
        DiagnosticClass::Warning,
        "backslash and newline separated by space",
    ),
    (DiagnosticId::MultiLineLineComment, DiagnosticClass::Warning, "multi-line line comment"),
    (DiagnosticId::NestedBlockComment, DiagnosticClass::Warning, "'/*' within block comment"),
    (DiagnosticId::NoNewlineAtEof, DiagnosticClass::Warning, "no newline at end of file"),
    (
        DiagnosticId::DeprecatedMinMaxOperator,
        DiagnosticClass::Warning,
        "use of deprecated min/max operator '{}'",
    ),
    (DiagnosticId::NullInFile, DiagnosticClass::Warning, "null character ignored"),
    (
        DiagnosticId::ExcessTokensAtDirectiveEnd,
        DiagnosticClass::Warning,
        "extra tokens at end of preprocessor directive",
    ),
    (
        DiagnosticId::LineCommentExtension,
        DiagnosticClass::Extension,
        "// comments are a language extension",
    ),
    (
        DiagnosticId::DollarInIdentifier,
        DiagnosticClass::Extension,
        "'$' in identifier is a language extension",
    ),
    (
        DiagnosticId::HexFloatRequiresExponentSign,
        DiagnosticClass::Extension,
        "hexadecimal floating constant requires an exponent",
    ),
    (DiagnosticId::UnterminatedString, DiagnosticClass::Error, "missing terminating '\"' character"),
    (DiagnosticId::UnterminatedChar, DiagnosticClass::Error, "missing terminating ' character"),
    (DiagnosticId::UnterminatedBlockComment, DiagnosticClass::Error, "unterminated /* comment"),
    (DiagnosticId::EmptyCharConstant, DiagnosticClass::Error, "empty character constant"),
    (DiagnosticId::StrayCharacter, DiagnosticClass::Error, "stray '{}' in program"),
    (
        DiagnosticId::UnterminatedConditional,
        DiagnosticClass::Error,
        "unterminated conditional directive",
    ),
    (DiagnosticId::NullInString, DiagnosticClass::Error, "null character in string literal"),
    (DiagnosticId::NullInChar, DiagnosticClass::Error, "null character in character constant"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_match_taxonomy() {
        assert_eq!(DiagnosticId::TrigraphIgnored.class(), DiagnosticClass::Warning);
        assert_eq!(DiagnosticId::LineCommentExtension.class(), DiagnosticClass::Extension);
        assert_eq!(DiagnosticId::UnterminatedString.class(), DiagnosticClass::Error);
    }

    #[test]
    fn templates_are_nonempty() {
        for entry in DIAGNOSTIC_TABLE.iter() {
            assert!(!entry.2.is_empty());
        }
    }
}
