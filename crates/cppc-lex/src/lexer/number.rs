//! Numeric constant lexing (spec.md §4.6).
//!
//! A numeric constant is scanned as a single maximal run, the same way the
//! original front-end does it: integers, floats, and every suffix combo
//! collapse into one `NumericConstant` token here, deferred to whoever
//! interprets its spelling downstream (out of scope for this core).

use cppc_util::diagnostic::DiagnosticId;
use cppc_util::SourceLocation;

use super::Lexer;
use crate::token::{Token, TokenKind};
use crate::unicode;

impl<'a> Lexer<'a> {
    /// The cursor has just consumed the constant's leading digit (or `.`
    /// followed by a digit, handled by the caller). Scans the maximal run
    /// of digits/letters/`.`, additionally admitting a `+`/`-` immediately
    /// after an `e`/`E` exponent marker (unconditionally) or after a
    /// `p`/`P` one (only when `LangOptions::hex_floats` is set), so `1e-10`
    /// always scans as one token and `0x1p+3` does too under hex floats.
    pub(super) fn lex_numeric_constant(&mut self, token: &mut Token, start_loc: SourceLocation) {
        let mut prev: u8 = 0;
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            // `e`/`E` exponent signs are always part of the constant; a
            // `p`/`P` sign only continues the run under hex-float support,
            // matching the original front-end's `Features.HexFloats` gate.
            let is_exponent_sign = (ch == b'+' || ch == b'-')
                && (matches!(prev, b'e' | b'E')
                    || (matches!(prev, b'p' | b'P') && self.handler.lang_options().hex_floats));
            if unicode::is_numeric_continue(ch) || is_exponent_sign {
                self.cursor.consume(sz);
                prev = ch;
            } else {
                break;
            }
        }

        let end_loc = self.cursor.loc();
        *token = Token::new(TokenKind::NumericConstant, start_loc, end_loc);
        token.set_needs_cleaning(self.range_needs_cleaning(start_loc, end_loc));

        let spelling = self.get_spelling(token);
        let is_hex = spelling.len() > 2 && (spelling.starts_with("0x") || spelling.starts_with("0X"));
        if is_hex && spelling.contains('.') && !spelling.contains('p') && !spelling.contains('P') {
            self.handler.report(start_loc, DiagnosticId::HexFloatRequiresExponentSign, "");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::StubPreprocessor;
    use cppc_util::{Handler, IdentifierTable, LangOptions};

    fn lex_one(src: &str) -> Token {
        let mut buf = src.as_bytes().to_vec();
        buf.push(0);
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        tok
    }

    #[test]
    fn plain_integer() {
        assert!(lex_one("123").is(TokenKind::NumericConstant));
    }

    #[test]
    fn float_with_suffix() {
        let tok = lex_one("3.14f");
        assert!(tok.is(TokenKind::NumericConstant));
    }

    #[test]
    fn exponent_with_sign_is_one_token() {
        let buf = b"1e-10 x\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut first = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut first, &mut pp);
        assert!(first.is(TokenKind::NumericConstant));
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn hex_exponent_sign_splits_without_hex_floats() {
        let buf = b"0x1p+3 x\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut first = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut first, &mut pp);
        assert!(first.is(TokenKind::NumericConstant));
        assert_eq!(first.len(), 4); // "0x1p", stops before the sign
        let mut second = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut second, &mut pp);
        assert!(second.is(TokenKind::Plus));
    }

    #[test]
    fn hex_exponent_sign_is_one_token_with_hex_floats() {
        let buf = b"0x1p+3 x\0".to_vec();
        let handler = Handler::new(LangOptions::new().with_hex_floats(true));
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut first = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut first, &mut pp);
        assert!(first.is(TokenKind::NumericConstant));
        assert_eq!(first.len(), 6); // "0x1p+3"
    }

    #[test]
    fn hex_constant_without_dot_is_not_flagged() {
        let tok = lex_one("0x1A");
        assert!(tok.is(TokenKind::NumericConstant));
    }

    #[test]
    fn hex_float_missing_exponent_is_diagnosed() {
        let buf = b"0x1.8\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(handler.diagnostics().iter().any(|d| d.id == DiagnosticId::HexFloatRequiresExponentSign));
    }
}
