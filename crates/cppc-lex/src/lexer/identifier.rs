//! Identifier and keyword-shaped-spelling lexing (spec.md §4.6, §4.5).

use cppc_util::diagnostic::DiagnosticId;
use cppc_util::SourceLocation;

use super::Lexer;
use crate::preprocessor::Preprocessor;
use crate::token::{Token, TokenKind};
use crate::unicode;

impl<'a> Lexer<'a> {
    /// The cursor has just consumed one identifier-start character. Scans
    /// the remaining identifier-continue run, interns the spelling, and
    /// writes an `Identifier` token. A lone `L` immediately followed by a
    /// quote is reclassified into a wide string/char literal instead,
    /// mirroring the "scan as identifier, then check for a literal prefix"
    /// strategy of recognizing `L"..."`/`L'...'` without a separate
    /// lookahead state.
    pub(super) fn lex_identifier(&mut self, token: &mut Token, start_loc: SourceLocation, pp: &mut dyn Preprocessor) {
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            if unicode::is_identifier_continue(ch) {
                self.cursor.consume(sz);
            } else if ch == b'$' && self.handler.lang_options().dollar_idents {
                self.handler.report(self.cursor.loc(), DiagnosticId::DollarInIdentifier, "");
                self.cursor.consume(sz);
            } else {
                break;
            }
        }

        let end_loc = self.cursor.loc();
        *token = Token::new(TokenKind::Identifier, start_loc, end_loc);
        token.set_needs_cleaning(self.range_needs_cleaning(start_loc, end_loc));
        let spelling = self.get_spelling(token);

        if spelling == "L" && !self.cursor.is_at_end() {
            let (next, _) = self.cursor.peek_char(self.handler);
            if next == b'"' || next == b'\'' {
                let (_, qsz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);
                self.cursor.consume(qsz);
                if next == b'"' {
                    self.lex_string_literal(token, start_loc, true, pp);
                } else {
                    self.lex_char_constant(token, start_loc, true, pp);
                }
                return;
            }
        }

        if let Ok(info) = self.identifiers.get_bytes(spelling.as_bytes()) {
            token.set_identifier_info(info);
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
    fn plain_identifier_is_interned() {
        let tok = lex_one("foo_bar123");
        assert!(tok.is(TokenKind::Identifier));
        assert_eq!(tok.identifier_info().unwrap().spelling(), "foo_bar123");
    }

    #[test]
    fn same_spelling_shares_the_same_info() {
        let buf = b"foo foo\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut a = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut a, &mut pp);
        let mut b = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut b, &mut pp);
        assert!(std::ptr::eq(a.identifier_info().unwrap(), b.identifier_info().unwrap()));
    }

    #[test]
    fn dollar_sign_extends_identifier_when_enabled() {
        let mut buf = b"a$b\0".to_vec();
        buf.truncate(buf.len());
        let handler = Handler::new(LangOptions::new().with_dollar_idents(true));
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert_eq!(tok.identifier_info().unwrap().spelling(), "a$b");
        assert!(handler.diagnostics().iter().any(|d| d.id == DiagnosticId::DollarInIdentifier));
    }

    #[test]
    fn wide_string_prefix_is_recognized() {
        let tok = lex_one("L\"hi\"");
        assert!(tok.is(TokenKind::WideStringLiteral));
    }

    #[test]
    fn wide_char_prefix_is_recognized() {
        let tok = lex_one("L'a'");
        assert!(tok.is(TokenKind::WideCharConstant));
    }

    #[test]
    fn bare_l_without_quote_stays_an_identifier() {
        let tok = lex_one("Length");
        assert!(tok.is(TokenKind::Identifier));
    }
}
