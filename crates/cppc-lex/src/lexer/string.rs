//! String, character, and angle-bracket filename literal lexing
//! (spec.md §4.6).

use cppc_util::diagnostic::DiagnosticId;
use cppc_util::SourceLocation;

use super::Lexer;
use crate::preprocessor::Preprocessor;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    /// The cursor has just consumed the opening `"`. Scans to the closing
    /// quote, treating a `\` as introducing a two-character escape (the
    /// escaped character's own decoding — including a further splice — is
    /// still handled by the usual protocol, just not interpreted here).
    ///
    /// An unterminated literal is not returned as a token of its own: it is
    /// discarded (matching the original's `BufferPtr = CurPtr - 1; return
    /// LexTokenInternal(Result);`) and lexing resumes from exactly where the
    /// scan stopped — the closing quote never arrived, so there is no
    /// `string_literal` to hand back. Returns `true` if `token` holds a real
    /// string-literal token, `false` if it holds whatever real token lexing
    /// resumed with instead.
    pub(super) fn lex_string_literal(
        &mut self,
        token: &mut Token,
        start_loc: SourceLocation,
        is_wide: bool,
        pp: &mut dyn Preprocessor,
    ) -> bool {
        let mut terminated = false;
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            match ch {
                b'"' => {
                    self.cursor.consume(sz);
                    terminated = true;
                    break;
                }
                b'\n' | b'\r' => break,
                0 => {
                    self.handler.report(self.cursor.loc(), DiagnosticId::NullInString, "");
                    self.cursor.consume(sz);
                }
                b'\\' => {
                    self.cursor.consume(sz);
                    if !self.cursor.is_at_end() {
                        let (_, esz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);
                        self.cursor.consume(esz);
                    }
                }
                _ => {
                    self.cursor.consume(sz);
                }
            }
        }
        if !terminated {
            self.handler.report(start_loc, DiagnosticId::UnterminatedString, "");
            self.lex(token, pp);
            return false;
        }
        let kind = if is_wide { TokenKind::WideStringLiteral } else { TokenKind::StringLiteral };
        let end_loc = self.cursor.loc();
        *token = Token::new(kind, start_loc, end_loc);
        token.set_needs_cleaning(self.range_needs_cleaning(start_loc, end_loc));
        true
    }

    /// As [`Self::lex_string_literal`], but closes on `'` and additionally
    /// diagnoses an empty constant (`''`) — which, like an unterminated
    /// constant, is discarded and re-lexed rather than handed back as a
    /// `char_constant` token, matching the original's `BufferPtr = CurPtr;
    /// return LexTokenInternal(Result);` on the empty-constant path. Returns
    /// `true` if `token` holds a real char-constant token, `false` if it
    /// holds whatever real token lexing resumed with instead.
    pub(super) fn lex_char_constant(
        &mut self,
        token: &mut Token,
        start_loc: SourceLocation,
        is_wide: bool,
        pp: &mut dyn Preprocessor,
    ) -> bool {
        let mut terminated = false;
        let mut char_count = 0u32;
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            match ch {
                b'\'' => {
                    self.cursor.consume(sz);
                    terminated = true;
                    break;
                }
                b'\n' | b'\r' => break,
                0 => {
                    self.handler.report(self.cursor.loc(), DiagnosticId::NullInChar, "");
                    self.cursor.consume(sz);
                    char_count += 1;
                }
                b'\\' => {
                    self.cursor.consume(sz);
                    if !self.cursor.is_at_end() {
                        let (_, esz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);
                        self.cursor.consume(esz);
                    }
                    char_count += 1;
                }
                _ => {
                    self.cursor.consume(sz);
                    char_count += 1;
                }
            }
        }
        if !terminated {
            self.handler.report(start_loc, DiagnosticId::UnterminatedChar, "");
            self.lex(token, pp);
            return false;
        }
        if char_count == 0 {
            self.handler.report(start_loc, DiagnosticId::EmptyCharConstant, "");
            self.lex(token, pp);
            return false;
        }
        let kind = if is_wide { TokenKind::WideCharConstant } else { TokenKind::CharConstant };
        let end_loc = self.cursor.loc();
        *token = Token::new(kind, start_loc, end_loc);
        token.set_needs_cleaning(self.range_needs_cleaning(start_loc, end_loc));
        true
    }

    /// The cursor has just consumed the opening `<` of an `#include <...>`
    /// argument. No escape processing — filenames have none — so this is
    /// simpler than [`Self::lex_string_literal`]. As there, an unterminated
    /// literal is discarded and lexing resumes rather than being handed back
    /// as an `angle_string_literal` token; returns `true`/`false` the same
    /// way.
    pub(super) fn lex_angled_string_literal(
        &mut self,
        token: &mut Token,
        start_loc: SourceLocation,
        pp: &mut dyn Preprocessor,
    ) -> bool {
        let mut terminated = false;
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            match ch {
                b'>' => {
                    self.cursor.consume(sz);
                    terminated = true;
                    break;
                }
                b'\n' | b'\r' => break,
                _ => {
                    self.cursor.consume(sz);
                }
            }
        }
        if !terminated {
            self.handler.report(start_loc, DiagnosticId::UnterminatedString, "");
            self.lex(token, pp);
            return false;
        }
        let end_loc = self.cursor.loc();
        *token = Token::new(TokenKind::AngleStringLiteral, start_loc, end_loc);
        token.set_needs_cleaning(self.range_needs_cleaning(start_loc, end_loc));
        true
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
    fn plain_string_literal() {
        let tok = lex_one(r#""hello""#);
        assert!(tok.is(TokenKind::StringLiteral));
        assert!(!tok.needs_cleaning());
    }

    #[test]
    fn escaped_quote_does_not_end_the_literal() {
        let buf = br#""a\"b""#.to_vec();
        let mut buf = buf;
        buf.push(0);
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(tok.is(TokenKind::StringLiteral));
        assert!(!handler.has_errors());
    }

    #[test]
    fn unterminated_string_is_diagnosed() {
        let buf = b"\"never closes\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(handler.diagnostics().iter().any(|d| d.id == DiagnosticId::UnterminatedString));
    }

    #[test]
    fn empty_char_constant_is_diagnosed() {
        // `''` alone with no trailing token: the empty constant is
        // discarded and lexing resumes, so the token reaching the caller
        // is `eof`, not a `char_constant` standing in for the empty pair.
        let buf = b"''\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(handler.diagnostics().iter().any(|d| d.id == DiagnosticId::EmptyCharConstant));
        assert!(tok.is(TokenKind::Eof));
    }

    #[test]
    fn angled_filename_literal() {
        let buf = b"<foo/bar.h>\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut token = Token::eof_at(SourceLocation::INVALID);
        lexer.lex_include_filename(&mut token, &mut pp);
        assert!(token.is(TokenKind::AngleStringLiteral));
    }
}
