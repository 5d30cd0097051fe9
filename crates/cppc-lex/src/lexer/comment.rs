//! Comment skipping: `//` line comments and `/* */` block comments
//! (spec.md §4.6).

use cppc_util::diagnostic::DiagnosticId;
use cppc_util::SourceLocation;

use super::Lexer;
use crate::preprocessor::Preprocessor;
use crate::token::Token;

impl<'a> Lexer<'a> {
    /// The cursor has just consumed a `/`. Peeks the following character to
    /// decide whether this begins a comment; if so, skips it and returns
    /// `true` so the caller re-dispatches. Otherwise produces the ordinary
    /// `/` or `/=` operator token into `token` and returns `false`.
    pub(super) fn try_lex_slash(
        &mut self,
        token: &mut Token,
        start_loc: SourceLocation,
        pp: &mut dyn Preprocessor,
    ) -> bool {
        let (next, next_sz) = self.cursor.peek_char(self.handler);
        match next {
            b'/' => {
                self.cursor.consume(next_sz);
                if !self.handler.lang_options().bcpl_comment && !self.line_comment_warned {
                    self.handler.report(start_loc, DiagnosticId::LineCommentExtension, "");
                    self.line_comment_warned = true;
                }
                self.skip_bcpl_comment();
                true
            }
            b'*' => {
                self.cursor.consume(next_sz);
                self.skip_block_comment(start_loc);
                true
            }
            _ => {
                self.lex_operator(token, start_loc, b'/', pp);
                false
            }
        }
    }

    /// Scans to (not past) the next physical newline. A `\` that splices
    /// into the next physical line is absorbed by the decode protocol, so
    /// the comment logically continues onto that line too; the first such
    /// occurrence is reported once as [`DiagnosticId::MultiLineLineComment`].
    fn skip_bcpl_comment(&mut self) {
        let mut warned = false;
        loop {
            if self.cursor.is_at_end() {
                return;
            }
            let pos = self.cursor.pos();
            if self.cursor.peek_raw() == b'\\' && !warned {
                let (_, sz) = self.cursor.get_char_and_size(pos, self.handler);
                if sz > 1 {
                    self.handler.report(self.cursor.loc(), DiagnosticId::MultiLineLineComment, "");
                    warned = true;
                    self.cursor.consume(sz);
                    continue;
                }
            }
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            if ch == b'\n' || ch == b'\r' {
                return;
            }
            self.cursor.consume(sz);
        }
    }

    /// Scans for the closing `*/`. A `/*` encountered before the close is
    /// reported once as [`DiagnosticId::NestedBlockComment`] (this lexer
    /// does not actually nest block comments — the first `*/` still
    /// closes it). Running off the end of the buffer without a closer is
    /// [`DiagnosticId::UnterminatedBlockComment`], reported at the
    /// comment's opening location.
    fn skip_block_comment(&mut self, start_loc: SourceLocation) {
        let mut warned_nested = false;
        loop {
            if self.cursor.is_at_end() {
                self.handler.report(start_loc, DiagnosticId::UnterminatedBlockComment, "");
                return;
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size(pos, self.handler);
            if ch == b'*' {
                let (next, next_sz) = self.cursor.get_char_and_size(pos + sz as usize, self.handler);
                if next == b'/' {
                    self.cursor.consume(sz + next_sz);
                    return;
                }
            } else if ch == b'/' && !warned_nested {
                let (next, next_sz) = self.cursor.get_char_and_size(pos + sz as usize, self.handler);
                if next == b'*' {
                    let (after, _) =
                        self.cursor.get_char_and_size(pos + sz as usize + next_sz as usize, self.handler);
                    // `/*/` is the outer comment's own closer arriving one
                    // byte early, not a real nested `/*` — the `*` and the
                    // following `/` close this comment on the next iteration.
                    if after != b'/' {
                        self.handler.report(self.cursor.loc(), DiagnosticId::NestedBlockComment, "");
                        warned_nested = true;
                    }
                }
            }
            self.cursor.consume(sz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::StubPreprocessor;
    use crate::token::TokenKind;
    use cppc_util::{Handler, IdentifierTable, LangOptions};

    fn lex_all(src: &str) -> Vec<TokenKind> {
        let mut buf = src.as_bytes().to_vec();
        buf.push(0);
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut kinds = Vec::new();
        loop {
            let mut tok = Token::eof_at(SourceLocation::INVALID);
            lexer.lex(&mut tok, &mut pp);
            kinds.push(tok.kind());
            if tok.is(TokenKind::Eof) {
                break;
            }
        }
        kinds
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(lex_all("x // comment\ny"), vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn block_comment_is_skipped() {
        assert_eq!(lex_all("x /* hi */ y"), vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment_is_diagnosed() {
        let buf = b"/* never closes\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(tok.is(TokenKind::Eof));
        assert!(handler.diagnostics().iter().any(|d| d.id == DiagnosticId::UnterminatedBlockComment));
    }

    #[test]
    fn nested_slash_star_warns_once() {
        let buf = b"/* outer /* inner */ x\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(tok.is(TokenKind::Identifier));
        assert_eq!(
            handler.diagnostics().iter().filter(|d| d.id == DiagnosticId::NestedBlockComment).count(),
            1
        );
    }

    #[test]
    fn slash_slash_slash_is_not_terminated() {
        let buf = b"/*/\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(handler.diagnostics().iter().any(|d| d.id == DiagnosticId::UnterminatedBlockComment));
    }

    #[test]
    fn slash_star_slash_collision_closes_without_nested_warning() {
        let buf = b"/* a /*/ b\0".to_vec();
        let handler = Handler::new(LangOptions::new());
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(tok.is(TokenKind::Identifier));
        assert!(!handler.diagnostics().iter().any(|d| d.id == DiagnosticId::NestedBlockComment));
    }

    #[test]
    fn line_comment_extension_warns_once_when_disabled() {
        let buf = b"// one\n// two\nx\0".to_vec();
        let handler = Handler::new(LangOptions::new().with_bcpl_comment(false));
        let identifiers = IdentifierTable::new();
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        assert!(tok.is(TokenKind::Identifier));
        assert_eq!(
            handler.diagnostics().iter().filter(|d| d.id == DiagnosticId::LineCommentExtension).count(),
            1
        );
    }
}
