//! Punctuator lexing: longest-match-first dispatch, digraphs, and the
//! deprecated GNU min/max operators (spec.md §4.6).

use cppc_util::diagnostic::DiagnosticId;
use cppc_util::SourceLocation;

use super::Lexer;
use crate::preprocessor::Preprocessor;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    /// `first` is the already-consumed first byte of the punctuator.
    /// Dispatches to a per-family helper that peeks (and conditionally
    /// consumes) further bytes to find the longest valid spelling.
    ///
    /// Returns `false` without writing `token` when `first` is `@` and
    /// `objc1` is off — the only case where a byte `looks_like_operator_start`
    /// admits turns out not to denote a real punctuator. The caller is
    /// expected to treat this exactly like any other stray character and
    /// resume lexing, not hand back a token for it.
    pub(super) fn lex_operator(
        &mut self,
        token: &mut Token,
        start_loc: SourceLocation,
        first: u8,
        pp: &mut dyn Preprocessor,
    ) -> bool {
        let kind = match first {
            b'[' => TokenKind::LSquare,
            b']' => TokenKind::RSquare,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'?' => TokenKind::Question,
            b';' => TokenKind::Semi,
            b',' => TokenKind::Comma,
            b'~' => TokenKind::Tilde,
            b'@' if self.handler.lang_options().objc1 => TokenKind::At,
            b'@' => {
                if !pp.is_skipping() {
                    self.handler.report(start_loc, DiagnosticId::StrayCharacter, "@".to_string());
                }
                return false;
            }
            b'.' => self.lex_period(),
            b'&' => self.lex_amp(),
            b'*' => self.lex_star(),
            b'+' => self.lex_plus(),
            b'-' => self.lex_minus(),
            b'!' => self.lex_exclaim(),
            b'%' => self.lex_percent(),
            b'<' => self.lex_less(),
            b'>' => self.lex_greater(),
            b'^' => self.lex_caret(),
            b'|' => self.lex_pipe(),
            b':' => self.lex_colon(),
            b'=' => self.lex_equal(),
            b'#' => self.lex_hash(),
            _ => unreachable!("lex_operator called with non-operator byte {first:?}"),
        };
        let end_loc = self.cursor.loc();
        *token = Token::new(kind, start_loc, end_loc);
        token.set_needs_cleaning(self.range_needs_cleaning(start_loc, end_loc));
        true
    }

    /// Peeks the next logical character; if it equals `expect`, consumes it
    /// and returns `true`.
    fn try_consume(&mut self, expect: u8) -> bool {
        let (ch, sz) = self.cursor.peek_char(self.handler);
        if ch == expect {
            self.cursor.consume(sz);
            true
        } else {
            false
        }
    }

    fn lex_period(&mut self) -> TokenKind {
        let save = self.cursor.pos();
        if self.try_consume(b'.') {
            if self.try_consume(b'.') {
                return TokenKind::Ellipsis;
            }
            self.cursor.set_pos(save);
        }
        TokenKind::Period
    }

    fn lex_amp(&mut self) -> TokenKind {
        if self.try_consume(b'&') {
            TokenKind::AmpAmp
        } else if self.try_consume(b'=') {
            TokenKind::AmpEqual
        } else {
            TokenKind::Amp
        }
    }

    fn lex_star(&mut self) -> TokenKind {
        if self.try_consume(b'=') {
            TokenKind::StarEqual
        } else {
            TokenKind::Star
        }
    }

    fn lex_plus(&mut self) -> TokenKind {
        if self.try_consume(b'+') {
            TokenKind::PlusPlus
        } else if self.try_consume(b'=') {
            TokenKind::PlusEqual
        } else {
            TokenKind::Plus
        }
    }

    fn lex_minus(&mut self) -> TokenKind {
        if self.try_consume(b'-') {
            return TokenKind::MinusMinus;
        }
        if self.try_consume(b'=') {
            return TokenKind::MinusEqual;
        }
        if self.try_consume(b'>') {
            if self.handler.lang_options().cplusplus && self.try_consume(b'*') {
                return TokenKind::ArrowStar;
            }
            return TokenKind::Arrow;
        }
        TokenKind::Minus
    }

    fn lex_exclaim(&mut self) -> TokenKind {
        if self.try_consume(b'=') {
            TokenKind::ExclaimEqual
        } else {
            TokenKind::Exclaim
        }
    }

    fn lex_percent(&mut self) -> TokenKind {
        if self.handler.lang_options().digraphs {
            if self.try_consume(b'>') {
                return TokenKind::RBrace;
            }
            let save = self.cursor.pos();
            if self.try_consume(b':') {
                let save2 = self.cursor.pos();
                if self.try_consume(b'%') {
                    if self.try_consume(b':') {
                        return TokenKind::HashHash;
                    }
                    self.cursor.set_pos(save2);
                }
                return TokenKind::Hash;
            }
            self.cursor.set_pos(save);
        }
        if self.try_consume(b'=') {
            TokenKind::PercentEqual
        } else {
            TokenKind::Percent
        }
    }

    fn lex_less(&mut self) -> TokenKind {
        if self.try_consume(b'<') {
            return if self.try_consume(b'=') { TokenKind::LessLessEqual } else { TokenKind::LessLess };
        }
        if self.try_consume(b'=') {
            return TokenKind::LessEqual;
        }
        if self.handler.lang_options().digraphs {
            if self.try_consume(b':') {
                return TokenKind::LSquare;
            }
            if self.try_consume(b'%') {
                return TokenKind::LBrace;
            }
        }
        if self.handler.lang_options().cpp_min_max {
            let save = self.cursor.pos();
            if self.try_consume(b'?') {
                let loc = self.cursor.loc();
                if self.try_consume(b'=') {
                    self.handler.report(loc, DiagnosticId::DeprecatedMinMaxOperator, "<?=");
                    return TokenKind::LessQuestionEqual;
                }
                self.handler.report(loc, DiagnosticId::DeprecatedMinMaxOperator, "<?");
                return TokenKind::LessQuestion;
            }
            self.cursor.set_pos(save);
        }
        TokenKind::Less
    }

    fn lex_greater(&mut self) -> TokenKind {
        if self.try_consume(b'>') {
            return if self.try_consume(b'=') { TokenKind::GreaterGreaterEqual } else { TokenKind::GreaterGreater };
        }
        if self.try_consume(b'=') {
            return TokenKind::GreaterEqual;
        }
        if self.handler.lang_options().cpp_min_max {
            let save = self.cursor.pos();
            if self.try_consume(b'?') {
                let loc = self.cursor.loc();
                if self.try_consume(b'=') {
                    self.handler.report(loc, DiagnosticId::DeprecatedMinMaxOperator, ">?=");
                    return TokenKind::GreaterQuestionEqual;
                }
                self.handler.report(loc, DiagnosticId::DeprecatedMinMaxOperator, ">?");
                return TokenKind::GreaterQuestion;
            }
            self.cursor.set_pos(save);
        }
        TokenKind::Greater
    }

    fn lex_caret(&mut self) -> TokenKind {
        if self.try_consume(b'=') {
            TokenKind::CaretEqual
        } else {
            TokenKind::Caret
        }
    }

    fn lex_pipe(&mut self) -> TokenKind {
        if self.try_consume(b'|') {
            TokenKind::PipePipe
        } else if self.try_consume(b'=') {
            TokenKind::PipeEqual
        } else {
            TokenKind::Pipe
        }
    }

    fn lex_colon(&mut self) -> TokenKind {
        if self.handler.lang_options().digraphs && self.try_consume(b'>') {
            return TokenKind::RSquare;
        }
        if self.handler.lang_options().cplusplus && self.try_consume(b':') {
            return TokenKind::ColonColon;
        }
        TokenKind::Colon
    }

    fn lex_equal(&mut self) -> TokenKind {
        if self.try_consume(b'=') {
            TokenKind::EqualEqual
        } else {
            TokenKind::Equal
        }
    }

    fn lex_hash(&mut self) -> TokenKind {
        if self.try_consume(b'#') {
            TokenKind::HashHash
        } else {
            TokenKind::Hash
        }
    }
}
