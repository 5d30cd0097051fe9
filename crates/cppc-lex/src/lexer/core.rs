//! The [`Lexer`] struct and its top-level dispatch loop.

use std::sync::atomic::{AtomicU32, Ordering};

use cppc_util::diagnostic::DiagnosticId;
use cppc_util::{Handler, IdentifierTable, SourceLocation};

use crate::cursor::Cursor;
use crate::preprocessor::{LexerId, Preprocessor};
use crate::token::{Token, TokenKind};
use crate::unicode;

static NEXT_LEXER_ID: AtomicU32 = AtomicU32::new(0);

/// Tokenizes one buffer. Holds no reference to the preprocessor driving it
/// — every decision that needs preprocessor state is a callback parameter
/// on [`Lexer::lex`], not stored state (spec.md §9 Design Notes).
pub struct Lexer<'a> {
    pub(super) cursor: Cursor<'a>,
    pub(super) handler: &'a Handler,
    pub(super) identifiers: &'a IdentifierTable,
    id: LexerId,
    pub(super) is_at_start_of_line: bool,
    pub(super) parsing_preprocessor_directive: bool,
    pub(super) parsing_filename: bool,
    /// Latches the first time `//` is seen under a `LangOptions` that
    /// doesn't treat it as a core feature, so `LineCommentExtension` is
    /// only ever reported once per lexer instance.
    pub(super) line_comment_warned: bool,
    /// Locations of `#if`/`#ifdef`/`#ifndef` directives still open, pushed
    /// and popped by whatever external preprocessor recognizes conditional
    /// directives during its `handle_directive` callback (spec.md §4.6 line
    /// 126: evaluating `#if` is out of scope here, but the nesting
    /// bookkeeping and its unterminated-at-EOF diagnosis are not). Drained
    /// by `lex_end_of_file`.
    conditional_stack: Vec<SourceLocation>,
}

impl<'a> Lexer<'a> {
    /// `buf` must be the sentinel-terminated buffer for `file_id`, typically
    /// obtained from `SourceManager::buffer_of`/`file_info_of`.
    pub fn new(buf: &'a [u8], file_id: u32, handler: &'a Handler, identifiers: &'a IdentifierTable) -> Self {
        Self {
            cursor: Cursor::new(buf, file_id),
            handler,
            identifiers,
            id: LexerId(NEXT_LEXER_ID.fetch_add(1, Ordering::Relaxed)),
            is_at_start_of_line: true,
            parsing_preprocessor_directive: false,
            parsing_filename: false,
            line_comment_warned: false,
            conditional_stack: Vec::new(),
        }
    }

    /// Records an open `#if`/`#ifdef`/`#ifndef` at `loc`. Called by the
    /// driving preprocessor from within its own `handle_directive` once it
    /// has recognized the directive's keyword — this lexer never inspects
    /// directive spellings itself.
    pub fn push_conditional(&mut self, loc: SourceLocation) {
        self.conditional_stack.push(loc);
    }

    /// Closes the innermost open conditional (an `#endif`). Returns the
    /// opening location, or `None` if the stack was already empty (a stray
    /// `#endif`, which is the preprocessor's diagnostic to make, not this
    /// core's).
    pub fn pop_conditional(&mut self) -> Option<SourceLocation> {
        self.conditional_stack.pop()
    }

    /// Number of conditionals still open.
    pub fn conditional_depth(&self) -> usize {
        self.conditional_stack.len()
    }

    pub fn id(&self) -> LexerId {
        self.id
    }

    pub fn is_parsing_preprocessor_directive(&self) -> bool {
        self.parsing_preprocessor_directive
    }

    pub fn is_parsing_filename(&self) -> bool {
        self.parsing_filename
    }

    /// Produces the next token into `token`, dispatching directives and
    /// identifiers through `pp` along the way.
    ///
    /// When a `#` directive is seen at the start of a line, `pp.
    /// handle_directive` is called; if the preprocessor reports (via
    /// `is_current_lexer`) that this lexer is still the one driving
    /// tokenization afterward, the loop tail-dispatches into another token
    /// from this same buffer instead of returning the `#` itself.
    ///
    /// While `parsing_preprocessor_directive` is set — for the duration of
    /// that same `handle_directive` call, including any further `lex` calls
    /// the preprocessor makes to gather the directive's own tokens — a bare
    /// physical newline or the sentinel NUL ends the directive: this call
    /// returns an `eom` token instead of skipping past it.
    pub fn lex(&mut self, token: &mut Token, pp: &mut dyn Preprocessor) {
        loop {
            let at_line_start = self.is_at_start_of_line;
            self.is_at_start_of_line = false;
            let had_leading_space = self.skip_whitespace();

            if self.parsing_preprocessor_directive && self.at_directive_terminator() {
                self.emit_eom(token, had_leading_space);
                return;
            }

            if self.cursor.is_at_end() {
                self.lex_end_of_file(token, pp);
                return;
            }

            self.lex_token_internal(token, pp);
            token.set_start_of_line(at_line_start);
            token.set_leading_space(had_leading_space);

            if token.is(TokenKind::Hash) && at_line_start && !self.parsing_preprocessor_directive && !pp.is_skipping() {
                self.parsing_preprocessor_directive = true;
                pp.handle_directive(token);
                self.parsing_preprocessor_directive = false;
                if pp.is_current_lexer(self.id) {
                    continue;
                }
                return;
            }

            if token.is(TokenKind::Identifier) {
                pp.handle_identifier(token);
            }
            return;
        }
    }

    /// Consumes horizontal whitespace, newlines (latching
    /// `is_at_start_of_line`), and embedded NULs (diagnosing each), through
    /// the full decode protocol so an escaped newline splicing straight
    /// into more whitespace is absorbed transparently. Returns whether any
    /// whitespace preceded the next real character.
    fn skip_whitespace(&mut self) -> bool {
        let mut had_space = false;
        loop {
            if self.cursor.is_at_end() {
                return had_space;
            }
            let (ch, sz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);
            match ch {
                b' ' | b'\t' | 0x0b | 0x0c => {
                    self.cursor.consume(sz);
                    had_space = true;
                }
                b'\n' | b'\r' => {
                    if self.parsing_preprocessor_directive {
                        return had_space;
                    }
                    self.cursor.consume(sz);
                    self.is_at_start_of_line = true;
                }
                0 => {
                    self.handler.report(self.cursor.loc(), DiagnosticId::NullInFile, "");
                    self.cursor.consume(sz);
                }
                _ => return had_space,
            }
        }
    }

    /// True once the cursor sits on a directive-ending boundary: a bare
    /// (unspliced) physical newline, or the sentinel NUL. Only meaningful
    /// while `parsing_preprocessor_directive` is set — this is how a
    /// directive's token stream is bounded without the lexer knowing
    /// anything about directive syntax itself.
    fn at_directive_terminator(&self) -> bool {
        if self.cursor.is_at_end() {
            return true;
        }
        let (ch, _) = self.cursor.get_char_and_size_no_warn(self.cursor.pos(), self.handler);
        matches!(ch, b'\n' | b'\r')
    }

    /// Emits the `eom` token ending the current directive: consumes the
    /// terminating newline (if any — the sentinel NUL is left for the next
    /// `lex` call's end-of-file handling to find again) and leaves
    /// directive mode.
    fn emit_eom(&mut self, token: &mut Token, had_leading_space: bool) {
        let start_loc = self.cursor.loc();
        if !self.cursor.is_at_end() {
            let (_, sz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);
            self.cursor.consume(sz);
            self.is_at_start_of_line = true;
        }
        self.parsing_preprocessor_directive = false;
        *token = Token::new(TokenKind::Eom, start_loc, self.cursor.loc());
        token.set_leading_space(had_leading_space);
    }

    /// Dispatches on the next logical character to produce one token,
    /// writing it into `token`. Called only once whitespace has already
    /// been skipped and end-of-buffer has already been ruled out.
    ///
    /// Loops rather than recurses when a `/` turns out to begin a comment:
    /// a skipped comment is followed by another whitespace-skip and a
    /// fresh dispatch, same as the top-level `lex` loop does for a
    /// directive tail call.
    ///
    /// Takes `pp` only to consult [`Preprocessor::is_skipping`] before
    /// reporting a stray character — inside an inactive `#if`/`#else`
    /// branch, unrecognized punctuation is silently swallowed rather than
    /// diagnosed, since the branch's contents may not even be valid in the
    /// active dialect.
    fn lex_token_internal(&mut self, token: &mut Token, pp: &mut dyn Preprocessor) {
        loop {
            let start_loc = self.cursor.loc();
            let (ch, sz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);

            match ch {
                c if unicode::is_identifier_start(c) => {
                    self.cursor.consume(sz);
                    self.lex_identifier(token, start_loc, pp);
                    return;
                }
                b'$' if self.handler.lang_options().dollar_idents => {
                    self.handler.report(start_loc, DiagnosticId::DollarInIdentifier, "");
                    self.cursor.consume(sz);
                    self.lex_identifier(token, start_loc, pp);
                    return;
                }
                c if unicode::is_digit(c) => {
                    self.cursor.consume(sz);
                    self.lex_numeric_constant(token, start_loc);
                    return;
                }
                b'.' => {
                    self.cursor.consume(sz);
                    let (next, _) = self.cursor.peek_char(self.handler);
                    if unicode::is_digit(next) {
                        self.lex_numeric_constant(token, start_loc);
                    } else {
                        self.lex_operator(token, start_loc, b'.', pp);
                    }
                    return;
                }
                b'"' => {
                    self.cursor.consume(sz);
                    self.lex_string_literal(token, start_loc, false, pp);
                    return;
                }
                b'\'' => {
                    self.cursor.consume(sz);
                    self.lex_char_constant(token, start_loc, false, pp);
                    return;
                }
                b'/' => {
                    self.cursor.consume(sz);
                    if self.try_lex_slash(token, start_loc, pp) {
                        // a comment was skipped; re-skip whitespace and
                        // dispatch again from the new position.
                        self.skip_whitespace();
                        if self.cursor.is_at_end() {
                            *token = Token::eof_at(self.cursor.loc());
                            return;
                        }
                        continue;
                    }
                    return;
                }
                _ if self.looks_like_operator_start(ch) => {
                    self.cursor.consume(sz);
                    if self.lex_operator(token, start_loc, ch, pp) {
                        return;
                    }
                    // `@` without `objc1`: already diagnosed inside
                    // `lex_operator`, discard it and resume dispatch.
                    if self.cursor.is_at_end() {
                        *token = Token::eof_at(self.cursor.loc());
                        return;
                    }
                    continue;
                }
                _ => {
                    self.cursor.consume(sz);
                    if !pp.is_skipping() {
                        self.handler.report(start_loc, DiagnosticId::StrayCharacter, (ch as char).to_string());
                    }
                    // Discard the byte and resume dispatch from the next
                    // position, same as the comment-skip path above; an
                    // unrecognized byte never escapes as a token of its own.
                    if self.cursor.is_at_end() {
                        *token = Token::eof_at(self.cursor.loc());
                        return;
                    }
                    continue;
                }
            }
        }
    }

    /// True for the first byte of any recognized punctuator (spec.md
    /// §4.6's operator table), so `lex_token_internal` can route to
    /// `lex_operator` without duplicating the full table here.
    fn looks_like_operator_start(&self, c: u8) -> bool {
        matches!(
            c,
            b'[' | b']'
                | b'('
                | b')'
                | b'{'
                | b'}'
                | b'&'
                | b'*'
                | b'+'
                | b'-'
                | b'~'
                | b'!'
                | b'%'
                | b'<'
                | b'>'
                | b'^'
                | b'|'
                | b'?'
                | b':'
                | b';'
                | b'='
                | b','
                | b'#'
                | b'@'
        )
    }

    fn lex_end_of_file(&mut self, token: &mut Token, pp: &mut dyn Preprocessor) {
        let loc = self.cursor.loc();
        if self.cursor.pos() > 0 {
            let (prev, _) = self.cursor.get_char_and_size_no_warn(self.cursor.pos() - 1, self.handler);
            if prev != b'\n' && prev != b'\r' {
                self.handler.report(loc, DiagnosticId::NoNewlineAtEof, "");
            }
        }
        while let Some(open_loc) = self.conditional_stack.pop() {
            self.handler.report(open_loc, DiagnosticId::UnterminatedConditional, "");
        }
        *token = Token::eof_at(loc);
        pp.handle_end_of_file(token);
    }

    /// Re-derives a token's canonical (cleaned) spelling: trigraphs decoded
    /// and escaped newlines removed. Cheap for the common case
    /// (`!token.needs_cleaning()`), which just slices the raw bytes
    /// directly — this is the non-inverted form of the cleaning-length
    /// assertion (cleaning must actually have changed the length, not the
    /// original's inverted `Result.size() != length` check read backwards).
    pub fn get_spelling(&self, token: &Token) -> String {
        let start = self.cursor.loc_to_pos(token.start());
        let end = self.cursor.loc_to_pos(token.end());
        if !token.needs_cleaning() {
            return String::from_utf8_lossy(&self.cursor.buf()[start..end]).into_owned();
        }
        let mut out = String::with_capacity(end - start);
        let mut pos = start;
        while pos < end {
            let (ch, sz) = self.cursor.get_char_and_size_no_warn(pos, self.handler);
            out.push(ch as char);
            pos += sz as usize;
        }
        debug_assert_ne!(out.len(), end - start, "a token marked needs_cleaning must have its length actually change");
        out
    }

    /// True if the raw range `[start_loc, token.end())` needed cleaning:
    /// decoding it with the no-warn protocol consumes more than one raw
    /// byte at some step, meaning a trigraph or escaped newline appears
    /// somewhere in the token (including its very first character).
    /// Token-family lexers call this once after fixing the token's end
    /// position rather than threading a cleaning flag through every
    /// character they scan.
    pub(super) fn range_needs_cleaning(&self, start_loc: SourceLocation, end_loc: SourceLocation) -> bool {
        let end = self.cursor.loc_to_pos(end_loc);
        let mut pos = self.cursor.loc_to_pos(start_loc);
        while pos < end {
            let (_, sz) = self.cursor.get_char_and_size_no_warn(pos, self.handler);
            if sz > 1 {
                return true;
            }
            pos += sz as usize;
        }
        false
    }

    /// Consumes through the next physical newline (inclusive of the
    /// decoding protocol, so an escaped newline does not itself end the
    /// directive line), returning the raw byte range read. Used by
    /// `#error`/`#warning` directive handling, which takes the remainder
    /// of the line verbatim rather than as a token stream.
    pub fn read_to_end_of_line(&mut self) -> SourceLocation {
        loop {
            if self.cursor.is_at_end() {
                return self.cursor.loc();
            }
            let pos = self.cursor.pos();
            let (ch, sz) = self.cursor.get_char_and_size_no_warn(pos, self.handler);
            if ch == b'\n' || ch == b'\r' {
                return self.cursor.loc();
            }
            self.cursor.consume(sz);
        }
    }

    /// Lexes the remainder of an `#include` directive's argument as a
    /// single filename token (`<...>` or `"..."`), per spec.md §4.6's
    /// directive-dispatch note that `#include` needs a distinct lexing
    /// mode. Sets `parsing_filename` for the duration so the string/angle
    /// lexers relax their usual escape handling.
    ///
    /// Once the filename token is produced, the remainder of the directive
    /// line must be `eom` — anything else is excess tokens, diagnosed once
    /// and discarded by consuming through the directive terminator without
    /// producing further tokens for it (spec.md §4.6).
    ///
    /// An unterminated `<...>`/`"..."` recovers by discarding the literal and
    /// re-lexing rather than producing a filename token at all; in that case
    /// `discard_excess_directive_tokens` is skipped, since whatever `pp.lex`
    /// resumed with has already consumed (or itself resolved) the rest of
    /// the line.
    pub fn lex_include_filename(&mut self, token: &mut Token, pp: &mut dyn Preprocessor) {
        self.parsing_filename = true;
        self.skip_whitespace();
        if !self.cursor.is_at_end() {
            let start_loc = self.cursor.loc();
            let (ch, sz) = self.cursor.get_char_and_size(self.cursor.pos(), self.handler);
            let produced_filename = match ch {
                b'<' => {
                    self.cursor.consume(sz);
                    self.lex_angled_string_literal(token, start_loc, pp)
                }
                b'"' => {
                    self.cursor.consume(sz);
                    self.lex_string_literal(token, start_loc, false, pp)
                }
                _ => {
                    self.cursor.consume(sz);
                    self.handler.report(start_loc, DiagnosticId::StrayCharacter, (ch as char).to_string());
                    *token = Token::new(TokenKind::Unknown, start_loc, self.cursor.loc());
                    true
                }
            };
            self.parsing_filename = false;
            if produced_filename {
                self.discard_excess_directive_tokens();
            }
        } else {
            *token = Token::eof_at(self.cursor.loc());
            self.parsing_filename = false;
        }
    }

    /// After a directive has consumed the one token it expects (a filename,
    /// for `#include`), anything remaining before the terminating newline is
    /// excess: diagnose it once and skip to the terminator without handing
    /// any of it back as a token, so the caller's next `lex` call sees `eom`.
    fn discard_excess_directive_tokens(&mut self) {
        self.skip_whitespace();
        if self.at_directive_terminator() {
            return;
        }
        self.handler.report(self.cursor.loc(), DiagnosticId::ExcessTokensAtDirectiveEnd, "");
        self.read_to_end_of_line();
    }
}

impl<'a> Cursor<'a> {
    /// Converts a [`SourceLocation`] known to belong to this cursor's file
    /// id back into a byte offset. Debug-asserts the file id matches;
    /// release builds simply use the raw offset (token boundaries are
    /// always produced by this same cursor).
    pub(crate) fn loc_to_pos(&self, loc: SourceLocation) -> usize {
        debug_assert!(!loc.is_valid() || loc.file_id() == self.file_id());
        loc.raw_in_chunk_offset() as usize
    }
}
