//! Macro replay (spec.md §4.7): a pre-recorded replacement list replayed as
//! a token source, indistinguishable to its consumer from the lexer it
//! temporarily stands in for.
//!
//! Macro argument substitution and rescanning nested invocations are out of
//! scope here (spec.md §1's Non-goals) — [`MacroInfo`] holds a flat,
//! already-substituted replacement list, and [`MacroExpander`] just replays
//! it.

use cppc_util::IdentifierTokenInfo;

use crate::preprocessor::Preprocessor;
use crate::token::Token;

/// A recorded macro definition: the identifier it is bound to (via
/// [`cppc_util::identifier_table::IdentifierTokenInfo::macro_info`]) and
/// its replacement token list.
pub struct MacroInfo {
    pub definer: &'static IdentifierTokenInfo,
    pub replacement: Vec<Token>,
}

impl MacroInfo {
    pub fn new(definer: &'static IdentifierTokenInfo, replacement: Vec<Token>) -> Self {
        Self { definer, replacement }
    }
}

/// Replays one macro's replacement list as a token source.
///
/// The first replayed token inherits the invoking identifier's
/// `start_of_line`/`leading_space` flags (so a macro expansion reads, to
/// its consumer, exactly as if its first token had appeared in the
/// invocation's place); every later token keeps whatever flags it was
/// recorded with.
pub struct MacroExpander<'m> {
    macro_info: &'m MacroInfo,
    next: usize,
    start_of_line: bool,
    leading_space: bool,
}

impl<'m> MacroExpander<'m> {
    pub fn new(macro_info: &'m MacroInfo, start_of_line: bool, leading_space: bool) -> Self {
        Self { macro_info, next: 0, start_of_line, leading_space }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next >= self.macro_info.replacement.len()
    }

    /// Replays the next recorded token into `token`. Once exhausted, calls
    /// `pp.handle_end_of_macro(token)` instead and leaves the expander
    /// permanently exhausted; the caller is expected to drop this expander
    /// and resume from whatever lexer it suspended.
    pub fn lex(&mut self, token: &mut Token, pp: &mut dyn Preprocessor) {
        if self.is_exhausted() {
            pp.handle_end_of_macro(token);
            return;
        }
        let mut next_tok = self.macro_info.replacement[self.next];
        if self.next == 0 {
            next_tok.set_start_of_line(self.start_of_line);
            next_tok.set_leading_space(self.leading_space);
        }
        self.next += 1;
        *token = next_tok;
        if token.identifier_info().is_some() {
            pp.handle_identifier(token);
        }
    }
}
