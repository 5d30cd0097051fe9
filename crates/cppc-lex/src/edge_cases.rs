//! Cross-cutting correctness properties and end-to-end scenarios that don't
//! belong to any single lexing mode.
//!
//! Properties 1-10 below correspond one-to-one with the invariants this
//! front-end core is meant to uphold; scenarios A-F are complete
//! small-buffer walkthroughs exercising several of those invariants at once.

use crate::preprocessor::StubPreprocessor;
use crate::token::{Token, TokenKind};
use crate::Lexer;
use cppc_util::{FileManager, Handler, IdentifierTable, LangOptions, SourceLocation, SourceManager};

fn lex_all(src: &[u8], opts: LangOptions) -> (Vec<Token>, Handler, IdentifierTable) {
    let mut buf = src.to_vec();
    buf.push(0);
    let handler = Handler::new(opts);
    let identifiers = IdentifierTable::new();
    let mut tokens = Vec::new();
    {
        let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
        let mut pp = StubPreprocessor::new();
        loop {
            let mut tok = Token::eof_at(SourceLocation::INVALID);
            lexer.lex(&mut tok, &mut pp);
            let done = tok.is(TokenKind::Eof);
            tokens.push(tok);
            if done {
                break;
            }
        }
    }
    (tokens, handler, identifiers)
}

// ---------------------------------------------------------------------
// Property 1: sentinel invariant — every ingested buffer ends with a NUL
// the cursor can rely on as an unconditional stopping point.
// ---------------------------------------------------------------------

#[test]
fn property_every_ingested_buffer_carries_a_sentinel() {
    let mut sm = SourceManager::new();
    for data in [Vec::new(), b"int x;".to_vec(), vec![b'a'; 5000]] {
        let id = sm.create_file_id_for_mem_buffer("<mem>", data);
        let buf = sm.buffer_of(id.0).expect("freshly allocated id resolves");
        assert_eq!(*buf.last().unwrap(), 0, "buffer must end in the sentinel NUL");
    }
}

// ---------------------------------------------------------------------
// Property 2: file-id uniqueness — every chunk of every ingested buffer
// gets its own, never-repeated file id, even across several buffers.
// ---------------------------------------------------------------------

#[test]
fn property_file_ids_are_dense_and_unique() {
    let mut sm = SourceManager::new();
    let a = sm.create_file_id_for_mem_buffer("a", b"short".to_vec());
    let b = sm.create_file_id_for_mem_buffer("b", vec![b'x'; 3 * (1 << 20)]);
    let c = sm.create_file_id_for_mem_buffer("c", b"also short".to_vec());

    assert!(a.0 < b.0, "ids are handed out in allocation order");
    assert!(b.0 < c.0, "a multi-chunk buffer consumes more than one id before the next file starts");
    assert!(c.0 - b.0 >= 3, "the 3 MiB buffer above must have consumed at least 3 chunk ids");
}

// ---------------------------------------------------------------------
// Property 3: location round trip — SourceLocation::new followed by its
// accessors always recovers exactly the file id and in-chunk offset that
// went in, for every representable pair.
// ---------------------------------------------------------------------

#[test]
fn property_location_round_trips_for_every_valid_pair() {
    for file_id in [1u32, 2, 100, SourceLocation::max_file_id()] {
        for offset in [0u32, 1, 17, (1 << 20) - 1] {
            let loc = SourceLocation::new(file_id, offset);
            assert_eq!(loc.file_id(), file_id);
            assert_eq!(loc.raw_in_chunk_offset(), offset);
            assert_eq!(SourceLocation::from_raw_encoding(loc.raw_encoding()), loc);
        }
    }
}

// ---------------------------------------------------------------------
// Property 4: true-offset identity — SourceManager::file_pos recovers the
// real byte offset into the underlying buffer, including across chunk
// boundaries for a file split into several ids.
// ---------------------------------------------------------------------

#[test]
fn property_file_pos_recovers_true_offset_across_chunks() {
    let mut sm = SourceManager::new();
    let chunk = 1u32 << 20;
    let data = vec![b'x'; (chunk as usize) * 2 + 10];
    let first = sm.create_file_id_for_mem_buffer("big", data);

    let loc_in_first_chunk = SourceLocation::new(first.0, 5);
    assert_eq!(sm.file_pos(loc_in_first_chunk), 5);

    let loc_in_third_chunk = SourceLocation::new(first.0 + 2, 3);
    assert_eq!(sm.file_pos(loc_in_third_chunk), 2 * chunk as u64 + 3);
}

// ---------------------------------------------------------------------
// Property 5: line/column monotonicity — walking forward through a
// single-line run of characters never decreases the column, and crossing
// a newline never decreases the line.
// ---------------------------------------------------------------------

#[test]
fn property_column_is_monotonic_within_a_line_and_line_is_monotonic_overall() {
    let mut sm = SourceManager::new();
    let text = b"abcdefg\nhijklmnop\nqrst".to_vec();
    let id = sm.create_file_id_for_mem_buffer("lines", text.clone());

    let mut prev_col = 0;
    let mut prev_line_no = 0;
    for (i, _) in text.iter().enumerate() {
        let loc = SourceLocation::new(id.0, i as u32);
        let line = sm.line_of(loc);
        let col = sm.column_of(loc);
        assert!(line >= prev_line_no, "line number must never go backward");
        if line == prev_line_no && i > 0 {
            assert!(col > prev_col, "column must strictly increase within one line");
        }
        prev_line_no = line;
        prev_col = col;
    }
}

// ---------------------------------------------------------------------
// Property 6: identifier interning — two lexes of the same spelling (in
// the same table) always resolve to the same leaked record.
// ---------------------------------------------------------------------

#[test]
fn property_identical_spellings_share_one_interned_record() {
    let spellings = ["a", "foo", "foo_bar_123", "_leading_underscore", "x"];
    let table = IdentifierTable::new();
    for s in spellings {
        let first = table.get(s) as *const _;
        let second = table.get(s) as *const _;
        assert_eq!(first, second, "re-interning {s:?} must return the same record");
    }
}

// ---------------------------------------------------------------------
// Property 7: inode uniquing — two distinct paths that resolve to the
// same (device, inode) pair share one FileEntry.
// ---------------------------------------------------------------------

#[test]
fn property_same_inode_two_paths_share_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real.c");
    std::fs::write(&real, b"int x;").unwrap();
    let link = dir.path().join("alias.c");
    #[cfg(unix)]
    std::os::unix::fs::symlink(&real, &link).unwrap();
    #[cfg(not(unix))]
    std::fs::copy(&real, &link).unwrap();

    let fm = FileManager::new();
    let a = fm.get_file(&real).unwrap().unwrap();
    let b = fm.get_file(&link).unwrap().unwrap();
    #[cfg(unix)]
    {
        assert_eq!(a.uid, b.uid);
        assert!(std::rc::Rc::ptr_eq(&a, &b));
    }
}

// ---------------------------------------------------------------------
// Property 8: spelling fidelity — for a token that needed no cleaning,
// get_spelling returns exactly the raw bytes of its source range.
// ---------------------------------------------------------------------

#[test]
fn property_uncleaned_token_spelling_matches_raw_bytes() {
    let src = b"foo_bar 12345 \"plain\"".to_vec();
    let mut buf = src.clone();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();
    loop {
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        if tok.is(TokenKind::Eof) {
            break;
        }
        assert!(!tok.needs_cleaning());
        let start = tok.start().raw_in_chunk_offset() as usize;
        let end = tok.end().raw_in_chunk_offset() as usize;
        assert_eq!(lexer.get_spelling(&tok), String::from_utf8_lossy(&src[start..end]));
    }
}

// ---------------------------------------------------------------------
// Property 9: cleaning flag soundness — needs_cleaning is set exactly
// when a token's raw range contains a trigraph or an escaped newline,
// never for a token that is plain ASCII spelling throughout.
// ---------------------------------------------------------------------

#[test]
fn property_cleaning_flag_is_set_iff_range_contains_a_splice_or_trigraph() {
    let plain = b"plain_identifier".to_vec();
    let (tokens, _handler, _ids) = lex_all(&plain, LangOptions::new());
    assert!(!tokens[0].needs_cleaning());

    let spliced = b"abc\\\ndef".to_vec();
    let (tokens, _handler, _ids) = lex_all(&spliced, LangOptions::new());
    assert!(tokens[0].is(TokenKind::Identifier));
    assert!(tokens[0].needs_cleaning());

    let trigraphed = b"int a??(10??);".to_vec();
    let (tokens, _handler, _ids) = lex_all(&trigraphed, LangOptions::new());
    let bracketed = tokens.iter().find(|t| t.is(TokenKind::LSquare)).expect("trigraph decodes to [");
    assert!(bracketed.needs_cleaning());
}

// ---------------------------------------------------------------------
// Property 10: trigraph/escaped-newline equivalence — a spelling built
// from trigraphs or line splices decodes to exactly the plain spelling it
// stands for, differing only in its needs_cleaning flag.
// ---------------------------------------------------------------------

#[test]
fn property_trigraph_and_splice_decode_to_the_plain_equivalent() {
    let mut buf = b"a??/\nb".to_vec();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();
    let mut tok = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut tok, &mut pp);

    assert!(tok.is(TokenKind::Identifier));
    assert!(tok.needs_cleaning());
    assert_eq!(lexer.get_spelling(&tok), "ab");
}

// ---------------------------------------------------------------------
// Scenario A: a minimal declaration, token-by-token.
// ---------------------------------------------------------------------

#[test]
fn scenario_a_minimal_declaration() {
    let mut buf = b"int x = 1;\n".to_vec();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();

    let mut got = Vec::new();
    loop {
        let mut tok = Token::eof_at(SourceLocation::INVALID);
        lexer.lex(&mut tok, &mut pp);
        let done = tok.is(TokenKind::Eof);
        got.push((tok.kind(), lexer.get_spelling(&tok)));
        if done {
            break;
        }
    }

    assert_eq!(
        got,
        vec![
            (TokenKind::Identifier, "int".to_string()),
            (TokenKind::Identifier, "x".to_string()),
            (TokenKind::Equal, "=".to_string()),
            (TokenKind::NumericConstant, "1".to_string()),
            (TokenKind::Semi, ";".to_string()),
            (TokenKind::Eof, String::new()),
        ]
    );
}

// ---------------------------------------------------------------------
// Scenario B: a line splice between two identifiers.
// ---------------------------------------------------------------------

#[test]
fn scenario_b_line_splice_joins_and_flags_correctly() {
    let mut buf = b"a \\\n b\n".to_vec();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();

    let mut a = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut a, &mut pp);
    let mut b = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut b, &mut pp);
    let mut eof = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut eof, &mut pp);

    assert!(a.is(TokenKind::Identifier));
    assert_eq!(lexer.get_spelling(&a), "a");
    assert!(b.is(TokenKind::Identifier));
    assert_eq!(lexer.get_spelling(&b), "b");
    assert!(eof.is(TokenKind::Eof));

    assert!(!b.is_start_of_line(), "the spliced line never starts a new logical line");
    assert!(b.has_leading_space(), "the splice's own whitespace still counts as leading space");
}

// ---------------------------------------------------------------------
// Scenario C: a trigraph-spelled `#` at the start of a line.
// ---------------------------------------------------------------------

#[test]
fn scenario_c_trigraph_hash_starts_a_directive() {
    let mut buf = b"??=define X 1\n".to_vec();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();

    let mut tok = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut tok, &mut pp);

    assert_eq!(pp.directives_seen.len(), 1, "the trigraph-spelled # must be dispatched as a directive");
    let hash = pp.directives_seen[0];
    assert!(hash.is(TokenKind::Hash));
    assert!(hash.needs_cleaning(), "the trigraph-decoded # needs cleaning to recover its raw spelling");
    assert_eq!(lexer.get_spelling(&hash), "#");
}

// ---------------------------------------------------------------------
// Scenario D: an unterminated string literal, with recovery on the next
// line.
// ---------------------------------------------------------------------

#[test]
fn scenario_d_unterminated_string_diagnoses_and_recovers() {
    let mut sm = SourceManager::new();
    let id = sm.create_file_id_for_mem_buffer("<mem>", b"\"hello\n".to_vec());
    let buf = sm.buffer_of(id.0).unwrap().to_vec();

    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, id.0, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();

    let mut tok = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut tok, &mut pp);

    // The malformed literal is discarded, not handed back as a
    // `StringLiteral` token: this single `lex` call already resumes past
    // it and returns whatever real token follows — here, `eof`.
    assert!(tok.is(TokenKind::Eof), "lexing recovers past the unterminated literal within this one call");
    let diag = handler
        .diagnostics()
        .iter()
        .find(|d| d.id == cppc_util::DiagnosticId::UnterminatedString)
        .expect("unterminated string must be diagnosed");
    assert_eq!(sm.column_of(diag.location), 1);
}

// ---------------------------------------------------------------------
// Scenario E: a nested block comment diagnosed at the inner `/*`, with
// the following identifier lexed normally.
// ---------------------------------------------------------------------

#[test]
fn scenario_e_nested_block_comment_is_diagnosed_and_recovers() {
    let mut buf = b"/* a /* b */ c\n".to_vec();
    buf.push(0);
    let handler = Handler::new(LangOptions::new());
    let identifiers = IdentifierTable::new();
    let mut lexer = Lexer::new(&buf, 1, &handler, &identifiers);
    let mut pp = StubPreprocessor::new();

    let mut tok = Token::eof_at(SourceLocation::INVALID);
    lexer.lex(&mut tok, &mut pp);

    assert!(tok.is(TokenKind::Identifier));
    assert_eq!(lexer.get_spelling(&tok), "c");
    assert!(handler.diagnostics().iter().any(|d| d.id == cppc_util::DiagnosticId::NestedBlockComment));
}

// ---------------------------------------------------------------------
// Scenario F: digraphs on vs. off change how `<:` tokenizes.
// ---------------------------------------------------------------------

#[test]
fn scenario_f_digraphs_toggle_changes_tokenization() {
    let (tokens, _handler, _ids) = lex_all(b"<:", LangOptions::new());
    assert_eq!(tokens[0].kind(), TokenKind::LSquare);

    let (tokens, _handler, _ids) = lex_all(b"<:", LangOptions::new().with_digraphs(false));
    assert_eq!(tokens[0].kind(), TokenKind::Less);
    assert_eq!(tokens[1].kind(), TokenKind::Colon);
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn identifier_spelling_round_trips_for_any_valid_identifier(
            s in "[a-zA-Z_][a-zA-Z0-9_]{0,30}"
        ) {
            let (tokens, _handler, _ids) = lex_all(s.as_bytes(), LangOptions::new());
            assert_eq!(tokens.len(), 2, "one identifier token plus eof");
            assert!(tokens[0].is(TokenKind::Identifier));
        }

        #[test]
        fn numeric_constant_is_a_single_maximal_token(
            digits in "[0-9]{1,12}"
        ) {
            let (tokens, _handler, _ids) = lex_all(digits.as_bytes(), LangOptions::new());
            assert_eq!(tokens.len(), 2);
            assert!(tokens[0].is(TokenKind::NumericConstant));
        }

        #[test]
        fn arbitrary_horizontal_whitespace_never_changes_the_token_kind(
            spaces in 0..20usize
        ) {
            let src = format!("{}x{}", " ".repeat(spaces), " ".repeat(spaces));
            let (tokens, _handler, _ids) = lex_all(src.as_bytes(), LangOptions::new());
            assert!(tokens[0].is(TokenKind::Identifier));
        }
    }
}
