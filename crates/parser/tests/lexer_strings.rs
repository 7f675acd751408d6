use gotype_parser::error::{Diag, LexErrorKind};
use gotype_parser::lexer::{Lexer, Tok};

fn lex_all(input: &str) -> (Vec<(usize, Tok<'_>, usize)>, Vec<Diag>) {
    let mut lx = Lexer::new(input);
    let toks: Vec<_> = lx.by_ref().collect();
    let diags = lx.take_diags();
    (toks, diags)
}

fn lex1(input: &str) -> (Tok<'_>, Vec<Diag>) {
    let mut lx = Lexer::new(input);
    let t = lx.next().map(|(_, t, _)| t).unwrap_or(Tok::Semi);
    let diags = lx.take_diags();
    (t, diags)
}

#[test]
fn raw_string_keeps_everything_verbatim() {
    let src = "`json:\"name\" \\n\nnext line`";
    let (t, diags) = lex1(src);
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(t, Tok::RawStringLit(src));
}

#[test]
fn interpreted_string_valid_escapes() {
    for s in [
        r#""\n""#,
        r#""\t""#,
        r#""\\\"""#,
        r#""\x41""#,
        r#""\101""#,
        r#""\u0041""#,
        r#""\U00000041""#,
        r#""json:\"x\"""#,
    ] {
        let (t, diags) = lex1(s);
        assert!(diags.is_empty(), "{s} produced diags: {diags:?}");
        assert_eq!(t, Tok::StringLit(s), "{s}");
    }
}

#[test]
fn interpreted_string_bad_escapes() {
    for s in [r#""\q""#, r#""\'""#, r#""\uD800""#, r#""\400""#, r#""\x4""#] {
        let (t, diags) = lex1(s);
        assert_eq!(t, Tok::Error(LexErrorKind::InvalidEscape), "{s}");
        assert_eq!(diags.len(), 1, "{s}");
    }
}

#[test]
fn interpreted_string_stops_at_newline() {
    let (toks, diags) = lex_all("\"abc\ndef\"");
    assert_eq!(toks[0], (0, Tok::Error(LexErrorKind::UnterminatedString), 4));
    assert_eq!(diags.len(), 2, "both halves are unterminated: {diags:?}");
}

#[test]
fn unterminated_literals_at_eof() {
    for (src, kind) in [
        ("`abc", LexErrorKind::UnterminatedString),
        ("\"abc", LexErrorKind::UnterminatedString),
        ("\"abc\\", LexErrorKind::UnterminatedString),
        ("/* abc", LexErrorKind::UnterminatedComment),
    ] {
        let (toks, diags) = lex_all(src);
        assert_eq!(toks[0].1, Tok::Error(kind), "{src:?}");
        assert_eq!(toks[0].2, src.len(), "{src:?}");
        assert_eq!(diags.len(), 1);
    }
}

#[test]
fn rune_literals_are_opaque() {
    for s in ["'a'", r"'\n'", r"'\x41'", "'é'"] {
        let (t, diags) = lex1(s);
        assert!(diags.is_empty(), "{s} produced diags: {diags:?}");
        assert_eq!(t, Tok::RuneLit(s));
    }
}

#[test]
fn illegal_characters_are_reported_not_skipped() {
    let (toks, diags) = lex_all("a @ b");
    assert_eq!(toks[1], (2, Tok::Error(LexErrorKind::InvalidToken), 3));
    assert_eq!(toks[2].1, Tok::Ident("b"));
    assert_eq!(diags.len(), 1);
}

#[test]
fn bom_only_allowed_first() {
    let (toks, _) = lex_all("\u{FEFF}a");
    assert_eq!(toks[0].1, Tok::Ident("a"));

    let (toks, diags) = lex_all("a\u{FEFF}");
    assert_eq!(toks[1].1, Tok::Error(LexErrorKind::InvalidToken));
    assert_eq!(diags.len(), 1);
}
