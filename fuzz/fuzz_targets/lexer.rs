// fuzz_targets/lexer.rs
#![no_main]

use gotype_parser::ast::{Quoting, TagLiteral};
use gotype_parser::lexer::{Lexer, Tok};
use libfuzzer_sys::fuzz_target;

/// A string token the lexer accepted must also be a valid tag literal that
/// prints back to the same text.
fn check_tag(text: &str, quoting: Quoting) {
    let body = &text[1..text.len() - 1];
    let tag = TagLiteral::new(body, quoting).expect("lexer and tag validation agree");
    assert_eq!(tag.to_string(), text);
    if quoting == Quoting::Backtick {
        assert!(!tag.value().contains('\r'));
    }
}

fuzz_target!(|data: &[u8]| {
    let s = std::string::String::from_utf8_lossy(data);

    let mut lx = Lexer::new(&s);
    let mut last_end = 0usize;
    let mut errors = 0usize;

    for (start, tok, end) in lx.by_ref() {
        assert!(start <= end && end <= s.len());
        assert!(start >= last_end, "tokens overlap at {start}");

        match tok {
            Tok::Semi if start == end => {}
            Tok::StringLit(text) => {
                assert_eq!(&s[start..end], text);
                check_tag(text, Quoting::DoubleQuote);
            }
            Tok::RawStringLit(text) => {
                assert_eq!(&s[start..end], text);
                check_tag(text, Quoting::Backtick);
            }
            Tok::Error(_) => errors += 1,
            _ => assert!(end > start),
        }
        last_end = last_end.max(end);
    }

    assert_eq!(errors, lx.take_diags().len());
});
