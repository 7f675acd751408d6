use crate::error::{Diag, LexError, LexErrorKind, Span};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 0. Shared helpers
// =============================================================================

#[inline(always)]
const fn first_newline_offset(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'\n' | b'\r') {
            return Some(i);
        }
        i += 1;
    }

    None
}

#[inline(always)]
const fn hex_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'f' => Some((b - b'a') as u32 + 10),
        b'A'..=b'F' => Some((b - b'A') as u32 + 10),
        _ => None,
    }
}

// =============================================================================
// 1. Block comment and string scanners (manual; memchr)
// =============================================================================

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    use memchr::memchr;

    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;

        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }

        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

/// Backtick literal: everything up to the next backtick, newlines included.
#[inline]
fn lex_raw_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();

    match memchr::memchr(b'`', rem) {
        Some(close) => {
            lex.bump(close + 1);
            Ok(())
        }
        None => {
            lex.bump(rem.len());
            Err(LexErrorKind::UnterminatedString)
        }
    }
}

/// Double-quoted literal: stops at the first unescaped `"`, a line break or EOF.
#[inline]
fn lex_interpreted_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut i = 0;

    while let Some(off) = memchr::memchr3(b'"', b'\\', b'\n', &rem[i..]) {
        let at = i + off;
        // A bare CR also ends the line.
        if let Some(cr) = memchr::memchr(b'\r', &rem[i..at]) {
            lex.bump(i + cr);
            return Err(LexErrorKind::UnterminatedString);
        }

        match rem[at] {
            b'"' => {
                lex.bump(at + 1);
                return decode_escapes(&rem[..at]).map(drop);
            }
            b'\\' => match rem.get(at + 1) {
                Some(b'\n' | b'\r') | None => {
                    lex.bump(at + 1);
                    return Err(LexErrorKind::UnterminatedString);
                }
                Some(_) => i = at + 2,
            },
            _ => {
                lex.bump(at);
                return Err(LexErrorKind::UnterminatedString);
            }
        }
    }

    let tail = memchr::memchr(b'\r', &rem[i..]).map_or(rem.len(), |cr| i + cr);
    lex.bump(tail);
    Err(LexErrorKind::UnterminatedString)
}

// =============================================================================
// 2. Escape decoding for double-quoted literals
// =============================================================================

/// Decodes the body of a double-quoted literal (delimiters excluded).
///
/// `\xHH` and `\ooo` produce raw bytes, `\u`/`\U` produce UTF-8; the result is
/// therefore bytes, not necessarily valid UTF-8.
pub fn decode_escapes(body: &[u8]) -> Result<Vec<u8>, LexErrorKind> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;

    while i < body.len() {
        let b = body[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let esc = *body.get(i + 1).ok_or(LexErrorKind::InvalidEscape)?;
        i += 2;
        let simple = match esc {
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'f' => Some(0x0C),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'v' => Some(0x0B),
            b'\\' => Some(b'\\'),
            b'"' => Some(b'"'),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            continue;
        }

        match esc {
            b'x' => {
                let v = read_hex(body, i, 2)?;
                out.push(v as u8);
                i += 2;
            }
            b'u' | b'U' => {
                let digits = if esc == b'u' { 4 } else { 8 };
                let v = read_hex(body, i, digits)?;
                // Rejects surrogates and values above U+10FFFF.
                let ch = char::from_u32(v).ok_or(LexErrorKind::InvalidEscape)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += digits;
            }
            b'0'..=b'7' => {
                let digits = body.get(i - 1..i + 2).ok_or(LexErrorKind::InvalidEscape)?;
                let mut v = 0u32;
                for &d in digits {
                    if !(b'0'..=b'7').contains(&d) {
                        return Err(LexErrorKind::InvalidEscape);
                    }
                    v = v * 8 + (d - b'0') as u32;
                }
                if v > 255 {
                    return Err(LexErrorKind::InvalidEscape);
                }
                out.push(v as u8);
                i += 2;
            }
            _ => return Err(LexErrorKind::InvalidEscape),
        }
    }

    Ok(out)
}

#[inline]
fn read_hex(body: &[u8], start: usize, digits: usize) -> Result<u32, LexErrorKind> {
    let chunk = body
        .get(start..start + digits)
        .ok_or(LexErrorKind::InvalidEscape)?;

    chunk.iter().try_fold(0u32, |acc, &b| {
        hex_value(b)
            .map(|v| (acc << 4) | v)
            .ok_or(LexErrorKind::InvalidEscape)
    })
}

// =============================================================================
// 3. Token Definition (RawTok)
// =============================================================================

#[repr(u8)]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", logos::skip)] _LineComment,
    #[token("/*", lex_block_comment)]
    BlockComment,

    // Keywords the declaration grammar understands
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("func")] KwFunc,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("struct")] KwStruct,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    // Reserved words only seen inside skipped bodies
    #[token("break")] KwBreak,
    #[token("continue")] KwContinue,
    #[token("fallthrough")] KwFallthrough,
    #[token("return")] KwReturn,
    #[token("case")]
    #[token("default")]
    #[token("defer")]
    #[token("else")]
    #[token("for")]
    #[token("go")]
    #[token("goto")]
    #[token("if")]
    #[token("range")]
    #[token("select")]
    #[token("switch")]
    KwOther,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    // Numbers are opaque: one maximal token, never validated.
    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9A-Za-z_]*)?")]
    #[regex(r"\.[0-9][0-9A-Za-z_]*")]
    Number,

    #[token("`", lex_raw_string)] RawString,
    #[token("\"", lex_interpreted_string)] String,
    #[regex(r"'([^'\\\n\r]|\\[^\n\r])+'")] Rune,

    #[token("...")] Ellipsis,
    #[token("<-")] Arrow,
    #[token("++")]
    #[token("--")]
    IncDec,
    #[regex(r"<<=|>>=|&\^=|\+=|-=|\*=|/=|%=|&=|\|=|\^=|<<|>>|&\^|&&|\|\||==|!=|<=|>=|:=")]
    #[regex(r"[+\-/%&^!<>]")]
    Operator,
    #[token("=")] Assign,
    #[token("*")] Star,
    #[token("|")] Pipe,
    #[token("~")] Tilde,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

// =============================================================================
// 4. Lookup tables
// =============================================================================

macro_rules! gen_lookup_table {
    ($size:expr, $($variant:ident),* $(,)?) => {{
        let mut table = [false; $size];
        $(table[RawTok::$variant as usize] = true;)*
        table
    }};
}

const SEMI_INSERT_TABLE: [bool; 64] = gen_lookup_table!(
    64,
    Ident,
    Number,
    Rune,
    String,
    RawString,
    KwBreak,
    KwContinue,
    KwFallthrough,
    KwReturn,
    IncDec,
    RParen,
    RBrack,
    RBrace,
);

impl RawTok {
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        SEMI_INSERT_TABLE[self as usize]
    }

    #[inline]
    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        match self {
            Self::Ident => Tok::Ident(slice),
            Self::Number => Tok::Number(slice),
            Self::Rune => Tok::RuneLit(slice),
            Self::String => Tok::StringLit(slice),
            Self::RawString => Tok::RawStringLit(slice),

            Self::KwChan => Tok::KwChan,
            Self::KwConst => Tok::KwConst,
            Self::KwFunc => Tok::KwFunc,
            Self::KwImport => Tok::KwImport,
            Self::KwInterface => Tok::KwInterface,
            Self::KwMap => Tok::KwMap,
            Self::KwPackage => Tok::KwPackage,
            Self::KwStruct => Tok::KwStruct,
            Self::KwType => Tok::KwType,
            Self::KwVar => Tok::KwVar,
            Self::KwBreak
            | Self::KwContinue
            | Self::KwFallthrough
            | Self::KwReturn
            | Self::KwOther => Tok::Keyword(slice),

            Self::IncDec | Self::Operator => Tok::Op(slice),
            Self::Ellipsis => Tok::Ellipsis,
            Self::Arrow => Tok::Arrow,
            Self::Assign => Tok::Assign,
            Self::Star => Tok::Star,
            Self::Pipe => Tok::Pipe,
            Self::Tilde => Tok::Tilde,

            Self::LParen => Tok::LParen,
            Self::RParen => Tok::RParen,
            Self::LBrack => Tok::LBrack,
            Self::RBrack => Tok::RBrack,
            Self::LBrace => Tok::LBrace,
            Self::RBrace => Tok::RBrace,
            Self::Comma => Tok::Comma,
            Self::Semi => Tok::Semi,
            Self::Colon => Tok::Colon,
            Self::Dot => Tok::Dot,

            // Trivia and errors never reach here; the wrapper filters them.
            Self::Bom | Self::Newline | Self::_LineComment | Self::BlockComment | Self::Error => {
                Tok::Error(LexErrorKind::InvalidToken)
            }
        }
    }
}

// =============================================================================
// 5. Public Token Definition (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'input> {
    Ident(&'input str),
    Number(&'input str),
    RuneLit(&'input str),
    /// Double-quoted literal, delimiters included.
    StringLit(&'input str),
    /// Backtick literal, delimiters included.
    RawStringLit(&'input str),

    KwChan,
    KwConst,
    KwFunc,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwStruct,
    KwType,
    KwVar,
    /// Any other reserved word.
    Keyword(&'input str),

    /// Operator with no role in declaration syntax (`+`, `<<`, `&&`, ...).
    Op(&'input str),
    Ellipsis,
    Arrow,
    Assign,
    Star,
    Pipe,
    Tilde,

    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error(LexErrorKind),
}

impl Tok<'_> {
    /// Short human-readable name, used in parse error expectations.
    pub fn describe(&self) -> String {
        match self {
            Tok::Ident(s) => format!("identifier `{s}`"),
            Tok::Number(s) | Tok::RuneLit(s) => format!("literal `{s}`"),
            Tok::StringLit(_) | Tok::RawStringLit(_) => "string literal".to_string(),
            Tok::Keyword(s) | Tok::Op(s) => format!("`{s}`"),
            Tok::Error(kind) => kind.to_string(),
            other => format!("`{}`", other.punct()),
        }
    }

    fn punct(&self) -> &'static str {
        match self {
            Tok::KwChan => "chan",
            Tok::KwConst => "const",
            Tok::KwFunc => "func",
            Tok::KwImport => "import",
            Tok::KwInterface => "interface",
            Tok::KwMap => "map",
            Tok::KwPackage => "package",
            Tok::KwStruct => "struct",
            Tok::KwType => "type",
            Tok::KwVar => "var",
            Tok::Ellipsis => "...",
            Tok::Arrow => "<-",
            Tok::Assign => "=",
            Tok::Star => "*",
            Tok::Pipe => "|",
            Tok::Tilde => "~",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Colon => ":",
            Tok::Dot => ".",
            _ => "?",
        }
    }
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

// =============================================================================
// 6. Lexer wrapper: semicolon insertion + diags
// =============================================================================

/// Lazy token stream over declaration source.
///
/// Yields `(start, tok, end)` byte triples. Injected semicolons are zero-width
/// (`start == end`). Cloning a lexer restarts iteration from its current point.
#[derive(Clone)]
pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let span = Span::from_range(span);
        self.diags.push(LexError { kind, span }.diag());
    }

    #[inline]
    fn emit_semi_at(&mut self, pos: usize) {
        self.pending = Some((pos, Tok::Semi, pos));
    }

    #[inline]
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>, slice: &str) -> bool {
        match raw {
            RawTok::Newline => {
                if self.last_can_insert_semi {
                    self.last_can_insert_semi = false;
                    self.emit_semi_at(span.start);
                }
                true
            }
            RawTok::BlockComment => {
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        self.emit_semi_at(span.start + off);
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            match self.logos.next() {
                None => {
                    // Don't return yet: a pending ';' may still have to go out.
                    self.handle_eof();
                    continue;
                }
                Some(Err(kind)) => return Some(self.handle_lex_error(kind)),
                Some(Ok(raw)) => {
                    if let Some(item) = self.handle_raw_token(raw) {
                        return Some(item);
                    }
                }
            }
        }
    }
}

impl<'src> Lexer<'src> {
    #[inline]
    fn handle_eof(&mut self) {
        self.eof_done = true;

        if self.last_can_insert_semi {
            self.last_can_insert_semi = false;
            self.emit_semi_at(self.src_len);
        }
    }

    #[inline]
    fn handle_lex_error(&mut self, kind: LexErrorKind) -> (usize, Tok<'src>, usize) {
        let span = self.logos.span();
        self.push_lex_diag(kind, span.clone());
        self.last_can_insert_semi = false;
        (span.start, Tok::Error(kind), span.end)
    }

    /// `None` means the raw token was trivia and nothing is emitted.
    #[inline]
    fn handle_raw_token(&mut self, raw: RawTok) -> Option<(usize, Tok<'src>, usize)> {
        let span = self.logos.span();
        let slice = self.logos.slice();

        if raw == RawTok::Bom {
            if span.start == 0 {
                return None;
            }
            return Some(self.handle_lex_error(LexErrorKind::InvalidToken));
        }

        if self.handle_trivia(raw, &span, slice) {
            return None;
        }

        if raw == RawTok::Error {
            return Some(self.handle_lex_error(LexErrorKind::InvalidToken));
        }

        self.last_can_insert_semi = raw.can_insert_semicolon();
        Some((span.start, raw.to_token(slice), span.end))
    }
}
