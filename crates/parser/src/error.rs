use std::fmt;

use thiserror::Error;

/// Compact byte-span used across the parser.
///
/// Offsets are `u32` for compactness; inputs beyond 4GiB are clamped rather
/// than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        let s = if start > u32::MAX as usize {
            u32::MAX
        } else {
            start as u32
        };
        let e = if end > u32::MAX as usize {
            u32::MAX
        } else {
            end as u32
        };
        Self { start: s, end: e }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub const fn to(self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

/// Flattened diagnostic, the form handed to callers in a [`ParseFailure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

/// Result of a failed [`crate::parse_source`] run.
///
/// `partial` holds every declaration completed before the failing one; the
/// failing declaration itself is never included.
#[derive(Debug)]
pub struct ParseFailure {
    pub partial: Option<crate::ast::SourceFile>,
    pub diags: Vec<Diag>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diags.first() {
            Some(d) => write!(f, "{} at {}", d.message, d.span),
            None => f.write_str("parse failed"),
        }
    }
}

impl std::error::Error for ParseFailure {}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid escape")]
    InvalidEscape,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unclosed delimiter")]
    Unclosed,
    #[error("type argument list cannot be empty")]
    EmptyTypeArgs,
    #[error("embedded field must be a type name or a pointer to a type name")]
    IllegalEmbedded,
    #[error("alias declaration cannot have type parameters")]
    AliasTypeParams,
    #[error("type expression nested too deeply")]
    NestingTooDeep,
    #[error("declaration is not supported here")]
    UnsupportedDecl,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at {span}; expected {expected}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Human-readable description of what the parser was looking for.
    pub expected: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, expected: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            expected: expected.into(),
        }
    }

    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Parse,
            span: self.span,
            message: format!("{}; expected {}", self.kind, self.expected),
        }
    }
}

/// Any failure produced while turning source text into the model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Byte offset where the failure starts.
    pub fn offset(&self) -> usize {
        self.span().start as usize
    }

    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span,
            Error::Parse(e) => e.span,
        }
    }

    pub fn diag(&self) -> Diag {
        match self {
            Error::Lex(e) => e.diag(),
            Error::Parse(e) => e.diag(),
        }
    }

    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            Error::Parse(e) => Some(e.kind),
            Error::Lex(_) => None,
        }
    }

    pub fn lex_kind(&self) -> Option<LexErrorKind> {
        match self {
            Error::Lex(e) => Some(e.kind),
            Error::Parse(_) => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
