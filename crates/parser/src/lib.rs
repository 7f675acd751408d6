//! Parser for Go-style type declarations (Logos lexer + hand-written parser).
//!
//! - Lexer uses Logos and implements Go semicolon insertion.
//! - Parser reads `package`/`import`/`type` declarations into an owned model;
//!   `func`, `var` and `const` declarations are skipped as opaque text.
//! - Every model node prints back as canonical source through `Display`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
mod parser_support;
mod print;
pub mod walk;

// Re-exports for convenience
pub use ast::{Field, SourceFile, TypeDecl, TypeExpr};
pub use error::{Diag, DiagKind, Error, LexErrorKind, ParseErrorKind, ParseFailure, Span};
pub use lexer::{Lexer, Tok};
pub use parser::{Parser, ParserConfig};
pub use walk::{Visitor, Walk, WalkChildren};

/// Parses a file of top-level declarations.
pub fn parse_source(src: &str) -> Result<SourceFile, ParseFailure> {
    Parser::new(src).parse_source()
}

/// Parses exactly one `type` declaration.
pub fn parse_decl(src: &str) -> error::Result<TypeDecl> {
    Parser::new(src).parse_decl()
}

/// Parses exactly one type expression.
pub fn parse_type(src: &str) -> error::Result<TypeExpr> {
    Parser::new(src).parse_type()
}
