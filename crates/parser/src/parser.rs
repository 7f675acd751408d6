//! Recursive-descent parser for declaration files.
//!
//! The token stream is collected up front (semicolons already inserted) so
//! that the few ambiguous spots can be settled by bounded lookahead instead
//! of backtracking:
//!
//! - `type T [` starts type parameters only when the bracket opens with an
//!   identifier followed by something that can begin a constraint.
//! - A struct field `a [...]` is a named array field when a type follows the
//!   matching `]`, and an embedded instantiation otherwise.
//!
//! A lexical error truncates the token stream; the parser reports it when it
//! reaches that point, so every declaration before it still completes.

use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{Error, LexError, ParseError, ParseErrorKind, ParseFailure, Result, Span};
use crate::lexer::{Lexer, Tok};
use crate::parser_support::{
    continues_type_param, resolve_param_list, starts_type, starts_type_literal, tok_span,
    ParamEntry,
};

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser settings. No I/O or environment is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Deepest allowed nesting of type expressions.
    pub max_depth: usize,
    /// Record top-level `func`/`var`/`const` as [`Decl::Opaque`] instead of
    /// failing on them.
    pub skip_opaque_decls: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            skip_opaque_decls: true,
        }
    }
}

impl ParserConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_skip_opaque_decls(mut self, skip: bool) -> Self {
        self.skip_opaque_decls = skip;
        self
    }
}

type Spanned<'src> = (usize, Tok<'src>, usize);

pub struct Parser<'src> {
    src: &'src str,
    toks: Vec<Spanned<'src>>,
    /// First lexical error; `toks` stops right before it.
    lex_error: Option<LexError>,
    pos: usize,
    depth: usize,
    config: ParserConfig,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self::with_config(src, ParserConfig::default())
    }

    pub fn with_config(src: &'src str, config: ParserConfig) -> Self {
        let mut toks = Vec::new();
        let mut lex_error = None;

        for (start, tok, end) in Lexer::new(src) {
            if let Tok::Error(kind) = tok {
                lex_error = Some(LexError {
                    kind,
                    span: tok_span(start, end),
                });
                break;
            }
            toks.push((start, tok, end));
        }

        Self {
            src,
            toks,
            lex_error,
            pos: 0,
            depth: 0,
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Parses a whole file. On failure the returned [`ParseFailure`] carries
    /// every declaration completed before the failing one.
    #[tracing::instrument(level = "debug", skip_all, fields(len = self.src.len()))]
    pub fn parse_source(mut self) -> Result<SourceFile, ParseFailure> {
        let mut file = SourceFile::default();

        match self.source_file(&mut file) {
            Ok(()) => {
                debug!(
                    decls = file.decls().len(),
                    imports = file.imports().len(),
                    "parsed source file"
                );
                Ok(file)
            }
            Err(err) => {
                debug!(%err, completed = file.decls().len(), "source file failed");
                Err(ParseFailure {
                    diags: vec![err.diag()],
                    partial: Some(file),
                })
            }
        }
    }

    /// Parses exactly one ungrouped `type` declaration.
    #[tracing::instrument(level = "debug", skip_all, fields(len = self.src.len()))]
    pub fn parse_decl(mut self) -> Result<TypeDecl> {
        self.skip_semis();
        self.expect(Tok::KwType, "`type`")?;
        if self.peek() == Some(Tok::LParen) {
            return Err(self.unexpected("a single type declaration"));
        }
        let decl = self.type_spec()?;
        self.finish()?;
        debug!(decl = decl.name(), "parsed declaration");
        Ok(decl)
    }

    /// Parses exactly one type expression.
    #[tracing::instrument(level = "debug", skip_all, fields(len = self.src.len()))]
    pub fn parse_type(mut self) -> Result<TypeExpr> {
        self.skip_semis();
        let ty = self.type_expr()?;
        self.finish()?;
        Ok(ty)
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    #[inline]
    fn peek(&self) -> Option<Tok<'src>> {
        self.peek_nth(0)
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<Tok<'src>> {
        self.toks.get(self.pos + n).map(|t| t.1)
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    /// Nothing but (usually inserted) semicolons remain.
    fn only_semis_left(&self) -> bool {
        self.toks
            .get(self.pos..)
            .map_or(true, |rest| rest.iter().all(|t| t.1 == Tok::Semi))
    }

    fn eof_span(&self) -> Span {
        match &self.lex_error {
            Some(e) => Span::empty_at(e.span.start as usize),
            None => Span::empty_at(self.src.len()),
        }
    }

    fn cur_span(&self) -> Span {
        match self.toks.get(self.pos) {
            Some(&(start, _, end)) => tok_span(start, end),
            None => self.eof_span(),
        }
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.toks.get(i))
            .map_or(0, |t| t.2)
    }

    fn bump(&mut self) -> Span {
        let span = self.cur_span();
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    fn eat(&mut self, tok: Tok<'src>) -> Option<Span> {
        if self.peek() == Some(tok) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(Tok::Semi).is_some() {}
    }

    // =========================================================================
    // Errors
    // =========================================================================

    fn error(&self, kind: ParseErrorKind, span: Span, expected: impl Into<String>) -> Error {
        ParseError::new(kind, span, expected).into()
    }

    /// Error for running out of tokens; a pending lexical error wins.
    fn eof_error(&self, kind: ParseErrorKind, span: Span, expected: &str) -> Error {
        match &self.lex_error {
            Some(e) => Error::Lex(e.clone()),
            None => self.error(kind, span, expected),
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.toks.get(self.pos) {
            Some(&(start, tok, end)) => self.error(
                ParseErrorKind::UnexpectedToken,
                tok_span(start, end),
                format!("{expected}, found {tok}"),
            ),
            None => self.eof_error(ParseErrorKind::UnexpectedEof, self.eof_span(), expected),
        }
    }

    fn expect(&mut self, tok: Tok<'src>, expected: &str) -> Result<Span> {
        self.eat(tok).ok_or_else(|| self.unexpected(expected))
    }

    fn expect_close(&mut self, close: Tok<'src>, open: Span, expected: &str) -> Result<Span> {
        if let Some(span) = self.eat(close) {
            return Ok(span);
        }
        if self.only_semis_left() {
            return Err(self.eof_error(ParseErrorKind::Unclosed, open, expected));
        }
        Err(self.unexpected(expected))
    }

    fn expect_ident(&mut self, expected: &str) -> Result<&'src str> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Consumes a `;`; a following `close` token or a clean EOF also ends the
    /// element without being consumed.
    fn expect_terminator(&mut self, close: Option<Tok<'src>>, expected: &str) -> Result<()> {
        match self.peek() {
            Some(Tok::Semi) => {
                self.pos += 1;
                Ok(())
            }
            None => match &self.lex_error {
                Some(e) => Err(Error::Lex(e.clone())),
                None => Ok(()),
            },
            next if next == close => Ok(()),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.skip_semis();
        if !self.at_end() {
            return Err(self.unexpected("end of input"));
        }
        match &self.lex_error {
            Some(e) => Err(Error::Lex(e.clone())),
            None => Ok(()),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(self.error(
                ParseErrorKind::NestingTooDeep,
                self.cur_span(),
                format!("at most {} nested types", self.config.max_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runs `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter()?;
        let out = f(self);
        self.leave();
        out
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    /// Index of the bracket closing the one at `open`.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, &(_, tok, _)) in self.toks.iter().enumerate().skip(open) {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// At `Ident [`: true when the bracket belongs to the identifier's type
    /// (`a []int`, `a [2]int`) rather than instantiating it (`List[int]`).
    fn bracket_then_type(&self) -> bool {
        if self.peek_nth(2) == Some(Tok::RBrack) {
            trace!("slice-typed name");
            return true;
        }
        let after = self
            .matching_close(self.pos + 1)
            .and_then(|close| self.toks.get(close + 1))
            .map(|t| t.1);
        let named = starts_type(after);
        trace!(named, "array-typed name or instantiation");
        named
    }

    /// At `type Name [`.
    fn at_type_params(&self) -> bool {
        let is_params = match (self.peek_nth(1), self.peek_nth(2)) {
            (Some(Tok::Ident(_)), Some(Tok::Star)) => self.star_starts_constraint(),
            (Some(Tok::Ident(_)), next) => continues_type_param(next),
            _ => false,
        };
        trace!(is_params, "type parameters or array length");
        is_params
    }

    /// At `type Name [P *`: `P *X` reads as a product unless `X` is a type
    /// literal or the bracket holds a top-level `,`, `~` or `|`.
    fn star_starts_constraint(&self) -> bool {
        if starts_type_literal(self.peek_nth(3)) {
            return true;
        }
        let Some(close) = self.matching_close(self.pos) else {
            return false;
        };
        let mut depth = 0usize;
        self.toks[self.pos + 1..close]
            .iter()
            .any(|&(_, tok, _)| match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => {
                    depth += 1;
                    false
                }
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    false
                }
                Tok::Comma | Tok::Tilde | Tok::Pipe => depth == 0,
                _ => false,
            })
    }

    // =========================================================================
    // File level
    // =========================================================================

    fn source_file(&mut self, file: &mut SourceFile) -> Result<()> {
        self.skip_semis();
        if self.eat(Tok::KwPackage).is_some() {
            let name = self.expect_ident("package name")?;
            file.set_package(name.to_string());
            self.expect_terminator(None, "`;` after package clause")?;
        }

        let mut seen_decl = false;
        loop {
            self.skip_semis();
            let Some(&(start, tok, _)) = self.toks.get(self.pos) else {
                break;
            };
            match tok {
                Tok::KwImport if !seen_decl => self.import_decl(file)?,
                Tok::KwType => self.type_decl(file, start)?,
                Tok::KwFunc => self.opaque_decl(file, start, OpaqueKind::Func)?,
                Tok::KwVar => self.opaque_decl(file, start, OpaqueKind::Var)?,
                Tok::KwConst => self.opaque_decl(file, start, OpaqueKind::Const)?,
                _ => return Err(self.unexpected("declaration")),
            }
            seen_decl |= tok != Tok::KwImport;
        }

        match &self.lex_error {
            Some(e) => Err(Error::Lex(e.clone())),
            None => Ok(()),
        }
    }

    fn import_decl(&mut self, file: &mut SourceFile) -> Result<()> {
        self.bump();
        if let Some(open) = self.eat(Tok::LParen) {
            while !matches!(self.peek(), Some(Tok::RParen) | None) {
                file.push_import(self.import_spec()?);
                self.expect_terminator(Some(Tok::RParen), "`;` or `)` after import")?;
            }
            self.expect_close(Tok::RParen, open, "`)` closing import group")?;
        } else {
            file.push_import(self.import_spec()?);
        }
        self.expect_terminator(None, "`;` after import declaration")
    }

    fn import_spec(&mut self) -> Result<ImportSpec> {
        let name = match self.peek() {
            Some(Tok::Dot) => Some(ImportName::Dot),
            Some(Tok::Ident("_")) => Some(ImportName::Blank),
            Some(Tok::Ident(name)) => Some(ImportName::Name(name.to_string())),
            _ => None,
        };
        if name.is_some() {
            self.pos += 1;
        }
        match self.string_lit() {
            Some(path) => Ok(ImportSpec::new(name, path)),
            None => Err(self.unexpected("import path")),
        }
    }

    fn type_decl(&mut self, file: &mut SourceFile, start: usize) -> Result<()> {
        self.bump();

        let Some(open) = self.eat(Tok::LParen) else {
            let decl = self.type_spec()?;
            let span = tok_span(start, self.prev_end());
            self.expect_terminator(None, "`;` after type declaration")?;
            file.push_decl(Decl::Type(decl), span);
            return Ok(());
        };

        // A group is all-or-nothing.
        let mut group = Vec::new();
        while !matches!(self.peek(), Some(Tok::RParen) | None) {
            let spec_start = self.cur_span().start as usize;
            let decl = self.type_spec()?;
            group.push((decl, tok_span(spec_start, self.prev_end())));
            self.expect_terminator(Some(Tok::RParen), "`;` or `)` after type spec")?;
        }
        self.expect_close(Tok::RParen, open, "`)` closing type group")?;
        self.expect_terminator(None, "`;` after type declaration")?;

        for (decl, span) in group {
            file.push_decl(Decl::Type(decl), span);
        }
        Ok(())
    }

    fn type_spec(&mut self) -> Result<TypeDecl> {
        let name = self.expect_ident("type name")?;

        let mut type_params = Vec::new();
        let mut params_span = None;
        if self.peek() == Some(Tok::LBrack) && self.at_type_params() {
            let start = self.cur_span();
            type_params = self.type_params()?;
            params_span = Some(start.to(Span::empty_at(self.prev_end())));
        }

        if self.eat(Tok::Assign).is_some() {
            if let Some(span) = params_span {
                return Err(self.error(
                    ParseErrorKind::AliasTypeParams,
                    span,
                    "an alias without type parameters",
                ));
            }
            let target = self.type_expr()?;
            trace!(decl = name, "alias declaration");
            return Ok(TypeDecl::Alias(AliasDecl::new(name, target)));
        }

        let underlying = self.type_expr()?;
        trace!(decl = name, type_params = type_params.len(), "type declaration");
        Ok(match underlying {
            TypeExpr::Struct(body) => TypeDecl::Struct(StructDecl::new(name, type_params, body)),
            TypeExpr::Interface(body) => {
                TypeDecl::Interface(InterfaceDecl::new(name, type_params, body))
            }
            other => TypeDecl::Defined(DefinedTypeDecl::new(name, type_params, other)),
        })
    }

    /// Skips a `func`/`var`/`const` declaration up to its terminating `;`,
    /// matching brackets on the way.
    fn opaque_decl(&mut self, file: &mut SourceFile, start: usize, kind: OpaqueKind) -> Result<()> {
        if !self.config.skip_opaque_decls {
            return Err(self.error(
                ParseErrorKind::UnsupportedDecl,
                self.cur_span(),
                "type, import or package declaration",
            ));
        }

        let mut open_stack: Vec<Span> = Vec::new();
        while let Some(&(s, tok, e)) = self.toks.get(self.pos) {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => open_stack.push(tok_span(s, e)),
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    if open_stack.pop().is_none() {
                        return Err(self.unexpected("balanced brackets"));
                    }
                }
                Tok::Semi if open_stack.is_empty() => break,
                _ => {}
            }
            self.pos += 1;
        }
        if let Some(&open) = open_stack.last() {
            return Err(self.eof_error(ParseErrorKind::Unclosed, open, "closing bracket"));
        }

        let end = self.prev_end();
        let text = self.src.get(start..end).unwrap_or_default().to_string();
        self.expect_terminator(None, "`;` after declaration")?;
        trace!(?kind, len = text.len(), "skipped declaration");
        file.push_decl(Decl::Opaque { kind, text }, tok_span(start, end));
        Ok(())
    }

    // =========================================================================
    // Generics
    // =========================================================================

    fn type_params(&mut self) -> Result<Vec<TypeParam>> {
        let open = self.bump();
        let mut params = Vec::new();

        while self.peek() != Some(Tok::RBrack) {
            let mut names = Names::new();
            names.push(self.expect_ident("type parameter name")?.to_string());
            while self.eat(Tok::Comma).is_some() {
                names.push(self.expect_ident("type parameter name")?.to_string());
            }
            let constraint = self.constraint()?;
            params.push(TypeParam::new(names, constraint));
            if self.eat(Tok::Comma).is_none() {
                break;
            }
        }

        self.expect_close(Tok::RBrack, open, "`]` closing type parameters")?;
        Ok(params)
    }

    /// `interface { ... }` as written, or a bare union wrapped as an implicit
    /// interface.
    fn constraint(&mut self) -> Result<InterfaceType> {
        let mut terms = self.type_terms()?;
        if terms.len() == 1
            && !terms[0].is_approx()
            && matches!(terms[0].ty(), TypeExpr::Interface(_))
        {
            if let Some(TypeExpr::Interface(iface)) = terms.pop().map(TypeSetTerm::into_ty) {
                return Ok(iface);
            }
        }
        Ok(InterfaceType::implicit(TypeElem::new(terms)))
    }

    fn type_terms(&mut self) -> Result<Vec<TypeSetTerm>> {
        let mut terms = vec![self.type_term()?];
        while self.eat(Tok::Pipe).is_some() {
            terms.push(self.type_term()?);
        }
        Ok(terms)
    }

    fn type_term(&mut self) -> Result<TypeSetTerm> {
        let approx = self.eat(Tok::Tilde).is_some();
        let ty = self.type_expr()?;
        Ok(TypeSetTerm::new(approx, ty))
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub(crate) fn type_expr(&mut self) -> Result<TypeExpr> {
        self.nested(Self::type_expr_inner)
    }

    fn type_expr_inner(&mut self) -> Result<TypeExpr> {
        match self.peek() {
            Some(Tok::Ident(_)) => self.type_name().map(TypeExpr::Named),
            Some(Tok::Star) => {
                self.pos += 1;
                Ok(TypeExpr::pointer(self.type_expr()?))
            }
            Some(Tok::LBrack) => self.nested(Self::array_or_slice),
            Some(Tok::KwMap) => self.nested(Self::map_type),
            Some(Tok::KwChan) => {
                self.pos += 1;
                let dir = match self.eat(Tok::Arrow) {
                    Some(_) => ChanDir::Send,
                    None => ChanDir::Both,
                };
                Ok(TypeExpr::chan(dir, self.type_expr()?))
            }
            Some(Tok::Arrow) => {
                self.pos += 1;
                self.expect(Tok::KwChan, "`chan` after `<-`")?;
                Ok(TypeExpr::chan(ChanDir::Recv, self.type_expr()?))
            }
            Some(Tok::KwStruct) => self.nested(Self::struct_type).map(TypeExpr::Struct),
            Some(Tok::KwInterface) => self
                .nested(Self::interface_type)
                .map(TypeExpr::Interface),
            Some(Tok::KwFunc) => {
                self.pos += 1;
                self.nested(Self::signature).map(TypeExpr::Func)
            }
            Some(Tok::LParen) => {
                let open = self.bump();
                let ty = self.type_expr()?;
                self.expect_close(Tok::RParen, open, "`)` closing parenthesized type")?;
                Ok(ty)
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// `[pkg.]Name[TypeArgs]`
    fn type_name(&mut self) -> Result<NamedType> {
        let first = self.expect_ident("type name")?;
        let mut named = match self.eat(Tok::Dot) {
            Some(_) => NamedType::qualified(first, self.expect_ident("type name after `.`")?),
            None => NamedType::new(first),
        };
        if self.peek() == Some(Tok::LBrack) {
            named = named.with_args(self.nested(Self::type_args)?);
        }
        Ok(named)
    }

    fn type_args(&mut self) -> Result<Vec<TypeExpr>> {
        let open = self.bump();
        if let Some(close) = self.eat(Tok::RBrack) {
            return Err(self.error(
                ParseErrorKind::EmptyTypeArgs,
                open.to(close),
                "at least one type argument",
            ));
        }

        let mut args = vec![self.type_expr()?];
        while self.eat(Tok::Comma).is_some() && self.peek() != Some(Tok::RBrack) {
            args.push(self.type_expr()?);
        }
        self.expect_close(Tok::RBrack, open, "`]` closing type arguments")?;
        Ok(args)
    }

    fn array_or_slice(&mut self) -> Result<TypeExpr> {
        let open = self.bump();
        if self.eat(Tok::RBrack).is_some() {
            return Ok(TypeExpr::slice(self.type_expr()?));
        }
        let len = self.array_len(open)?;
        Ok(TypeExpr::Array {
            len,
            elem: Box::new(self.type_expr()?),
        })
    }

    /// Captures the length tokens up to the matching `]` as source text.
    fn array_len(&mut self, open: Span) -> Result<RawExpr> {
        let first = self.cur_span().start as usize;
        let mut depth = 0usize;

        loop {
            match self.peek() {
                None => {
                    return Err(self.eof_error(
                        ParseErrorKind::Unclosed,
                        open,
                        "`]` closing array length",
                    ))
                }
                Some(Tok::LParen | Tok::LBrack | Tok::LBrace) => depth += 1,
                Some(Tok::RBrack) if depth == 0 => break,
                Some(Tok::RParen | Tok::RBrack | Tok::RBrace) => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => return Err(self.unexpected("array length")),
                },
                Some(Tok::Semi) if self.only_semis_left() => {
                    return Err(self.eof_error(
                        ParseErrorKind::Unclosed,
                        open,
                        "`]` closing array length",
                    ))
                }
                Some(Tok::Semi) if depth == 0 => {
                    return Err(self.unexpected("`]` closing array length"))
                }
                _ => {}
            }
            self.pos += 1;
        }

        let text = self.src.get(first..self.prev_end()).unwrap_or_default();
        self.bump();
        Ok(RawExpr::new(text))
    }

    fn map_type(&mut self) -> Result<TypeExpr> {
        self.pos += 1;
        let open = self.expect(Tok::LBrack, "`[` after `map`")?;
        let key = self.type_expr()?;
        self.expect_close(Tok::RBrack, open, "`]` closing map key")?;
        if !starts_type(self.peek()) {
            return Err(self.unexpected("map value type"));
        }
        let value = self.type_expr()?;
        Ok(TypeExpr::map(key, value))
    }

    // =========================================================================
    // Structs
    // =========================================================================

    fn struct_type(&mut self) -> Result<StructType> {
        self.pos += 1;
        let open = self.expect(Tok::LBrace, "`{` after `struct`")?;

        let mut fields = Vec::new();
        while !matches!(self.peek(), Some(Tok::RBrace) | None) {
            fields.push(self.field_decl()?);
            self.expect_terminator(Some(Tok::RBrace), "`;` or `}` after field")?;
        }

        self.expect_close(Tok::RBrace, open, "`}` closing struct")?;
        Ok(StructType::new(fields))
    }

    fn field_decl(&mut self) -> Result<Field> {
        let start = self.cur_span().start as usize;
        match (self.peek(), self.peek_nth(1)) {
            (Some(Tok::Ident(_)), Some(Tok::Comma)) => self.named_field(),
            (Some(Tok::Ident(_)), Some(Tok::LBrack)) => {
                if self.bracket_then_type() {
                    self.named_field()
                } else {
                    self.embedded_field(start)
                }
            }
            (Some(Tok::Ident(_)), next) if next != Some(Tok::Dot) && starts_type(next) => {
                self.named_field()
            }
            _ => self.embedded_field(start),
        }
    }

    fn named_field(&mut self) -> Result<Field> {
        let mut names = Names::new();
        names.push(self.expect_ident("field name")?.to_string());
        while self.eat(Tok::Comma).is_some() {
            names.push(self.expect_ident("field name")?.to_string());
        }
        let ty = self.type_expr()?;
        let tag = self.tag();
        trace!(names = ?names, "named field");
        Ok(Field::named(names, ty, tag))
    }

    fn embedded_field(&mut self, start: usize) -> Result<Field> {
        let ty = self.type_expr()?;
        let span = tok_span(start, self.prev_end());
        let tag = self.tag();
        trace!(%span, "embedded field");
        Field::embedded(ty, tag).ok_or_else(|| {
            self.error(
                ParseErrorKind::IllegalEmbedded,
                span,
                "a type name or a pointer to a type name",
            )
        })
    }

    fn string_lit(&mut self) -> Option<TagLiteral> {
        let lit = match self.peek()? {
            Tok::StringLit(text) => TagLiteral::from_token(text, Quoting::DoubleQuote),
            Tok::RawStringLit(text) => TagLiteral::from_token(text, Quoting::Backtick),
            _ => return None,
        };
        self.pos += 1;
        Some(lit)
    }

    #[inline]
    fn tag(&mut self) -> Option<TagLiteral> {
        self.string_lit()
    }

    // =========================================================================
    // Interfaces and signatures
    // =========================================================================

    fn interface_type(&mut self) -> Result<InterfaceType> {
        self.pos += 1;
        let open = self.expect(Tok::LBrace, "`{` after `interface`")?;

        let mut elems = Vec::new();
        let mut methods = Vec::new();
        while !matches!(self.peek(), Some(Tok::RBrace) | None) {
            match (self.peek(), self.peek_nth(1)) {
                (Some(Tok::Ident(name)), Some(Tok::LParen)) => {
                    self.pos += 1;
                    let sig = self.nested(Self::signature)?;
                    trace!(method = name, "interface method");
                    methods.push(MethodSig::new(name, sig));
                }
                _ => elems.push(TypeElem::new(self.type_terms()?)),
            }
            self.expect_terminator(Some(Tok::RBrace), "`;` or `}` after interface element")?;
        }

        self.expect_close(Tok::RBrace, open, "`}` closing interface")?;
        Ok(InterfaceType::new(elems, methods))
    }

    fn signature(&mut self) -> Result<Signature> {
        let params = self.parameters()?;
        let results = match self.peek() {
            Some(Tok::LParen) => self.parameters()?,
            next if starts_type(next) => vec![Param::unnamed(self.type_expr()?)],
            _ => Vec::new(),
        };
        Ok(Signature::new(params, results))
    }

    fn parameters(&mut self) -> Result<Vec<Param>> {
        let open = self.expect(Tok::LParen, "`(` starting parameters")?;

        let mut entries = Vec::new();
        while !matches!(self.peek(), Some(Tok::RParen) | None) {
            entries.push(self.param_entry()?);
            if self.eat(Tok::Comma).is_none() {
                break;
            }
        }

        self.expect_close(Tok::RParen, open, "`)` closing parameters")?;
        resolve_param_list(entries).map_err(Error::from)
    }

    fn param_entry(&mut self) -> Result<ParamEntry> {
        let start = self.cur_span().start as usize;
        let (name, variadic, ty) = match (self.peek(), self.peek_nth(1)) {
            (Some(Tok::Ident(name)), Some(Tok::Comma | Tok::RParen)) => {
                self.pos += 1;
                (Some(name), false, None)
            }
            (Some(Tok::Ident(name)), Some(Tok::Ellipsis)) => {
                self.pos += 2;
                (Some(name), true, Some(self.type_expr()?))
            }
            (Some(Tok::Ident(name)), Some(Tok::LBrack)) if self.bracket_then_type() => {
                self.pos += 1;
                (Some(name), false, Some(self.type_expr()?))
            }
            (Some(Tok::Ident(name)), next)
                if !matches!(next, Some(Tok::Dot | Tok::LBrack)) && starts_type(next) =>
            {
                self.pos += 1;
                (Some(name), false, Some(self.type_expr()?))
            }
            (Some(Tok::Ellipsis), _) => {
                self.pos += 1;
                (None, true, Some(self.type_expr()?))
            }
            _ => (None, false, Some(self.type_expr()?)),
        };

        Ok(ParamEntry {
            name: name.map(str::to_string),
            variadic,
            ty,
            span: tok_span(start, self.prev_end()),
        })
    }
}
