//! # Declaration Model
//!
//! The tree produced by the parser for `type` declarations and the type
//! expressions they contain.
//!
//! ## Design Goals
//!
//! - **Structural equality**: nodes derive `PartialEq`; positions live in side
//!   tables (see [`SpannedList`]) so two parses of equivalent source compare
//!   equal.
//! - **Read-only surface**: fields are private and exposed through accessors;
//!   enum variants stay public for pattern matching.
//! - **Verbatim capture**: tag literals keep their exact source text and
//!   delimiter, array lengths keep their unevaluated token text.
//!
//! ## Important Notes
//!
//! - Syntax only. Duplicate field names, empty type sets and unsatisfiable
//!   constraints are preserved as written.
//! - Package qualifiers (`time` in `time.Time`) are opaque strings.
//! - Walk/Visitor infrastructure lives in `walk.rs`; `#[derive(WalkAst)]`
//!   generates `impl crate::walk::WalkChildren`.

use ast_derive::WalkAst;
use smallvec::SmallVec;
use std::borrow::Cow;

use crate::error::{LexErrorKind, Span};
use crate::lexer::decode_escapes;

/// Identifier list sharing one type (`d, e, f []*string`); almost always one.
pub type Names = SmallVec<[String; 1]>;

// =============================================================================
// Side-table spans
// =============================================================================

/// List of nodes with their source spans stored in a parallel vector.
///
/// Spans are positional metadata and do not take part in equality.
#[derive(Debug, Clone)]
pub struct SpannedList<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedList<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, node: T, span: Span) {
        self.data.push(node);
        self.spans.push(span);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    #[inline]
    pub fn span(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Nodes paired with their spans.
    pub fn iter_spanned(&self) -> impl Iterator<Item = (&T, Span)> {
        self.data.iter().zip(self.spans.iter().copied())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: PartialEq> PartialEq for SpannedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: Eq> Eq for SpannedList<T> {}

impl<'a, T> IntoIterator for &'a SpannedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

// =============================================================================
// Source File (Root Node)
// =============================================================================

/// A parsed declaration file.
///
/// ```text
/// SourceFile = [ PackageClause ";" ] { ImportDecl ";" } { TopLevelDecl ";" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, WalkAst)]
pub struct SourceFile {
    package: Option<String>,
    imports: Vec<ImportSpec>,
    decls: SpannedList<Decl>,
}

impl SourceFile {
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    pub fn decls(&self) -> &[Decl] {
        self.decls.as_slice()
    }

    /// Byte span of the `index`-th top-level declaration.
    pub fn decl_span(&self, index: usize) -> Option<Span> {
        self.decls.span(index)
    }

    /// All type declarations, in source order, skipping opaque ones.
    pub fn type_decls(&self) -> impl Iterator<Item = &TypeDecl> {
        self.decls.iter().filter_map(Decl::as_type)
    }

    /// First type declaration with the given name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.type_decls().find(|d| d.name() == name)
    }

    pub(crate) fn set_package(&mut self, name: String) {
        self.package = Some(name);
    }

    pub(crate) fn push_import(&mut self, spec: ImportSpec) {
        self.imports.push(spec);
    }

    pub(crate) fn push_decl(&mut self, decl: Decl, span: Span) {
        self.decls.push(decl, span);
    }
}

/// `import [name] "path"`
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct ImportSpec {
    name: Option<ImportName>,
    #[walk(skip)]
    path: TagLiteral,
}

impl ImportSpec {
    pub fn new(name: Option<ImportName>, path: TagLiteral) -> Self {
        Self { name, path }
    }

    pub fn name(&self) -> Option<&ImportName> {
        self.name.as_ref()
    }

    /// Import path literal exactly as written.
    pub fn path(&self) -> &TagLiteral {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// `import . "pkg"`
    Dot,
    /// `import _ "pkg"`
    Blank,
    /// `import name "pkg"`
    Name(String),
}

/// Top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub enum Decl {
    Type(TypeDecl),
    /// `func`/`var`/`const` declaration, captured verbatim and not parsed.
    Opaque { kind: OpaqueKind, text: String },
}

impl Decl {
    pub fn as_type(&self) -> Option<&TypeDecl> {
        match self {
            Decl::Type(d) => Some(d),
            Decl::Opaque { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    Func,
    Var,
    Const,
}

// =============================================================================
// Type Declarations
// =============================================================================

/// One `type` spec.
///
/// ```text
/// TypeSpec  = AliasDecl | TypeDef
/// AliasDecl = identifier "=" Type
/// TypeDef   = identifier [ TypeParameters ] Type
/// ```
///
/// A definition whose underlying type is a struct or interface literal is
/// specialized into [`StructDecl`] / [`InterfaceDecl`].
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub enum TypeDecl {
    Struct(StructDecl),
    Interface(InterfaceDecl),
    Alias(AliasDecl),
    Defined(DefinedTypeDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Struct(d) => &d.name,
            TypeDecl::Interface(d) => &d.name,
            TypeDecl::Alias(d) => &d.name,
            TypeDecl::Defined(d) => &d.name,
        }
    }

    /// Type parameters; always empty for aliases.
    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            TypeDecl::Struct(d) => &d.type_params,
            TypeDecl::Interface(d) => &d.type_params,
            TypeDecl::Alias(_) => &[],
            TypeDecl::Defined(d) => &d.type_params,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, TypeDecl::Alias(_))
    }

    pub fn as_struct(&self) -> Option<&StructDecl> {
        match self {
            TypeDecl::Struct(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match self {
            TypeDecl::Interface(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasDecl> {
        match self {
            TypeDecl::Alias(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_defined(&self) -> Option<&DefinedTypeDecl> {
        match self {
            TypeDecl::Defined(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct StructDecl {
    name: String,
    type_params: Vec<TypeParam>,
    body: StructType,
}

impl StructDecl {
    pub fn new(name: impl Into<String>, type_params: Vec<TypeParam>, body: StructType) -> Self {
        Self {
            name: name.into(),
            type_params,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_params(&self) -> &[TypeParam] {
        &self.type_params
    }

    pub fn fields(&self) -> &[Field] {
        self.body.fields()
    }

    pub fn body(&self) -> &StructType {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct InterfaceDecl {
    name: String,
    type_params: Vec<TypeParam>,
    body: InterfaceType,
}

impl InterfaceDecl {
    pub fn new(name: impl Into<String>, type_params: Vec<TypeParam>, body: InterfaceType) -> Self {
        Self {
            name: name.into(),
            type_params,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_params(&self) -> &[TypeParam] {
        &self.type_params
    }

    /// Every type-set term of every term line, in order.
    pub fn terms(&self) -> impl Iterator<Item = &TypeSetTerm> {
        self.body.terms()
    }

    pub fn methods(&self) -> &[MethodSig] {
        self.body.methods()
    }

    pub fn body(&self) -> &InterfaceType {
        &self.body
    }
}

/// `type name = target`
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct AliasDecl {
    name: String,
    target: TypeExpr,
}

impl AliasDecl {
    pub fn new(name: impl Into<String>, target: TypeExpr) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TypeExpr {
        &self.target
    }
}

/// `type name[params] underlying` where `underlying` is not a struct or
/// interface literal.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct DefinedTypeDecl {
    name: String,
    type_params: Vec<TypeParam>,
    underlying: TypeExpr,
}

impl DefinedTypeDecl {
    pub fn new(name: impl Into<String>, type_params: Vec<TypeParam>, underlying: TypeExpr) -> Self {
        Self {
            name: name.into(),
            type_params,
            underlying,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_params(&self) -> &[TypeParam] {
        &self.type_params
    }

    pub fn underlying(&self) -> &TypeExpr {
        &self.underlying
    }
}

// =============================================================================
// Generics
// =============================================================================

/// `T, U int | []int`: names sharing one constraint.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct TypeParam {
    names: Names,
    constraint: InterfaceType,
}

impl TypeParam {
    pub fn new(names: impl IntoIterator<Item = String>, constraint: InterfaceType) -> Self {
        Self {
            names: names.into_iter().collect(),
            constraint,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Constraint as an interface. Sugar forms (`any`, `int | []int`) are an
    /// implicit interface with a single term line.
    pub fn constraint(&self) -> &InterfaceType {
        &self.constraint
    }
}

// =============================================================================
// Struct fields
// =============================================================================

/// Field group inside a struct body.
///
/// ```text
/// FieldDecl     = ( IdentifierList Type | EmbeddedField ) [ Tag ]
/// EmbeddedField = [ "*" ] TypeName [ TypeArgs ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub enum Field {
    Named {
        names: Names,
        ty: TypeExpr,
        tag: Option<TagLiteral>,
    },
    /// Declared by type alone; see [`TypeExpr::embedded_name`].
    Embedded { ty: TypeExpr, tag: Option<TagLiteral> },
}

impl Field {
    pub fn named(
        names: impl IntoIterator<Item = String>,
        ty: TypeExpr,
        tag: Option<TagLiteral>,
    ) -> Self {
        Field::Named {
            names: names.into_iter().collect(),
            ty,
            tag,
        }
    }

    /// Returns `None` when `ty` has no derivable name and so cannot be embedded.
    pub fn embedded(ty: TypeExpr, tag: Option<TagLiteral>) -> Option<Self> {
        ty.embedded_name()?;
        Some(Field::Embedded { ty, tag })
    }

    pub fn ty(&self) -> &TypeExpr {
        match self {
            Field::Named { ty, .. } | Field::Embedded { ty, .. } => ty,
        }
    }

    pub fn tag(&self) -> Option<&TagLiteral> {
        match self {
            Field::Named { tag, .. } | Field::Embedded { tag, .. } => tag.as_ref(),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Field::Embedded { .. })
    }

    /// Names as written; empty for embedded fields.
    pub fn explicit_names(&self) -> &[String] {
        match self {
            Field::Named { names, .. } => names,
            Field::Embedded { .. } => &[],
        }
    }

    /// Names this group declares: the explicit list, or the derived name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let derived = match self {
            Field::Embedded { ty, .. } => ty.embedded_name(),
            Field::Named { .. } => None,
        };
        self.explicit_names()
            .iter()
            .map(String::as_str)
            .chain(derived)
    }
}

// =============================================================================
// Interfaces
// =============================================================================

/// One alternative of a union; `approx` marks a leading `~`.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct TypeSetTerm {
    approx: bool,
    ty: TypeExpr,
}

impl TypeSetTerm {
    pub fn new(approx: bool, ty: TypeExpr) -> Self {
        Self { approx, ty }
    }

    pub fn exact(ty: TypeExpr) -> Self {
        Self::new(false, ty)
    }

    pub fn approx(ty: TypeExpr) -> Self {
        Self::new(true, ty)
    }

    pub fn is_approx(&self) -> bool {
        self.approx
    }

    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    pub(crate) fn into_ty(self) -> TypeExpr {
        self.ty
    }
}

/// Syntactic type element: `TypeTerm { "|" TypeTerm }`, one interface line.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct TypeElem {
    terms: Vec<TypeSetTerm>,
}

impl TypeElem {
    pub fn new(terms: Vec<TypeSetTerm>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[TypeSetTerm] {
        &self.terms
    }
}

/// `Name(params) results` inside an interface body.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct MethodSig {
    name: String,
    sig: Signature,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, sig: Signature) -> Self {
        Self {
            name: name.into(),
            sig,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.sig
    }
}

/// `interface { ... }`, or the implicit interface of a sugar constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, WalkAst)]
pub struct InterfaceType {
    elems: Vec<TypeElem>,
    methods: Vec<MethodSig>,
    implicit: bool,
}

impl InterfaceType {
    pub fn new(elems: Vec<TypeElem>, methods: Vec<MethodSig>) -> Self {
        Self {
            elems,
            methods,
            implicit: false,
        }
    }

    /// Wraps a bare constraint such as `any` or `~int | string`.
    pub fn implicit(elem: TypeElem) -> Self {
        Self {
            elems: vec![elem],
            methods: Vec::new(),
            implicit: true,
        }
    }

    /// Term lines in order; each line is an independent union.
    pub fn term_lines(&self) -> &[TypeElem] {
        &self.elems
    }

    pub fn terms(&self) -> impl Iterator<Item = &TypeSetTerm> {
        self.elems.iter().flat_map(|e| e.terms.iter())
    }

    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty() && self.methods.is_empty()
    }
}

// =============================================================================
// Structs and signatures
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, WalkAst)]
pub struct StructType {
    fields: Vec<Field>,
}

impl StructType {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First field group declaring `name` (explicitly or by derivation).
    pub fn field<'a>(&'a self, name: &'a str) -> Option<&'a Field> {
        self.fields_named(name).next()
    }

    /// Every field group declaring `name`; duplicates are kept as written.
    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.names().any(|n| n == name))
    }
}

/// Parameter group: `a, b int`, `...string`, or an unnamed `error`.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct Param {
    names: Names,
    ty: TypeExpr,
    variadic: bool,
}

impl Param {
    pub fn new(names: impl IntoIterator<Item = String>, ty: TypeExpr, variadic: bool) -> Self {
        Self {
            names: names.into_iter().collect(),
            ty,
            variadic,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Self::new(None, ty, false)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }
}

/// `Signature = Parameters [ Result ]`
#[derive(Debug, Clone, Default, PartialEq, Eq, WalkAst)]
pub struct Signature {
    params: Vec<Param>,
    results: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>, results: Vec<Param>) -> Self {
        Self { params, results }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn results(&self) -> &[Param] {
        &self.results
    }
}

// =============================================================================
// Literals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quoting {
    Backtick,
    DoubleQuote,
}

impl Quoting {
    pub const fn delimiter(self) -> char {
        match self {
            Quoting::Backtick => '`',
            Quoting::DoubleQuote => '"',
        }
    }
}

/// String literal attached to a field (or naming an import path).
///
/// `raw` is the exact text between the delimiters; escapes in double-quoted
/// literals are kept undecoded until [`TagLiteral::value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagLiteral {
    raw: String,
    quoting: Quoting,
}

impl TagLiteral {
    /// Builds a literal from its body, rejecting text that could not have
    /// been written between the given delimiters.
    pub fn new(raw: impl Into<String>, quoting: Quoting) -> Result<Self, LexErrorKind> {
        let raw = raw.into();
        match quoting {
            Quoting::Backtick if raw.contains('`') => {
                return Err(LexErrorKind::UnterminatedString)
            }
            Quoting::Backtick => {}
            Quoting::DoubleQuote => validate_interpreted_body(&raw)?,
        }
        Ok(Self { raw, quoting })
    }

    /// Splits a lexer-validated literal token (delimiters included).
    pub(crate) fn from_token(text: &str, quoting: Quoting) -> Self {
        let body = text
            .get(1..text.len().saturating_sub(1))
            .unwrap_or_default();
        Self {
            raw: body.to_string(),
            quoting,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    /// Interpreted value: escapes decoded for double-quoted literals,
    /// carriage returns dropped for backtick literals.
    pub fn value(&self) -> Cow<'_, str> {
        match self.quoting {
            Quoting::Backtick if self.raw.contains('\r') => Cow::Owned(self.raw.replace('\r', "")),
            Quoting::Backtick => Cow::Borrowed(&self.raw),
            Quoting::DoubleQuote => match decode_escapes(self.raw.as_bytes()) {
                Ok(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
                Err(_) => Cow::Borrowed(&self.raw),
            },
        }
    }
}

fn validate_interpreted_body(raw: &str) -> Result<(), LexErrorKind> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' | b'\n' | b'\r' => return Err(LexErrorKind::UnterminatedString),
            _ => i += 1,
        }
    }
    decode_escapes(bytes).map(drop)
}

/// Unevaluated array length, kept as its source text (`x`, `2`, `N+1`, `...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawExpr {
    text: String,
}

impl RawExpr {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// =============================================================================
// Types
// =============================================================================

/// `[pkg.]Name[TypeArgs]`
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub struct NamedType {
    qualifier: Option<String>,
    name: String,
    args: Vec<TypeExpr>,
}

impl NamedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            ..Self::new(name)
        }
    }

    pub fn with_args(mut self, args: Vec<TypeExpr>) -> Self {
        self.args = args;
        self
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type arguments; empty unless instantiated.
    pub fn args(&self) -> &[TypeExpr] {
        &self.args
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// Type expression node.
#[derive(Debug, Clone, PartialEq, Eq, WalkAst)]
pub enum TypeExpr {
    /// `pkg.Name` or `Name[T]`
    Named(NamedType),
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`
    Array { len: RawExpr, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    /// `struct { ... }`
    Struct(StructType),
    /// `interface { ... }`
    Interface(InterfaceType),
    /// `func(...) ...`
    Func(Signature),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(NamedType::new(name))
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named(NamedType::qualified(qualifier, name))
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    pub fn array(len: impl Into<String>, elem: TypeExpr) -> Self {
        TypeExpr::Array {
            len: RawExpr::new(len),
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(dir: ChanDir, elem: TypeExpr) -> Self {
        TypeExpr::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            TypeExpr::Named(n) => Some(n),
            _ => None,
        }
    }

    /// Name an embedded field of this type would get: one leading pointer is
    /// stripped, then the identifier of the named type is taken (qualifier and
    /// type arguments ignored). `None` for types that cannot be embedded.
    pub fn embedded_name(&self) -> Option<&str> {
        let base = match self {
            TypeExpr::Pointer(inner) => inner.as_ref(),
            other => other,
        };
        match base {
            TypeExpr::Named(n) => Some(n.name()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_name_strips_one_pointer() {
        let vec2 = TypeExpr::Named(
            NamedType::new("Vec2").with_args(vec![TypeExpr::pointer(TypeExpr::named("uint32"))]),
        );
        assert_eq!(vec2.embedded_name(), Some("Vec2"));
        assert_eq!(
            TypeExpr::pointer(TypeExpr::qualified("time", "Duration")).embedded_name(),
            Some("Duration")
        );
        assert_eq!(
            TypeExpr::pointer(TypeExpr::pointer(TypeExpr::named("T"))).embedded_name(),
            None
        );
        assert_eq!(TypeExpr::slice(TypeExpr::named("T")).embedded_name(), None);
    }

    #[test]
    fn embedded_field_requires_a_name() {
        assert!(Field::embedded(TypeExpr::map(TypeExpr::named("K"), TypeExpr::named("V")), None).is_none());

        let field = Field::embedded(TypeExpr::qualified("time", "Time"), None).unwrap();
        assert!(field.explicit_names().is_empty());
        assert_eq!(field.names().collect::<Vec<_>>(), ["Time"]);
    }

    #[test]
    fn tag_literal_validation() {
        assert!(TagLiteral::new("a`b", Quoting::Backtick).is_err());
        assert!(TagLiteral::new("a\"b", Quoting::DoubleQuote).is_err());
        assert!(TagLiteral::new(r"\q", Quoting::DoubleQuote).is_err());
        assert!(TagLiteral::new("json:\"a\"", Quoting::Backtick).is_ok());
    }

    #[test]
    fn tag_value_drops_carriage_returns_in_raw_literals() {
        let tag = TagLiteral::new("a\r\nb", Quoting::Backtick).unwrap();
        assert_eq!(tag.value(), "a\nb");
        assert_eq!(tag.raw(), "a\r\nb");
    }

    #[test]
    fn spans_do_not_affect_equality() {
        let mut a = SpannedList::new();
        let mut b = SpannedList::new();
        a.push(1, Span::new(0, 4));
        b.push(1, Span::new(10, 14));
        assert_eq!(a, b);
        assert_eq!(b.iter_spanned().next(), Some((&1, Span::new(10, 14))));
    }
}
