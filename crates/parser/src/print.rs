//! Canonical source printer.
//!
//! Output uses single spaces and `; ` between members inside braces, so any
//! printed declaration parses back to an equal model.

use std::fmt::{self, Display, Formatter};

use crate::ast::*;

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        item.fmt(f)?;
    }
    Ok(())
}

fn type_params(f: &mut Formatter<'_>, params: &[TypeParam]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    f.write_str("[")?;
    join(f, params, ", ")?;
    if let [only] = params {
        if reads_as_product(only) {
            f.write_str(",")?;
        }
    }
    f.write_str("]")
}

/// `[P *C]` alone reads back as an array length; a trailing comma keeps it a
/// parameter list.
fn reads_as_product(param: &TypeParam) -> bool {
    let constraint = param.constraint();
    let mut terms = constraint.terms();
    let single_pointer = match (terms.next(), terms.next()) {
        (Some(term), None) => !term.is_approx() && matches!(term.ty(), TypeExpr::Pointer(_)),
        _ => false,
    };
    param.names().len() == 1 && constraint.is_implicit() && single_pointer
}

fn tag(f: &mut Formatter<'_>, tag: Option<&TagLiteral>) -> fmt::Result {
    match tag {
        Some(t) => write!(f, " {t}"),
        None => Ok(()),
    }
}

impl Display for SourceFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(pkg) = self.package() {
            writeln!(f, "package {pkg}")?;
            writeln!(f)?;
        }
        for import in self.imports() {
            writeln!(f, "{import}")?;
        }
        if !self.imports().is_empty() {
            writeln!(f)?;
        }
        for decl in self.decls() {
            writeln!(f, "{decl}")?;
        }
        Ok(())
    }
}

impl Display for ImportSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("import ")?;
        if let Some(name) = self.name() {
            write!(f, "{name} ")?;
        }
        self.path().fmt(f)
    }
}

impl Display for ImportName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ImportName::Dot => f.write_str("."),
            ImportName::Blank => f.write_str("_"),
            ImportName::Name(n) => f.write_str(n),
        }
    }
}

impl Display for Decl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Type(d) => d.fmt(f),
            Decl::Opaque { text, .. } => f.write_str(text),
        }
    }
}

impl Display for TypeDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Struct(d) => d.fmt(f),
            TypeDecl::Interface(d) => d.fmt(f),
            TypeDecl::Alias(d) => d.fmt(f),
            TypeDecl::Defined(d) => d.fmt(f),
        }
    }
}

impl Display for StructDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.name())?;
        type_params(f, self.type_params())?;
        write!(f, " {}", self.body())
    }
}

impl Display for InterfaceDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.name())?;
        type_params(f, self.type_params())?;
        write!(f, " {}", self.body())
    }
}

impl Display for AliasDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "type {} = {}", self.name(), self.target())
    }
}

impl Display for DefinedTypeDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.name())?;
        type_params(f, self.type_params())?;
        write!(f, " {}", self.underlying())
    }
}

impl Display for TypeParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        join(f, self.names(), ", ")?;
        write!(f, " {}", self.constraint())
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.is_embedded() {
            join(f, self.explicit_names(), ", ")?;
            f.write_str(" ")?;
        }
        self.ty().fmt(f)?;
        tag(f, self.tag())
    }
}

impl Display for StructType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.fields().is_empty() {
            return f.write_str("struct{}");
        }
        f.write_str("struct { ")?;
        join(f, self.fields(), "; ")?;
        f.write_str(" }")
    }
}

impl Display for TypeSetTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_approx() {
            f.write_str("~")?;
        }
        self.ty().fmt(f)
    }
}

impl Display for TypeElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        join(f, self.terms(), " | ")
    }
}

impl Display for MethodSig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.signature())
    }
}

impl Display for InterfaceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Sugar constraint: print the bare union back.
        if self.is_implicit() {
            return join(f, self.term_lines(), "; ");
        }
        if self.is_empty() {
            return f.write_str("interface{}");
        }
        f.write_str("interface { ")?;
        join(f, self.term_lines(), "; ")?;
        if !self.term_lines().is_empty() && !self.methods().is_empty() {
            f.write_str("; ")?;
        }
        join(f, self.methods(), "; ")?;
        f.write_str(" }")
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.names().is_empty() {
            join(f, self.names(), ", ")?;
            f.write_str(" ")?;
        }
        if self.is_variadic() {
            f.write_str("...")?;
        }
        self.ty().fmt(f)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        join(f, self.params(), ", ")?;
        f.write_str(")")?;
        match self.results() {
            [] => Ok(()),
            [single] if single.names().is_empty() && !single.is_variadic() => {
                write!(f, " {}", single.ty())
            }
            results => {
                f.write_str(" (")?;
                join(f, results, ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl Display for TagLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let quote = self.quoting().delimiter();
        write!(f, "{quote}{}{quote}", self.raw())
    }
}

impl Display for RawExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl Display for NamedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(q) = self.qualifier() {
            write!(f, "{q}.")?;
        }
        f.write_str(self.name())?;
        if !self.args().is_empty() {
            f.write_str("[")?;
            join(f, self.args(), ", ")?;
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(n) => n.fmt(f),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(elem) => write!(f, "[]{elem}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan { dir, elem } => match dir {
                // `chan <-chan T` would read as a send channel.
                ChanDir::Both
                    if matches!(
                        elem.as_ref(),
                        TypeExpr::Chan {
                            dir: ChanDir::Recv,
                            ..
                        }
                    ) =>
                {
                    write!(f, "chan ({elem})")
                }
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeExpr::Struct(s) => s.fmt(f),
            TypeExpr::Interface(i) => i.fmt(f),
            TypeExpr::Func(sig) => write!(f, "func{sig}"),
        }
    }
}
