use crate::ast::*;

// Core traits
pub trait Walk<'ast> {
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V);
}

/// Visits the children of a node without calling its own hook.
/// Implemented by `#[derive(WalkAst)]`.
pub trait WalkChildren<'ast> {
    fn walk_children<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V);
}

/// Read-only traversal. Every hook defaults to descending into the node's
/// children; override a hook and call `walk_children` to keep descending.
pub trait Visitor<'ast> {
    #[inline(always)]
    fn visit_source_file(&mut self, f: &'ast SourceFile) {
        f.walk_children(self);
    }

    #[inline(always)]
    fn visit_import(&mut self, _import: &'ast ImportSpec) {}

    #[inline(always)]
    fn visit_decl(&mut self, d: &'ast Decl) {
        d.walk_children(self);
    }

    #[inline(always)]
    fn visit_type_decl(&mut self, d: &'ast TypeDecl) {
        d.walk_children(self);
    }

    #[inline(always)]
    fn visit_type_param(&mut self, p: &'ast TypeParam) {
        p.walk_children(self);
    }

    #[inline(always)]
    fn visit_type(&mut self, t: &'ast TypeExpr) {
        t.walk_children(self);
    }

    #[inline(always)]
    fn visit_field(&mut self, f: &'ast Field) {
        f.walk_children(self);
    }

    #[inline(always)]
    fn visit_term(&mut self, t: &'ast TypeSetTerm) {
        t.walk_children(self);
    }

    #[inline(always)]
    fn visit_method(&mut self, m: &'ast MethodSig) {
        m.walk_children(self);
    }

    #[inline(always)]
    fn visit_tag(&mut self, _tag: &'ast TagLiteral) {}
}

macro_rules! impl_walk_hooked {
    ($($ty:ty => $visit:ident),* $(,)?) => {
        $(
            impl<'ast> Walk<'ast> for $ty {
                #[inline(always)]
                fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
                    v.$visit(self);
                }
            }
        )*
    };
}

impl_walk_hooked! {
    SourceFile => visit_source_file,
    ImportSpec => visit_import,
    Decl => visit_decl,
    TypeDecl => visit_type_decl,
    TypeParam => visit_type_param,
    TypeExpr => visit_type,
    Field => visit_field,
    TypeSetTerm => visit_term,
    MethodSig => visit_method,
    TagLiteral => visit_tag,
}

// Nodes without a hook of their own
macro_rules! impl_walk_transparent {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'ast> Walk<'ast> for $ty {
                #[inline(always)]
                fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
                    self.walk_children(v);
                }
            }
        )*
    };
}

impl_walk_transparent! {
    StructDecl,
    InterfaceDecl,
    AliasDecl,
    DefinedTypeDecl,
    NamedType,
    TypeElem,
    InterfaceType,
    StructType,
    Param,
    Signature,
}

// Utilities
impl<'ast, T: Walk<'ast>> Walk<'ast> for Option<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        if let Some(x) = self {
            x.walk(v);
        }
    }
}

impl<'ast, T: Walk<'ast>> Walk<'ast> for Box<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        (**self).walk(v);
    }
}

impl<'ast, T: Walk<'ast>> Walk<'ast> for Vec<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        for item in self {
            item.walk(v);
        }
    }
}

impl<'ast, T: Walk<'ast>> Walk<'ast> for SpannedList<T> {
    #[inline(always)]
    fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, v: &mut V) {
        for item in self.iter() {
            item.walk(v);
        }
    }
}

// No-ops for leaf types
macro_rules! impl_walk_noop {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'ast> Walk<'ast> for $ty {
                #[inline(always)]
                fn walk<V: Visitor<'ast> + ?Sized>(&'ast self, _: &mut V) {}
            }
        )*
    };
}

impl_walk_noop! {
    String,
    bool,
    Names,
    RawExpr,
    ChanDir,
    Quoting,
    ImportName,
    OpaqueKind,
}

/// Every named type referenced anywhere below `node`, in visiting order.
/// Qualified names come back as `pkg.Name`.
pub fn referenced_type_names<'ast, T>(node: &'ast T) -> Vec<String>
where
    T: Walk<'ast> + ?Sized,
{
    struct Collect(Vec<String>);

    impl<'ast> Visitor<'ast> for Collect {
        fn visit_type(&mut self, t: &'ast TypeExpr) {
            if let TypeExpr::Named(n) = t {
                self.0.push(match n.qualifier() {
                    Some(q) => format!("{q}.{}", n.name()),
                    None => n.name().to_string(),
                });
            }
            t.walk_children(self);
        }
    }

    let mut c = Collect(Vec::new());
    node.walk(&mut c);
    c.0
}

