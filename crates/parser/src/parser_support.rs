use crate::ast::{Names, Param, TypeExpr};
use crate::error::{ParseError, ParseErrorKind, Result, Span};
use crate::lexer::Tok;

#[inline(always)]
pub fn tok_span(start: usize, end: usize) -> Span {
    Span::new(start, end)
}

/// Tokens that can begin a type expression.
#[inline]
pub fn starts_type(tok: Option<Tok<'_>>) -> bool {
    matches!(
        tok,
        Some(
            Tok::Ident(_)
                | Tok::Star
                | Tok::LBrack
                | Tok::LParen
                | Tok::Arrow
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwFunc
                | Tok::KwStruct
                | Tok::KwInterface
        )
    )
}

/// After `type Name [ Ident`, tokens that make the bracket a type parameter
/// list rather than an array length. `*` is settled separately.
#[inline]
pub fn continues_type_param(tok: Option<Tok<'_>>) -> bool {
    matches!(
        tok,
        Some(
            Tok::Ident(_)
                | Tok::Comma
                | Tok::Tilde
                | Tok::LBrack
                | Tok::Arrow
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwFunc
                | Tok::KwStruct
                | Tok::KwInterface
        )
    )
}

/// Tokens that start a type literal and can never start a constant operand.
#[inline]
pub fn starts_type_literal(tok: Option<Tok<'_>>) -> bool {
    matches!(
        tok,
        Some(
            Tok::LBrack
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwFunc
                | Tok::KwStruct
                | Tok::KwInterface
        )
    )
}

/// One comma-separated entry of a parameter list before grouping.
///
/// A bare identifier (`a` in `(a, b int)` or `int` in `(int, error)`) has no
/// type yet; grouping decides whether it names a parameter or a type.
#[derive(Clone, Debug)]
pub struct ParamEntry {
    pub name: Option<String>,
    pub variadic: bool,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

/// Groups raw entries the way the declaration syntax reads them:
/// `(a, b int, c string)` gives two named groups. When no entry pairs a name
/// with a type, every entry is an unnamed type (`(int, []string)`).
///
/// In a named list every entry must end up in a typed group, so `(a int, b)`
/// and `(a int, []string)` are errors.
pub fn resolve_param_list(params: Vec<ParamEntry>) -> Result<Vec<Param>, ParseError> {
    let named = params.iter().any(|p| p.name.is_some() && p.ty.is_some());
    if !named {
        return Ok(params
            .into_iter()
            .filter_map(|p| {
                let ty = p.ty.or_else(|| p.name.map(TypeExpr::named))?;
                Some(Param::new(None, ty, p.variadic))
            })
            .collect());
    }

    let mut out = Vec::new();
    let mut pending_names: Names = Names::new();
    let mut dangling: Option<Span> = None;

    for param in params {
        match (param.name, param.ty) {
            (name, Some(ty)) if name.is_some() || pending_names.is_empty() => {
                let mut names = std::mem::take(&mut pending_names);
                names.extend(name);
                if names.is_empty() {
                    return Err(mixed_list_error(param.span, "parameter name"));
                }
                out.push(Param::new(names, ty, param.variadic));
                dangling = None;
            }
            (Some(name), None) => {
                pending_names.push(name);
                dangling.get_or_insert(param.span);
            }
            _ => return Err(mixed_list_error(param.span, "parameter name")),
        }
    }

    match dangling {
        Some(span) => Err(mixed_list_error(span, "type for parameter")),
        None => Ok(out),
    }
}

fn mixed_list_error(span: Span, expected: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::UnexpectedToken,
        span,
        format!("{expected}; named and unnamed parameters cannot be mixed"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(name: &str) -> ParamEntry {
        ParamEntry {
            name: Some(name.to_string()),
            variadic: false,
            ty: None,
            span: Span::new(0, name.len()),
        }
    }

    fn typed(name: Option<&str>, ty: &str, variadic: bool) -> ParamEntry {
        ParamEntry {
            name: name.map(str::to_string),
            variadic,
            ty: Some(TypeExpr::named(ty)),
            span: Span::new(0, ty.len()),
        }
    }

    fn at(mut entry: ParamEntry, start: usize, end: usize) -> ParamEntry {
        entry.span = Span::new(start, end);
        entry
    }

    #[test]
    fn pending_names_join_next_typed_entry() {
        let out =
            resolve_param_list(vec![bare("a"), bare("b"), typed(Some("c"), "int", false)]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].names(), ["a", "b", "c"]);
        assert_eq!(out[0].ty(), &TypeExpr::named("int"));
    }

    #[test]
    fn trailing_bare_identifiers_are_types() {
        let out = resolve_param_list(vec![bare("int"), bare("error")]).unwrap();
        assert_eq!(
            out,
            vec![
                Param::unnamed(TypeExpr::named("int")),
                Param::unnamed(TypeExpr::named("error")),
            ]
        );
    }

    #[test]
    fn type_only_entries_stay_unnamed() {
        let slice = ParamEntry {
            name: None,
            variadic: false,
            ty: Some(TypeExpr::slice(TypeExpr::named("string"))),
            span: Span::new(5, 13),
        };
        let out = resolve_param_list(vec![bare("int"), slice]).unwrap();
        assert_eq!(out[0], Param::unnamed(TypeExpr::named("int")));
        assert!(out[1].names().is_empty());
    }

    #[test]
    fn variadic_flag_survives_grouping() {
        let out = resolve_param_list(vec![typed(Some("args"), "string", true)]).unwrap();
        assert!(out[0].is_variadic());
        assert_eq!(out[0].names(), ["args"]);
    }

    #[test]
    fn dangling_name_after_typed_group_is_rejected() {
        let err = resolve_param_list(vec![
            at(typed(Some("a"), "int", false), 0, 5),
            at(bare("b"), 7, 8),
            at(bare("c"), 10, 11),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.span, Span::new(7, 8));
    }

    #[test]
    fn unnamed_type_in_named_list_is_rejected() {
        let err = resolve_param_list(vec![
            at(typed(Some("a"), "int", false), 0, 5),
            at(typed(None, "string", false), 7, 13),
        ])
        .unwrap_err();
        assert_eq!(err.span, Span::new(7, 13));
    }
}
