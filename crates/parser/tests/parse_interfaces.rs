use gotype_parser::ast::*;
use gotype_parser::{parse_decl, parse_source, ParseErrorKind};
use pretty_assertions::assert_eq;

const INTERFACE_FIXTURE: &str = include_str!("data/interface.go");

fn iface(src: &str) -> InterfaceDecl {
    match parse_decl(src) {
        Ok(TypeDecl::Interface(d)) => d,
        other => panic!("{src}: {other:?}"),
    }
}

fn term_strings(decl: &InterfaceDecl) -> Vec<String> {
    decl.terms().map(ToString::to_string).collect()
}

#[test]
fn fixture_has_five_interfaces_in_order() {
    let file = parse_source(INTERFACE_FIXTURE).unwrap();
    let decls: Vec<&InterfaceDecl> = file
        .type_decls()
        .map(|d| d.as_interface().expect("interface"))
        .collect();
    let names: Vec<_> = decls.iter().map(|d| d.name()).collect();
    assert_eq!(names, ["x", "x", "x", "x", "Float"]);

    assert_eq!(term_strings(decls[0]), ["int"]);
    assert_eq!(term_strings(decls[1]), ["~int"]);

    assert_eq!(term_strings(decls[2]), ["~int"]);
    assert_eq!(decls[2].methods().len(), 1);
    assert_eq!(decls[2].methods()[0].name(), "String");
    assert_eq!(
        decls[2].methods()[0].signature().results(),
        [Param::unnamed(TypeExpr::named("string"))]
    );

    // Two lines, kept as two separate unions.
    assert_eq!(term_strings(decls[3]), ["int", "string"]);
    assert_eq!(decls[3].body().term_lines().len(), 2);

    assert_eq!(term_strings(decls[4]), ["~float32", "~float64"]);
    assert_eq!(decls[4].body().term_lines().len(), 1);
}

#[test]
fn approximation_flag() {
    let d = iface("type F interface { ~float32 | float64 }");
    let approx: Vec<bool> = d.terms().map(TypeSetTerm::is_approx).collect();
    assert_eq!(approx, [true, false]);
}

#[test]
fn embedded_interfaces_are_exact_terms() {
    let d = iface("type RW interface { io.Reader; Writer; Close() error }");
    assert_eq!(
        d.body().term_lines(),
        [
            TypeElem::new(vec![TypeSetTerm::exact(TypeExpr::qualified("io", "Reader"))]),
            TypeElem::new(vec![TypeSetTerm::exact(TypeExpr::named("Writer"))]),
        ]
    );
    assert_eq!(d.methods()[0].name(), "Close");
}

#[test]
fn method_signatures() {
    let d = iface("type S interface {\n\tRead(p []byte) (n int, err error)\n\tPrintf(format string, args ...any)\n}");
    let read = &d.methods()[0];
    assert_eq!(read.signature().params()[0].names(), ["p"]);
    assert_eq!(read.signature().results().len(), 2);

    let printf = &d.methods()[1];
    assert!(printf.signature().params()[1].is_variadic());
    assert!(printf.signature().results().is_empty());
}

#[test]
fn generic_interface() {
    let d = iface("type Getter[T any] interface { Get() T }");
    assert_eq!(d.type_params().len(), 1);
    assert_eq!(d.type_params()[0].names(), ["T"]);
}

#[test]
fn empty_interface() {
    let d = iface("type Any interface{}");
    assert!(d.body().is_empty());
    assert_eq!(d.terms().count(), 0);
}

#[test]
fn adjacent_terms_without_bar() {
    let err = parse_decl("type F interface { ~int ~float64 }").unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnexpectedToken));
    assert_eq!(err.offset(), "type F interface { ~int ".len());
}

#[test]
fn empty_union_term() {
    for src in [
        "type F interface { int | }",
        "type F interface { int || string }",
        "type F interface { ~ }",
    ] {
        assert!(parse_decl(src).is_err(), "{src}");
    }
}

#[test]
fn tilde_cannot_prefix_a_method() {
    assert!(parse_decl("type F interface { ~String() string }").is_err());
}
