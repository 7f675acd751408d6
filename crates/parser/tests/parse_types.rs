use gotype_parser::ast::*;
use gotype_parser::{parse_type, LexErrorKind, ParseErrorKind, Parser, ParserConfig};
use pretty_assertions::assert_eq;

fn ty(src: &str) -> TypeExpr {
    parse_type(src).unwrap_or_else(|e| panic!("{src}: {e}"))
}

fn int() -> TypeExpr {
    TypeExpr::named("int")
}

#[test]
fn named_qualified_and_instantiated() {
    assert_eq!(ty("int"), int());
    assert_eq!(ty("time.Time"), TypeExpr::qualified("time", "Time"));
    assert_eq!(
        ty("hide.Vec2[*uint32]"),
        TypeExpr::Named(
            NamedType::qualified("hide", "Vec2")
                .with_args(vec![TypeExpr::pointer(TypeExpr::named("uint32"))])
        )
    );
    assert_eq!(
        ty("Map[string, List[int],]"),
        TypeExpr::Named(NamedType::new("Map").with_args(vec![
            TypeExpr::named("string"),
            TypeExpr::Named(NamedType::new("List").with_args(vec![int()])),
        ]))
    );
}

#[test]
fn pointer_slice_array_map() {
    assert_eq!(ty("*int"), TypeExpr::pointer(int()));
    assert_eq!(ty("[]int"), TypeExpr::slice(int()));
    assert_eq!(ty("[2]int"), TypeExpr::array("2", int()));
    assert_eq!(ty("[...]int"), TypeExpr::array("...", int()));
    assert_eq!(ty("[N + 1]int"), TypeExpr::array("N + 1", int()));
    assert_eq!(ty("[len(x)]int"), TypeExpr::array("len(x)", int()));
    assert_eq!(
        ty("map[string][]*int"),
        TypeExpr::map(TypeExpr::named("string"), TypeExpr::slice(TypeExpr::pointer(int())))
    );
}

#[test]
fn array_length_is_verbatim_text() {
    let TypeExpr::Array { len, .. } = ty("[ 1<<3 ]byte") else {
        panic!("not an array");
    };
    assert_eq!(len.text(), "1<<3");
}

#[test]
fn channels() {
    assert_eq!(ty("chan int"), TypeExpr::chan(ChanDir::Both, int()));
    assert_eq!(ty("chan<- int"), TypeExpr::chan(ChanDir::Send, int()));
    assert_eq!(ty("<-chan int"), TypeExpr::chan(ChanDir::Recv, int()));
    assert_eq!(
        ty("chan<- chan int"),
        TypeExpr::chan(ChanDir::Send, TypeExpr::chan(ChanDir::Both, int()))
    );
    assert_eq!(
        ty("chan (<-chan int)"),
        TypeExpr::chan(ChanDir::Both, TypeExpr::chan(ChanDir::Recv, int()))
    );
}

#[test]
fn parenthesized_types_unwrap() {
    assert_eq!(ty("(int)"), int());
    assert_eq!(ty("*((int))"), TypeExpr::pointer(int()));
}

#[test]
fn function_types_group_parameters() {
    let TypeExpr::Func(sig) = ty("func(a, b int, c ...string) (n int, err error)") else {
        panic!("not a func");
    };
    assert_eq!(
        sig.params(),
        [
            Param::new(["a".to_string(), "b".to_string()], int(), false),
            Param::new(["c".to_string()], TypeExpr::named("string"), true),
        ]
    );
    assert_eq!(sig.results().len(), 2);
    assert_eq!(sig.results()[1].names(), ["err"]);
}

#[test]
fn function_types_with_unnamed_parameters() {
    let TypeExpr::Func(sig) = ty("func(int, []string, pkg.T, List[int]) error") else {
        panic!("not a func");
    };
    let types: Vec<String> = sig.params().iter().map(|p| p.ty().to_string()).collect();
    assert_eq!(types, ["int", "[]string", "pkg.T", "List[int]"]);
    assert!(sig.params().iter().all(|p| p.names().is_empty()));
    assert_eq!(sig.results(), [Param::unnamed(TypeExpr::named("error"))]);
}

#[test]
fn function_type_named_array_parameter() {
    let TypeExpr::Func(sig) = ty("func(buf [4]byte, rest []byte)") else {
        panic!("not a func");
    };
    assert_eq!(sig.params()[0].names(), ["buf"]);
    assert_eq!(sig.params()[0].ty(), &TypeExpr::array("4", TypeExpr::named("byte")));
    assert_eq!(sig.params()[1].names(), ["rest"]);
}

#[test]
fn mixed_named_and_unnamed_parameters_rejected() {
    let err = parse_type("func(a int, b)").unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnexpectedToken));
    assert_eq!(err.offset(), 12);

    let err = parse_type("func(a int, []string)").unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnexpectedToken));
    assert_eq!(err.offset(), 12);

    let err = parse_type("interface { Get(key string, bool) }").unwrap_err();
    assert_eq!(err.offset(), 28);

    // Results follow the same rule.
    assert!(parse_type("func() (n int, error)").is_err());
    assert_eq!(
        ty("func(a, b int) (int, error)").to_string(),
        "func(a, b int) (int, error)"
    );
}

#[test]
fn anonymous_struct_and_interface_literals() {
    let TypeExpr::Struct(s) = ty("struct { a, b int; c string `x` }") else {
        panic!("not a struct");
    };
    assert_eq!(s.fields().len(), 2);

    let TypeExpr::Interface(i) = ty("interface{ M() }") else {
        panic!("not an interface");
    };
    assert_eq!(i.methods()[0].name(), "M");
    assert!(!i.is_implicit());
}

#[test]
fn empty_type_arguments_rejected() {
    let err = parse_type("T[]").unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::EmptyTypeArgs));
    assert_eq!(err.offset(), 1);
}

#[test]
fn map_without_value_type() {
    let err = parse_type("map[string]").unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnexpectedToken));
    assert!(err.to_string().contains("map value type"), "{err}");
}

#[test]
fn unmatched_brackets() {
    for src in ["[2int", "map[string", "List[int", "(int", "struct {", "func(a int"] {
        let err = parse_type(src).unwrap_err();
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::Unclosed), "{src}: {err}");
    }
}

#[test]
fn trailing_tokens_rejected() {
    let err = parse_type("int string").unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnexpectedToken));
    assert_eq!(err.offset(), 4);
}

#[test]
fn lex_errors_surface_as_lex_errors() {
    let err = parse_type("[]in$t").unwrap_err();
    assert_eq!(err.lex_kind(), Some(LexErrorKind::InvalidToken));
    assert_eq!(err.offset(), 4);
}

#[test]
fn nesting_limit() {
    let deep = format!("{}int", "*".repeat(40));
    let err = Parser::with_config(&deep, ParserConfig::default().with_max_depth(32))
        .parse_type()
        .unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::NestingTooDeep));

    assert!(Parser::with_config(&deep, ParserConfig::default().with_max_depth(41))
        .parse_type()
        .is_ok());
}

#[test]
fn nested_method_signatures_count_toward_the_limit() {
    let levels = 250;
    let nested = format!(
        "{}int{}",
        "interface { m(a ".repeat(levels),
        ") }".repeat(levels)
    );
    let err = parse_type(&nested).unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::NestingTooDeep));

    let shallow = format!("{}int{}", "interface { m(a ".repeat(20), ") }".repeat(20));
    assert!(parse_type(&shallow).is_ok());
}

#[test]
fn nested_structs_and_type_arguments_count_toward_the_limit() {
    let structs = format!("{}int{}", "struct { f ".repeat(200), " }".repeat(200));
    let err = parse_type(&structs).unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::NestingTooDeep));

    let args = format!("{}int{}", "List[".repeat(200), "]".repeat(200));
    let err = parse_type(&args).unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::NestingTooDeep));
}

#[test]
fn default_nesting_limit_stops_hostile_input() {
    let hostile = "[".repeat(100_000);
    assert!(parse_type(&hostile).is_err());

    let hostile = "*".repeat(100_000);
    let err = parse_type(&hostile).unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::NestingTooDeep));
}
