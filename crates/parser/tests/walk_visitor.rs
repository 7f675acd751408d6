use gotype_parser::ast::*;
use gotype_parser::walk::referenced_type_names;
use gotype_parser::{parse_decl, parse_source, Visitor, Walk, WalkChildren};
use pretty_assertions::assert_eq;

const STRUCT_FIXTURE: &str = include_str!("data/struct.go");

#[derive(Default)]
struct Counts {
    fields: usize,
    embedded: usize,
    tags: usize,
    imports: usize,
}

impl<'ast> Visitor<'ast> for Counts {
    fn visit_import(&mut self, _import: &'ast ImportSpec) {
        self.imports += 1;
    }

    fn visit_field(&mut self, f: &'ast Field) {
        self.fields += 1;
        if f.is_embedded() {
            self.embedded += 1;
        }
        f.walk_children(self);
    }

    fn visit_tag(&mut self, _tag: &'ast TagLiteral) {
        self.tags += 1;
    }
}

#[test]
fn visitor_counts_fields_and_tags() {
    let file = parse_source(STRUCT_FIXTURE).unwrap();
    let mut counts = Counts::default();
    file.walk(&mut counts);

    assert_eq!(counts.imports, 1);
    // a: 16 plus the `x` of its anonymous struct, b: 2, person: 2. The func
    // body stays opaque.
    assert_eq!(counts.fields, 21);
    assert_eq!(counts.embedded, 13);
    assert_eq!(counts.tags, 7);
}

#[test]
fn nested_struct_fields_are_visited() {
    let decl = parse_decl("type T struct { a struct { b, c int; d *struct{ e int } } }").unwrap();
    let mut counts = Counts::default();
    decl.walk(&mut counts);
    assert_eq!(counts.fields, 4);
}

#[test]
fn referenced_names_in_visiting_order() {
    let decl = parse_decl("type List[T any] struct { next *List[T]; at time.Time }").unwrap();
    assert_eq!(
        referenced_type_names(&decl),
        ["any", "List", "T", "time.Time"]
    );
}

#[test]
fn referenced_names_cover_signatures_and_terms() {
    let decl =
        parse_decl("type I interface { ~int | Celsius; Get(key string) (Value, error) }").unwrap();
    assert_eq!(
        referenced_type_names(&decl),
        ["int", "Celsius", "string", "Value", "error"]
    );
}

#[test]
fn overriding_a_hook_stops_descent() {
    struct TopLevelOnly(Vec<String>);

    impl<'ast> Visitor<'ast> for TopLevelOnly {
        fn visit_type(&mut self, t: &'ast TypeExpr) {
            self.0.push(t.to_string());
        }
    }

    let decl = parse_decl("type M map[string][]*int").unwrap();
    let mut v = TopLevelOnly(Vec::new());
    decl.walk(&mut v);
    assert_eq!(v.0, ["map[string][]*int"]);
}
