//! Type resolution for annotations and runtime prop constructors.
//!
//! Annotations have two renderings. Member annotations are printed into a
//! single display name (`"a" | "b"` becomes `a | b`), while decorator and
//! constructor lists keep their members as structured `elements`.

use crate::model::TypeDescriptor;
use crate::syntax::{Expr, ExprKind, TypeNode};

/// Renders a type annotation into a single display name.
pub fn type_from_annotation(node: &TypeNode) -> TypeDescriptor {
    TypeDescriptor::named(print_type(node))
}

/// Resolves a type annotation keeping union and intersection members.
pub fn structured_type_from_annotation(node: &TypeNode) -> TypeDescriptor {
    match node {
        TypeNode::Union(members) => {
            TypeDescriptor::union(members.iter().map(structured_type_from_annotation).collect())
        }
        TypeNode::Intersection(members) => TypeDescriptor::intersection(
            members.iter().map(structured_type_from_annotation).collect(),
        ),
        other => type_from_annotation(other),
    }
}

/// Prints a type node the way it is shown in documentation.
pub fn print_type(node: &TypeNode) -> String {
    match node {
        TypeNode::Keyword(keyword) => keyword.clone(),
        TypeNode::Reference { name, arguments } if name == "Array" && arguments.len() == 1 => {
            array_of(&arguments[0])
        }
        TypeNode::Reference { name, .. } => name.clone(),
        TypeNode::Array(element) => array_of(element),
        TypeNode::Union(members) => join(members, " | "),
        TypeNode::Intersection(members) => join(members, " & "),
        TypeNode::StringLiteral(value) => value.clone(),
        TypeNode::NumberLiteral(raw) => raw.clone(),
        TypeNode::BooleanLiteral(value) => value.to_string(),
        TypeNode::Other(source) => source.clone(),
    }
}

fn array_of(element: &TypeNode) -> String {
    match element {
        TypeNode::Union(_) | TypeNode::Intersection(_) => format!("({})[]", print_type(element)),
        other => format!("{}[]", print_type(other)),
    }
}

fn join(members: &[TypeNode], separator: &str) -> String {
    members
        .iter()
        .map(print_type)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Values of a union made only of string or number literals.
pub fn literal_values(node: &TypeNode) -> Option<Vec<String>> {
    let TypeNode::Union(members) = node else {
        return None;
    };
    members
        .iter()
        .map(|member| match member {
            TypeNode::StringLiteral(value) => Some(value.clone()),
            TypeNode::NumberLiteral(raw) => Some(raw.clone()),
            _ => None,
        })
        .collect()
}

/// Maps a Vue runtime type (`String`, `[String, Number]`, `Object as PropType<T>`)
/// to a type descriptor.
pub fn type_from_constructor(expr: &Expr) -> TypeDescriptor {
    match &expr.kind {
        ExprKind::Ident(name) => TypeDescriptor::named(constructor_name(name)),
        ExprKind::Array(items) => {
            let mut elements: Vec<TypeDescriptor> = items.iter().map(type_from_constructor).collect();
            if elements.len() == 1 {
                elements.remove(0)
            } else {
                TypeDescriptor::union(elements)
            }
        }
        ExprKind::TypeCast {
            expression,
            type_annotation,
        } => match type_annotation {
            TypeNode::Reference { name, arguments } if name == "PropType" && !arguments.is_empty() => {
                type_from_annotation(&arguments[0])
            }
            _ => type_from_constructor(expression),
        },
        ExprKind::Null => TypeDescriptor::named("null"),
        _ => TypeDescriptor::named(expr.source.clone()),
    }
}

fn constructor_name(name: &str) -> String {
    match name {
        "String" => "string",
        "Number" => "number",
        "Boolean" => "boolean",
        "Array" => "array",
        "Object" => "object",
        "Function" => "func",
        "Symbol" => "symbol",
        "Date" => "date",
        "Promise" => "promise",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, Binding, Grammar};

    fn binding(source: &str, name: &str) -> Binding {
        let script = parse(source, Grammar::default()).unwrap();
        script.bindings[name].clone()
    }

    fn cast_type(source: &str) -> TypeNode {
        match binding(source, "x").value.kind {
            ExprKind::TypeCast { type_annotation, .. } => type_annotation,
            other => panic!("expected cast, got {other:?}"),
        }
    }

    #[test]
    fn prints_keywords_and_arrays() {
        assert_eq!(print_type(&cast_type("const x = y as string")), "string");
        assert_eq!(print_type(&cast_type("const x = y as Book[]")), "Book[]");
        assert_eq!(print_type(&cast_type("const x = y as Array<Book>")), "Book[]");
        assert_eq!(print_type(&cast_type("const x = y as Map<string, Book>")), "Map");
        assert_eq!(print_type(&cast_type("const x = y as (string | number)[]")), "(string | number)[]");
    }

    #[test]
    fn annotation_unions_are_joined() {
        let ty = cast_type(r#"const x = y as "A" | "B" | "C""#);
        assert_eq!(type_from_annotation(&ty), TypeDescriptor::named("A | B | C"));
        assert_eq!(
            literal_values(&ty),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn structured_unions_keep_elements() {
        let ty = cast_type("const x = y as string | number");
        assert_eq!(
            structured_type_from_annotation(&ty),
            TypeDescriptor::union(vec![TypeDescriptor::named("string"), TypeDescriptor::named("number")])
        );
        let ty = cast_type("const x = y as A & B");
        assert_eq!(structured_type_from_annotation(&ty).name, "intersection");
        assert_eq!(type_from_annotation(&ty).name, "A & B");
    }

    #[test]
    fn mixed_unions_have_no_values() {
        let ty = cast_type(r#"const x = y as "a" | string"#);
        assert_eq!(literal_values(&ty), None);
    }

    #[test]
    fn maps_constructors() {
        assert_eq!(type_from_constructor(&binding("const x = String", "x").value).name, "string");
        assert_eq!(type_from_constructor(&binding("const x = Function", "x").value).name, "func");
        assert_eq!(
            type_from_constructor(&binding("const x = [String, Number]", "x").value),
            TypeDescriptor::union(vec![TypeDescriptor::named("string"), TypeDescriptor::named("number")])
        );
        assert_eq!(type_from_constructor(&binding("const x = [Boolean]", "x").value).name, "boolean");
        assert_eq!(
            type_from_constructor(&binding("const x = Object as PropType<Book>", "x").value).name,
            "Book"
        );
    }

    #[test]
    fn unknown_shapes_fall_back_to_source() {
        let ty = cast_type("const x = y as { a: string }");
        assert_eq!(print_type(&ty), "{ a: string }");
        assert_eq!(type_from_constructor(&binding("const x = types.Book", "x").value).name, "types.Book");
    }
}
