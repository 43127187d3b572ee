//! Lowering from the OXC arena tree into the owned syntax model.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    self, Argument, ArrayExpressionElement, AssignmentTarget, BindingPattern, BindingPatternKind,
    CallExpression, Class, ClassElement, ComputedMemberExpression, Declaration, Decorator,
    ExportDefaultDeclarationKind, Expression, FormalParameters, FunctionBody,
    ImportDeclarationSpecifier, MethodDefinitionKind, ObjectPropertyKind, Statement,
    StaticMemberExpression, TSLiteral, TSType, TSTypeAnnotation, UnaryOperator,
    VariableDeclaration,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use serde::{Deserialize, Serialize};

use super::{
    Binding, ClassLit, ClassMember, CommentIndex, DecoratorNode, EmitUsage, ExportEntry,
    ExportTarget, Expr, ExprKind, FunctionLit, ImportBinding, Imported, MemberKind, ObjectLit,
    Param, ParsedScript, Property, PropertyKind, SlotUsage, Span, TypeNode, Usages,
};

/// Type-annotation dialect of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// TypeScript (also used for plain JavaScript).
    #[default]
    Ts,
    /// Flow annotations. Parsed with the plain JavaScript grammar.
    Flow,
}

/// Grammar a script is parsed with. Part of the parse cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grammar {
    pub lang: Lang,
    pub jsx: bool,
}

impl Grammar {
    pub fn new(lang: Lang, jsx: bool) -> Self {
        Self { lang, jsx }
    }

    pub fn source_type(&self) -> SourceType {
        match (self.lang, self.jsx) {
            (Lang::Ts, true) => SourceType::tsx(),
            (Lang::Ts, false) => SourceType::ts(),
            (Lang::Flow, true) => SourceType::jsx(),
            (Lang::Flow, false) => SourceType::mjs(),
        }
    }
}

/// Parses `source` and lowers the parts of the tree the handlers read.
///
/// Returns the parser diagnostics when the script has syntax errors.
pub fn parse(source: &str, grammar: Grammar) -> Result<ParsedScript, Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, grammar.source_type()).parse();

    if !ret.errors.is_empty() {
        return Err(ret.errors.iter().map(|err| format!("{:?}", err)).collect());
    }

    let comments = CommentIndex::new(source, ret.program.comments.iter());
    let lowerer = Lowerer {
        source,
        comments: &comments,
    };
    let mut script = ParsedScript {
        docblocks: comments.docblocks(),
        ..ParsedScript::default()
    };
    for statement in &ret.program.body {
        lowerer.statement(statement, &mut script);
    }
    Ok(script)
}

struct Lowerer<'s, 'c> {
    source: &'s str,
    comments: &'c CommentIndex<'s>,
}

impl<'s, 'c> Lowerer<'s, 'c> {
    fn text(&self, span: oxc_span::Span) -> String {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
            .to_string()
    }

    fn statement(&self, statement: &Statement<'_>, script: &mut ParsedScript) {
        match statement {
            Statement::ImportDeclaration(import) => {
                let source = import.source.value.to_string();
                for specifier in import.specifiers.iter().flatten() {
                    let (local, imported) = match specifier {
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            (s.local.name.to_string(), Imported::Default)
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (s.local.name.to_string(), Imported::Namespace)
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            let name = s.imported.name().to_string();
                            let imported = if name == "default" {
                                Imported::Default
                            } else {
                                Imported::Named(name)
                            };
                            (s.local.name.to_string(), imported)
                        }
                    };
                    script.imports.insert(
                        local,
                        ImportBinding {
                            source: source.clone(),
                            imported,
                        },
                    );
                }
            }
            Statement::VariableDeclaration(declaration) => {
                let doc = self.comments.leading(declaration.span.start);
                self.variable_bindings(declaration, doc, script);
            }
            Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    let value = self.class_expr(class);
                    let doc = value_doc(&value);
                    script
                        .bindings
                        .insert(id.name.to_string(), Binding { value, doc });
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                let start = match &export.declaration {
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        decorated_start(export.span.start, &class.decorators)
                    }
                    _ => export.span.start,
                };
                let doc = self.comments.leading(start);
                let target = match &export.declaration {
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        Some(ExportTarget::Expr(self.class_expr(class)))
                    }
                    ExportDefaultDeclarationKind::FunctionDeclaration(_) => None,
                    kind => kind.as_expression().map(|expression| match expression {
                        Expression::Identifier(ident) => ExportTarget::Local(ident.name.to_string()),
                        other => ExportTarget::Expr(self.expr(other)),
                    }),
                };
                if let Some(target) = target {
                    script.exports.push(ExportEntry {
                        name: "default".to_string(),
                        target,
                        doc,
                    });
                }
            }
            Statement::ExportNamedDeclaration(export) => {
                if export.source.is_some() {
                    return;
                }
                match &export.declaration {
                    Some(Declaration::VariableDeclaration(declaration)) => {
                        let doc = self.comments.leading(export.span.start);
                        let names = self.variable_bindings(declaration, doc.clone(), script);
                        for name in names {
                            script.exports.push(ExportEntry {
                                target: ExportTarget::Local(name.clone()),
                                name,
                                doc: doc.clone(),
                            });
                        }
                    }
                    Some(Declaration::ClassDeclaration(class)) => {
                        let Some(id) = &class.id else { return };
                        let start = decorated_start(export.span.start, &class.decorators);
                        let doc = self.comments.leading(start);
                        let name = id.name.to_string();
                        script.bindings.insert(
                            name.clone(),
                            Binding {
                                value: self.class_expr(class),
                                doc: doc.clone(),
                            },
                        );
                        script.exports.push(ExportEntry {
                            target: ExportTarget::Local(name.clone()),
                            name,
                            doc,
                        });
                    }
                    Some(_) => {}
                    None => {
                        for specifier in &export.specifiers {
                            script.exports.push(ExportEntry {
                                name: specifier.exported.name().to_string(),
                                target: ExportTarget::Local(specifier.local.name().to_string()),
                                doc: None,
                            });
                        }
                    }
                }
            }
            Statement::ExpressionStatement(statement) => {
                let Expression::AssignmentExpression(assign) = &statement.expression else {
                    return;
                };
                if !is_module_exports(&assign.left) {
                    return;
                }
                let target = match &assign.right {
                    Expression::Identifier(ident) => ExportTarget::Local(ident.name.to_string()),
                    other => ExportTarget::Expr(self.expr(other)),
                };
                script.exports.push(ExportEntry {
                    name: "default".to_string(),
                    target,
                    doc: self.comments.leading(statement.span.start),
                });
            }
            _ => {}
        }
    }

    /// Records every simple `name = init` declarator and returns the names.
    fn variable_bindings(
        &self,
        declaration: &VariableDeclaration<'_>,
        doc: Option<String>,
        script: &mut ParsedScript,
    ) -> Vec<String> {
        let mut names = Vec::new();
        for declarator in &declaration.declarations {
            let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
                continue;
            };
            let Some(init) = &declarator.init else {
                continue;
            };
            let name = id.name.to_string();
            script.bindings.insert(
                name.clone(),
                Binding {
                    value: self.expr(init),
                    doc: doc.clone(),
                },
            );
            names.push(name);
        }
        names
    }

    fn expr(&self, expression: &Expression<'_>) -> Expr {
        let span = expression.span();
        let kind = match expression {
            Expression::ParenthesizedExpression(paren) => return self.expr(&paren.expression),
            Expression::TSSatisfiesExpression(e) => return self.expr(&e.expression),
            Expression::TSNonNullExpression(e) => return self.expr(&e.expression),
            Expression::ObjectExpression(object) => ExprKind::Object(ObjectLit {
                properties: object
                    .properties
                    .iter()
                    .map(|property| self.property(property))
                    .collect(),
                span: to_span(object.span),
            }),
            Expression::ArrayExpression(array) => ExprKind::Array(
                array
                    .elements
                    .iter()
                    .filter_map(|element| match element {
                        ArrayExpressionElement::SpreadElement(_)
                        | ArrayExpressionElement::Elision(_) => None,
                        other => other.as_expression().map(|e| self.expr(e)),
                    })
                    .collect(),
            ),
            Expression::StringLiteral(lit) => ExprKind::Str(lit.value.to_string()),
            Expression::TemplateLiteral(_) => ExprKind::Template,
            Expression::NumericLiteral(_) | Expression::BigIntLiteral(_) => {
                ExprKind::Number(self.text(span))
            }
            Expression::UnaryExpression(unary)
                if unary.operator == UnaryOperator::UnaryNegation
                    && matches!(unary.argument, Expression::NumericLiteral(_)) =>
            {
                ExprKind::Number(self.text(span))
            }
            Expression::BooleanLiteral(lit) => ExprKind::Bool(lit.value),
            Expression::NullLiteral(_) => ExprKind::Null,
            Expression::Identifier(ident) if ident.name.as_str() == "undefined" => ExprKind::Null,
            Expression::Identifier(ident) => ExprKind::Ident(ident.name.to_string()),
            Expression::ThisExpression(_) => ExprKind::This,
            Expression::StaticMemberExpression(member) => ExprKind::Member {
                object: Box::new(self.expr(&member.object)),
                property: member.property.name.to_string(),
            },
            Expression::CallExpression(call) => ExprKind::Call {
                callee: Box::new(self.expr(&call.callee)),
                arguments: self.arguments(&call.arguments),
            },
            Expression::BinaryExpression(binary) => ExprKind::Binary {
                left: Box::new(self.expr(&binary.left)),
                operator: binary.operator.as_str().to_string(),
                right: Box::new(self.expr(&binary.right)),
            },
            Expression::FunctionExpression(function) => ExprKind::Function(self.function(
                &function.params,
                function.body.as_deref(),
                function.return_type.as_deref(),
                function.r#async,
                false,
            )),
            Expression::ArrowFunctionExpression(arrow) => {
                let mut lit = self.function(
                    &arrow.params,
                    Some(&*arrow.body),
                    arrow.return_type.as_deref(),
                    arrow.r#async,
                    true,
                );
                if arrow.expression {
                    lit.returned = arrow_expression_body(&arrow.body).map(|e| Box::new(self.expr(e)));
                    lit.returns_only = lit.returned.is_some();
                }
                ExprKind::Function(lit)
            }
            Expression::ClassExpression(class) => ExprKind::Class(self.class(class)),
            Expression::TSAsExpression(cast) => ExprKind::TypeCast {
                expression: Box::new(self.expr(&cast.expression)),
                type_annotation: self.ty(&cast.type_annotation),
            },
            _ => ExprKind::Other,
        };
        Expr {
            kind,
            source: self.text(span),
            span: to_span(span),
        }
    }

    fn arguments(&self, arguments: &[Argument<'_>]) -> Vec<Expr> {
        arguments
            .iter()
            .filter_map(|argument| argument.as_expression().map(|e| self.expr(e)))
            .collect()
    }

    fn property(&self, property: &ObjectPropertyKind<'_>) -> Property {
        match property {
            ObjectPropertyKind::ObjectProperty(prop) => {
                let key = prop.key.static_name().map(|name| name.to_string());
                let kind = match (prop.kind, prop.method, key.is_some() && !prop.computed) {
                    (_, _, false) => PropertyKind::Computed,
                    (ast::PropertyKind::Get, _, _) => PropertyKind::Get,
                    (ast::PropertyKind::Set, _, _) => PropertyKind::Set,
                    (ast::PropertyKind::Init, true, _) => PropertyKind::Method,
                    (ast::PropertyKind::Init, false, _) => PropertyKind::Init,
                };
                Property {
                    key: key.unwrap_or_default(),
                    value: self.expr(&prop.value),
                    kind,
                    doc: self.comments.leading(prop.span.start),
                    span: to_span(prop.span),
                }
            }
            ObjectPropertyKind::SpreadProperty(spread) => Property {
                key: String::new(),
                value: self.expr(&spread.argument),
                kind: PropertyKind::Spread,
                doc: None,
                span: to_span(spread.span),
            },
        }
    }

    fn function(
        &self,
        params: &FormalParameters<'_>,
        body: Option<&FunctionBody<'_>>,
        return_type: Option<&TSTypeAnnotation<'_>>,
        is_async: bool,
        is_arrow: bool,
    ) -> FunctionLit {
        let params = params
            .items
            .iter()
            .map(|param| self.param(&param.pattern))
            .collect();

        let mut lit = FunctionLit {
            params,
            return_type: return_type.map(|annotation| self.ty(&annotation.type_annotation)),
            is_async,
            is_arrow,
            ..FunctionLit::default()
        };

        if let Some(body) = body {
            let returned = body.statements.iter().rev().find_map(|statement| match statement {
                Statement::ReturnStatement(ret) => ret.argument.as_ref(),
                _ => None,
            });
            lit.returned = returned.map(|e| Box::new(self.expr(e)));
            lit.returns_only = body.statements.len() == 1 && lit.returned.is_some();

            let mut collector = UsageCollector {
                lowerer: self,
                usages: Usages::default(),
            };
            collector.visit_function_body(body);
            lit.usages = collector.usages;
        }
        lit
    }

    fn param(&self, pattern: &BindingPattern<'_>) -> Param {
        let mut annotation = pattern.type_annotation.as_ref();
        let (name, has_default) = match &pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => (id.name.to_string(), false),
            BindingPatternKind::AssignmentPattern(assign) => {
                annotation = annotation.or(assign.left.type_annotation.as_ref());
                match &assign.left.kind {
                    BindingPatternKind::BindingIdentifier(id) => (id.name.to_string(), true),
                    _ => (self.text(assign.left.span()), true),
                }
            }
            _ => (self.text(pattern.span()), false),
        };
        Param {
            name,
            type_annotation: annotation.map(|annotation| self.ty(&annotation.type_annotation)),
            has_default,
        }
    }

    fn class_expr(&self, class: &Class<'_>) -> Expr {
        Expr {
            kind: ExprKind::Class(self.class(class)),
            source: self.text(class.span),
            span: to_span(class.span),
        }
    }

    fn class(&self, class: &Class<'_>) -> ClassLit {
        let members = class
            .body
            .body
            .iter()
            .filter_map(|element| self.class_member(element))
            .collect();
        ClassLit {
            name: class.id.as_ref().map(|id| id.name.to_string()),
            decorators: self.decorators(&class.decorators),
            super_class: class.super_class.as_ref().map(|e| Box::new(self.expr(e))),
            members,
            doc: self
                .comments
                .leading(decorated_start(class.span.start, &class.decorators)),
            span: to_span(class.span),
        }
    }

    fn class_member(&self, element: &ClassElement<'_>) -> Option<ClassMember> {
        match element {
            ClassElement::PropertyDefinition(prop) => Some(ClassMember {
                name: self.key_name(&prop.key),
                kind: MemberKind::Field,
                decorators: self.decorators(&prop.decorators),
                type_annotation: prop
                    .type_annotation
                    .as_ref()
                    .map(|annotation| self.ty(&annotation.type_annotation)),
                value: prop.value.as_ref().map(|value| self.expr(value)),
                function: None,
                is_static: prop.r#static,
                doc: self
                    .comments
                    .leading(decorated_start(prop.span.start, &prop.decorators)),
                span: to_span(prop.span),
            }),
            ClassElement::MethodDefinition(method) => {
                let function = &method.value;
                Some(ClassMember {
                    name: self.key_name(&method.key),
                    kind: match method.kind {
                        MethodDefinitionKind::Constructor => MemberKind::Constructor,
                        MethodDefinitionKind::Method => MemberKind::Method,
                        MethodDefinitionKind::Get => MemberKind::Getter,
                        MethodDefinitionKind::Set => MemberKind::Setter,
                    },
                    decorators: self.decorators(&method.decorators),
                    type_annotation: None,
                    value: None,
                    function: Some(self.function(
                        &function.params,
                        function.body.as_deref(),
                        function.return_type.as_deref(),
                        function.r#async,
                        false,
                    )),
                    is_static: method.r#static,
                    doc: self
                        .comments
                        .leading(decorated_start(method.span.start, &method.decorators)),
                    span: to_span(method.span),
                })
            }
            _ => None,
        }
    }

    fn key_name(&self, key: &ast::PropertyKey<'_>) -> String {
        key.static_name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| self.text(key.span()))
    }

    fn decorators(&self, decorators: &[Decorator<'_>]) -> Vec<DecoratorNode> {
        decorators
            .iter()
            .map(|decorator| {
                let (callee, arguments, is_call) = match &decorator.expression {
                    Expression::CallExpression(call) => {
                        (&call.callee, self.arguments(&call.arguments), true)
                    }
                    other => (other, Vec::new(), false),
                };
                let name = match callee {
                    Expression::Identifier(ident) => ident.name.to_string(),
                    Expression::StaticMemberExpression(member) => member.property.name.to_string(),
                    other => self.text(other.span()),
                };
                DecoratorNode {
                    name,
                    arguments,
                    is_call,
                    span: to_span(decorator.span),
                }
            })
            .collect()
    }

    fn ty(&self, ty: &TSType<'_>) -> TypeNode {
        match ty {
            TSType::TSAnyKeyword(_) => keyword("any"),
            TSType::TSBigIntKeyword(_) => keyword("bigint"),
            TSType::TSBooleanKeyword(_) => keyword("boolean"),
            TSType::TSNeverKeyword(_) => keyword("never"),
            TSType::TSNullKeyword(_) => keyword("null"),
            TSType::TSNumberKeyword(_) => keyword("number"),
            TSType::TSObjectKeyword(_) => keyword("object"),
            TSType::TSStringKeyword(_) => keyword("string"),
            TSType::TSSymbolKeyword(_) => keyword("symbol"),
            TSType::TSUndefinedKeyword(_) => keyword("undefined"),
            TSType::TSUnknownKeyword(_) => keyword("unknown"),
            TSType::TSVoidKeyword(_) => keyword("void"),
            TSType::TSArrayType(array) => TypeNode::Array(Box::new(self.ty(&array.element_type))),
            TSType::TSUnionType(union) => {
                TypeNode::Union(union.types.iter().map(|t| self.ty(t)).collect())
            }
            TSType::TSIntersectionType(intersection) => {
                TypeNode::Intersection(intersection.types.iter().map(|t| self.ty(t)).collect())
            }
            TSType::TSTypeReference(reference) => TypeNode::Reference {
                name: self.text(reference.type_name.span()),
                arguments: reference
                    .type_arguments
                    .as_ref()
                    .map(|args| args.params.iter().map(|t| self.ty(t)).collect())
                    .unwrap_or_default(),
            },
            TSType::TSLiteralType(literal) => match &literal.literal {
                TSLiteral::StringLiteral(lit) => TypeNode::StringLiteral(lit.value.to_string()),
                TSLiteral::NumericLiteral(lit) => TypeNode::NumberLiteral(self.text(lit.span)),
                TSLiteral::BooleanLiteral(lit) => TypeNode::BooleanLiteral(lit.value),
                _ => TypeNode::Other(self.text(literal.span)),
            },
            other => TypeNode::Other(self.text(other.span())),
        }
    }
}

/// Collects `$emit` calls and `$slots` accesses inside a function body.
struct UsageCollector<'l, 's, 'c> {
    lowerer: &'l Lowerer<'s, 'c>,
    usages: Usages,
}

impl<'l, 's, 'c> UsageCollector<'l, 's, 'c> {
    fn record_emit(&mut self, call: &CallExpression<'_>) {
        let Some(first) = call.arguments.first().and_then(|arg| arg.as_expression()) else {
            return;
        };
        let event = match first {
            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
            _ => None,
        };
        self.usages.emits.push(EmitUsage {
            event,
            event_source: self.lowerer.text(first.span()),
            payload_count: call.arguments.len().saturating_sub(1),
            doc: self.lowerer.comments.leading(call.span.start),
            span: to_span(call.span),
        });
    }

    fn record_slot(&mut self, object: &Expression<'_>, name: String, span: oxc_span::Span) {
        let Expression::StaticMemberExpression(slots) = object else {
            return;
        };
        let scoped = match slots.property.name.as_str() {
            "$slots" => false,
            "$scopedSlots" => true,
            _ => return,
        };
        self.usages.slots.push(SlotUsage {
            name,
            scoped,
            span: to_span(span),
        });
    }
}

impl<'a, 'l, 's, 'c> Visit<'a> for UsageCollector<'l, 's, 'c> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        let is_emit = match &call.callee {
            Expression::StaticMemberExpression(member) => {
                matches!(member.property.name.as_str(), "$emit" | "emit")
            }
            Expression::Identifier(ident) => matches!(ident.name.as_str(), "emit" | "$emit"),
            _ => false,
        };
        if is_emit {
            self.record_emit(call);
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        self.record_slot(&member.object, member.property.name.to_string(), member.span);
        walk::walk_static_member_expression(self, member);
    }

    fn visit_computed_member_expression(&mut self, member: &ComputedMemberExpression<'a>) {
        if let Expression::StringLiteral(lit) = &member.expression {
            self.record_slot(&member.object, lit.value.to_string(), member.span);
        }
        walk::walk_computed_member_expression(self, member);
    }
}

fn keyword(name: &str) -> TypeNode {
    TypeNode::Keyword(name.to_string())
}

fn to_span(span: oxc_span::Span) -> Span {
    Span::new(span.start, span.end)
}

/// Start of a node, moved back to its first decorator.
fn decorated_start(start: u32, decorators: &[Decorator<'_>]) -> u32 {
    decorators
        .iter()
        .map(|decorator| decorator.span.start)
        .fold(start, u32::min)
}

fn value_doc(value: &Expr) -> Option<String> {
    match &value.kind {
        ExprKind::Class(class) => class.doc.clone(),
        _ => None,
    }
}

fn arrow_expression_body<'b, 'a>(body: &'b FunctionBody<'a>) -> Option<&'b Expression<'a>> {
    match body.statements.first()? {
        Statement::ExpressionStatement(statement) => Some(&statement.expression),
        _ => None,
    }
}

fn is_module_exports(target: &AssignmentTarget<'_>) -> bool {
    let AssignmentTarget::StaticMemberExpression(member) = target else {
        return false;
    };
    member.property.name.as_str() == "exports"
        && matches!(&member.object, Expression::Identifier(ident) if ident.name.as_str() == "module")
}
