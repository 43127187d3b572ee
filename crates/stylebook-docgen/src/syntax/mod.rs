//! Owned syntax model lowered from the OXC tree.
//!
//! OXC allocates its tree in an arena that lives only as long as one parse.
//! Handlers run asynchronously and results are cached across calls, so the
//! parts of the tree the handlers read are lowered once into the plain owned
//! structures below. Every node keeps its source text so that default values
//! and fallback type names can be re-emitted verbatim.

mod comments;
mod lower;

pub use comments::CommentIndex;
pub use lower::{parse, Grammar, Lang};

use rustc_hash::FxHashMap;

/// Byte range in the parsed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns `true` when `other` lies entirely inside this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A parsed and lowered script, shared through the parse cache.
#[derive(Debug, Clone, Default)]
pub struct ParsedScript {
    /// Exports in declaration order.
    pub exports: Vec<ExportEntry>,
    /// Top-level `const`/`let`/`var` initializers and class declarations by local name.
    pub bindings: FxHashMap<String, Binding>,
    /// Import table by local name.
    pub imports: FxHashMap<String, ImportBinding>,
    /// Every `/** ... */` comment in the script, in source order.
    pub docblocks: Vec<Docblock>,
}

impl ParsedScript {
    /// Docblocks located inside `span`.
    pub fn docblocks_within(&self, span: Span) -> impl Iterator<Item = &Docblock> {
        self.docblocks
            .iter()
            .filter(move |block| span.contains(block.span))
    }
}

/// A top-level export.
#[derive(Debug, Clone)]
pub struct ExportEntry {
    /// Exported name (`default` for default exports and `module.exports`).
    pub name: String,
    pub target: ExportTarget,
    /// Docblock leading the export statement.
    pub doc: Option<String>,
}

/// What an export points at.
#[derive(Debug, Clone)]
pub enum ExportTarget {
    /// An inline expression or class.
    Expr(Expr),
    /// A local binding (`export default Button`, `export { Button }`).
    Local(String),
}

/// A top-level binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Expr,
    /// Docblock leading the declaration statement.
    pub doc: Option<String>,
}

/// An imported binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Module specifier as written (`./mixins/sizeable`).
    pub source: String,
    pub imported: Imported,
}

/// Which export of the module an import refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Default,
    Named(String),
    Namespace,
}

/// A docblock comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docblock {
    pub span: Span,
    /// Full comment text including delimiters.
    pub text: String,
}

/// A lowered expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Source text of the expression.
    pub source: String,
    pub span: Span,
}

/// Expression shapes the handlers distinguish.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Object(ObjectLit),
    Array(Vec<Expr>),
    /// String literal (cooked value).
    Str(String),
    /// Template literal (see `source`).
    Template,
    /// Numeric literal (raw text).
    Number(String),
    Bool(bool),
    Null,
    Ident(String),
    This,
    Member {
        object: Box<Expr>,
        property: String,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    Function(FunctionLit),
    Class(ClassLit),
    /// `expr as Type`
    TypeCast {
        expression: Box<Expr>,
        type_annotation: TypeNode,
    },
    /// Anything else; only `source` is meaningful.
    Other,
}

impl Expr {
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectLit> {
        match &self.kind {
            ExprKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ExprKind::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionLit> {
        match &self.kind {
            ExprKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Literal values that need no evaluation.
    pub fn is_literal(&self) -> bool {
        match &self.kind {
            ExprKind::Str(_)
            | ExprKind::Template
            | ExprKind::Number(_)
            | ExprKind::Bool(_)
            | ExprKind::Null => true,
            ExprKind::Array(items) => items.iter().all(Expr::is_literal),
            ExprKind::Object(object) => object
                .properties
                .iter()
                .all(|p| p.kind == PropertyKind::Init && p.value.is_literal()),
            _ => false,
        }
    }

    /// Visits every function literal reachable from this expression.
    pub fn for_each_function<'a>(&'a self, visit: &mut dyn FnMut(&'a FunctionLit)) {
        match &self.kind {
            ExprKind::Function(function) => visit(function),
            ExprKind::Object(object) => {
                for property in &object.properties {
                    property.value.for_each_function(visit);
                }
            }
            ExprKind::Array(items) => items.iter().for_each(|item| item.for_each_function(visit)),
            ExprKind::Call { callee, arguments } => {
                callee.for_each_function(visit);
                arguments.iter().for_each(|arg| arg.for_each_function(visit));
            }
            ExprKind::TypeCast { expression, .. } => expression.for_each_function(visit),
            _ => {}
        }
    }
}

/// An object literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectLit {
    pub properties: Vec<Property>,
    pub span: Span,
}

impl ObjectLit {
    /// Value of the first non-computed property named `key`.
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.property(key).map(|property| &property.value)
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|property| property.key == key && property.kind != PropertyKind::Spread)
    }
}

/// An object literal member.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Static key name; empty for spreads and computed keys.
    pub key: String,
    pub value: Expr,
    pub kind: PropertyKind,
    /// Leading docblock.
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Method,
    Get,
    Set,
    Spread,
    Computed,
}

/// A function or arrow function.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionLit {
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    /// Argument of the last top-level `return`, or the arrow expression body.
    pub returned: Option<Box<Expr>>,
    /// `true` when the body consists of nothing but that return.
    pub returns_only: bool,
    pub is_async: bool,
    pub is_arrow: bool,
    pub usages: Usages,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Binding name, or the pattern source for destructured params.
    pub name: String,
    pub type_annotation: Option<TypeNode>,
    pub has_default: bool,
}

/// Component API usages found inside a function body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Usages {
    pub emits: Vec<EmitUsage>,
    pub slots: Vec<SlotUsage>,
}

impl Usages {
    pub fn extend(&mut self, other: &Usages) {
        self.emits.extend(other.emits.iter().cloned());
        self.slots.extend(other.slots.iter().cloned());
    }
}

/// A `this.$emit(...)` / `emit(...)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitUsage {
    /// Event name when the first argument is a string literal.
    pub event: Option<String>,
    /// Source of the non-literal first argument (`EVENTS.CHANGE`).
    pub event_source: String,
    /// Number of payload arguments after the event name.
    pub payload_count: usize,
    /// Docblock leading the call.
    pub doc: Option<String>,
    pub span: Span,
}

/// A `this.$slots.x` / `this.$scopedSlots.x` access.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotUsage {
    pub name: String,
    pub scoped: bool,
    pub span: Span,
}

/// A class declaration or expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassLit {
    pub name: Option<String>,
    pub decorators: Vec<DecoratorNode>,
    pub super_class: Option<Box<Expr>>,
    pub members: Vec<ClassMember>,
    /// Docblock leading the class (or its first decorator).
    pub doc: Option<String>,
    pub span: Span,
}

impl ClassLit {
    /// First decorator named `name`.
    pub fn decorator(&self, name: &str) -> Option<&DecoratorNode> {
        self.decorators.iter().find(|decorator| decorator.name == name)
    }
}

/// A decorator application (`@Prop`, `@Prop({ default: 1 })`).
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorNode {
    pub name: String,
    pub arguments: Vec<Expr>,
    /// `true` for `@Name(...)`, `false` for bare `@Name`.
    pub is_call: bool,
    pub span: Span,
}

/// A class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub name: String,
    pub kind: MemberKind,
    pub decorators: Vec<DecoratorNode>,
    pub type_annotation: Option<TypeNode>,
    /// Field initializer.
    pub value: Option<Expr>,
    /// Method, getter or setter body.
    pub function: Option<FunctionLit>,
    pub is_static: bool,
    /// Leading docblock (before the first decorator when decorated).
    pub doc: Option<String>,
    pub span: Span,
}

impl ClassMember {
    pub fn decorator(&self, names: &[&str]) -> Option<&DecoratorNode> {
        self.decorators
            .iter()
            .find(|decorator| names.contains(&decorator.name.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
    Getter,
    Setter,
    Constructor,
}

/// A lowered type annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    /// Keyword types (`string`, `number`, `null`, ...), lowercase.
    Keyword(String),
    /// `Name` or `Name<Args>`.
    Reference { name: String, arguments: Vec<TypeNode> },
    /// `T[]`
    Array(Box<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    StringLiteral(String),
    /// Numeric literal (raw text).
    NumberLiteral(String),
    BooleanLiteral(bool),
    /// Unsupported shapes, kept as source text.
    Other(String),
}

/// Closed set of component definition sites.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentDefinition {
    /// Options object: `export default {...}`, `defineComponent({...})`, `module.exports = {...}`.
    Object {
        options: ObjectLit,
        doc: Option<String>,
    },
    /// Class component; `options` holds the `@Component({...})` argument.
    Class {
        class: ClassLit,
        options: Option<ObjectLit>,
        doc: Option<String>,
    },
}

impl ComponentDefinition {
    /// Options object, for object components and decorated classes.
    pub fn options(&self) -> Option<&ObjectLit> {
        match self {
            Self::Object { options, .. } => Some(options),
            Self::Class { options, .. } => options.as_ref(),
        }
    }

    pub fn class(&self) -> Option<&ClassLit> {
        match self {
            Self::Class { class, .. } => Some(class),
            Self::Object { .. } => None,
        }
    }

    /// Docblock describing the component.
    pub fn doc(&self) -> Option<&str> {
        match self {
            Self::Object { doc, .. } | Self::Class { doc, .. } => doc.as_deref(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Object { options, .. } => options.span,
            Self::Class { class, .. } => class.span,
        }
    }

    /// All `$emit` / `$slots` usages inside the definition.
    pub fn usages(&self) -> Usages {
        let mut usages = Usages::default();
        let mut collect = |function: &FunctionLit| usages.extend(&function.usages);
        if let Some(options) = self.options() {
            for property in &options.properties {
                property.value.for_each_function(&mut collect);
            }
        }
        if let Some(class) = self.class() {
            for member in &class.members {
                if let Some(function) = &member.function {
                    collect(function);
                }
                if let Some(value) = &member.value {
                    value.for_each_function(&mut collect);
                }
            }
        }
        usages
    }
}
