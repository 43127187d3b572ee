use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tags attached to a descriptor, grouped by tag title (`@author`, `@since`, ...).
pub type TagMap = IndexMap<String, Vec<Tag>>;

/// Documentation record for one exported component definition.
///
/// Descriptor maps are keyed by name; insertion order is declaration order.
/// Equality compares maps as sets of entries, so two records built by
/// handlers running in a different order still compare equal.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Documentation {
    /// Component name shown in the style guide.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
    /// Free-form description from the component docblock.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Component-level tags.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
    /// Declared props.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub props: IndexMap<String, PropDescriptor>,
    /// Public methods.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub methods: IndexMap<String, MethodDescriptor>,
    /// Emitted events.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub events: IndexMap<String, EventDescriptor>,
    /// Slots rendered by the component.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub slots: IndexMap<String, SlotDescriptor>,
    /// Computed properties.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub computed: IndexMap<String, ComputedDescriptor>,
    /// Reactive data entries.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub data: IndexMap<String, DataDescriptor>,
    /// Custom `v-model` binding.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model: Option<ModelDescriptor>,
    /// Contents of `<docs>` blocks.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub docs_blocks: Vec<String>,
    /// Export the record was extracted from (`default` or the exported identifier).
    #[serde(default)]
    pub export_name: String,
}

impl Documentation {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor for `name`, creating it on first reference.
    pub fn prop_mut(&mut self, name: &str) -> &mut PropDescriptor {
        self.props
            .entry(name.to_string())
            .or_insert_with(|| PropDescriptor::new(name))
    }

    /// Returns the method descriptor for `name`, creating it on first reference.
    pub fn method_mut(&mut self, name: &str) -> &mut MethodDescriptor {
        self.methods
            .entry(name.to_string())
            .or_insert_with(|| MethodDescriptor::new(name))
    }

    /// Returns the event descriptor for `name`, creating it on first reference.
    pub fn event_mut(&mut self, name: &str) -> &mut EventDescriptor {
        self.events
            .entry(name.to_string())
            .or_insert_with(|| EventDescriptor::new(name))
    }

    /// Returns the slot descriptor for `name`, creating it on first reference.
    pub fn slot_mut(&mut self, name: &str) -> &mut SlotDescriptor {
        self.slots
            .entry(name.to_string())
            .or_insert_with(|| SlotDescriptor::new(name))
    }

    /// Returns the computed descriptor for `name`, creating it on first reference.
    pub fn computed_mut(&mut self, name: &str) -> &mut ComputedDescriptor {
        self.computed
            .entry(name.to_string())
            .or_insert_with(|| ComputedDescriptor::new(name))
    }

    /// Returns the data descriptor for `name`, creating it on first reference.
    pub fn data_mut(&mut self, name: &str) -> &mut DataDescriptor {
        self.data
            .entry(name.to_string())
            .or_insert_with(|| DataDescriptor::new(name))
    }

    /// Folds a record produced by another handler into this one.
    ///
    /// Scalars set in `other` win; descriptors with the same name are merged
    /// field by field, new descriptors are appended.
    pub fn merge(&mut self, other: Documentation) {
        if other.display_name.is_some() {
            self.display_name = other.display_name;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        merge_tags(&mut self.tags, other.tags);
        for (name, prop) in other.props {
            self.prop_mut(&name).merge(prop);
        }
        for (name, method) in other.methods {
            self.method_mut(&name).merge(method);
        }
        for (name, event) in other.events {
            self.event_mut(&name).merge(event);
        }
        for (name, slot) in other.slots {
            self.slot_mut(&name).merge(slot);
        }
        for (name, computed) in other.computed {
            self.computed_mut(&name).merge(computed);
        }
        for (name, data) in other.data {
            self.data_mut(&name).merge(data);
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        self.docs_blocks.extend(other.docs_blocks);
        if !other.export_name.is_empty() {
            self.export_name = other.export_name;
        }
    }
}

/// Appends every tag of `other` to `target`, keeping title order.
pub(crate) fn merge_tags(target: &mut TagMap, other: TagMap) {
    for (title, tags) in other {
        let entry = target.entry(title).or_default();
        for tag in tags {
            if !entry.contains(&tag) {
                entry.push(tag);
            }
        }
    }
}

fn merge_option<T>(target: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *target = other;
    }
}

/// Canonical representation of a resolved type expression.
///
/// `elements` is present only for `union` and `intersection` shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Display name (`string`, `Book[]`, `union`, `"a" | "b"` rendered as `a | b`, ...).
    pub name: String,
    /// Members of a structured union or intersection.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub elements: Option<Vec<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Creates a leaf descriptor.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: None,
        }
    }

    /// Creates a structured union descriptor.
    pub fn union(elements: Vec<TypeDescriptor>) -> Self {
        Self {
            name: "union".to_string(),
            elements: Some(elements),
        }
    }

    /// Creates a structured intersection descriptor.
    pub fn intersection(elements: Vec<TypeDescriptor>) -> Self {
        Self {
            name: "intersection".to_string(),
            elements: Some(elements),
        }
    }
}

/// Default value of a prop or data entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValue {
    /// Source text that can be re-inserted verbatim into generated code.
    pub value: String,
    /// `true` when the value is computed at runtime (identifier, call, factory).
    pub computed: bool,
}

impl DefaultValue {
    pub fn new(value: impl Into<String>, computed: bool) -> Self {
        Self {
            value: value.into(),
            computed,
        }
    }
}

/// A documented prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_: Option<TypeDescriptor>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<DefaultValue>,
    /// Enumerated allowed values.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
}

impl PropDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_: None,
            required: false,
            default_value: None,
            values: None,
            tags: TagMap::default(),
        }
    }

    fn merge(&mut self, other: PropDescriptor) {
        merge_option(&mut self.description, other.description);
        merge_option(&mut self.type_, other.type_);
        self.required |= other.required;
        merge_option(&mut self.default_value, other.default_value);
        merge_option(&mut self.values, other.values);
        merge_tags(&mut self.tags, other.tags);
    }
}

/// A documented function parameter or payload property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_: Option<TypeDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_: None,
            description: None,
        }
    }
}

/// Return value of a documented method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnDescriptor {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_: Option<TypeDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// A public method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub returns: Option<ReturnDescriptor>,
    /// `async`, `static`, ...
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modifiers: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
            returns: None,
            modifiers: Vec::new(),
            tags: TagMap::default(),
        }
    }

    fn merge(&mut self, other: MethodDescriptor) {
        merge_option(&mut self.description, other.description);
        if !other.params.is_empty() {
            self.params = other.params;
        }
        merge_option(&mut self.returns, other.returns);
        for modifier in other.modifiers {
            if !self.modifiers.contains(&modifier) {
                self.modifiers.push(modifier);
            }
        }
        merge_tags(&mut self.tags, other.tags);
    }
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Payload type from an `@type` tag.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_: Option<TypeDescriptor>,
    /// Payload properties from `@property` / `@arg` tags.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub properties: Vec<ParamDescriptor>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
}

impl EventDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_: None,
            properties: Vec::new(),
            tags: TagMap::default(),
        }
    }

    fn merge(&mut self, other: EventDescriptor) {
        merge_option(&mut self.description, other.description);
        merge_option(&mut self.type_, other.type_);
        if !other.properties.is_empty() {
            self.properties = other.properties;
        }
        merge_tags(&mut self.tags, other.tags);
    }
}

/// A slot rendered by the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Values bound on scoped slots.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub bindings: Vec<ParamDescriptor>,
    #[serde(default)]
    pub scoped: bool,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
}

impl SlotDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            bindings: Vec::new(),
            scoped: false,
            tags: TagMap::default(),
        }
    }

    fn merge(&mut self, other: SlotDescriptor) {
        merge_option(&mut self.description, other.description);
        for binding in other.bindings {
            match self.bindings.iter_mut().find(|b| b.name == binding.name) {
                Some(existing) => {
                    merge_option(&mut existing.type_, binding.type_);
                    merge_option(&mut existing.description, binding.description);
                }
                None => self.bindings.push(binding),
            }
        }
        self.scoped |= other.scoped;
        merge_tags(&mut self.tags, other.tags);
    }
}

/// A computed property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_: Option<TypeDescriptor>,
    /// `true` when a setter is declared.
    #[serde(default)]
    pub settable: bool,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
}

impl ComputedDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_: None,
            settable: false,
            tags: TagMap::default(),
        }
    }

    fn merge(&mut self, other: ComputedDescriptor) {
        merge_option(&mut self.description, other.description);
        merge_option(&mut self.type_, other.type_);
        self.settable |= other.settable;
        merge_tags(&mut self.tags, other.tags);
    }
}

/// A reactive data entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_: Option<TypeDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<DefaultValue>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub tags: TagMap,
}

impl DataDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_: None,
            default_value: None,
            tags: TagMap::default(),
        }
    }

    fn merge(&mut self, other: DataDescriptor) {
        merge_option(&mut self.description, other.description);
        merge_option(&mut self.type_, other.type_);
        merge_option(&mut self.default_value, other.default_value);
        merge_tags(&mut self.tags, other.tags);
    }
}

/// Custom `v-model` binding (`model: { prop, event }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub prop: String,
    pub event: String,
}

/// Structured representation of a docblock tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag identifier (e.g. `author`, `param`).
    pub title: String,
    /// Identifier associated with param-like tags.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Type hint captured from a `{type}` prefix.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_hint: Option<String>,
    /// Arbitrary textual description.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl Tag {
    /// Creates a new tag record.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            name: None,
            type_hint: None,
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_descriptor_is_created_once() {
        let mut doc = Documentation::new();
        doc.prop_mut("size").required = true;
        doc.prop_mut("size").description = Some("Button size".into());
        assert_eq!(doc.props.len(), 1);
        assert!(doc.props["size"].required);
    }

    #[test]
    fn merge_combines_descriptors_by_name() {
        let mut base = Documentation::new();
        base.prop_mut("color").type_ = Some(TypeDescriptor::named("string"));

        let mut other = Documentation::new();
        other.prop_mut("color").values = Some(vec!["dark".into(), "light".into()]);
        other.prop_mut("size");
        other.display_name = Some("AppButton".into());

        base.merge(other);
        assert_eq!(base.props.len(), 2);
        assert_eq!(base.props["color"].type_, Some(TypeDescriptor::named("string")));
        assert_eq!(base.props["color"].values.as_ref().map(Vec::len), Some(2));
        assert_eq!(base.display_name.as_deref(), Some("AppButton"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut a = Documentation::new();
        a.prop_mut("first");
        a.prop_mut("second");
        let mut b = Documentation::new();
        b.prop_mut("second");
        b.prop_mut("first");
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_camel_case_and_skips_empty() {
        let mut doc = Documentation::new();
        doc.export_name = "default".into();
        let prop = doc.prop_mut("size");
        prop.type_ = Some(TypeDescriptor::union(vec![
            TypeDescriptor::named("string"),
            TypeDescriptor::named("number"),
        ]));
        prop.default_value = Some(DefaultValue::new("\"normal\"", false));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["exportName"], "default");
        assert_eq!(json["props"]["size"]["type"]["name"], "union");
        assert_eq!(json["props"]["size"]["defaultValue"]["value"], "\"normal\"");
        assert!(json.get("methods").is_none());
        assert!(json["props"]["size"].get("values").is_none());
        assert!(json["props"]["size"]["type"]["elements"][0].get("elements").is_none());
    }
}
