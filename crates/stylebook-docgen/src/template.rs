//! Template scanning for single file components.
//!
//! Templates are HTML-like markup; a byte scan with `memchr` finds the few
//! constructs that document a component: `<slot>` elements (with an optional
//! `<!-- @slot ... -->` comment right before them) and `$emit('name')` calls
//! in inline handlers.

use memchr::memmem;
use tracing::trace;

use crate::jsdoc::parse_docblock;
use crate::model::{merge_tags, Documentation, ParamDescriptor};

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Adds the slots and events found in `template` to `doc`.
pub fn document_template(doc: &mut Documentation, template: &str) {
    let comments = comment_ranges(template);
    document_slots(doc, template, &comments);
    document_emits(doc, template, &comments);
}

fn document_slots(doc: &mut Documentation, template: &str, comments: &[(usize, usize)]) {
    let bytes = template.as_bytes();
    for start in memmem::find_iter(bytes, b"<slot") {
        if in_comment(comments, start) {
            continue;
        }
        let after = start + "<slot".len();
        if !matches!(bytes.get(after), Some(b' ' | b'\t' | b'\n' | b'\r' | b'/' | b'>')) {
            continue;
        }
        let attributes = parse_attributes(&template[after..]);

        let mut name = "default";
        let mut bindings = Vec::new();
        let mut scoped = false;
        let mut dynamic_name = false;
        for (attr, value) in &attributes {
            match attr.as_str() {
                "name" => name = value.as_deref().unwrap_or("default"),
                ":name" | "v-bind:name" => dynamic_name = true,
                "v-bind" => scoped = true,
                _ => {
                    if let Some(binding) = attr.strip_prefix(':').or_else(|| attr.strip_prefix("v-bind:")) {
                        bindings.push(ParamDescriptor::new(binding));
                    }
                }
            }
        }
        if dynamic_name {
            trace!(offset = start, "skipping <slot> with a dynamic name");
            continue;
        }

        let slot = doc.slot_mut(name);
        if !bindings.is_empty() || scoped {
            slot.scoped = true;
        }
        for binding in bindings {
            if !slot.bindings.iter().any(|existing| existing.name == binding.name) {
                slot.bindings.push(binding);
            }
        }

        let Some(comment) = preceding_comment(template, start) else {
            continue;
        };
        let block = parse_docblock(comment);
        let Some(tag) = block.tag("slot") else {
            continue;
        };
        if let Some(description) = tag.description.clone().or_else(|| block.description.clone()) {
            slot.description = Some(description);
        }
        let documented = block.params(&["binding"]);
        if !documented.is_empty() {
            slot.scoped = true;
        }
        for binding in documented {
            match slot.bindings.iter_mut().find(|existing| existing.name == binding.name) {
                Some(existing) => *existing = binding,
                None => slot.bindings.push(binding),
            }
        }
        merge_tags(&mut slot.tags, block.tag_map(&["slot", "binding"]));
    }
}

fn document_emits(doc: &mut Documentation, template: &str, comments: &[(usize, usize)]) {
    let bytes = template.as_bytes();
    for start in memmem::find_iter(bytes, b"$emit(") {
        if in_comment(comments, start) {
            continue;
        }
        let rest = template[start + "$emit(".len()..].trim_start();
        let Some(quote) = rest.chars().next().filter(|c| matches!(c, '\'' | '"' | '`')) else {
            trace!(offset = start, "skipping $emit with a dynamic event name");
            continue;
        };
        let rest = &rest[quote.len_utf8()..];
        if let Some(end) = rest.find(quote) {
            let name = &rest[..end];
            if !name.is_empty() {
                doc.event_mut(name);
            }
        }
    }
}

/// Attributes of the tag whose name ends where `input` starts, up to its `>`.
fn parse_attributes(input: &str) -> Vec<(String, Option<String>)> {
    let bytes = input.as_bytes();
    let mut attributes = Vec::new();
    let mut i = 0;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'>' || bytes[i..].starts_with(b"/>") {
            break;
        }

        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>') {
            if bytes[i..].starts_with(b"/>") {
                break;
            }
            i += 1;
        }
        let name = input[name_start..i].to_string();
        if name.is_empty() {
            // stray `=`
            i += 1;
            continue;
        }

        let mut value = None;
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            match bytes.get(i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = i + 1;
                    let end = memchr::memchr(quote, &bytes[value_start..])
                        .map_or(bytes.len(), |offset| value_start + offset);
                    value = Some(input[value_start..end].to_string());
                    i = (end + 1).min(bytes.len());
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = Some(input[value_start..i].to_string());
                }
            }
        }
        attributes.push((name, value));
    }
    attributes
}

/// Inner text of the HTML comment directly before `position`, if only
/// whitespace separates them.
fn preceding_comment(template: &str, position: usize) -> Option<&str> {
    let before = template[..position].trim_end();
    let body = before.strip_suffix(COMMENT_CLOSE)?;
    let open = memmem::rfind(body.as_bytes(), COMMENT_OPEN.as_bytes())?;
    Some(&body[open + COMMENT_OPEN.len()..])
}

fn comment_ranges(template: &str) -> Vec<(usize, usize)> {
    let bytes = template.as_bytes();
    let mut ranges = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = memmem::find(&bytes[cursor..], COMMENT_OPEN.as_bytes()) {
        let start = cursor + offset;
        let body = start + COMMENT_OPEN.len();
        let end = memmem::find(&bytes[body..], COMMENT_CLOSE.as_bytes())
            .map_or(bytes.len(), |offset| body + offset + COMMENT_CLOSE.len());
        ranges.push((start, end));
        cursor = end;
    }
    ranges
}

fn in_comment(ranges: &[(usize, usize)], position: usize) -> bool {
    ranges
        .iter()
        .any(|&(start, end)| (start..end).contains(&position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeDescriptor;

    fn document(template: &str) -> Documentation {
        let mut doc = Documentation::new();
        document_template(&mut doc, template);
        doc
    }

    #[test]
    fn documents_named_and_default_slots() {
        let doc = document(
            r#"
            <div>
              <!-- @slot Title area -->
              <slot name="header" />
              <slot>Fallback</slot>
            </div>
            "#,
        );
        let names: Vec<_> = doc.slots.keys().map(String::as_str).collect();
        assert_eq!(names, ["header", "default"]);
        assert_eq!(doc.slots["header"].description.as_deref(), Some("Title area"));
        assert!(doc.slots["default"].description.is_none());
    }

    #[test]
    fn bound_attributes_make_scoped_slots() {
        let doc = document(
            r#"
            <ul>
              <li v-for="item in items">
                <!--
                  @slot One row
                  @binding {Item} item the row being rendered
                -->
                <slot name="row" :item="item" v-bind:index="i"></slot>
              </li>
            </ul>
            "#,
        );
        let row = &doc.slots["row"];
        assert!(row.scoped);
        let bindings: Vec<_> = row.bindings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(bindings, ["item", "index"]);
        assert_eq!(row.bindings[0].type_, Some(TypeDescriptor::named("Item")));
        assert_eq!(row.bindings[0].description.as_deref(), Some("the row being rendered"));
    }

    #[test]
    fn ignores_commented_out_markup_and_similar_tags() {
        let doc = document(
            r#"
            <!-- <slot name="old" /> -->
            <slotted-item />
            <button @click="$emit('legacy')">x</button>
            <!-- <button @click="$emit('removed')" /> -->
            "#,
        );
        assert!(doc.slots.is_empty());
        let events: Vec<_> = doc.events.keys().map(String::as_str).collect();
        assert_eq!(events, ["legacy"]);
    }

    #[test]
    fn documents_template_emits() {
        let doc = document(
            r#"<input @input="$emit( 'update:value', $event.target.value)" @blur="$emit(eventName)" />"#,
        );
        let events: Vec<_> = doc.events.keys().map(String::as_str).collect();
        assert_eq!(events, ["update:value"]);
    }

    #[test]
    fn dynamic_slot_names_are_skipped() {
        let doc = document(r#"<slot :name="current" />"#);
        assert!(doc.slots.is_empty());
    }

    #[test]
    fn comment_must_directly_precede_the_slot() {
        let doc = document("<!-- @slot Orphan --><p>text</p><slot />");
        assert!(doc.slots["default"].description.is_none());
    }

    #[test]
    fn parses_unquoted_and_boolean_attributes() {
        let attributes = parse_attributes(r#" name=footer v-bind="props" hidden/>"#);
        assert_eq!(
            attributes,
            vec![
                ("name".to_string(), Some("footer".to_string())),
                ("v-bind".to_string(), Some("props".to_string())),
                ("hidden".to_string(), None),
            ]
        );
    }

    #[test]
    fn non_ascii_attributes_do_not_break_scanning() {
        let doc = document(r#"<div><slot name="a" données="x" /><slot name="é"/></div>"#);
        let names: Vec<_> = doc.slots.keys().map(String::as_str).collect();
        assert_eq!(names, ["a", "é"]);

        let attributes = parse_attributes(r#" clé=valeur ünïcode/>"#);
        assert_eq!(
            attributes,
            vec![
                ("clé".to_string(), Some("valeur".to_string())),
                ("ünïcode".to_string(), None),
            ]
        );
    }
}
