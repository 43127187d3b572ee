use crate::model::{ParamDescriptor, Tag, TagMap, TypeDescriptor};

/// Tags whose payload is `{type} name description`.
const PARAM_LIKE_TAGS: &[&str] = &[
    "param", "arg", "argument", "property", "prop", "binding", "event",
];

/// Structured representation of a parsed docblock.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DocBlock {
    /// Description text before any tags.
    pub description: Option<String>,
    /// Tags in declaration order.
    pub tags: Vec<Tag>,
}

impl DocBlock {
    /// Returns `true` if the comment does not contain any meaningful data.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.tags.is_empty()
    }

    /// Returns `true` when at least one tag with `title` is present.
    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|tag| tag.title == title)
    }

    /// First tag with `title`.
    pub fn tag(&self, title: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.title == title)
    }

    /// Every tag with one of the given titles.
    pub fn tags_named<'a>(&'a self, titles: &'a [&'a str]) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags
            .iter()
            .filter(move |tag| titles.contains(&tag.title.as_str()))
    }

    /// Enumerated values from a `@values a, b, c` tag.
    pub fn values(&self) -> Option<Vec<String>> {
        let tag = self.tag("values")?;
        let values: Vec<String> = tag
            .description
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        (!values.is_empty()).then_some(values)
    }

    /// Parameter-like tags converted into descriptors.
    pub fn params(&self, titles: &[&str]) -> Vec<ParamDescriptor> {
        self.tags_named(titles)
            .filter_map(|tag| {
                let name = tag.name.as_ref()?;
                let mut param = ParamDescriptor::new(name.clone());
                param.type_ = tag.type_hint.as_ref().map(TypeDescriptor::named);
                param.description = tag.description.clone();
                Some(param)
            })
            .collect()
    }

    /// Groups tags by title, dropping the given titles.
    pub fn tag_map(&self, skip: &[&str]) -> TagMap {
        let mut map = TagMap::default();
        for tag in &self.tags {
            if skip.contains(&tag.title.as_str()) {
                continue;
            }
            map.entry(tag.title.clone()).or_default().push(tag.clone());
        }
        map
    }
}

/// Parse a docblock (with or without comment delimiters) into structured data.
///
/// The parser handles the common tag patterns without a full JSDoc grammar:
/// every `@tag` line starts a new tag, following lines without a tag are
/// appended to the previous tag's description.
pub fn parse_docblock(raw: &str) -> DocBlock {
    let mut description_lines = Vec::new();
    let mut tags: Vec<Tag> = Vec::new();
    let mut open_tag: Option<(String, Vec<String>)> = None;

    for line in normalize_lines(strip_delimiters(raw)) {
        if let Some(rest) = line.strip_prefix('@') {
            if let Some((title, payload)) = open_tag.take() {
                tags.push(build_tag(title, payload));
            }
            let (title, payload) = split_tag_payload(rest);
            open_tag = Some((title.to_string(), vec![payload.to_string()]));
        } else if let Some((_, payload)) = open_tag.as_mut() {
            payload.push(line);
        } else {
            description_lines.push(line);
        }
    }

    if let Some((title, payload)) = open_tag.take() {
        tags.push(build_tag(title, payload));
    }

    DocBlock {
        description: compose_description(description_lines),
        tags,
    }
}

fn strip_delimiters(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("/**").or_else(|| trimmed.strip_prefix("/*")).unwrap_or(trimmed);
    trimmed.strip_suffix("*/").unwrap_or(trimmed)
}

fn normalize_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches('*');
            line.trim().to_string()
        })
        .collect()
}

fn compose_description(lines: Vec<String>) -> Option<String> {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_tag_payload(input: &str) -> (&str, &str) {
    let mut parts = input.splitn(2, char::is_whitespace);
    let tag = parts.next().unwrap_or("");
    let payload = parts.next().unwrap_or("").trim();
    (tag, payload)
}

fn build_tag(title: String, payload: Vec<String>) -> Tag {
    let payload = payload.join("\n");
    let payload = payload.trim();
    let mut tag = Tag::new(title);

    let (type_hint, rest) = parse_type_and_rest(payload);
    tag.type_hint = type_hint;

    if PARAM_LIKE_TAGS.contains(&tag.title.as_str()) {
        let rest = rest.unwrap_or_default();
        let mut parts = rest.splitn(2, char::is_whitespace);
        if let Some(name) = parts.next().filter(|name| !name.is_empty()) {
            tag.name = Some(name.trim_matches(|c| c == '[' || c == ']').to_string());
        }
        tag.description = parts
            .next()
            .map(|desc| desc.trim().trim_start_matches('-').trim().to_string())
            .filter(|desc| !desc.is_empty());
    } else {
        tag.description = rest;
    }
    tag
}

fn parse_type_and_rest(payload: &str) -> (Option<String>, Option<String>) {
    let trimmed = payload.trim();
    if let Some(stripped) = trimmed.strip_prefix('{') {
        if let Some((ty, rest)) = stripped.split_once('}') {
            let ty = ty.trim();
            let rest = rest.trim();
            let ty = (!ty.is_empty()).then(|| ty.to_string());
            let rest = (!rest.is_empty()).then(|| rest.to_string());
            return (ty, rest);
        }
    }
    (None, (!trimmed.is_empty()).then(|| trimmed.to_string()))
}
