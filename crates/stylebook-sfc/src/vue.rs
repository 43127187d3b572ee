//! Vue Single File Component (SFC) block extractor.
//!
//! Splits a `.vue` file into its top-level blocks using byte scanning.
//! Only the outermost level is interpreted: `<template>` blocks are matched
//! with nesting awareness, every other block is treated as raw text up to its
//! closing tag.

use memchr::{memchr, memmem};

use super::common::{BlockKind, Extractor, SfcBlock, SfcError, MAX_BLOCKS, MAX_FILE_SIZE};

/// Vue SFC block extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct VueExtractor;

impl Extractor for VueExtractor {
    fn extract<'a>(&self, source: &'a str) -> Result<Vec<SfcBlock<'a>>, SfcError> {
        if source.len() > MAX_FILE_SIZE {
            return Err(SfcError::FileTooLarge {
                size: source.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let mut blocks = Vec::new();
        let mut pointer = 0;

        while let Some(block) = parse_block(source, &mut pointer)? {
            blocks.push(block);

            if blocks.len() > MAX_BLOCKS {
                return Err(SfcError::TooManyBlocks {
                    count: blocks.len(),
                    max: MAX_BLOCKS,
                });
            }
        }

        Ok(blocks)
    }

    fn file_extension(&self) -> &'static str {
        ".vue"
    }
}

/// Parses the next top-level block starting from the given position.
fn parse_block<'a>(
    source: &'a str,
    pointer: &mut usize,
) -> Result<Option<SfcBlock<'a>>, SfcError> {
    let bytes = source.as_bytes();

    loop {
        let open = match memchr(b'<', &bytes[*pointer..]) {
            Some(pos) => *pointer + pos,
            None => return Ok(None),
        };

        // Top-level HTML comments are skipped entirely
        if bytes[open..].starts_with(b"<!--") {
            let end = memmem::find(&bytes[open + 4..], b"-->")
                .ok_or(SfcError::UnclosedComment { position: open })?;
            *pointer = open + 4 + end + 3;
            continue;
        }

        let name_start = open + 1;
        let name_end = tag_name_end(bytes, name_start);
        if name_end == name_start {
            // Stray `<` or a closing tag at the top level
            *pointer = name_start;
            continue;
        }

        let tag = &source[name_start..name_end];
        let tag_end = find_closing_angle(bytes, name_end).ok_or_else(|| SfcError::UnclosedBlock {
            tag: tag.to_string(),
            position: open,
        })?;

        let attributes = &source[name_end..tag_end];
        let kind = block_kind(tag, attributes);
        let lang = extract_lang_attribute(attributes, default_lang(kind));

        // Self-closing tag <script src="..." />
        if bytes[tag_end - 1] == b'/' {
            *pointer = tag_end + 1;
            return Ok(Some(SfcBlock::new("", tag_end + 1, kind, lang)));
        }

        let content_start = tag_end + 1;
        let close = if kind == BlockKind::Template {
            find_template_end(bytes, content_start)
        } else {
            find_close_tag(bytes, content_start, tag.as_bytes())
        }
        .ok_or_else(|| SfcError::UnclosedBlock {
            tag: tag.to_string(),
            position: open,
        })?;

        // Move past the closing tag, tolerating `</script  >`
        *pointer = match memchr(b'>', &bytes[close..]) {
            Some(pos) => close + pos + 1,
            None => bytes.len(),
        };

        return Ok(Some(SfcBlock::new(
            &source[content_start..close],
            content_start,
            kind,
            lang,
        )));
    }
}

fn block_kind(tag: &str, attributes: &str) -> BlockKind {
    match tag {
        "script" if has_attribute(attributes, "setup") => BlockKind::ScriptSetup,
        "script" => BlockKind::Script,
        "template" => BlockKind::Template,
        "docs" => BlockKind::Docs,
        "style" => BlockKind::Style,
        _ => BlockKind::Custom,
    }
}

fn default_lang(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Script | BlockKind::ScriptSetup => "js",
        BlockKind::Template => "html",
        BlockKind::Docs => "md",
        BlockKind::Style => "css",
        BlockKind::Custom => "",
    }
}

/// Returns the index one past the last byte of a tag name starting at `start`.
fn tag_name_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-') {
        end += 1;
    }
    end
}

/// Returns `true` when the byte can follow a tag name (`<script>`, `<script lang>`).
fn is_tag_boundary(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
}

/// Finds the closing `>` of an opening tag, handling quoted attributes.
fn find_closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_quote = false;
    let mut quote_char = 0u8;

    for (i, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'"' | b'\'' => {
                if !in_quote {
                    in_quote = true;
                    quote_char = byte;
                } else if byte == quote_char {
                    in_quote = false;
                }
            }
            b'>' if !in_quote => return Some(start + i),
            _ => {}
        }
    }

    None
}

/// Finds the `<` of the closing tag `</tag>` for a raw-text block.
fn find_close_tag(bytes: &[u8], start: usize, tag: &[u8]) -> Option<usize> {
    let finder = memmem::Finder::new(b"</");
    let mut cursor = start;
    while let Some(pos) = finder.find(&bytes[cursor..]) {
        let at = cursor + pos;
        let name_start = at + 2;
        let name_end = name_start + tag.len();
        if bytes.len() >= name_end
            && bytes[name_start..name_end].eq_ignore_ascii_case(tag)
            && bytes.get(name_end).is_none_or(|b| is_tag_boundary(*b))
        {
            return Some(at);
        }
        cursor = name_start;
    }
    None
}

/// Finds the `<` of the `</template>` closing the outermost template block.
fn find_template_end(bytes: &[u8], start: usize) -> Option<usize> {
    const OPEN: &[u8] = b"<template";
    const CLOSE: &[u8] = b"</template";

    let mut depth = 1usize;
    let mut cursor = start;
    while let Some(pos) = memchr(b'<', &bytes[cursor..]) {
        let at = cursor + pos;
        let rest = &bytes[at..];
        if rest.starts_with(CLOSE) && rest.get(CLOSE.len()).is_none_or(|b| is_tag_boundary(*b)) {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
        } else if rest.starts_with(OPEN)
            && rest.get(OPEN.len()).is_some_and(|b| is_tag_boundary(*b))
        {
            // Self-closing nested templates do not open a new level
            let self_closing = find_closing_angle(bytes, at + OPEN.len())
                .is_some_and(|end| bytes[end - 1] == b'/');
            if !self_closing {
                depth += 1;
            }
        }
        cursor = at + 1;
    }
    None
}

/// Returns `true` when `name` appears as an attribute in the tag content.
fn has_attribute(tag_content: &str, name: &str) -> bool {
    tag_content
        .split(|c: char| c.is_whitespace() || c == '/')
        .any(|token| token == name || token.strip_prefix(name).is_some_and(|rest| rest.starts_with('=')))
}

/// Extracts the `lang` attribute value from a tag.
fn extract_lang_attribute<'a>(tag_content: &'a str, fallback: &'static str) -> &'a str {
    let Some(lang_pos) = tag_content.find("lang=") else {
        return fallback;
    };
    let after_equals = tag_content[lang_pos + 5..].trim_start();

    match after_equals.chars().next() {
        None => fallback,
        Some(quote @ ('"' | '\'')) => match after_equals[1..].find(quote) {
            Some(end_quote) => &after_equals[1..=end_quote],
            None => fallback,
        },
        Some(_) => {
            // Unquoted value (non-standard but handle it)
            let end = after_equals
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(after_equals.len());
            &after_equals[..end]
        }
    }
}
