use oxc_ast::ast::Comment;

use super::{Docblock, Span};

/// Sorted index of the docblock comments of one script.
///
/// A docblock "leads" a node when only whitespace separates the end of the
/// comment from the start of the node.
#[derive(Debug)]
pub struct CommentIndex<'s> {
    source: &'s str,
    blocks: Vec<Span>,
}

impl<'s> CommentIndex<'s> {
    pub fn new<'c>(source: &'s str, comments: impl IntoIterator<Item = &'c Comment>) -> Self {
        let mut blocks: Vec<Span> = comments
            .into_iter()
            .filter(|comment| comment.is_jsdoc())
            .map(|comment| Span::new(comment.span.start, comment.span.end))
            .collect();
        blocks.sort_by_key(|span| span.start);
        Self { source, blocks }
    }

    /// Docblock text immediately preceding `start`, delimiters included.
    pub fn leading(&self, start: u32) -> Option<String> {
        let idx = self.blocks.partition_point(|span| span.end <= start);
        let span = self.blocks.get(idx.checked_sub(1)?)?;
        let gap = self.source.get(span.end as usize..start as usize)?;
        let gap = gap.strip_prefix("*/").unwrap_or(gap);
        if !gap.trim().is_empty() {
            return None;
        }
        self.text(*span)
    }

    /// Every docblock in source order.
    pub fn docblocks(&self) -> Vec<Docblock> {
        self.blocks
            .iter()
            .filter_map(|span| {
                Some(Docblock {
                    span: *span,
                    text: self.text(*span)?,
                })
            })
            .collect()
    }

    fn text(&self, span: Span) -> Option<String> {
        let text = self.source.get(span.start as usize..span.end as usize)?;
        let text = if text.starts_with("/*") {
            text.to_string()
        } else {
            format!("/*{text}*/")
        };
        Some(text)
    }
}
