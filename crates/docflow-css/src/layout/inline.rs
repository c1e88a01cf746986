//! Inline content: white-space processing and run generation.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! Line breaking and glyph placement belong to the emitter. This module only
//! flattens a paragraph's inline content into a sequence of runs, breaks and
//! atomic boxes, with white space already processed the way
//! [CSS Text § 4](https://www.w3.org/TR/css-text-3/#white-space-processing)
//! describes.

use std::sync::Arc;

use docflow_dom::NodeId;

use super::layout_box::{BoxKind, LayoutBox, TextRun};
use crate::style::ComputedStyle;
use crate::style::values::TextDecoration;

/// What inline ancestors contribute to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineContext {
    /// [§ 2.1 Propagation](https://www.w3.org/TR/css-text-decor-3/#line-decoration)
    pub decoration: TextDecoration,
    /// `href` of the nearest enclosing `a`.
    pub link: Option<String>,
}

impl InlineContext {
    /// The context for the children of an inline element.
    #[must_use]
    pub fn enter(&self, style: &ComputedStyle, href: Option<&str>) -> Self {
        Self {
            decoration: self.decoration.union(style.text_decoration),
            link: href.map(str::to_string).or_else(|| self.link.clone()),
        }
    }
}

/// Collects the inline-level boxes of one paragraph.
///
/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// "Any collapsible space immediately following another collapsible space,
/// even one outside the boundary of the inline containing that space,
/// provided both spaces are within the same inline formatting context, is
/// collapsed to have zero advance width."
///
/// [§ 4.1.2 Phase II: Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
///
/// "A sequence of collapsible spaces at the beginning of a line is removed."
/// "A sequence of collapsible spaces at the end of a line is removed."
#[derive(Debug)]
pub struct InlineFlow {
    items: Vec<LayoutBox>,
    at_line_start: bool,
    trailing_space: bool,
}

impl Default for InlineFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineFlow {
    /// An empty flow positioned at the start of a line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            at_line_start: true,
            trailing_space: false,
        }
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a text node's content.
    pub fn push_text(
        &mut self,
        node: NodeId,
        text: &str,
        style: &Arc<ComputedStyle>,
        context: &InlineContext,
    ) {
        let collapse = style.white_space.collapses_spaces();
        let keep_newlines = style.white_space.preserves_newlines();
        let mut chunk = String::new();
        let mut word_start = self.word_start();

        for ch in text.chars() {
            if ch == '\n' && keep_newlines {
                self.push_chunk(node, &mut chunk, word_start, style, context);
                self.push_break(node, style, context);
                word_start = true;
                continue;
            }
            if ch == '\r' {
                continue;
            }
            if collapse && ch.is_ascii_whitespace() {
                // [§ 4.1.1](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
                // Segment breaks and tabs become spaces, then collapse.
                if !self.at_line_start && !self.trailing_space {
                    if chunk.is_empty() {
                        word_start = self.word_start();
                    }
                    chunk.push(' ');
                    self.trailing_space = true;
                }
                continue;
            }
            if chunk.is_empty() {
                word_start = self.word_start();
            }
            chunk.push(ch);
            self.at_line_start = false;
            self.trailing_space = false;
        }
        self.push_chunk(node, &mut chunk, word_start, style, context);
    }

    /// A forced line break: `br` or a preserved newline.
    pub fn push_break(&mut self, node: NodeId, style: &Arc<ComputedStyle>, context: &InlineContext) {
        self.trim_line_end();
        let run = TextRun {
            text: String::new(),
            line_break: true,
            decoration: context.decoration,
            link: context.link.clone(),
        };
        self.items.push(LayoutBox::text_run(node, Arc::clone(style), run));
        self.at_line_start = true;
    }

    /// An atomic inline (an image). Spaces on either side are kept.
    pub fn push_atomic(&mut self, item: LayoutBox) {
        self.items.push(item);
        self.at_line_start = false;
        self.trailing_space = false;
    }

    /// Finish the paragraph: trailing collapsible space is removed, and a
    /// flow that produced nothing visible yields no boxes.
    #[must_use]
    pub fn finish(mut self) -> Vec<LayoutBox> {
        self.trim_line_end();
        self.items
    }

    fn word_start(&self) -> bool {
        self.at_line_start || self.trailing_space
    }

    fn push_chunk(
        &mut self,
        node: NodeId,
        chunk: &mut String,
        word_start: bool,
        style: &Arc<ComputedStyle>,
        context: &InlineContext,
    ) {
        if chunk.is_empty() {
            return;
        }
        // [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
        let text = style.text_transform.apply(chunk, word_start);
        chunk.clear();
        let run = TextRun {
            text,
            line_break: false,
            decoration: context.decoration.union(style.text_decoration),
            link: context.link.clone(),
        };
        self.items.push(LayoutBox::text_run(node, Arc::clone(style), run));
    }

    fn trim_line_end(&mut self) {
        if !self.trailing_space {
            return;
        }
        self.trailing_space = false;
        let Some(last) = self.items.last_mut() else {
            return;
        };
        if let BoxKind::InlineRun(run) = &mut last.kind
            && !run.line_break
        {
            let _ = run.text.pop();
            if run.text.is_empty() {
                let _ = self.items.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::values::{TextTransform, WhiteSpace};

    fn style(white_space: WhiteSpace) -> Arc<ComputedStyle> {
        Arc::new(ComputedStyle {
            white_space,
            ..ComputedStyle::default()
        })
    }

    fn texts(items: &[LayoutBox]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item.as_text_run() {
                Some(run) if run.line_break => "\\n".to_string(),
                Some(run) => run.text.clone(),
                None => "[atomic]".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_spaces_collapse_across_runs() {
        let normal = style(WhiteSpace::Normal);
        let ctx = InlineContext::default();
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), "  Hello   ", &normal, &ctx);
        flow.push_text(NodeId(2), "  \n world \t", &normal, &ctx);
        assert_eq!(texts(&flow.finish()), vec!["Hello ", "world"]);
    }

    #[test]
    fn test_whitespace_only_content_produces_nothing() {
        let normal = style(WhiteSpace::Normal);
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), " \n\t ", &normal, &InlineContext::default());
        assert!(flow.finish().is_empty());
    }

    #[test]
    fn test_pre_preserves_spaces_and_breaks_lines() {
        let pre = style(WhiteSpace::Pre);
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), "a  b\n  c", &pre, &InlineContext::default());
        assert_eq!(texts(&flow.finish()), vec!["a  b", "\\n", "  c"]);
    }

    #[test]
    fn test_pre_line_collapses_spaces_but_keeps_newlines() {
        let pre_line = style(WhiteSpace::PreLine);
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), "a   b  \n   c", &pre_line, &InlineContext::default());
        assert_eq!(texts(&flow.finish()), vec!["a b", "\\n", "c"]);
    }

    #[test]
    fn test_break_trims_preceding_space() {
        let normal = style(WhiteSpace::Normal);
        let ctx = InlineContext::default();
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), "line one ", &normal, &ctx);
        flow.push_break(NodeId(2), &normal, &ctx);
        flow.push_text(NodeId(3), " line two", &normal, &ctx);
        assert_eq!(texts(&flow.finish()), vec!["line one", "\\n", "line two"]);
    }

    #[test]
    fn test_capitalize_across_runs() {
        let cap = Arc::new(ComputedStyle {
            text_transform: TextTransform::Capitalize,
            ..ComputedStyle::default()
        });
        let ctx = InlineContext::default();
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), "hello wor", &cap, &ctx);
        flow.push_text(NodeId(2), "ld again", &cap, &ctx);
        assert_eq!(texts(&flow.finish()), vec!["Hello Wor", "ld Again"]);
    }

    #[test]
    fn test_context_carries_decoration_and_link() {
        let underlined = ComputedStyle {
            text_decoration: TextDecoration {
                underline: true,
                ..TextDecoration::default()
            },
            ..ComputedStyle::default()
        };
        let ctx = InlineContext::default().enter(&underlined, Some("https://example.com"));
        let inner = ctx.enter(&ComputedStyle::default(), None);
        let mut flow = InlineFlow::new();
        flow.push_text(NodeId(1), "link", &style(WhiteSpace::Normal), &inner);
        let items = flow.finish();
        let run = items[0].as_text_run().cloned().unwrap_or_default();
        assert!(run.decoration.underline);
        assert_eq!(run.link.as_deref(), Some("https://example.com"));
    }
}
