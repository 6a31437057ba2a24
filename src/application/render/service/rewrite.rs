use std::num::NonZeroU32;

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};

use crate::application::render::languages::LanguageTag;
use crate::application::render::types::{BlockKind, RenderedBlock};

use super::{
    blocks::{PARAGRAPH_CLASS, TABLE_CLASS},
    highlight::{CODE_CONTAINER_CLASS, CodeBlock, CodeBlockRenderer, RenderedCode},
    image::{ImageRenderer, ImageSource, split_dimension_prefix},
    strip_trailing_newline,
};

#[derive(Debug, Default)]
pub(crate) struct RewriteOutcome {
    pub(crate) contains_code: bool,
    pub(crate) blocks: Vec<RenderedBlock>,
    pub(crate) code_blocks: usize,
    pub(crate) images: usize,
}

/// Replace code and image nodes with the markup of their renderers and
/// record an outline of the top-level blocks.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    code: &CodeBlockRenderer,
    images: &ImageRenderer,
) -> RewriteOutcome {
    let mut walker = RewriteWalker {
        code,
        images,
        outcome: RewriteOutcome::default(),
    };

    let mut child = root.first_child();
    while let Some(node) = child {
        child = node.next_sibling();
        walker.visit_nodes(node, true);
    }

    walker.outcome
}

struct RewriteWalker<'r> {
    code: &'r CodeBlockRenderer,
    images: &'r ImageRenderer,
    outcome: RewriteOutcome,
}

impl RewriteWalker<'_> {
    fn visit_nodes(&mut self, node: &AstNode<'_>, top_level: bool) {
        let summary = if let Some((info, literal)) = extract_code_block(node) {
            Some(self.rewrite_code_block(node, &info, literal))
        } else {
            self.rewrite_inline_code(node);
            if is_image(node) {
                self.rewrite_image(node);
            }
            top_level.then(|| describe_block(node))
        };

        // Image rewrites detach their dimension sibling; walk a snapshot.
        let mut children = Vec::new();
        let mut child = node.first_child();
        while let Some(next) = child {
            children.push(next);
            child = next.next_sibling();
        }
        for child in children {
            self.visit_nodes(child, false);
        }

        if top_level && let Some(block) = summary {
            self.outcome.blocks.push(block);
        }
    }

    fn rewrite_code_block(&mut self, node: &AstNode<'_>, info: &str, literal: String) -> RenderedBlock {
        let language = LanguageTag::from_info_string(info);
        let block = CodeBlock::fenced(literal, language.clone());
        let rendered = self.code.render(&block);
        let highlighted = rendered.is_highlighted();

        let html = match rendered {
            RenderedCode::Highlighted { html, .. } => html,
            RenderedCode::Plain { html } => format!("<pre>{html}</pre>"),
        };

        self.outcome.code_blocks += 1;
        self.outcome.contains_code |= highlighted;

        {
            let mut data = node.data.borrow_mut();
            data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: format!("{html}\n"),
            });
        }

        RenderedBlock {
            kind: BlockKind::Code {
                language: language.map(|tag| tag.as_str().to_string()),
                highlighted,
            },
            class: highlighted.then(|| CODE_CONTAINER_CLASS.to_string()),
            text: strip_trailing_newline(&block.literal).to_string(),
        }
    }

    fn rewrite_inline_code(&mut self, node: &AstNode<'_>) {
        let literal = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Code(code) => code.literal.clone(),
                _ => return,
            }
        };

        let rendered = self.code.render(&CodeBlock::inline(literal));
        let mut data = node.data.borrow_mut();
        data.value = NodeValue::HtmlInline(rendered.html().to_string());
    }

    fn rewrite_image(&mut self, node: &AstNode<'_>) {
        let (src, title) = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Image(link) => (link.url.clone(), link.title.clone()),
                _ => return,
            }
        };

        let alt = normalize_whitespace(&collect_inline_text(node));
        let (width, height) = match extract_markdown_dimensions(node) {
            Some((width, height)) => (Some(width), Some(height)),
            None => (None, None),
        };

        let html = self.images.render(&ImageSource {
            src,
            alt: (!alt.is_empty()).then_some(alt),
            title: (!title.is_empty()).then_some(title),
            width,
            height,
        });
        self.outcome.images += 1;

        {
            let mut data = node.data.borrow_mut();
            data.value = NodeValue::HtmlInline(html);
        }

        while let Some(child) = node.first_child() {
            child.detach();
        }
    }
}

fn describe_block(node: &AstNode<'_>) -> RenderedBlock {
    let (kind, class) = {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Heading(heading) => (
                BlockKind::Heading {
                    level: heading.level,
                },
                None,
            ),
            NodeValue::Paragraph => (BlockKind::Paragraph, Some(PARAGRAPH_CLASS)),
            NodeValue::Table(..) => (BlockKind::Table, Some(TABLE_CLASS)),
            NodeValue::List(..) => (BlockKind::List, None),
            NodeValue::BlockQuote => (BlockKind::BlockQuote, None),
            NodeValue::ThematicBreak => (BlockKind::ThematicBreak, None),
            NodeValue::HtmlBlock(..) => (BlockKind::Html, None),
            _ => (BlockKind::Other, None),
        }
    };

    let text = match kind {
        BlockKind::Html => {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::HtmlBlock(block) => block.literal.trim().to_string(),
                _ => String::new(),
            }
        }
        _ => normalize_whitespace(&collect_inline_text(node)),
    };

    RenderedBlock {
        kind,
        class: class.map(str::to_string),
        text,
    }
}

fn is_image(node: &AstNode<'_>) -> bool {
    let data = node.data.borrow();
    matches!(data.value, NodeValue::Image(..))
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.clone()))
    } else {
        None
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        let separate = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => match split_dimension_prefix(text) {
                    Some((_, rest)) if follows_image(node) => buffer.push_str(rest),
                    _ => buffer.push_str(text),
                },
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
            matches!(
                data.value,
                NodeValue::TableCell | NodeValue::Item(..) | NodeValue::Paragraph
            )
        };

        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }

        if separate {
            buffer.push(' ');
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

/// Consume a `{width=… height=…}` run at the start of the text that
/// follows an image. Text after the closing brace stays in place.
fn extract_markdown_dimensions(node: &AstNode<'_>) -> Option<(NonZeroU32, NonZeroU32)> {
    let mut sibling = node.next_sibling();
    while let Some(current) = sibling {
        sibling = current.next_sibling();

        let (found, skip) = {
            let data = current.data.borrow();
            match &data.value {
                NodeValue::Text(text) => match split_dimension_prefix(text) {
                    Some((dimensions, rest)) => (Some((dimensions, rest.to_string())), false),
                    None => (None, text.trim().is_empty()),
                },
                NodeValue::SoftBreak | NodeValue::LineBreak => (None, true),
                _ => (None, false),
            }
        };

        if let Some((dimensions, rest)) = found {
            if rest.is_empty() {
                current.detach();
            } else {
                current.data.borrow_mut().value = NodeValue::Text(rest.into());
            }
            return Some(dimensions);
        }

        if !skip {
            break;
        }
    }

    None
}

/// Whether only whitespace separates this node from a preceding image.
fn follows_image(node: &AstNode<'_>) -> bool {
    let mut previous = node.previous_sibling();
    while let Some(current) = previous {
        let whitespace = match &current.data.borrow().value {
            NodeValue::Image(..) => return true,
            NodeValue::Text(text) => text.trim().is_empty(),
            NodeValue::SoftBreak | NodeValue::LineBreak => true,
            _ => false,
        };
        if !whitespace {
            return false;
        }
        previous = current.previous_sibling();
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::render::languages::language_registry;
    use crate::application::render::service::config::markdown_options;
    use comrak::{Arena, format_html, parse_document};

    fn rewrite(markdown: &str) -> (RewriteOutcome, String) {
        let options = markdown_options(true);
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &options);
        let code = CodeBlockRenderer::new(Arc::clone(&language_registry()));
        let outcome = rewrite_ast(root, &code, &ImageRenderer::default());

        let mut html = String::new();
        format_html(root, &options, &mut html).expect("html");
        (outcome, html)
    }

    #[test]
    fn fenced_swift_block_is_highlighted() {
        let (outcome, html) = rewrite("```swift\nprint(1)\n```\n");

        assert!(outcome.contains_code);
        assert_eq!(outcome.code_blocks, 1);
        assert!(html.contains("data-language=\"swift\""));
        assert_eq!(
            outcome.blocks,
            vec![RenderedBlock {
                kind: BlockKind::Code {
                    language: Some("swift".into()),
                    highlighted: true
                },
                class: Some(CODE_CONTAINER_CLASS.into()),
                text: "print(1)".into(),
            }]
        );
    }

    #[test]
    fn unknown_fence_language_keeps_pre_and_class() {
        let (outcome, html) = rewrite("```cobol-ish\nMOVE A TO B\n```\n");

        assert!(!outcome.contains_code);
        assert!(html.contains("<pre><code class=\"language-cobol-ish\">MOVE A TO B\n</code></pre>"));
    }

    #[test]
    fn images_use_renderer_and_dimension_block() {
        let (outcome, html) = rewrite("![Pipeline](ci.png){width=640 height=480}\n\n![](plain.png)\n");

        assert_eq!(outcome.images, 2);
        assert!(html.contains(
            "<img src=\"/images/ci.png\" alt=\"Pipeline\" width=\"640\" height=\"480\" class=\"image-block\" />"
        ));
        assert!(html.contains(
            "<img src=\"/images/plain.png\" alt=\"Image\" width=\"500\" height=\"500\" class=\"image-block\" />"
        ));
        assert!(!html.contains("{width"));
    }

    #[test]
    fn outline_lists_top_level_blocks_in_order() {
        let (outcome, _) = rewrite("# Title\n\nSome *text*.\n\n- one\n- two\n\n> quote\n\n---\n");
        let kinds: Vec<_> = outcome.blocks.iter().map(|b| b.kind.clone()).collect();

        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading { level: 1 },
                BlockKind::Paragraph,
                BlockKind::List,
                BlockKind::BlockQuote,
                BlockKind::ThematicBreak,
            ]
        );
        assert_eq!(outcome.blocks[0].text, "Title");
        assert_eq!(outcome.blocks[1].text, "Some text.");
        assert_eq!(outcome.blocks[2].text, "one two");
    }

    #[test]
    fn nested_code_blocks_are_rewritten_but_not_outlined() {
        let (outcome, html) = rewrite("- item\n\n  ```bash\n  echo hi\n  ```\n");

        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].kind, BlockKind::List);
        assert_eq!(outcome.code_blocks, 1);
        assert!(html.contains("data-language=\"bash\""));
    }

    #[test]
    fn images_sharing_a_paragraph_are_all_rewritten() {
        let (outcome, html) = rewrite("![a](a.png){width=10 height=10} ![b](b.png)\n");

        assert_eq!(outcome.images, 2);
        assert!(html.contains(
            "<img src=\"/images/a.png\" alt=\"a\" width=\"10\" height=\"10\" class=\"image-block\" /> <img src=\"/images/b.png\" alt=\"b\" width=\"500\" height=\"500\" class=\"image-block\" />"
        ));
        assert_eq!(outcome.blocks[0].text, "a b");
    }

    #[test]
    fn inline_code_after_dimensioned_image_is_rendered() {
        let (outcome, html) = rewrite("![Chart](c.png){width=64 height=32} then `x` here\n");

        assert_eq!(outcome.images, 1);
        assert!(html.contains("width=\"64\" height=\"32\""));
        assert!(html.contains(" then <code>x</code> here"));
        assert!(!html.contains("{width"));
        assert_eq!(outcome.blocks[0].text, "Chart then x here");
    }

    #[test]
    fn outline_text_omits_dimension_block() {
        let (outcome, _) = rewrite("![Pipeline](ci.png){width=640 height=480}\n");

        assert_eq!(outcome.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(outcome.blocks[0].text, "Pipeline");
    }
}
