//! PHPDoc block parsing.
//!
//! This module turns the raw text of a `/** ... */` comment into a small
//! node tree.  The tree only models what annotation inspection needs:
//!
//! - a [`DocNodeKind::Comment`] root spanning the whole docblock,
//! - one [`DocNodeKind::Tag`] per `@Name` occurrence, with tags written
//!   inside another tag's argument list (`@ORM\JoinTable(joinColumns={
//!   @ORM\JoinColumn(...)})`) nested under that tag,
//! - a [`DocNodeKind::TagName`] token as the first child of every tag.
//!
//! All spans are absolute byte offsets in the containing file, so nodes
//! can be used directly as anchors for diagnostics and text edits.
//!
//! # Submodules
//!
//! - [`tags`]: the denylist of documentation-only tags that are never
//!   treated as annotations.

pub mod tags;

use crate::types::Span;

pub use tags::{NON_ANNOTATION_TAGS, is_documentation_tag};

/// The kind of a docblock syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocNodeKind {
    /// The whole `/** ... */` comment.
    Comment,
    /// One `@Name` tag, including its argument list if it has one.
    Tag,
    /// The `@Name` token of a tag.
    TagName,
}

/// A node of the docblock syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocNode {
    pub kind: DocNodeKind,
    pub span: Span,
    /// For [`DocNodeKind::TagName`] nodes the token text (`@ORM\Column`);
    /// empty for other kinds.
    pub text: String,
    pub children: Vec<DocNode>,
}

impl DocNode {
    fn new(kind: DocNodeKind, span: Span) -> Self {
        DocNode {
            kind,
            span,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// The tag's name token, if this is a tag whose first child is one.
    pub fn name_token(&self) -> Option<&DocNode> {
        if self.kind != DocNodeKind::Tag {
            return None;
        }
        self.children
            .first()
            .filter(|c| c.kind == DocNodeKind::TagName)
    }

    /// The tag's name (`@ORM\Column`), if any.
    pub fn tag_name(&self) -> Option<&str> {
        self.name_token().map(|t| t.text.as_str())
    }

    /// Every tag below this node, nested tags included, in source order.
    ///
    /// This is the unfiltered tag pass: no name filter is applied.
    pub fn tags(&self) -> Vec<&DocNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&DocNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.kind == DocNodeKind::Tag {
                out.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// A tag still collecting nested tags while its argument list is open.
struct OpenTag {
    node: DocNode,
    /// Parenthesis depth at which the tag name appeared.
    depth: u32,
}

/// Parse a docblock comment into a node tree.
///
/// `base_offset` is the byte offset of the comment's first character in
/// the file; every span in the returned tree is shifted by it.
pub fn parse_docblock(text: &str, base_offset: u32) -> DocNode {
    let mut root = DocNode::new(
        DocNodeKind::Comment,
        Span::new(base_offset, base_offset + text.len() as u32),
    );

    let bytes = text.as_bytes();
    let mut open: Vec<OpenTag> = Vec::new();
    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if b == b'"' {
                // Doctrine escapes quotes by doubling them.
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                in_string = false;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' if depth > 0 => in_string = true,
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                close_tags(&mut open, &mut root, base_offset + i as u32 + 1, |d| {
                    d > depth
                });
            }
            b'@' if starts_tag(bytes, i) => {
                let name_end = scan_tag_name(bytes, i + 1);
                let start = base_offset + i as u32;
                let end = base_offset + name_end as u32;

                close_tags(&mut open, &mut root, start, |d| d >= depth);

                let mut name = DocNode::new(DocNodeKind::TagName, Span::new(start, end));
                name.text = text[i..name_end].to_string();

                let mut tag = DocNode::new(DocNodeKind::Tag, Span::new(start, end));
                tag.children.push(name);
                open.push(OpenTag { node: tag, depth });

                i = name_end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    let end = root.span.end;
    close_tags(&mut open, &mut root, end, |_| true);
    root
}

/// Pop every open tag whose depth satisfies `should_close`, attaching each
/// to the next open tag (or the root) and ending its span at `end`.
fn close_tags(
    open: &mut Vec<OpenTag>,
    root: &mut DocNode,
    end: u32,
    should_close: impl Fn(u32) -> bool,
) {
    while let Some(top) = open.last() {
        if !should_close(top.depth) {
            break;
        }
        let Some(mut closed) = open.pop() else {
            break;
        };
        closed.node.span.end = closed.node.span.end.max(end);
        match open.last_mut() {
            Some(parent) => parent.node.children.push(closed.node),
            None => root.children.push(closed.node),
        }
    }
}

/// An `@` starts a tag when it is preceded by a boundary character and
/// followed by a name character.  This keeps e-mail addresses such as
/// `dev@example.com` out of the tag list.
fn starts_tag(bytes: &[u8], at: usize) -> bool {
    let boundary = at == 0
        || matches!(
            bytes[at - 1],
            b' ' | b'\t' | b'\n' | b'\r' | b'*' | b'(' | b'{' | b'[' | b',' | b'='
        );
    let next = bytes.get(at + 1).copied().unwrap_or(b' ');
    boundary && (next.is_ascii_alphabetic() || next == b'_' || next == b'\\')
}

fn scan_tag_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric()
            || bytes[i] == b'_'
            || bytes[i] == b'\\'
            || bytes[i] == b'-'
            || bytes[i] >= 0x80)
    {
        i += 1;
    }
    i
}

// ─── Tests ──────────────────────────────────────────────────────────────────
