/// Import fix for missing annotation imports.
///
/// Given a reported tag and the class the user picked, this module computes
/// the text edits that make the tag resolve:
///
///   1. A `use Vendor\Pkg\Class;` line, placed after the last import of the
///      namespace block that contains the tag, else after the `namespace`
///      line, else after `<?php` and any `declare(...)` statements.
///   2. When the tag was written qualified (`@ORM\Column`), the name token is
///      shortened to `@Column` so it matches the new import.
///
/// If the class is already imported under some alias, the tag is rewritten
/// to that alias and no line is added.  If the short name is already bound
/// to a different class in that namespace block (an import or a declared
/// class), importing would clash; the tag is then rewritten to its
/// fully-qualified form instead.
///
/// Edits are byte-based; the server converts them to LSP `TextEdit`s.
use crate::parser::{NamespaceScope, ParsedFile};
use crate::types::{AnnotationTag, Span, short_name};

/// A single replacement of `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdit {
    pub span: Span,
    pub new_text: String,
}

/// Build the edits that import `fqn` for `tag`.
pub fn build_import_edits(
    content: &str,
    parsed: &ParsedFile,
    tag: &AnnotationTag,
    fqn: &str,
) -> Vec<ImportEdit> {
    let fqn = fqn.trim_start_matches('\\');
    let short = short_name(fqn);
    let scope = parsed.scope_at(tag.span.start);

    // The class is already imported, possibly under another alias.
    if let Some(import) = scope.imports.iter().find(|i| i.fqn.eq_ignore_ascii_case(fqn)) {
        if tag.name().eq_ignore_ascii_case(&import.alias) {
            return Vec::new();
        }
        return vec![ImportEdit {
            span: tag.span,
            new_text: format!("@{}", import.alias),
        }];
    }

    if binds_other_class(scope, short, fqn) {
        return vec![ImportEdit {
            span: tag.span,
            new_text: format!("@\\{}", fqn),
        }];
    }

    let mut edits = Vec::new();

    // A global class needs no import from the global namespace.
    let needs_use = !(scope.namespace.is_global() && !fqn.contains('\\'));
    if needs_use {
        let offset = find_use_insert_offset(content, scope);
        let prefix = if offset as usize == content.len() && !content.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        edits.push(ImportEdit {
            span: Span::new(offset, offset),
            new_text: format!("{}use {};\n", prefix, fqn),
        });
    }

    if tag.is_qualified() {
        edits.push(ImportEdit {
            span: tag.span,
            new_text: format!("@{}", short),
        });
    }

    edits
}

/// Whether `short` already names something other than `fqn` in `scope`,
/// either through an import alias or a class declared in the block.
fn binds_other_class(scope: &NamespaceScope, short: &str, fqn: &str) -> bool {
    let imported = scope
        .imports
        .iter()
        .any(|i| i.alias.eq_ignore_ascii_case(short) && !i.fqn.eq_ignore_ascii_case(fqn));
    let declared = scope.classes.iter().any(|c| {
        c.name.eq_ignore_ascii_case(short)
            && !c.fqn.trim_start_matches('\\').eq_ignore_ascii_case(fqn)
    });
    imported || declared
}

/// Byte offset at which a new `use` line should be inserted.
///
/// The returned offset is always the start of a line (or the end of the
/// file), so callers can insert `"use Foo\\Bar;\n"` directly.
pub fn find_use_insert_offset(content: &str, scope: &NamespaceScope) -> u32 {
    // After the last existing import of this block.
    if let Some(last_use) = scope.imports.iter().map(|i| i.statement_end).max() {
        return line_end_after(content, last_use);
    }

    // After the namespace header (`namespace Foo;` or `namespace Foo {`).
    if !scope.namespace.is_global() {
        let start = scope.span.start as usize;
        if let Some(rest) = content.get(start..)
            && let Some(idx) = rest.find([';', '{'])
        {
            return line_end_after(content, (start + idx + 1) as u32);
        }
    }

    // After the opening tag and any `declare(...);` statements that follow it.
    match content.find("<?php") {
        Some(idx) => {
            let after_tag = idx + "<?php".len();
            match skip_declares(content, after_tag) {
                Some(end) => line_end_after(content, end as u32),
                None => line_end_after(content, after_tag as u32),
            }
        }
        None => 0,
    }
}

/// End offset (past the `;`) of the run of `declare(...);` statements that
/// starts at `from`, ignoring leading whitespace.  `None` when there is none.
fn skip_declares(content: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    let mut last = None;
    loop {
        let rest = content.get(pos..)?;
        let trimmed = rest.trim_start();
        let start = pos + (rest.len() - trimmed.len());
        let is_declare = trimmed
            .get(..7)
            .is_some_and(|kw| kw.eq_ignore_ascii_case("declare"))
            && trimmed[7..].trim_start().starts_with('(');
        if !is_declare {
            return last;
        }
        let semi = trimmed.find(';')?;
        pos = start + semi + 1;
        last = Some(pos);
    }
}

/// Offset of the start of the line following `offset`, or the end of the
/// file when `offset` is on the last line.
fn line_end_after(content: &str, offset: u32) -> u32 {
    let from = (offset as usize).min(content.len());
    match content[from..].find('\n') {
        Some(idx) => (from + idx + 1) as u32,
        None => content.len() as u32,
    }
}

/// Apply byte-based edits to `content`.
///
/// Edits must not overlap.  Insertions at the same offset keep their
/// relative order.
pub fn apply_edits(content: &str, edits: &[ImportEdit]) -> String {
    let mut ordered: Vec<(usize, &ImportEdit)> = edits.iter().enumerate().collect();
    ordered.sort_by(|(ia, a), (ib, b)| {
        b.span
            .start
            .cmp(&a.span.start)
            .then_with(|| ib.cmp(ia))
    });

    let mut out = content.to_string();
    for (_, edit) in ordered {
        let start = (edit.span.start as usize).min(out.len());
        let end = (edit.span.end as usize).clamp(start, out.len());
        out.replace_range(start..end, &edit.new_text);
    }
    out
}

// ─── Tests ──────────────────────────────────────────────────────────────────
