/// `use` statement extraction.
///
/// This module walks the `UseItems` of a `use` statement and records one
/// [`UseImport`] per imported class.  Function and constant imports are
/// skipped; annotations only ever refer to classes.
use mago_syntax::ast::*;

use crate::types::{UseImport, short_name};

/// Extract the class imports of one `use` statement.
///
/// `statement_end` is the byte offset where the statement ends; it is
/// recorded on every import so the import fix can place new statements
/// after the existing ones.
pub(super) fn extract_use_items(items: &UseItems, statement_end: u32, imports: &mut Vec<UseImport>) {
    match items {
        UseItems::Sequence(seq) => {
            // `use Foo\Bar;` or `use Foo\Bar, Baz\Qux;`
            for item in seq.items.iter() {
                register_use_item(item, None, statement_end, imports);
            }
        }
        UseItems::TypedSequence(seq) => {
            // `use function Foo\bar;` / `use const Foo\BAR;`
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, statement_end, imports);
            }
        }
        UseItems::TypedList(list) => {
            // `use function Foo\{bar, baz};`
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), statement_end, imports);
            }
        }
        UseItems::MixedList(list) => {
            // `use Foo\{Bar, function baz, const QUX};`
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), statement_end, imports);
            }
        }
    }
}

/// Record a single `UseItem`.
///
/// With a `group_prefix` the item name is relative to it: for
/// `use Foo\{Bar}` the prefix is `Foo` and the imported name `Foo\Bar`.
fn register_use_item(
    item: &UseItem,
    group_prefix: Option<&str>,
    statement_end: u32,
    imports: &mut Vec<UseImport>,
) {
    let item_name = item.name.value();

    let fqn = match group_prefix {
        Some(prefix) => format!(
            "{}\\{}",
            prefix.trim_end_matches('\\'),
            item_name.trim_start_matches('\\')
        ),
        None => item_name.to_string(),
    };
    let fqn = fqn.trim_start_matches('\\').to_string();

    let alias = match item.alias {
        Some(ref alias) => alias.identifier.value.to_string(),
        None => short_name(&fqn).to_string(),
    };

    imports.push(UseImport {
        alias,
        fqn,
        statement_end,
    });
}
