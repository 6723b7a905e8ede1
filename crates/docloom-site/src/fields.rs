//! Typed access to page definition fields.
//!
//! Malformed values are reported on the run context and read as absent.

use docloom_config::{RawEntry, key_label};
use serde_yaml::Value;

use crate::diagnostics::RunContext;

/// Human-readable name of a YAML value's type.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Present, non-null field value.
pub(crate) fn value<'a>(entry: &'a RawEntry, field: &str) -> Option<&'a Value> {
    entry.get(field).filter(|v| !v.is_null())
}

/// Text field. Numbers and booleans are accepted as their text form.
pub(crate) fn text(entry: &RawEntry, field: &str, ctx: &mut RunContext) -> Option<String> {
    let value = value(entry, field)?;
    match key_label(value) {
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text),
        None => {
            malformed(entry, field, "text", value, ctx);
            None
        }
    }
}

/// List of text items. A single string counts as a one-item list.
pub(crate) fn list(entry: &RawEntry, field: &str, ctx: &mut RunContext) -> Option<Vec<String>> {
    let value = value(entry, field)?;
    let items = match value {
        Value::Sequence(seq) => {
            let mut items = Vec::with_capacity(seq.len());
            for (i, item) in seq.iter().enumerate() {
                match key_label(item) {
                    Some(text) if !text.trim().is_empty() => items.push(text),
                    Some(_) => {}
                    None if item.is_null() => {}
                    None => ctx.warn(
                        &entry.id,
                        Some(field),
                        format!("item {} is {}, expected text; skipped", i + 1, value_kind(item)),
                    ),
                }
            }
            items
        }
        other => match key_label(other) {
            Some(text) if !text.trim().is_empty() => vec![text],
            Some(_) => Vec::new(),
            None => {
                malformed(entry, field, "text or a list", other, ctx);
                return None;
            }
        },
    };
    (!items.is_empty()).then_some(items)
}

/// Items of a list field that may hold mappings. A single mapping counts
/// as a one-item list.
pub(crate) fn items<'a>(
    entry: &'a RawEntry,
    field: &str,
    ctx: &mut RunContext,
) -> Option<Vec<&'a Value>> {
    let value = value(entry, field)?;
    match value {
        Value::Sequence(seq) => {
            let items: Vec<&Value> = seq.iter().filter(|v| !v.is_null()).collect();
            (!items.is_empty()).then_some(items)
        }
        Value::Mapping(_) | Value::String(_) => Some(vec![value]),
        other => {
            malformed(entry, field, "a list", other, ctx);
            None
        }
    }
}

/// Text value of `key` inside a mapping item.
pub(crate) fn item_text(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(key_label)
        .filter(|text| !text.trim().is_empty())
}

fn malformed(entry: &RawEntry, field: &str, expected: &str, found: &Value, ctx: &mut RunContext) {
    ctx.warn(
        &entry.id,
        Some(field),
        format!("expected {expected}, found {}; field ignored", value_kind(found)),
    );
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::test_support::entry;
    use super::*;

    #[test]
    fn test_text() {
        let e = entry("p", "a: hello\nb: 3\nc: [x]\nd: ''\ne: null\n");
        let mut ctx = RunContext::new();

        assert_eq!(text(&e, "a", &mut ctx).as_deref(), Some("hello"));
        assert_eq!(text(&e, "b", &mut ctx).as_deref(), Some("3"));
        assert_eq!(text(&e, "c", &mut ctx), None);
        assert_eq!(text(&e, "d", &mut ctx), None);
        assert_eq!(text(&e, "e", &mut ctx), None);
        assert_eq!(text(&e, "missing", &mut ctx), None);

        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(
            ctx.diagnostics()[0].to_string(),
            "[p] c: expected text, found a list; field ignored"
        );
    }

    #[test]
    fn test_list() {
        let e = entry(
            "p",
            "one: single\nmany: [a, 2, {x: y}, null]\nbad: 3.5\nmap: {k: v}\nempty: []\n",
        );
        let mut ctx = RunContext::new();

        assert_eq!(list(&e, "one", &mut ctx), Some(vec!["single".to_owned()]));
        assert_eq!(
            list(&e, "many", &mut ctx),
            Some(vec!["a".to_owned(), "2".to_owned()])
        );
        assert_eq!(list(&e, "bad", &mut ctx), Some(vec!["3.5".to_owned()]));
        assert_eq!(list(&e, "map", &mut ctx), None);
        assert_eq!(list(&e, "empty", &mut ctx), None);

        let messages: Vec<String> = ctx.diagnostics().iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "[p] many: item 3 is a mapping, expected text; skipped",
                "[p] map: expected text or a list, found a mapping; field ignored",
            ]
        );
    }

    #[test]
    fn test_items() {
        let e = entry("p", "seq: [a, {b: c}]\nsingle: {b: c}\nnum: 4\n");
        let mut ctx = RunContext::new();

        assert_eq!(items(&e, "seq", &mut ctx).map(|v| v.len()), Some(2));
        assert_eq!(items(&e, "single", &mut ctx).map(|v| v.len()), Some(1));
        assert!(items(&e, "num", &mut ctx).is_none());
        assert_eq!(ctx.warning_count(), 1);
    }
}
