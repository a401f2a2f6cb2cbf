//! Picks exactly one command kind for an input record.
//!
//! When a record carries fields for several kinds the first row of
//! [`PRIORITY`] that matches wins, independent of key order in the record.
//! A `command` field naming a kind is consulted right after the `cmd`
//! override; an unknown name falls through to the field rows.

use serde_json::Value;
use shared::protocol::CommandKind;

use crate::resolver::InputRecord;

/// Trigger keys, highest priority first.
const PRIORITY: &[(CommandKind, &[&str])] = &[
    (CommandKind::Raw, &["cmd"]),
    (CommandKind::Text, &["text", "payload"]),
    (CommandKind::Layout, &["layout", "preset"]),
    (CommandKind::Brightness, &["brightness"]),
    (CommandKind::Clear, &["clear"]),
    (CommandKind::Orientation, &["orientation"]),
    (CommandKind::Group, &["group"]),
    (CommandKind::Config, &["config"]),
];

/// Field carrying a kind by name, e.g. `{"command": "clear_all"}`.
const NAMED_KIND: &str = "command";

pub fn classify(record: &InputRecord) -> Option<CommandKind> {
    let (raw, fields) = PRIORITY.split_first()?;
    if triggered(raw, record) {
        return Some(CommandKind::Raw);
    }
    if let Some(kind) = record.get(NAMED_KIND).and_then(named_kind) {
        return Some(refine(kind, record));
    }
    fields
        .iter()
        .find(|row| triggered(row, record))
        .map(|(kind, _)| refine(*kind, record))
}

fn triggered((kind, keys): &(CommandKind, &[&str]), record: &InputRecord) -> bool {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .any(|value| triggers(*kind, value))
}

/// Raw is never selectable by name; it needs a `cmd` field.
fn named_kind(value: &Value) -> Option<CommandKind> {
    let kind = match value.as_str()?.trim().to_ascii_lowercase().as_str() {
        "text" => CommandKind::Text,
        "clear" => CommandKind::Clear,
        "clear_all" => CommandKind::ClearAll,
        "brightness" => CommandKind::Brightness,
        "layout" => CommandKind::Layout,
        "orientation" => CommandKind::Orientation,
        "group" => CommandKind::Group,
        "config" => CommandKind::Config,
        _ => return None,
    };
    Some(kind)
}

fn triggers(kind: CommandKind, value: &Value) -> bool {
    match kind {
        CommandKind::Raw => value.as_str().is_some_and(|cmd| !cmd.trim().is_empty()),
        _ => !value.is_null(),
    }
}

fn refine(kind: CommandKind, record: &InputRecord) -> CommandKind {
    match kind {
        CommandKind::Clear if record.get("clear").is_some_and(clears_everything) => {
            CommandKind::ClearAll
        }
        other => other,
    }
}

/// `"all"` or `true` clears every segment.
pub(crate) fn clears_everything(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(target) => target.trim().eq_ignore_ascii_case("all"),
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
