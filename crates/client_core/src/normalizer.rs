//! Builds the canonical command for a classified input record.

use serde_json::Value;
use shared::{
    domain::{Align, Effect, Geometry, GroupId, PresetId, SegmentId, MAX_TEXT_LENGTH},
    protocol::{CanonicalCommand, CommandKind, TextCommand},
};

use crate::{
    classifier::clears_everything,
    defaults::InstanceDefaults,
    error::DispatchError,
    resolver::{lookup, Field, InputRecord, Resolver},
    transport::Target,
};

pub fn normalize(
    kind: CommandKind,
    record: &InputRecord,
    defaults: &InstanceDefaults,
) -> Result<CanonicalCommand, DispatchError> {
    let resolver = Resolver::new(record, defaults);

    let command = match kind {
        CommandKind::Text => CanonicalCommand::Text(text_command(&resolver, record)?),
        CommandKind::Clear => CanonicalCommand::Clear {
            seg: clear_segment(&resolver, record)?,
        },
        CommandKind::ClearAll => CanonicalCommand::ClearAll,
        CommandKind::Brightness => CanonicalCommand::Brightness {
            value: integer(Field::Brightness, &resolver.value(Field::Brightness))?,
        },
        CommandKind::Layout => CanonicalCommand::Layout {
            preset: PresetId(integer(Field::Layout, &resolver.value(Field::Layout))?),
        },
        CommandKind::Orientation => CanonicalCommand::Orientation {
            value: text(&resolver.value(Field::Orientation)),
        },
        CommandKind::Group => CanonicalCommand::Group {
            value: GroupId(integer(Field::Group, &resolver.value(Field::Group))?),
            segments: segment_list(&resolver.value(Field::Segments))?,
        },
        CommandKind::Config => {
            let resolver = resolver.scoped(record.get("config").and_then(Value::as_object));
            CanonicalCommand::Config {
                seg: SegmentId(integer(Field::Segment, &resolver.value(Field::Segment))?),
                geometry: Geometry {
                    x: integer(Field::X, &resolver.value(Field::X))?,
                    y: integer(Field::Y, &resolver.value(Field::Y))?,
                    w: integer(Field::W, &resolver.value(Field::W))?,
                    h: integer(Field::H, &resolver.value(Field::H))?,
                },
            }
        }
        CommandKind::Raw => CanonicalCommand::Raw(record.clone()),
    };

    Ok(command)
}

/// Destination for one dispatch; `ip`/`port` in the record override the
/// instance target.
pub fn target(
    record: &InputRecord,
    defaults: &InstanceDefaults,
) -> Result<Target, DispatchError> {
    let resolver = Resolver::new(record, defaults);
    let port = integer(Field::Port, &resolver.value(Field::Port))?;
    let port = u16::try_from(port)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| DispatchError::invalid(format!("port {port} is outside 1-65535")))?;

    Ok(Target {
        ip: text(&resolver.value(Field::Ip)),
        port,
    })
}

fn text_command(
    resolver: &Resolver<'_>,
    record: &InputRecord,
) -> Result<TextCommand, DispatchError> {
    let body = match lookup(record, Field::Payload) {
        Some(payload) => text(payload),
        None => text(&resolver.value(Field::Text)),
    };

    let align = text(&resolver.value(Field::Align));
    let effect = text(&resolver.value(Field::Effect));

    Ok(TextCommand {
        seg: SegmentId(integer(Field::Segment, &resolver.value(Field::Segment))?),
        text: truncate(body, MAX_TEXT_LENGTH),
        color: color(&resolver.value(Field::Color)),
        bgcolor: color(&resolver.value(Field::BgColor)),
        font: text(&resolver.value(Field::Font)),
        size: text(&resolver.value(Field::Size)),
        align: Align::parse(&align)
            .ok_or_else(|| DispatchError::invalid(format!("align '{align}' is not L, C or R")))?,
        effect: Effect::parse(&effect)
            .ok_or_else(|| DispatchError::invalid(format!("unknown effect '{effect}'")))?,
        intensity: integer(Field::Intensity, &resolver.value(Field::Intensity))?,
    })
}

fn clear_segment(
    resolver: &Resolver<'_>,
    record: &InputRecord,
) -> Result<SegmentId, DispatchError> {
    let named = record
        .get("clear")
        .filter(|value| !clears_everything(value))
        .and_then(coerce_integer);

    match named {
        Some(seg) => Ok(SegmentId(seg)),
        None => Ok(SegmentId(integer(
            Field::Segment,
            &resolver.value(Field::Segment),
        )?)),
    }
}

fn segment_list(value: &Value) -> Result<Vec<SegmentId>, DispatchError> {
    let invalid =
        || DispatchError::invalid(format!("segments must be a list of integers, got {value}"));

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| coerce_integer(item).map(SegmentId).ok_or_else(invalid))
            .collect(),
        Value::String(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse().map(SegmentId).map_err(|_| invalid()))
            .collect(),
        single => coerce_integer(single)
            .map(|seg| vec![SegmentId(seg)])
            .ok_or_else(invalid),
    }
}

/// Removes one leading `#`; case and digit count pass through untouched.
pub fn color(value: &Value) -> String {
    let raw = text(value);
    match raw.strip_prefix('#') {
        Some(stripped) => stripped.to_string(),
        None => raw,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn integer(field: Field, value: &Value) -> Result<i64, DispatchError> {
    coerce_integer(value).ok_or_else(|| {
        DispatchError::invalid(format!("{} must be an integer, got {value}", field.name()))
    })
}

/// Integers, finite floats (truncated toward zero) and numeric strings.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(raw) => {
            let raw = raw.trim();
            raw.parse::<i64>().ok().or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn truncate(mut text: String, max_chars: usize) -> String {
    if let Some((index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(index);
    }
    text
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
