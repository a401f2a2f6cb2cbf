//! Three-tier value resolution: explicit input, then the instance default,
//! then the protocol default.

use serde_json::{json, Map, Value};
use shared::domain::{
    DEFAULT_BGCOLOR, DEFAULT_BRIGHTNESS, DEFAULT_COLOR, DEFAULT_FONT, DEFAULT_INTENSITY,
    DEFAULT_IP, DEFAULT_ORIENTATION, DEFAULT_PORT, DEFAULT_PRESET, DEFAULT_SIZE, PANEL_HEIGHT,
    PANEL_WIDTH,
};

use crate::defaults::InstanceDefaults;

/// Loosely shaped caller input.
pub type InputRecord = Map<String, Value>;

/// Which values count as "not supplied" for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// Only a missing key or `null`; `0`, `false` and `""` are real values.
    NullOnly,
    /// A missing key, `null`, or the empty string.
    NullOrEmpty,
}

impl Absence {
    pub fn is_present(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (Self::NullOrEmpty, Value::String(s)) => !s.is_empty(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Segment,
    Payload,
    Text,
    Color,
    BgColor,
    Font,
    Size,
    Align,
    Effect,
    Intensity,
    Layout,
    Brightness,
    Orientation,
    Group,
    Segments,
    X,
    Y,
    W,
    H,
    Ip,
    Port,
}

impl Field {
    /// Input keys for this field, primary name first.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Self::Segment => &["segment", "seg"],
            Self::Payload => &["payload"],
            Self::Text => &["text"],
            Self::Color => &["color"],
            Self::BgColor => &["bgcolor"],
            Self::Font => &["font"],
            Self::Size => &["size"],
            Self::Align => &["align"],
            Self::Effect => &["effect"],
            Self::Intensity => &["intensity"],
            Self::Layout => &["layout", "preset"],
            Self::Brightness => &["brightness"],
            Self::Orientation => &["orientation"],
            Self::Group => &["group"],
            Self::Segments => &["segments"],
            Self::X => &["x"],
            Self::Y => &["y"],
            Self::W => &["w"],
            Self::H => &["h"],
            Self::Ip => &["ip"],
            Self::Port => &["port"],
        }
    }

    pub fn name(self) -> &'static str {
        self.keys()[0]
    }

    pub fn absence(self) -> Absence {
        match self {
            Self::Segment
            | Self::Payload
            | Self::Intensity
            | Self::Layout
            | Self::Brightness
            | Self::Group
            | Self::Segments
            | Self::X
            | Self::Y
            | Self::W
            | Self::H
            | Self::Port => Absence::NullOnly,
            Self::Text
            | Self::Color
            | Self::BgColor
            | Self::Font
            | Self::Size
            | Self::Align
            | Self::Effect
            | Self::Orientation
            | Self::Ip => Absence::NullOrEmpty,
        }
    }

    pub fn protocol_default(self) -> Value {
        match self {
            Self::Segment | Self::Group | Self::X | Self::Y => json!(0),
            Self::Payload | Self::Text => json!(""),
            Self::Color => json!(DEFAULT_COLOR),
            Self::BgColor => json!(DEFAULT_BGCOLOR),
            Self::Font => json!(DEFAULT_FONT),
            Self::Size => json!(DEFAULT_SIZE),
            Self::Align => json!("C"),
            Self::Effect => json!("none"),
            Self::Intensity => json!(DEFAULT_INTENSITY),
            Self::Layout => json!(DEFAULT_PRESET.0),
            Self::Brightness => json!(DEFAULT_BRIGHTNESS),
            Self::Orientation => json!(DEFAULT_ORIENTATION),
            Self::Segments => json!([]),
            Self::W => json!(PANEL_WIDTH),
            Self::H => json!(PANEL_HEIGHT),
            Self::Ip => json!(DEFAULT_IP),
            Self::Port => json!(DEFAULT_PORT),
        }
    }
}

/// Picks the first supplied value among `explicit` and `instance`, falling
/// back to `protocol`.
pub fn resolve(
    absence: Absence,
    explicit: Option<Value>,
    instance: Option<Value>,
    protocol: Value,
) -> Value {
    explicit
        .filter(|value| absence.is_present(value))
        .or_else(|| instance.filter(|value| absence.is_present(value)))
        .unwrap_or(protocol)
}

/// Looks `field` up in `record`, trying the primary key before its aliases.
pub fn lookup<'a>(record: &'a InputRecord, field: Field) -> Option<&'a Value> {
    field
        .keys()
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| field.absence().is_present(value))
}

/// Resolves fields for one input record against one set of instance defaults.
pub struct Resolver<'a> {
    record: &'a InputRecord,
    scope: Option<&'a InputRecord>,
    defaults: &'a InstanceDefaults,
}

impl<'a> Resolver<'a> {
    pub fn new(record: &'a InputRecord, defaults: &'a InstanceDefaults) -> Self {
        Self {
            record,
            scope: None,
            defaults,
        }
    }

    /// Consults `scope` before the top-level record.
    pub fn scoped(mut self, scope: Option<&'a InputRecord>) -> Self {
        self.scope = scope;
        self
    }

    pub fn explicit(&self, field: Field) -> Option<&'a Value> {
        self.scope
            .and_then(|scope| lookup(scope, field))
            .or_else(|| lookup(self.record, field))
    }

    pub fn value(&self, field: Field) -> Value {
        self.value_from(self.explicit(field).cloned(), field)
    }

    /// Resolves with an explicit value picked by the caller, e.g. when two
    /// input keys feed one field.
    pub fn value_from(&self, explicit: Option<Value>, field: Field) -> Value {
        resolve(
            field.absence(),
            explicit,
            self.defaults.get(field),
            field.protocol_default(),
        )
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
