use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    Align, Effect, Geometry, GroupId, PresetId, SegmentId, DEFAULT_BGCOLOR, DEFAULT_COLOR,
    DEFAULT_FONT, DEFAULT_INTENSITY, DEFAULT_ORIENTATION, DEFAULT_PRESET, DEFAULT_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Text,
    Clear,
    ClearAll,
    Brightness,
    Layout,
    Orientation,
    Group,
    Config,
    Raw,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Clear => "clear",
            Self::ClearAll => "clear_all",
            Self::Brightness => "brightness",
            Self::Layout => "layout",
            Self::Orientation => "orientation",
            Self::Group => "group",
            Self::Config => "config",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCommand {
    #[serde(default)]
    pub seg: SegmentId,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_bgcolor")]
    pub bgcolor: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default = "default_intensity")]
    pub intensity: i64,
}

/// A fully resolved command, ready for wire encoding.
///
/// The JSON form is tagged by `cmd`. `Raw` carries a caller supplied record
/// verbatim; it serializes as that record and is the fallback when a decoded
/// datagram names a command this crate does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum CanonicalCommand {
    Text(TextCommand),
    Clear {
        #[serde(default)]
        seg: SegmentId,
    },
    ClearAll,
    Brightness {
        value: i64,
    },
    Layout {
        #[serde(default = "default_preset")]
        preset: PresetId,
    },
    Orientation {
        #[serde(default = "default_orientation")]
        value: String,
    },
    Group {
        #[serde(default)]
        value: GroupId,
        #[serde(default)]
        segments: Vec<SegmentId>,
    },
    Config {
        #[serde(default)]
        seg: SegmentId,
        #[serde(flatten)]
        geometry: Geometry,
    },
    #[serde(untagged)]
    Raw(Map<String, Value>),
}

impl CanonicalCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Text(_) => CommandKind::Text,
            Self::Clear { .. } => CommandKind::Clear,
            Self::ClearAll => CommandKind::ClearAll,
            Self::Brightness { .. } => CommandKind::Brightness,
            Self::Layout { .. } => CommandKind::Layout,
            Self::Orientation { .. } => CommandKind::Orientation,
            Self::Group { .. } => CommandKind::Group,
            Self::Config { .. } => CommandKind::Config,
            Self::Raw(_) => CommandKind::Raw,
        }
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_bgcolor() -> String {
    DEFAULT_BGCOLOR.to_string()
}

fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

fn default_intensity() -> i64 {
    DEFAULT_INTENSITY
}

fn default_preset() -> PresetId {
    DEFAULT_PRESET
}

fn default_orientation() -> String {
    DEFAULT_ORIENTATION.to_string()
}
