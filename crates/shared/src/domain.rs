use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SegmentId);
id_newtype!(GroupId);
id_newtype!(PresetId);

pub const DEFAULT_PORT: u16 = 21324;
pub const DEFAULT_IP: &str = "192.168.1.100";

pub const PANEL_WIDTH: i64 = 64;
pub const PANEL_HEIGHT: i64 = 32;

/// Longest text a segment accepts; longer text is cut on the client side.
pub const MAX_TEXT_LENGTH: usize = 128;

pub const DEFAULT_COLOR: &str = "FFFFFF";
pub const DEFAULT_BGCOLOR: &str = "000000";
pub const DEFAULT_FONT: &str = "arial";
pub const DEFAULT_SIZE: &str = "auto";
pub const DEFAULT_INTENSITY: i64 = 255;
pub const DEFAULT_BRIGHTNESS: i64 = 128;
pub const DEFAULT_PRESET: PresetId = PresetId(1);
pub const DEFAULT_ORIENTATION: &str = "landscape";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Align {
    #[serde(rename = "L")]
    Left,
    #[default]
    #[serde(rename = "C")]
    Center,
    #[serde(rename = "R")]
    Right,
}

impl Align {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Some(Self::Left),
            "c" | "center" | "centre" => Some(Self::Center),
            "r" | "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Center => "C",
            Self::Right => "R",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    #[default]
    None,
    Scroll,
    Blink,
    Fade,
    Rainbow,
}

impl Effect {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "scroll" => Some(Self::Scroll),
            "blink" => Some(Self::Blink),
            "fade" => Some(Self::Fade),
            "rainbow" => Some(Self::Rainbow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Scroll => "scroll",
            Self::Blink => "blink",
            Self::Fade => "fade",
            Self::Rainbow => "rainbow",
        }
    }
}

/// Segment rectangle in panel pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default = "full_width")]
    pub w: i64,
    #[serde(default = "full_height")]
    pub h: i64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            w: PANEL_WIDTH,
            h: PANEL_HEIGHT,
        }
    }
}

fn full_width() -> i64 {
    PANEL_WIDTH
}

fn full_height() -> i64 {
    PANEL_HEIGHT
}
