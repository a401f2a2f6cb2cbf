//! Per-client instance defaults, loaded from a toml file with `LEDMATRIX__*` env overrides.

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::wire::WireEncoding;
use tracing::{debug, warn};

use crate::resolver::Field;

pub const SETTINGS_FILE: &str = "matrix.toml";
pub const ENV_PREFIX: &str = "LEDMATRIX__";

/// Per-client fallback values. `None` defers to the protocol default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceDefaults {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub encoding: Option<WireEncoding>,
    pub segment: Option<i64>,
    pub text: Option<String>,
    pub color: Option<String>,
    pub bgcolor: Option<String>,
    pub font: Option<String>,
    pub size: Option<String>,
    pub align: Option<String>,
    pub effect: Option<String>,
    pub intensity: Option<i64>,
    pub preset: Option<i64>,
    pub brightness: Option<i64>,
    pub orientation: Option<String>,
    pub group: Option<i64>,
    pub segments: Option<Vec<i64>>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub w: Option<i64>,
    pub h: Option<i64>,
}

impl InstanceDefaults {
    pub fn get(&self, field: Field) -> Option<Value> {
        let text = |value: &Option<String>| value.clone().map(Value::from);
        let number = |value: Option<i64>| value.map(Value::from);

        match field {
            Field::Segment => number(self.segment),
            Field::Payload => None,
            Field::Text => text(&self.text),
            Field::Color => text(&self.color),
            Field::BgColor => text(&self.bgcolor),
            Field::Font => text(&self.font),
            Field::Size => text(&self.size),
            Field::Align => text(&self.align),
            Field::Effect => text(&self.effect),
            Field::Intensity => number(self.intensity),
            Field::Layout => number(self.preset),
            Field::Brightness => number(self.brightness),
            Field::Orientation => text(&self.orientation),
            Field::Group => number(self.group),
            Field::Segments => self.segments.clone().map(Value::from),
            Field::X => number(self.x),
            Field::Y => number(self.y),
            Field::W => number(self.w),
            Field::H => number(self.h),
            Field::Ip => text(&self.ip),
            Field::Port => self.port.map(Value::from),
        }
    }

    pub fn encoding(&self) -> WireEncoding {
        self.encoding.unwrap_or_default()
    }
}

/// Loads instance defaults from `path` (or `matrix.toml`), then applies
/// `LEDMATRIX__*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> InstanceDefaults {
    let path = path.unwrap_or_else(|| Path::new(SETTINGS_FILE));
    let mut settings = read_settings_file(path).unwrap_or_default();
    apply_env(&mut settings, |key| std::env::var(format!("{ENV_PREFIX}{key}")).ok());
    settings
}

fn read_settings_file(path: &Path) -> Option<InstanceDefaults> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            debug!(path = %path.display(), %error, "no settings file");
            return None;
        }
    };

    match toml::from_str::<InstanceDefaults>(&raw) {
        Ok(settings) => Some(settings),
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring invalid settings file");
            None
        }
    }
}

pub(crate) fn apply_env(settings: &mut InstanceDefaults, var: impl Fn(&str) -> Option<String>) {
    let parsed = |key: &str| var(key).and_then(|raw| raw.trim().parse::<i64>().ok());

    if let Some(v) = var("IP") {
        settings.ip = Some(v);
    }
    if let Some(v) = var("PORT").and_then(|raw| parse_trimmed::<u16>(&raw)) {
        settings.port = Some(v);
    }
    if let Some(v) = var("ENCODING").and_then(|raw| parse_trimmed::<WireEncoding>(&raw)) {
        settings.encoding = Some(v);
    }
    if let Some(v) = parsed("SEGMENT") {
        settings.segment = Some(v);
    }
    if let Some(v) = var("TEXT") {
        settings.text = Some(v);
    }
    if let Some(v) = var("COLOR") {
        settings.color = Some(v);
    }
    if let Some(v) = var("BGCOLOR") {
        settings.bgcolor = Some(v);
    }
    if let Some(v) = var("FONT") {
        settings.font = Some(v);
    }
    if let Some(v) = var("SIZE") {
        settings.size = Some(v);
    }
    if let Some(v) = var("ALIGN") {
        settings.align = Some(v);
    }
    if let Some(v) = var("EFFECT") {
        settings.effect = Some(v);
    }
    if let Some(v) = parsed("INTENSITY") {
        settings.intensity = Some(v);
    }
    if let Some(v) = parsed("PRESET") {
        settings.preset = Some(v);
    }
    if let Some(v) = parsed("BRIGHTNESS") {
        settings.brightness = Some(v);
    }
    if let Some(v) = var("ORIENTATION") {
        settings.orientation = Some(v);
    }
    if let Some(v) = parsed("GROUP") {
        settings.group = Some(v);
    }
    if let Some(raw) = var("SEGMENTS") {
        let segments: Option<Vec<i64>> = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse_trimmed::<i64>)
            .collect();
        if let Some(v) = segments {
            settings.segments = Some(v);
        }
    }
    if let Some(v) = parsed("X") {
        settings.x = Some(v);
    }
    if let Some(v) = parsed("Y") {
        settings.y = Some(v);
    }
    if let Some(v) = parsed("W") {
        settings.w = Some(v);
    }
    if let Some(v) = parsed("H") {
        settings.h = Some(v);
    }
}

fn parse_trimmed<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

#[cfg(test)]
#[path = "tests/defaults_tests.rs"]
mod tests;
