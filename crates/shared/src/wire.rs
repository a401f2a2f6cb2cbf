//! Datagram encodings understood by the matrix controller.
//!
//! The JSON encoding carries every command. The delimited encoding is the
//! older line protocol and only covers text, clear, clear-all and brightness.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        Align, Effect, SegmentId, DEFAULT_BGCOLOR, DEFAULT_COLOR, DEFAULT_FONT, DEFAULT_INTENSITY,
        DEFAULT_SIZE,
    },
    error::WireError,
    protocol::{CanonicalCommand, TextCommand},
};

const DELIMITER: char = '|';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireEncoding {
    #[default]
    Json,
    Delimited,
}

impl WireEncoding {
    pub fn encode(self, command: &CanonicalCommand) -> Result<Vec<u8>, WireError> {
        match self {
            Self::Json => encode_json(command),
            Self::Delimited => encode_delimited(command),
        }
    }
}

impl std::str::FromStr for WireEncoding {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "delimited" | "text" | "legacy" => Ok(Self::Delimited),
            other => Err(format!("unknown wire encoding '{other}'")),
        }
    }
}

pub fn encode_json(command: &CanonicalCommand) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(command)?)
}

pub fn encode_delimited(command: &CanonicalCommand) -> Result<Vec<u8>, WireError> {
    let line = match command {
        CanonicalCommand::Text(text) => {
            let fields = [
                ("text", text.text.as_str()),
                ("color", text.color.as_str()),
                ("font", text.font.as_str()),
                ("size", text.size.as_str()),
            ];
            for (field, value) in fields {
                if value.contains([DELIMITER, '\n', '\r']) {
                    return Err(WireError::UnrepresentableField { field });
                }
            }
            format!(
                "TEXT|{}|{}|{}|{}|{}|{}|{}",
                text.seg,
                text.text,
                text.color,
                text.font,
                text.size,
                text.align.as_str(),
                text.effect.as_str()
            )
        }
        CanonicalCommand::Clear { seg } => format!("CLEAR|{seg}"),
        CanonicalCommand::ClearAll => "CLEAR_ALL".to_string(),
        CanonicalCommand::Brightness { value } => format!("BRIGHTNESS|{value}"),
        other => {
            return Err(WireError::UnsupportedKind { kind: other.kind() });
        }
    };

    let mut bytes = line.into_bytes();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes a datagram the way the controller does, guessing the encoding from
/// its first non-blank byte.
pub fn decode(datagram: &[u8]) -> Result<CanonicalCommand, WireError> {
    let raw = std::str::from_utf8(datagram)?.trim();
    if raw.starts_with('{') {
        decode_json(raw.as_bytes())
    } else {
        decode_delimited(raw.as_bytes())
    }
}

pub fn decode_json(datagram: &[u8]) -> Result<CanonicalCommand, WireError> {
    let raw = std::str::from_utf8(datagram)?.trim();
    Ok(serde_json::from_str(raw)?)
}

pub fn decode_delimited(datagram: &[u8]) -> Result<CanonicalCommand, WireError> {
    let raw = std::str::from_utf8(datagram)?.trim();
    let mut parts = raw.split(DELIMITER);
    let verb = parts.next().unwrap_or_default();
    let fields: Vec<&str> = parts.collect();

    match (verb, fields.as_slice()) {
        ("TEXT", [seg, text, rest @ ..]) => {
            let field = |index: usize, fallback: &str| {
                rest.get(index)
                    .filter(|value| !value.is_empty())
                    .map_or_else(|| fallback.to_string(), |value| value.to_string())
            };
            let align = rest.get(3).map_or(Some(Align::default()), |raw| Align::parse(raw));
            let effect = rest.get(4).map_or(Some(Effect::default()), |raw| Effect::parse(raw));

            Ok(CanonicalCommand::Text(TextCommand {
                seg: parse_segment(seg)?,
                text: text.to_string(),
                color: field(0, DEFAULT_COLOR),
                bgcolor: DEFAULT_BGCOLOR.to_string(),
                font: field(1, DEFAULT_FONT),
                size: field(2, DEFAULT_SIZE),
                align: align.ok_or_else(|| malformed("align", raw))?,
                effect: effect.ok_or_else(|| malformed("effect", raw))?,
                intensity: DEFAULT_INTENSITY,
            }))
        }
        ("CLEAR", [seg]) => Ok(CanonicalCommand::Clear {
            seg: parse_segment(seg)?,
        }),
        ("CLEAR_ALL", []) => Ok(CanonicalCommand::ClearAll),
        ("BRIGHTNESS", [value]) => Ok(CanonicalCommand::Brightness {
            value: value
                .trim()
                .parse()
                .map_err(|_| malformed("brightness", raw))?,
        }),
        _ => Err(WireError::Delimited(format!("unknown command line '{raw}'"))),
    }
}

fn parse_segment(raw: &str) -> Result<SegmentId, WireError> {
    raw.trim()
        .parse()
        .map(SegmentId)
        .map_err(|_| malformed("segment", raw))
}

fn malformed(field: &str, raw: &str) -> WireError {
    WireError::Delimited(format!("invalid {field} in '{raw}'"))
}

#[cfg(test)]
#[path = "tests/wire_tests.rs"]
mod tests;
