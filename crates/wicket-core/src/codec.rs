//! Typed call arguments and return values, and their wire encoding.
//!
//! On the wire every value is a JSON object `{"type": ..., "value": ...}`.
//! Raw payloads travel base64-encoded. Accessors never fail: an index past
//! the end of the list or an unconvertible value yields a zero/empty default.

use std::borrow::Cow;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// One typed argument or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Argument {
    Int(i64),
    Text(String),
    Bool(bool),
    Raw(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl Argument {
    /// Integer view. Text is parsed as an integer, then as a float
    /// (truncated); anything unparsable is `0`.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(n) => *n,
            Self::Bool(b) => i64::from(*b),
            Self::Text(s) => parse_int(s),
            Self::Raw(bytes) => std::str::from_utf8(bytes).map(parse_int).unwrap_or(0),
        }
    }

    /// Text view. Integers render in decimal, booleans as `true`/`false`,
    /// raw bytes are read as (lossy) UTF-8.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Raw(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    /// Boolean view. `true` (any case) and non-zero integers are true.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => parse_bool(s),
            Self::Raw(bytes) => std::str::from_utf8(bytes).map(parse_bool).unwrap_or(false),
        }
    }

    /// Length in bytes of the value's canonical encoding.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Raw(bytes) => bytes.len(),
            other => other.as_text().len(),
        }
    }

    pub fn empty() -> Self {
        Self::Text(String::new())
    }
}

impl From<i64> for Argument {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

fn parse_int(text: &str) -> i64 {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return n;
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => f as i64,
        _ => 0,
    }
}

fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("true") || parse_int(text) != 0
}

/// Ordered, immutable argument list of one event. Cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Arc<[Argument]>);

impl Arguments {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.0.get(index)
    }

    pub fn int_at(&self, index: usize) -> i64 {
        self.get(index).map(Argument::as_int).unwrap_or(0)
    }

    pub fn string_at(&self, index: usize) -> String {
        self.get(index)
            .map(|arg| arg.as_text().into_owned())
            .unwrap_or_default()
    }

    pub fn bool_at(&self, index: usize) -> bool {
        self.get(index).map(Argument::as_bool).unwrap_or(false)
    }

    pub fn size_at(&self, index: usize) -> usize {
        self.get(index).map(Argument::byte_len).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.0.iter()
    }
}

impl From<Vec<Argument>> for Arguments {
    fn from(args: Vec<Argument>) -> Self {
        Self(args.into())
    }
}

/// Base64-encode text so it can be embedded safely in script source.
pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode base64 text produced by [`encode`] or the browser. `None` if the
/// input is not valid base64 or does not decode to UTF-8.
pub fn decode(text: &str) -> Option<String> {
    let bytes = STANDARD.decode(text.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Serde adapter for byte payloads carried as base64 strings.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
