use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a customer record after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    /// Interprets a raw CSV cell: empty is missing, numeric text becomes a number.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }

        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Discrete key for mapping lookups. Fractional numbers and missing values have none.
    pub fn mapping_key(&self) -> Option<MappingKey> {
        match self {
            Self::Number(number) if number.fract() == 0.0 => Some(MappingKey::Int(*number as i64)),
            Self::Number(_) | Self::Missing => None,
            Self::Text(text) => Some(MappingKey::Text(text.clone())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Missing => Ok(()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Discrete value used as a key in direct mappings and overrides.
///
/// Serialized as a plain JSON string; integer-looking strings become `Int`
/// so that rule files can key mappings by encoded category codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappingKey {
    Int(i64),
    Text(String),
}

impl MappingKey {
    fn from_raw(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(value) => Self::Int(value),
            Err(_) => Self::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for MappingKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for MappingKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl Serialize for MappingKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MappingKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Int(i64),
            Text(String),
        }

        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Int(value) => Self::Int(value),
            RawKey::Text(value) => Self::from_raw(&value),
        })
    }
}
