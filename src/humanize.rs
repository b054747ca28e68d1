//! Human-readable byte quantities for configuration values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Suffix table shared by parsing and display. Units are 1024-based;
/// the IEC spellings are accepted on input only.
const SUFFIXES: &[(&str, u64)] = &[
    ("B", 1),
    ("KB", 1 << 10),
    ("MB", 1 << 20),
    ("GB", 1 << 30),
    ("TB", 1 << 40),
];

#[derive(Debug, Error)]
pub enum ParseSizeError {
    #[error("empty size value")]
    Empty,

    #[error("invalid size number in '{0}'")]
    BadNumber(String),

    #[error("unknown size unit '{0}'")]
    UnknownUnit(String),
}

/// Byte count that deserializes from either an integer or a string
/// like `"50MB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for ByteSize {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseSizeError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (digits, suffix) = s.split_at(split);

        let value: u64 = digits
            .parse()
            .map_err(|_| ParseSizeError::BadNumber(s.to_string()))?;

        let suffix = suffix.trim();
        if suffix.is_empty() {
            return Ok(ByteSize(value));
        }

        let unit = normalize_unit(suffix)
            .ok_or_else(|| ParseSizeError::UnknownUnit(suffix.to_string()))?;
        let multiplier = SUFFIXES
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, multiplier)| *multiplier)
            .unwrap_or(1);

        Ok(ByteSize(value * multiplier))
    }
}

/// Collapses short ("M") and IEC ("MiB") spellings onto the table units.
fn normalize_unit(raw: &str) -> Option<&'static str> {
    match raw.to_ascii_uppercase().as_str() {
        "B" => Some("B"),
        "K" | "KB" | "KIB" => Some("KB"),
        "M" | "MB" | "MIB" => Some("MB"),
        "G" | "GB" | "GIB" => Some("GB"),
        "T" | "TB" | "TIB" => Some("TB"),
        _ => None,
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Largest unit that divides evenly, so the rendering is lossless
        for (unit, multiplier) in SUFFIXES.iter().rev() {
            if self.0 >= *multiplier && self.0 % multiplier == 0 {
                return write!(f, "{}{}", self.0 / multiplier, unit);
            }
        }
        write!(f, "{}B", self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SizeVisitor;

        impl serde::de::Visitor<'_> for SizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a byte count as integer or string such as \"50MB\"")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ByteSize(v))
            }

            // TOML and environment sources hand integers over as i64
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| serde::de::Error::custom("byte count cannot be negative"))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(SizeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_numbers() {
        assert_eq!("0".parse::<ByteSize>().unwrap().as_u64(), 0);
        assert_eq!("4096".parse::<ByteSize>().unwrap().as_u64(), 4096);
    }

    #[test]
    fn parses_unit_suffixes() {
        assert_eq!("1KB".parse::<ByteSize>().unwrap().as_u64(), 1024);
        assert_eq!("50MB".parse::<ByteSize>().unwrap().as_u64(), 50 * 1024 * 1024);
        assert_eq!("2GB".parse::<ByteSize>().unwrap().as_u64(), 2 << 30);
        assert_eq!("1TB".parse::<ByteSize>().unwrap().as_u64(), 1 << 40);
    }

    #[test]
    fn parses_short_and_iec_spellings() {
        assert_eq!("5M".parse::<ByteSize>().unwrap().as_u64(), 5 << 20);
        assert_eq!("5MiB".parse::<ByteSize>().unwrap().as_u64(), 5 << 20);
        assert_eq!("1 KB".parse::<ByteSize>().unwrap().as_u64(), 1024);
        assert_eq!("1kb".parse::<ByteSize>().unwrap().as_u64(), 1024);
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<ByteSize>().is_err());
        assert!("MB".parse::<ByteSize>().is_err());
        assert!("12XB".parse::<ByteSize>().is_err());
        assert!("-5MB".parse::<ByteSize>().is_err());
    }

    #[test]
    fn displays_largest_even_unit() {
        assert_eq!(ByteSize(50 * 1024 * 1024).to_string(), "50MB");
        assert_eq!(ByteSize(1024).to_string(), "1KB");
        assert_eq!(ByteSize(1536).to_string(), "1536B");
        assert_eq!(ByteSize(0).to_string(), "0B");
    }

    #[test]
    fn deserializes_from_string_and_integer() {
        #[derive(Deserialize)]
        struct Wrapper {
            size: ByteSize,
        }

        let from_string: Wrapper = serde_json::from_str(r#"{"size": "50MB"}"#).unwrap();
        assert_eq!(from_string.size.as_u64(), 50 * 1024 * 1024);

        let from_int: Wrapper = serde_json::from_str(r#"{"size": 2048}"#).unwrap();
        assert_eq!(from_int.size.as_u64(), 2048);

        let from_toml: Wrapper = toml::from_str("size = 1048576").unwrap();
        assert_eq!(from_toml.size.as_u64(), 1 << 20);
    }
}
