// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Firmware version parsing and ordering.
//!
//! Versions are `(major, minor)` pairs extracted from filename tokens like
//! `firmware_v1.2.bin`. Ordering is lexicographic on the pair; the wire form
//! is the canonical `"major.minor"` string.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    /// `0.0` — "nothing installed / nothing available".
    pub const ZERO: Version = Version { major: 0, minor: 0 };

    pub fn new(major: u16, minor: u16) -> Self {
        Version { major, minor }
    }

    /// Parse a `"major.minor"` string. Missing or non-numeric components
    /// default to 0, so any input yields a version.
    pub fn parse(s: &str) -> Version {
        let mut parts = s.trim().split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Version { major, minor }
    }

    /// Extract the version from a filename carrying a `v<digits>[.<digits>]`
    /// token. Absent or unparsable tokens yield `Version::ZERO`.
    pub fn from_filename(name: &str) -> Version {
        match version_token(name) {
            Some(token) => Version::parse(token),
            None => Version::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Version::ZERO
    }

    /// The next minor release after this one.
    pub fn next_minor(&self) -> Version {
        Version { major: self.major, minor: self.minor.saturating_add(1) }
    }
}

/// Whether `name` carries a `v<digits>`-style token at all. Distinguishes a
/// real `v0.0` from "no version here".
pub fn has_version_token(name: &str) -> bool {
    version_token(name).is_some()
}

/// First `v`-prefixed run of digits and dots in `name`, if any.
fn version_token(name: &str) -> Option<&str> {
    for (i, c) in name.char_indices() {
        if c != 'v' {
            continue;
        }
        let rest = &name[i + 1..];
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        if len > 0 {
            return Some(&rest[..len]);
        }
    }
    None
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// Wire form is the display string, not a struct.
impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;
        impl<'de> de::Visitor<'de> for VersionVisitor {
            type Value = Version;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a version string like \"1.2\"")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Version, E> {
                Ok(Version::parse(v))
            }
        }
        deserializer.deserialize_str(VersionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        assert_eq!(Version::parse("1.2"), Version::new(1, 2));
        assert_eq!(Version::parse("10.0"), Version::new(10, 0));
        assert_eq!(Version::parse("3"), Version::new(3, 0));
    }

    #[test]
    fn test_parse_defaults_to_zero() {
        assert_eq!(Version::parse(""), Version::ZERO);
        assert_eq!(Version::parse("x.y"), Version::ZERO);
        assert_eq!(Version::parse("1.x"), Version::new(1, 0));
        assert_eq!(Version::parse(".5"), Version::new(0, 5));
    }

    #[test]
    fn test_from_filename() {
        assert_eq!(Version::from_filename("firmware_v1.2.bin"), Version::new(1, 2));
        assert_eq!(
            Version::from_filename("malicious_firmware_v2.0.bin"),
            Version::new(2, 0)
        );
        assert_eq!(Version::from_filename("readme.txt"), Version::ZERO);
        assert_eq!(Version::from_filename("firmware.bin"), Version::ZERO);
    }

    #[test]
    fn test_parse_idempotent_on_canonical_form() {
        for v in [Version::ZERO, Version::new(1, 2), Version::new(42, 7)] {
            assert_eq!(Version::parse(&v.to_string()), v);
        }
    }

    #[test]
    fn test_total_order() {
        assert!(Version::new(1, 2) > Version::new(1, 1));
        assert!(Version::new(2, 0) > Version::new(1, 9));
        assert!(Version::new(1, 2) == Version::new(1, 2));
        assert!(Version::new(0, 9) < Version::new(1, 0));
    }

    #[test]
    fn test_wire_roundtrip() {
        let v = Version::new(1, 2);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"1.2\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
