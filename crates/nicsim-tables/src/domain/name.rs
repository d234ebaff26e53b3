//! Hierarchical names and prefix decomposition
//!
//! Names are sequences of opaque byte components written as `/a/b/c`.
//! Table adapters hash the canonical URI form, so two spellings of the
//! same name (`ndn:/a/b`, `/a//b/`) land on the same counters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A name split into its components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    components: Vec<Vec<u8>>,
}

impl Name {
    /// The root name `/`.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_components<I, C>(components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a URI such as `/a/b/c` or `ndn:/a/b/c`.
    ///
    /// Empty components are skipped and `%XX` escapes are decoded. A stray
    /// `%` that is not followed by two hex digits is kept literally.
    pub fn parse(uri: &str) -> Self {
        let trimmed = uri.trim();
        let path = trimmed.strip_prefix("ndn:").unwrap_or(trimmed);
        Self {
            components: path
                .split('/')
                .filter(|part| !part.is_empty())
                .map(percent_decode)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[Vec<u8>] {
        &self.components
    }

    /// The first `len` components.
    pub fn prefix(&self, len: usize) -> Name {
        Name {
            components: self.components[..len.min(self.components.len())].to_vec(),
        }
    }

    /// Whether `self` equals `other` or is one of its prefixes.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.len() <= other.len() && other.components[..self.len()] == self.components[..]
    }

    /// Canonical URI form, the byte string fed into the hash functions.
    pub fn to_uri(&self) -> String {
        self.to_string()
    }

    pub fn wire_bytes(&self) -> Vec<u8> {
        self.to_uri().into_bytes()
    }
}

/// All structural prefixes of `name`, longest first.
///
/// `/a/b/c` yields `/a/b/c`, `/a/b`, `/a`. The root name has no prefixes.
pub fn prefixes_of(name: &Name) -> Vec<Name> {
    (1..=name.len()).rev().map(|len| name.prefix(len)).collect()
}

impl FromStr for Name {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Name::parse(s))
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::parse(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            f.write_str("/")?;
            for &byte in component {
                if is_unreserved(byte) {
                    write!(f, "{}", byte as char)?;
                } else {
                    write!(f, "%{:02X}", byte)?;
                }
            }
        }
        Ok(())
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b'=' | b'+' | b',')
}

fn percent_decode(part: &str) -> Vec<u8> {
    let bytes = part.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}
