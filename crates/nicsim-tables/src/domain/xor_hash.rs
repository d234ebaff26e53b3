//! XOR-polynomial hash
//!
//! The hashed bytes are read as a bit string whose bits are the
//! coefficients of a polynomial over GF(2). Evaluation XORs together one
//! 64-bit term per set bit:
//!
//! ```text
//! h(x) = XOR over set bits p of x:  terms[p mod T] rotl ((p / T) mod 64)
//! index = h(x) mod m
//! ```
//!
//! Cheap and statistically weaker than HMAC. Loading the terms from a file
//! makes every instance built from that file hash identically, across runs
//! and across filters in the same run.

use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::debug;

use crate::error::ConfigError;

/// Number of polynomial terms each `XorHash` consumes.
pub const XOR_TERMS_PER_HASH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorHash {
    modulus: usize,
    terms: Box<[u64; XOR_TERMS_PER_HASH]>,
}

impl XorHash {
    /// # Panics
    /// Panics if `modulus` is zero.
    pub fn from_terms(modulus: usize, terms: [u64; XOR_TERMS_PER_HASH]) -> Self {
        assert!(modulus > 0, "hash modulus must be positive");
        Self {
            modulus,
            terms: Box::new(terms),
        }
    }

    /// Random polynomial terms drawn from `rng`.
    pub fn random<R: RngCore + ?Sized>(modulus: usize, rng: &mut R) -> Self {
        let mut terms = [0u64; XOR_TERMS_PER_HASH];
        for term in terms.iter_mut() {
            *term = rng.next_u64();
        }
        Self::from_terms(modulus, terms)
    }

    pub(crate) fn evaluate_canonical(&self, input: &[u8]) -> usize {
        let mut acc = 0u64;
        for (i, &byte) in input.iter().enumerate() {
            let mut bits = byte;
            while bits != 0 {
                let p = i * 8 + bits.trailing_zeros() as usize;
                let rotation = ((p / XOR_TERMS_PER_HASH) % 64) as u32;
                acc ^= self.terms[p % XOR_TERMS_PER_HASH].rotate_left(rotation);
                bits &= bits - 1;
            }
        }
        (acc % self.modulus as u64) as usize
    }

    pub fn modulus(&self) -> usize {
        self.modulus
    }

    pub fn terms(&self) -> &[u64] {
        &self.terms[..]
    }
}

/// Polynomial terms loaded from a file.
///
/// Format: whitespace-separated unsigned 64-bit integers, decimal or
/// `0x`-prefixed hex. `#` starts a comment that runs to end of line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolynomialFile {
    path: PathBuf,
    terms: Vec<u64>,
}

impl PolynomialFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::PolynomialUnreadable {
            path: path.clone(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse file contents. `path` only labels errors.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut terms = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let content = line.split('#').next().unwrap_or("");
            for token in content.split_whitespace() {
                let term = parse_term(token).ok_or_else(|| ConfigError::MalformedPolynomial {
                    path: path.clone(),
                    line: line_no + 1,
                    token: token.to_string(),
                })?;
                terms.push(term);
            }
        }

        Ok(Self { path, terms })
    }

    /// Build `k` hashes from consecutive term blocks.
    pub fn hashes(&self, modulus: usize, k: usize) -> Result<Vec<XorHash>, ConfigError> {
        let needed = k
            .checked_mul(XOR_TERMS_PER_HASH)
            .ok_or_else(|| ConfigError::InvalidHashCount {
                input: format!("{} hashes from {}", k, self.path.display()),
            })?;
        if self.terms.len() < needed {
            return Err(ConfigError::PolynomialTooShort {
                path: self.path.clone(),
                needed,
                found: self.terms.len(),
            });
        }
        if self.terms.len() > needed {
            debug!(
                path = %self.path.display(),
                unused = self.terms.len() - needed,
                "ignoring surplus polynomial terms"
            );
        }

        Ok(self.terms[..needed]
            .chunks_exact(XOR_TERMS_PER_HASH)
            .map(|block| {
                let mut terms = [0u64; XOR_TERMS_PER_HASH];
                terms.copy_from_slice(block);
                XorHash::from_terms(modulus, terms)
            })
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn terms(&self) -> &[u64] {
        &self.terms
    }
}

fn parse_term(token: &str) -> Option<u64> {
    match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}
