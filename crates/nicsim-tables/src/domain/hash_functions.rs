//! Hash functions for the counting Bloom filter
//!
//! Every function maps a `(name, tag)` pair to a bucket in `[0, m)`. The tag
//! is folded into the hashed bytes, so tables sharing a bank get unrelated
//! bucket assignments for the same name.
//!
//! Two closed variants exist:
//! - `HmacHash`: keyed HMAC over a SHA-2 or SHA-3 digest, reduced mod m.
//! - `XorHash`: GF(2) polynomial evaluation with random or file-supplied
//!   terms (see `xor_hash`).

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use super::xor_hash::{PolynomialFile, XorHash};
use crate::error::ConfigError;

/// Canonical hash input: `u32_be(tag.len()) || tag || name`.
///
/// The length prefix keeps `("A", "BC")` and `("AB", "C")` apart.
pub fn canonical_input(name: &[u8], tag: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(4 + tag.len() + name.len());
    input.extend_from_slice(&(tag.len() as u32).to_be_bytes());
    input.extend_from_slice(tag.as_bytes());
    input.extend_from_slice(name);
    input
}

/// Read a digest as a big-endian integer and reduce it mod `modulus`.
fn reduce_digest(digest: &[u8], modulus: usize) -> usize {
    let m = modulus as u128;
    let reduced = digest
        .iter()
        .fold(0u128, |acc, &byte| ((acc << 8) | byte as u128) % m);
    reduced as usize
}

/// MAC primitive behind an `HmacHash`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl HmacAlgorithm {
    pub const ALL: [HmacAlgorithm; 8] = [
        HmacAlgorithm::Sha224,
        HmacAlgorithm::Sha256,
        HmacAlgorithm::Sha384,
        HmacAlgorithm::Sha512,
        HmacAlgorithm::Sha3_224,
        HmacAlgorithm::Sha3_256,
        HmacAlgorithm::Sha3_384,
        HmacAlgorithm::Sha3_512,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha3_224 => "sha3-224",
            Self::Sha3_256 => "sha3-256",
            Self::Sha3_384 => "sha3-384",
            Self::Sha3_512 => "sha3-512",
        }
    }

    fn mac(&self, key: &[u8], input: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha224 => mac_with::<Hmac<Sha224>>(key, input),
            Self::Sha256 => mac_with::<Hmac<Sha256>>(key, input),
            Self::Sha384 => mac_with::<Hmac<Sha384>>(key, input),
            Self::Sha512 => mac_with::<Hmac<Sha512>>(key, input),
            Self::Sha3_224 => mac_with::<Hmac<Sha3_224>>(key, input),
            Self::Sha3_256 => mac_with::<Hmac<Sha3_256>>(key, input),
            Self::Sha3_384 => mac_with::<Hmac<Sha3_384>>(key, input),
            Self::Sha3_512 => mac_with::<Hmac<Sha3_512>>(key, input),
        }
    }
}

fn mac_with<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(input);
    mac.finalize().into_bytes().to_vec()
}

impl FromStr for HmacAlgorithm {
    type Err = String;

    /// Case-insensitive; `sha3_256` and `sha3-256` are the same algorithm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        HmacAlgorithm::ALL
            .into_iter()
            .find(|algo| algo.name() == normalized)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyed HMAC hash reduced mod m.
///
/// The key is fixed at construction. Two instances agree only when their
/// keys are equal, so independent runs differ unless the key is pinned.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacHash {
    modulus: usize,
    algorithm: HmacAlgorithm,
    key: Vec<u8>,
}

impl HmacHash {
    /// Length of freshly generated keys.
    pub const KEY_LEN: usize = 32;

    /// Create with a fresh random key.
    ///
    /// # Panics
    /// Panics if `modulus` is zero.
    pub fn create<R: RngCore + ?Sized>(modulus: usize, algorithm: HmacAlgorithm, rng: &mut R) -> Self {
        let mut key = vec![0u8; Self::KEY_LEN];
        rng.fill_bytes(&mut key);
        Self::with_key(modulus, algorithm, key)
    }

    /// Create with a pinned key.
    ///
    /// # Panics
    /// Panics if `modulus` is zero.
    pub fn with_key(modulus: usize, algorithm: HmacAlgorithm, key: impl Into<Vec<u8>>) -> Self {
        assert!(modulus > 0, "hash modulus must be positive");
        Self {
            modulus,
            algorithm,
            key: key.into(),
        }
    }

    pub fn evaluate(&self, name: &[u8], tag: &str) -> usize {
        self.evaluate_canonical(&canonical_input(name, tag))
    }

    fn evaluate_canonical(&self, input: &[u8]) -> usize {
        reduce_digest(&self.algorithm.mac(&self.key, input), self.modulus)
    }

    pub fn modulus(&self) -> usize {
        self.modulus
    }

    pub fn algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for HmacHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only a fingerprint of the key goes into logs.
        let fingerprint = hex::encode(&self.key[..self.key.len().min(4)]);
        f.debug_struct("HmacHash")
            .field("modulus", &self.modulus)
            .field("algorithm", &self.algorithm)
            .field("key", &format_args!("{}..", fingerprint))
            .finish()
    }
}

/// One member of a hash group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashFunction {
    Hmac(HmacHash),
    Xor(XorHash),
}

impl HashFunction {
    /// Bucket index in `[0, modulus)` for `(name, tag)`.
    pub fn evaluate(&self, name: &[u8], tag: &str) -> usize {
        self.evaluate_canonical(&canonical_input(name, tag))
    }

    pub(crate) fn evaluate_canonical(&self, input: &[u8]) -> usize {
        match self {
            HashFunction::Hmac(h) => h.evaluate_canonical(input),
            HashFunction::Xor(h) => h.evaluate_canonical(input),
        }
    }

    pub fn modulus(&self) -> usize {
        match self {
            HashFunction::Hmac(h) => h.modulus(),
            HashFunction::Xor(h) => h.modulus(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HashFunction::Hmac(_) => "hmac",
            HashFunction::Xor(_) => "xor",
        }
    }
}

impl From<HmacHash> for HashFunction {
    fn from(h: HmacHash) -> Self {
        HashFunction::Hmac(h)
    }
}

impl From<XorHash> for HashFunction {
    fn from(h: XorHash) -> Self {
        HashFunction::Xor(h)
    }
}

/// Ordered group of k hash functions sharing one modulus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashGroup {
    functions: Vec<HashFunction>,
    modulus: usize,
}

impl HashGroup {
    /// Build a group, checking `k >= 1` and a common modulus.
    pub fn new(functions: Vec<HashFunction>) -> Result<Self, ConfigError> {
        let modulus = functions
            .first()
            .map(HashFunction::modulus)
            .ok_or_else(|| ConfigError::InvalidHashCount {
                input: "0".to_string(),
            })?;

        if let Some(odd) = functions.iter().find(|h| h.modulus() != modulus) {
            return Err(ConfigError::InvalidSpec {
                input: format!("{} functions", functions.len()),
                reason: format!("mixed moduli {} and {}", modulus, odd.modulus()),
            });
        }

        Ok(Self { functions, modulus })
    }

    /// k independently keyed HMAC functions.
    pub fn hmac<R: RngCore + ?Sized>(
        modulus: usize,
        k: usize,
        algorithm: HmacAlgorithm,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        Self::new(
            (0..k)
                .map(|_| HmacHash::create(modulus, algorithm, rng).into())
                .collect(),
        )
    }

    /// k XOR functions with random polynomial terms.
    pub fn xor_random<R: RngCore + ?Sized>(modulus: usize, k: usize, rng: &mut R) -> Result<Self, ConfigError> {
        Self::new(
            (0..k)
                .map(|_| XorHash::random(modulus, rng).into())
                .collect(),
        )
    }

    /// k XOR functions taking consecutive term blocks from a polynomial file.
    pub fn xor_from_file(modulus: usize, k: usize, file: &PolynomialFile) -> Result<Self, ConfigError> {
        Self::new(
            file.hashes(modulus, k)?
                .into_iter()
                .map(HashFunction::from)
                .collect(),
        )
    }

    /// k indices in member order. Duplicates are kept.
    pub fn evaluate(&self, name: &[u8], tag: &str) -> Vec<usize> {
        let input = canonical_input(name, tag);
        self.functions
            .iter()
            .map(|h| h.evaluate_canonical(&input))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn modulus(&self) -> usize {
        self.modulus
    }

    pub fn functions(&self) -> &[HashFunction] {
        &self.functions
    }
}
