//! NIC configuration: bank specs and table expressions
//!
//! # Bank spec grammar
//!
//! ```text
//! spec := m
//!       | m "," k
//!       | m "," k "," algorithm
//!       | m "," k "," "xor"
//!       | m "," k "," "xor" "," polyFilePath
//! ```
//!
//! `m` alone means one HMAC-SHA256 function. The polynomial path is
//! everything after the third comma, so it may itself contain commas.
//! `m` is capped at `BankSpec::MAX_BUCKETS` and `k` at
//! `BankSpec::MAX_HASH_COUNT`.
//!
//! # Table expressions
//!
//! ```text
//! expr := ident | ident "(" [arg ("," arg)*] ")"
//! arg  := "nic" | ("bank" | "tag" | "match") "=" value
//! ```
//!
//! # Example
//!
//! ```ignore
//! use nicsim_tables::domain::NicConfigBuilder;
//!
//! let config = NicConfigBuilder::new()
//!     .bank("bf1", "4096,4")
//!     .bank("bf2", "2048,3,xor,poly.txt")
//!     .pit("NaivePit(bank=bf1, tag=PIT1)")
//!     .seed(7)
//!     .build()?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::counting_bloom::CountingBloomFilter;
use super::hash_functions::{HashGroup, HmacAlgorithm};
use super::parameters::calculate_optimal_parameters;
use super::xor_hash::PolynomialFile;
use crate::error::{ConfigError, NicError};
use crate::tables::{MatchPolicy, TableKind};

/// Hash family selected by a bank spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashSpec {
    Hmac { algorithm: HmacAlgorithm },
    XorRandom,
    XorFile { path: PathBuf },
}

/// Parsed bank spec string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BankSpec {
    /// Counter count (m)
    pub buckets: usize,
    /// Hash function count (k)
    pub hash_count: usize,
    pub hashes: HashSpec,
}

impl BankSpec {
    /// Largest accepted counter count (256 MiB of counters).
    pub const MAX_BUCKETS: usize = 1 << 27;
    /// Largest accepted hash count.
    pub const MAX_HASH_COUNT: usize = 64;

    /// `m` counters with one default HMAC function.
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets,
            hash_count: 1,
            hashes: HashSpec::Hmac {
                algorithm: HmacAlgorithm::default(),
            },
        }
    }

    /// HMAC spec sized for `n` entries at `target_fpr`.
    pub fn for_capacity(n: usize, target_fpr: f64) -> Self {
        let params = calculate_optimal_parameters(n, target_fpr);
        Self {
            buckets: params.size,
            hash_count: params.hash_count,
            hashes: HashSpec::Hmac {
                algorithm: HmacAlgorithm::default(),
            },
        }
    }

    /// Construct the filter. Polynomial files are read here.
    pub fn build<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<CountingBloomFilter, ConfigError> {
        self.check_bounds()?;
        let group = match &self.hashes {
            HashSpec::Hmac { algorithm } => HashGroup::hmac(self.buckets, self.hash_count, *algorithm, rng)?,
            HashSpec::XorRandom => HashGroup::xor_random(self.buckets, self.hash_count, rng)?,
            HashSpec::XorFile { path } => {
                let file = PolynomialFile::load(path)?;
                HashGroup::xor_from_file(self.buckets, self.hash_count, &file)?
            }
        };
        debug!(spec = %self, "built counting bloom filter");
        Ok(CountingBloomFilter::new(group))
    }

    /// Specs built field by field skip `FromStr`, so `build` checks again.
    fn check_bounds(&self) -> Result<(), ConfigError> {
        if !(1..=Self::MAX_BUCKETS).contains(&self.buckets) {
            return Err(ConfigError::InvalidBucketCount { input: self.to_string() });
        }
        if !(1..=Self::MAX_HASH_COUNT).contains(&self.hash_count) {
            return Err(ConfigError::InvalidHashCount { input: self.to_string() });
        }
        Ok(())
    }
}

impl FromStr for BankSpec {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = input.splitn(4, ',').map(str::trim).collect();

        let buckets = parse_bounded(fields[0], Self::MAX_BUCKETS).ok_or_else(|| ConfigError::InvalidBucketCount {
            input: input.to_string(),
        })?;

        let Some(k_field) = fields.get(1) else {
            return Ok(Self::with_buckets(buckets));
        };
        let hash_count = parse_bounded(k_field, Self::MAX_HASH_COUNT).ok_or_else(|| ConfigError::InvalidHashCount {
            input: input.to_string(),
        })?;

        let hashes = match (fields.get(2), fields.get(3)) {
            (None, _) => HashSpec::Hmac {
                algorithm: HmacAlgorithm::default(),
            },
            (Some(algo), None) if algo.eq_ignore_ascii_case("xor") => HashSpec::XorRandom,
            (Some(algo), Some(path)) if algo.eq_ignore_ascii_case("xor") => {
                if path.is_empty() {
                    return Err(ConfigError::InvalidSpec {
                        input: input.to_string(),
                        reason: "empty polynomial file path".to_string(),
                    });
                }
                HashSpec::XorFile {
                    path: PathBuf::from(path),
                }
            }
            (Some(algo), None) => HashSpec::Hmac {
                algorithm: algo.parse().map_err(|algorithm| ConfigError::UnknownAlgorithm {
                    input: input.to_string(),
                    algorithm,
                })?,
            },
            (Some(_), Some(extra)) => {
                return Err(ConfigError::InvalidSpec {
                    input: input.to_string(),
                    reason: format!("unexpected field '{}' after algorithm", extra),
                })
            }
        };

        Ok(Self {
            buckets,
            hash_count,
            hashes,
        })
    }
}

fn parse_bounded(field: &str, max: usize) -> Option<usize> {
    field.parse::<usize>().ok().filter(|n| (1..=max).contains(n))
}

impl fmt::Display for BankSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hashes {
            HashSpec::Hmac { algorithm } if *algorithm == HmacAlgorithm::default() => {
                if self.hash_count == 1 {
                    write!(f, "{}", self.buckets)
                } else {
                    write!(f, "{},{}", self.buckets, self.hash_count)
                }
            }
            HashSpec::Hmac { algorithm } => write!(f, "{},{},{}", self.buckets, self.hash_count, algorithm),
            HashSpec::XorRandom => write!(f, "{},{},xor", self.buckets, self.hash_count),
            HashSpec::XorFile { path } => {
                write!(f, "{},{},xor,{}", self.buckets, self.hash_count, path.display())
            }
        }
    }
}

impl TryFrom<String> for BankSpec {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BankSpec> for String {
    fn from(spec: BankSpec) -> Self {
        spec.to_string()
    }
}

/// Parsed table expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableExpr {
    pub variant: String,
    pub bank: Option<String>,
    pub tag: Option<String>,
    pub policy: Option<MatchPolicy>,
}

impl TableExpr {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTableExpression {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (ident, args) = match trimmed.split_once('(') {
            None => (trimmed, None),
            Some((ident, rest)) => {
                let inner = rest
                    .strip_suffix(')')
                    .ok_or_else(|| invalid("missing closing parenthesis"))?;
                (ident.trim(), Some(inner))
            }
        };

        if ident.is_empty() || !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("expected a table identifier"));
        }

        let mut expr = TableExpr {
            variant: ident.to_string(),
            ..Default::default()
        };

        let args = args.unwrap_or("");
        if args.contains(|c| c == '(' || c == ')') {
            return Err(invalid("nested expressions are not allowed"));
        }

        for arg in args.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            if arg == "nic" {
                continue;
            }
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| invalid(&format!("expected key=value, got '{}'", arg)))?;
            let value = unquote(value.trim());
            if value.is_empty() {
                return Err(invalid(&format!("empty value for '{}'", key.trim())));
            }

            let duplicate = match key.trim() {
                "bank" => expr.bank.replace(value.to_string()).is_some(),
                "tag" => expr.tag.replace(value.to_string()).is_some(),
                "match" => {
                    let policy = value
                        .parse::<MatchPolicy>()
                        .map_err(|_| invalid(&format!("unknown match policy '{}'", value)))?;
                    expr.policy.replace(policy).is_some()
                }
                other => return Err(invalid(&format!("unknown argument '{}'", other))),
            };
            if duplicate {
                return Err(invalid(&format!("argument '{}' given twice", key.trim())));
            }
        }

        Ok(expr)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

/// Complete NIC configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NicConfig {
    /// Memory banks by name
    pub banks: BTreeMap<String, BankSpec>,
    /// FIB table expression
    pub fib: String,
    /// PIT table expression
    pub pit: String,
    /// CS table expression
    pub cs: String,
    /// Seed for HMAC keys and random XOR terms; fresh entropy when unset
    pub seed: Option<u64>,
}

impl Default for NicConfig {
    fn default() -> Self {
        let banks = ["bf1", "bf2", "bf3"]
            .into_iter()
            .map(|name| (name.to_string(), BankSpec::with_buckets(1024)))
            .collect();
        Self {
            banks,
            fib: "NaiveFib".to_string(),
            pit: "NaivePit".to_string(),
            cs: "NaiveCs".to_string(),
            seed: None,
        }
    }
}

impl NicConfig {
    /// Load from a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, NicError> {
        let config: NicConfig =
            serde_json::from_str(text).map_err(|e| NicError::at("configuration document", e.into()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn table_expression(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Fib => &self.fib,
            TableKind::Pit => &self.pit,
            TableKind::Cs => &self.cs,
        }
    }

    /// Check that at least one bank exists and that every table expression
    /// parses and names an existing bank.
    pub fn validate(&self) -> Result<(), NicError> {
        if self.banks.is_empty() {
            return Err(NicError::at(
                "banks",
                ConfigError::InvalidSpec {
                    input: String::new(),
                    reason: "at least one memory bank is required".to_string(),
                },
            ));
        }

        for kind in TableKind::ALL {
            let origin = kind.origin();
            let expr = TableExpr::parse(self.table_expression(kind)).map_err(|e| NicError::at(&origin, e))?;
            if let Some(bank) = expr.bank {
                if !self.banks.contains_key(&bank) {
                    return Err(NicError::at(origin, ConfigError::UnknownBank { bank }));
                }
            }
        }
        Ok(())
    }
}

/// Builder for NicConfig with validation
#[derive(Default)]
pub struct NicConfigBuilder {
    banks: Vec<(String, String)>,
    fib: Option<String>,
    pit: Option<String>,
    cs: Option<String>,
    seed: Option<u64>,
}

impl NicConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bank. The first call replaces the default bf1..bf3 layout.
    pub fn bank(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.banks.push((name.into(), spec.into()));
        self
    }

    pub fn fib(mut self, expr: impl Into<String>) -> Self {
        self.fib = Some(expr.into());
        self
    }

    pub fn pit(mut self, expr: impl Into<String>) -> Self {
        self.pit = Some(expr.into());
        self
    }

    pub fn cs(mut self, expr: impl Into<String>) -> Self {
        self.cs = Some(expr.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse every bank spec and validate the result.
    pub fn build(self) -> Result<NicConfig, NicError> {
        let defaults = NicConfig::default();

        let banks = if self.banks.is_empty() {
            defaults.banks
        } else {
            self.banks
                .into_iter()
                .map(|(name, spec)| {
                    let parsed = spec
                        .parse::<BankSpec>()
                        .map_err(|e| NicError::at(format!("bank {}", name), e))?;
                    Ok((name, parsed))
                })
                .collect::<Result<BTreeMap<_, _>, NicError>>()?
        };

        let config = NicConfig {
            banks,
            fib: self.fib.unwrap_or(defaults.fib),
            pit: self.pit.unwrap_or(defaults.pit),
            cs: self.cs.unwrap_or(defaults.cs),
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
