//! # Determinism
//!
//! Bank indices depend only on the hash group. Pinned HMAC keys, a fixed
//! seed or a shared polynomial file reproduce them exactly across runs.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use nicsim_tables::{
        ConfigError, CountingBloomFilter, HashGroup, HmacAlgorithm, HmacHash, MemoryLog, Name,
        NicConfigBuilder, NicError, NicTables, TableKind,
    };
    use tempfile::NamedTempFile;

    use crate::seeded_tables;

    fn pinned_filter(key: &[u8]) -> CountingBloomFilter {
        let functions = (0..3u8)
            .map(|i| {
                let mut key = key.to_vec();
                key.push(i);
                HmacHash::with_key(4096, HmacAlgorithm::Sha3_256, key).into()
            })
            .collect();
        CountingBloomFilter::new(HashGroup::new(functions).unwrap())
    }

    fn names() -> Vec<Name> {
        (0..64).map(|i| Name::parse(&format!("/d/{}", i))).collect()
    }

    #[test]
    fn test_pinned_keys_reproduce_indices() {
        let a = pinned_filter(b"fixed-key");
        let b = pinned_filter(b"fixed-key");
        let other = pinned_filter(b"other-key");

        let mut differs = false;
        for name in names() {
            let wire = name.wire_bytes();
            assert_eq!(a.indices(&wire, "FIB1"), b.indices(&wire, "FIB1"));
            differs |= a.indices(&wire, "FIB1") != other.indices(&wire, "FIB1");
        }
        assert!(differs);
    }

    #[test]
    fn test_seed_reproduces_update_log() {
        let run = |seed| {
            let tables = seeded_tables("2048,4,sha512", seed);
            let mut log = MemoryLog::new();
            for name in names() {
                tables.insert(TableKind::Fib, &name, &mut log).unwrap();
                tables.insert(TableKind::Cs, &name, &mut log).unwrap();
            }
            log.updates
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    fn polynomial_file(terms: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# generated polynomial terms").unwrap();
        for i in 0..terms as u64 {
            let term = (i + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            writeln!(file, "{:#x}", term).unwrap();
        }
        file
    }

    #[test]
    fn test_polynomial_file_reproduces_indices_without_seed() {
        let file = polynomial_file(128);
        let spec = format!("4096,2,xor,{}", file.path().display());

        let build = || {
            let config = NicConfigBuilder::new()
                .bank("bf1", spec.as_str())
                .cs("NaiveCs(bank=bf1)")
                .build()
                .unwrap();
            NicTables::from_config(&config).unwrap()
        };
        let first = build();
        let second = build();

        for name in names() {
            let wire = name.wire_bytes();
            let a = first.nic().bank("bf1").unwrap().read(|f| f.indices(&wire, "FIB1"));
            let b = second.nic().bank("bf1").unwrap().read(|f| f.indices(&wire, "FIB1"));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_short_polynomial_file_rejected_at_startup() {
        let file = polynomial_file(100);
        let config = NicConfigBuilder::new()
            .bank("bf1", format!("1024,2,xor,{}", file.path().display()))
            .cs("NaiveCs(bank=bf1)")
            .build()
            .unwrap();

        let err = NicTables::from_config(&config).unwrap_err();
        assert_eq!(err.origin(), Some("bank bf1"));
        assert!(matches!(
            err,
            NicError::Configuration {
                error: ConfigError::PolynomialTooShort {
                    needed: 128,
                    found: 100,
                    ..
                },
                ..
            }
        ));
    }
}
