//! # Table Flows
//!
//! FIB, PIT and CS over shared and separate memory banks.
//!
//! ## Flows Tested:
//!
//! 1. **Shared bank, distinct tags**: PIT erase of a FIB-only name is a no-op
//! 2. **CS prefix expansion**: every prefix inserted and erased together
//! 3. **Single counter bank**: m=1, k=1 collisions stay consistent
//! 4. **Tag isolation**: cross-tag positives stay near the analytic rate
//! 5. **Expression rebinding**: a table moved to bf3 leaves bf1 alone

#[cfg(test)]
mod tests {
    use nicsim_tables::{
        MemoryLog, Name, NicConfigBuilder, NicError, NicTables, Outcome, TableKind, TableOp,
    };

    use crate::{init_tracing, seeded_tables};

    fn nonzero(tables: &NicTables, bank: &str) -> usize {
        tables
            .nic()
            .bank(bank)
            .unwrap()
            .read(|filter| filter.nonzero_count())
    }

    // =========================================================================
    // SHARED BANK: FIB AND PIT ON bf1
    // =========================================================================

    #[test]
    fn test_pit_erase_does_not_disturb_fib_entry() {
        init_tracing();
        let tables = seeded_tables("1024,4", 11);
        let mut log = MemoryLog::new();
        let x = Name::parse("/x");

        tables.insert(TableKind::Fib, &x, &mut log).unwrap();
        let before = tables
            .nic()
            .bank("bf1")
            .unwrap()
            .read(|filter| filter.counters().to_vec());

        tables.erase(TableKind::Pit, &x, &mut log).unwrap();

        let after = tables
            .nic()
            .bank("bf1")
            .unwrap()
            .read(|filter| filter.counters().to_vec());
        assert_eq!(before, after);
        assert!(log.updates[1].ends_with(" unmatched"));
        assert!(tables.lookup(TableKind::Fib, &x, &mut log).unwrap());
        assert!(!tables.lookup(TableKind::Pit, &x, &mut log).unwrap());
    }

    #[test]
    fn test_fib_and_pit_share_counters() {
        let tables = seeded_tables("4096,4", 3);
        let mut log = MemoryLog::new();

        tables.insert(TableKind::Fib, &Name::parse("/a"), &mut log).unwrap();
        tables.insert(TableKind::Pit, &Name::parse("/a"), &mut log).unwrap();

        let stats = tables.nic().bank("bf1").unwrap().metrics();
        assert_eq!(stats.adds, 2);
        assert_eq!(nonzero(&tables, "bf2"), 0);
        assert!(log.updates.iter().all(|line| line.starts_with("bf1 add ")));
    }

    #[test]
    fn test_fib_longest_prefix_match() {
        let tables = seeded_tables("4096,4", 5);
        let mut log = MemoryLog::new();

        tables.insert(TableKind::Fib, &Name::parse("/news"), &mut log).unwrap();
        tables.insert(TableKind::Fib, &Name::parse("/news/sport"), &mut log).unwrap();

        let decision = tables
            .apply(TableKind::Fib, TableOp::Lookup, &Name::parse("/news/sport/today"), &mut log)
            .unwrap();
        assert_eq!(decision.outcome, Outcome::Hit(Name::parse("/news/sport")));

        let decision = tables
            .apply(TableKind::Fib, TableOp::Lookup, &Name::parse("/news/weather"), &mut log)
            .unwrap();
        assert_eq!(decision.outcome, Outcome::Hit(Name::parse("/news")));

        // PIT is exact match only
        tables.insert(TableKind::Pit, &Name::parse("/news"), &mut log).unwrap();
        assert!(!tables.lookup(TableKind::Pit, &Name::parse("/news/weather"), &mut log).unwrap());
    }

    // =========================================================================
    // CS PREFIX EXPANSION
    // =========================================================================

    #[test]
    fn test_cs_insert_and_erase_every_prefix() {
        let tables = seeded_tables("8192,4", 21);
        let mut log = MemoryLog::new();
        let name = Name::parse("/a/b/c");

        tables.insert(TableKind::Cs, &name, &mut log).unwrap();
        assert_eq!(log.updates.len(), 3);
        for prefix in ["/a", "/a/b", "/a/b/c"] {
            assert!(tables.lookup(TableKind::Cs, &Name::parse(prefix), &mut log).unwrap());
        }

        tables.erase(TableKind::Cs, &name, &mut log).unwrap();
        assert_eq!(nonzero(&tables, "bf2"), 0);
        assert!(!tables.lookup(TableKind::Cs, &Name::parse("/a"), &mut log).unwrap());
    }

    #[test]
    fn test_cs_shared_prefixes_survive_partial_erase() {
        let tables = seeded_tables("8192,4", 22);
        let mut log = MemoryLog::new();

        tables.insert(TableKind::Cs, &Name::parse("/a/b"), &mut log).unwrap();
        tables.insert(TableKind::Cs, &Name::parse("/a/c"), &mut log).unwrap();
        tables.erase(TableKind::Cs, &Name::parse("/a/b"), &mut log).unwrap();

        assert!(tables.lookup(TableKind::Cs, &Name::parse("/a"), &mut log).unwrap());
        assert!(tables.lookup(TableKind::Cs, &Name::parse("/a/c"), &mut log).unwrap());
    }

    // =========================================================================
    // DEGENERATE BANK: m=1, k=1
    // =========================================================================

    #[test]
    fn test_single_counter_bank() {
        let tables = seeded_tables("1,1", 1);
        let mut log = MemoryLog::new();
        let bank = tables.nic().bank("bf1").unwrap();

        tables.insert(TableKind::Pit, &Name::parse("/a"), &mut log).unwrap();
        tables.insert(TableKind::Pit, &Name::parse("/b"), &mut log).unwrap();
        assert_eq!(bank.read(|filter| filter.counter(0)), 2);

        // Everything collides, so any name looks present
        assert!(tables.lookup(TableKind::Pit, &Name::parse("/never"), &mut log).unwrap());

        tables.erase(TableKind::Pit, &Name::parse("/a"), &mut log).unwrap();
        tables.erase(TableKind::Pit, &Name::parse("/b"), &mut log).unwrap();
        assert_eq!(bank.read(|filter| filter.counter(0)), 0);

        // Nothing left: the next erase is unmatched and cannot underflow
        tables.erase(TableKind::Pit, &Name::parse("/a"), &mut log).unwrap();
        assert_eq!(bank.read(|filter| filter.counter(0)), 0);
        assert_eq!(bank.metrics().unmatched_removes, 1);
    }

    #[test]
    fn test_erase_of_absent_name_changes_nothing() {
        let tables = seeded_tables("2048,3", 8);
        let mut log = MemoryLog::new();

        tables.insert(TableKind::Pit, &Name::parse("/present"), &mut log).unwrap();
        let before = tables.nic().bank("bf1").unwrap().read(|f| f.counters().to_vec());

        tables.erase(TableKind::Pit, &Name::parse("/absent"), &mut log).unwrap();
        let after = tables.nic().bank("bf1").unwrap().read(|f| f.counters().to_vec());

        assert_eq!(before, after);
    }

    // =========================================================================
    // TAG ISOLATION
    // =========================================================================

    #[test]
    fn test_cross_tag_positive_rate_near_expected() {
        let tables = seeded_tables("8192,4", 77);
        let mut log = MemoryLog::new();

        for i in 0..500 {
            let name = Name::parse(&format!("/route/{}", i));
            tables.insert(TableKind::Fib, &name, &mut log).unwrap();
        }

        let bank = tables.nic().bank("bf1").unwrap();
        let expected = bank.read(|filter| filter.expected_fpr());

        let samples = 5000;
        let hits = (0..samples)
            .filter(|i| {
                // Same names under the PIT tag: every hit is a false positive
                let name = Name::parse(&format!("/route/{}", i % 500));
                bank.query(&name, "PIT1")
            })
            .count();
        let observed = hits as f64 / samples as f64;

        assert!(expected < 0.01, "expected fpr {}", expected);
        assert!(
            observed <= expected * 5.0 + 0.01,
            "observed {} vs expected {}",
            observed,
            expected
        );
    }

    // =========================================================================
    // TABLE EXPRESSIONS
    // =========================================================================

    #[test]
    fn test_pit_rebound_to_third_bank() {
        let config = NicConfigBuilder::new()
            .bank("bf1", "2048,3")
            .bank("bf2", "2048,3")
            .bank("bf3", "2048,3,xor")
            .pit("NaivePit(bank=bf3, tag=P)")
            .seed(4)
            .build()
            .unwrap();
        let tables = NicTables::from_config(&config).unwrap();
        let mut log = MemoryLog::new();

        tables.insert(TableKind::Pit, &Name::parse("/interest"), &mut log).unwrap();

        assert_eq!(nonzero(&tables, "bf1"), 0);
        assert!(nonzero(&tables, "bf3") > 0);
        assert!(log.updates[0].starts_with("bf3 add P /interest "));
    }

    #[test]
    fn test_configuration_errors_name_their_origin() {
        let err = NicConfigBuilder::new()
            .bank("bf1", "0,3")
            .build()
            .unwrap_err();
        assert_eq!(err.origin(), Some("bank bf1"));

        let err = NicConfigBuilder::new()
            .cs("NaiveCs(bank=bf9)")
            .build()
            .unwrap_err();
        assert_eq!(err.origin(), Some("table cs"));

        let config = NicConfigBuilder::new().pit("HashPit").build();
        let err = match config {
            Ok(config) => NicTables::from_config(&config).unwrap_err(),
            Err(err) => err,
        };
        assert!(matches!(err, NicError::TableNotFound { ref name, .. } if name == "HashPit"));
    }

    #[test]
    fn test_default_document_builds() {
        let config = nicsim_tables::NicConfig::from_json(r#"{ "seed": 2 }"#).unwrap();
        let tables = NicTables::from_config(&config).unwrap();
        assert_eq!(tables.nic().bank_names(), vec!["bf1", "bf2", "bf3"]);
    }
}
