//! # Counting Filter Properties
//!
//! Property tests over random name sets on a seeded HMAC bank.

#[cfg(test)]
mod tests {
    use nicsim_tables::{BankSpec, CountingBloomFilter, Name};
    use proptest::collection::{hash_set, vec};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn filter(spec: &str, seed: u64) -> CountingBloomFilter {
        let mut rng = StdRng::seed_from_u64(seed);
        spec.parse::<BankSpec>().unwrap().build(&mut rng).unwrap()
    }

    fn name_strategy() -> impl Strategy<Value = Name> {
        vec("[a-z0-9]{1,6}", 1..5).prop_map(|parts| Name::from_components(parts.into_iter().map(String::into_bytes)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn no_false_negatives(names in hash_set(name_strategy(), 1..200), seed in any::<u64>()) {
            let mut bank = filter("2048,4", seed);
            for name in &names {
                bank.add(&name.wire_bytes(), "FIB1");
            }
            for name in &names {
                prop_assert!(bank.query(&name.wire_bytes(), "FIB1"));
            }
        }

        #[test]
        fn removal_restores_empty_bank(names in hash_set(name_strategy(), 1..200), seed in any::<u64>()) {
            let mut bank = filter("1024,3,xor", seed);
            for name in &names {
                bank.add(&name.wire_bytes(), "CS2");
            }
            // Reverse order: removal order must not matter
            let mut ordered: Vec<_> = names.iter().collect();
            ordered.reverse();
            for name in ordered {
                let update = bank.remove(&name.wire_bytes(), "CS2");
                prop_assert!(!update.unmatched);
            }
            prop_assert_eq!(bank.nonzero_count(), 0);
        }

        #[test]
        fn remaining_names_survive_removals(
            names in hash_set(name_strategy(), 2..120),
            split in 1usize..100,
            seed in any::<u64>(),
        ) {
            let names: Vec<Name> = names.into_iter().collect();
            let split = split % names.len();
            let mut bank = filter("512,4,sha256", seed);
            for name in &names {
                bank.add(&name.wire_bytes(), "PIT1");
            }
            for name in &names[..split] {
                bank.remove(&name.wire_bytes(), "PIT1");
            }
            for name in &names[split..] {
                prop_assert!(bank.query(&name.wire_bytes(), "PIT1"));
            }
        }

        #[test]
        fn erase_never_underflows(
            inserted in hash_set(name_strategy(), 0..40),
            erased in vec(name_strategy(), 1..80),
            seed in any::<u64>(),
        ) {
            let mut bank = filter("64,2", seed);
            for name in &inserted {
                bank.add(&name.wire_bytes(), "T");
            }
            let total_before: u64 = bank.counters().iter().map(|&c| c as u64).sum();
            for name in &erased {
                let update = bank.remove(&name.wire_bytes(), "T");
                for change in &update.changes {
                    prop_assert!(change.after <= change.before);
                }
            }
            let total_after: u64 = bank.counters().iter().map(|&c| c as u64).sum();
            prop_assert!(total_after <= total_before);
        }
    }
}
