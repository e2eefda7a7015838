//! Stable assignment of vertex ids to partitions.

use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

const PARTITION_SEED: u64 = 42;

pub fn calculate_hash<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut s = XxHash64::with_seed(PARTITION_SEED);
    t.hash(&mut s);
    s.finish()
}

/// Returns the partition owning `id` out of `n_partitions`.
///
/// The result only depends on the id and the partition count, so every
/// worker agrees on ownership without coordination.
pub fn partition_for<T: Hash + ?Sized>(id: &T, n_partitions: usize) -> usize {
    debug_assert!(n_partitions > 0, "at least one partition is required");
    (calculate_hash(id) % n_partitions as u64) as usize
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn partition_is_in_range_and_stable(id: u64, n in 1usize..64) {
            let p = partition_for(&id, n);
            prop_assert!(p < n);
            prop_assert_eq!(p, partition_for(&id, n));
        }
    }

    #[test]
    fn single_partition_owns_everything() {
        for id in 0u64..100 {
            assert_eq!(partition_for(&id, 1), 0);
        }
    }
}
