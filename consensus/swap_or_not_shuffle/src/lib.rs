//! Implements the "swap or not" shuffling algorithm used to permute active
//! validator indices into committees. Bit-exact across platforms: it only
//! ever hashes byte sequences and compares integers, never floats.
//!
//! Reference:
//! https://github.com/ethereum/eth2.0-specs/blob/v0.12.0/specs/phase0/beacon-chain.md#compute_shuffled_index

use eth2_hashing::hash;

const SEED_SIZE: usize = 32;
const ROUND_SIZE: usize = 1;
const POSITION_WINDOW_SIZE: usize = 4;
const PIVOT_VIEW_SIZE: usize = SEED_SIZE + ROUND_SIZE;
const TOTAL_SIZE: usize = SEED_SIZE + ROUND_SIZE + POSITION_WINDOW_SIZE;

/// Shuffles `index` into its new position for a list of length `index_count`, given `seed` and
/// `round_count` (`ChainSpec::shuffle_round_count`).
///
/// Returns `None` if `index >= index_count`.
pub fn compute_shuffled_index(
    mut index: usize,
    index_count: usize,
    seed: &[u8; 32],
    round_count: u8,
) -> Option<usize> {
    if index >= index_count || index_count == 0 {
        return None;
    }

    let mut buf: [u8; TOTAL_SIZE] = [0; TOTAL_SIZE];
    buf[0..SEED_SIZE].copy_from_slice(&seed[..]);

    for round in 0..round_count {
        buf[SEED_SIZE] = round;

        let pivot = bytes_to_int64(&hash(&buf[0..PIVOT_VIEW_SIZE])[0..8]) as usize % index_count;
        let flip = (pivot + index_count - index) % index_count;
        let position = std::cmp::max(index, flip);

        buf[PIVOT_VIEW_SIZE..TOTAL_SIZE].copy_from_slice(&int_to_bytes4((position / 256) as u32));
        let source = hash(&buf[..]);

        let byte = source[(position % 256) / 8];
        let bit = (byte >> (position % 8)) % 2;

        if bit == 1 {
            index = flip;
        }
    }

    Some(index)
}

/// Returns `{shuffled_index(i, n, seed) : i in [0,n)}` as a `Vec<usize>`, a permutation of
/// `[0,n)`. Used by tests and by callers that need the whole committee ordering at once.
pub fn shuffle_list(
    index_count: usize,
    seed: &[u8; 32],
    round_count: u8,
) -> Option<Vec<usize>> {
    (0..index_count)
        .map(|i| compute_shuffled_index(i, index_count, seed, round_count))
        .collect()
}

fn bytes_to_int64(bytes: &[u8]) -> u64 {
    let mut array = [0u8; 8];
    array.copy_from_slice(&bytes[0..8]);
    u64::from_le_bytes(array)
}

fn int_to_bytes4(int: u32) -> [u8; 4] {
    int.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn is_permutation() {
        let seed = [7u8; 32];
        for &n in &[0usize, 1, 2, 3, 5, 13, 64, 257] {
            let shuffled = shuffle_list(n, &seed, 90).unwrap();
            let set: HashSet<_> = shuffled.iter().copied().collect();
            assert_eq!(set.len(), n, "shuffle of {} must be a permutation", n);
            for v in 0..n {
                assert!(set.contains(&v));
            }
        }
    }

    #[test]
    fn out_of_range_is_none() {
        let seed = [0u8; 32];
        assert_eq!(compute_shuffled_index(5, 5, &seed, 90), None);
        assert_eq!(compute_shuffled_index(0, 0, &seed, 90), None);
    }

    #[test]
    fn deterministic_across_calls() {
        let seed = [3u8; 32];
        let a = shuffle_list(100, &seed, 90).unwrap();
        let b = shuffle_list(100, &seed, 90).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = shuffle_list(100, &[1u8; 32], 90).unwrap();
        let b = shuffle_list(100, &[2u8; 32], 90).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn zero_rounds_is_identity() {
        let seed = [9u8; 32];
        let shuffled = shuffle_list(16, &seed, 0).unwrap();
        let identity: Vec<usize> = (0..16).collect();
        assert_eq!(shuffled, identity);
    }
}
