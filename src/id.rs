//! Eight-digit identifier allocation.
//!
//! Owners and file records are keyed by random ids in
//! `[10_000_000, 99_999_999]`. Uniqueness is not guaranteed by generation;
//! repositories insert with a candidate and retry on a primary-key collision.

use rand::Rng;

/// Smallest valid id.
pub const MIN_ID: i64 = 10_000_000;

/// Largest valid id.
pub const MAX_ID: i64 = 99_999_999;

/// Number of candidates tried before an insert gives up.
pub const MAX_ID_ATTEMPTS: usize = 8;

/// Source of candidate ids.
pub trait IdAllocator: Send + Sync {
    /// Produce the next candidate id.
    fn next_id(&self) -> i64;
}

/// Uniformly random ids from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdAllocator;

impl IdAllocator for RandomIdAllocator {
    fn next_id(&self) -> i64 {
        generate_id()
    }
}

/// Generate a random 8-digit id.
pub fn generate_id() -> i64 {
    rand::rng().random_range(MIN_ID..=MAX_ID)
}

/// Check whether an id is present and has exactly eight digits.
///
/// Negative values are never valid.
pub fn is_valid_id(id: Option<i64>) -> bool {
    matches!(id, Some(v) if (MIN_ID..=MAX_ID).contains(&v))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{generate_id, IdAllocator};

    /// Replays a fixed sequence of ids, then falls back to random ones.
    #[derive(Debug, Default)]
    pub struct ScriptedIds {
        ids: Mutex<VecDeque<i64>>,
    }

    impl ScriptedIds {
        pub fn new(ids: &[i64]) -> Self {
            Self {
                ids: Mutex::new(ids.iter().copied().collect()),
            }
        }
    }

    impl IdAllocator for ScriptedIds {
        fn next_id(&self) -> i64 {
            let mut ids = self.ids.lock().unwrap();
            ids.pop_front().unwrap_or_else(generate_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid() {
        for _ in 0..10_000 {
            let id = generate_id();
            assert!(is_valid_id(Some(id)), "{id} out of range");
        }
    }

    #[test]
    fn test_random_allocator_in_range() {
        let allocator = RandomIdAllocator;
        for _ in 0..100 {
            assert!(is_valid_id(Some(allocator.next_id())));
        }
    }

    #[test]
    fn test_is_valid_id_none() {
        assert!(!is_valid_id(None));
    }

    #[test]
    fn test_is_valid_id_bounds() {
        assert!(is_valid_id(Some(10_000_000)));
        assert!(is_valid_id(Some(99_999_999)));
        assert!(!is_valid_id(Some(9_999_999)));
        assert!(!is_valid_id(Some(100_000_000)));
        assert!(!is_valid_id(Some(0)));
    }

    #[test]
    fn test_is_valid_id_negative() {
        assert!(!is_valid_id(Some(-12_345_678)));
        assert!(!is_valid_id(Some(-1)));
    }

    #[test]
    fn test_scripted_ids_replay_then_random() {
        let ids = testing::ScriptedIds::new(&[11_111_111, 22_222_222]);
        assert_eq!(ids.next_id(), 11_111_111);
        assert_eq!(ids.next_id(), 22_222_222);
        assert!(is_valid_id(Some(ids.next_id())));
    }
}
