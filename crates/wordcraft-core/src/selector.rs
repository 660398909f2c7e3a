//! Day-seeded word selection.
//!
//! Everyone with the same bank sees the same words on the same day. The
//! selection depends only on the day key, the bank and the count, never on
//! stored state, so it can be recomputed on any machine at any time.
//!
//! The mixing constants below are part of the output contract: changing any of
//! them changes every day's words.

use crate::day::DayKey;
use crate::model::{WordBank, WordEntry};

/// Hash a string to a 32-bit seed (xmur3-style multiply/rotate with an
/// avalanche finalizer).
pub fn seed_from_str(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut h: u32 = 1_779_033_703 ^ bytes.len() as u32;
    for &b in bytes {
        h = (h ^ u32::from(b)).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// mulberry32: a small non-cryptographic 32-bit generator.
#[derive(Debug, Clone)]
pub struct DayRng {
    state: u32,
}

impl DayRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn for_day(day: &DayKey) -> Self {
        Self::new(seed_from_str(day.as_str()))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform index in `0..bound` by multiply-shift.
    fn below(&mut self, bound: usize) -> usize {
        ((u64::from(self.next_u32()) * bound as u64) >> 32) as usize
    }
}

/// Deterministic permutation of `0..len` for a day.
pub fn day_permutation(day: &DayKey, len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    let mut rng = DayRng::for_day(day);
    for i in (1..len).rev() {
        let j = rng.below(i + 1);
        order.swap(i, j);
    }
    order
}

/// Pick the day's words: the first `count` entries of the day's permutation
/// of the bank. `count` is clamped to the bank size.
pub fn select_daily<'a>(bank: &'a WordBank, day: &DayKey, count: usize) -> Vec<&'a WordEntry> {
    let entries = bank.entries();
    let count = count.min(entries.len());
    day_permutation(day, entries.len())
        .into_iter()
        .take(count)
        .map(|i| &entries[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;

    fn synthetic_bank(n: usize) -> WordBank {
        let entries = (0..n)
            .map(|i| WordEntry {
                term: format!("word-{i:03}"),
                definition: String::new(),
                connotation_note: String::new(),
                etymology: String::new(),
                tier: Tier::Common,
            })
            .collect();
        WordBank::new(entries).unwrap()
    }

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn terms(words: &[&WordEntry]) -> Vec<String> {
        words.iter().map(|w| w.term.clone()).collect()
    }

    #[test]
    fn seed_is_pinned() {
        assert_eq!(seed_from_str("2024-03-01"), 2_811_447_182);
        assert_eq!(seed_from_str(""), 167_010_153);
    }

    #[test]
    fn generator_is_pinned() {
        let mut rng = DayRng::for_day(&day("2024-03-01"));
        assert_eq!(rng.next_u32(), 4_194_275_694);
        assert_eq!(rng.next_u32(), 4_263_111_342);
        assert_eq!(rng.next_u32(), 383_977_584);

        let mut zero = DayRng::new(0);
        assert_eq!(zero.next_u32(), 1_144_304_738);
    }

    #[test]
    fn pinned_selection_over_160_words() {
        let bank = synthetic_bank(160);
        let first = select_daily(&bank, &day("2024-03-01"), 5);
        assert_eq!(
            terms(&first),
            ["word-004", "word-035", "word-058", "word-096", "word-080"]
        );

        let again = select_daily(&bank, &day("2024-03-01"), 5);
        assert_eq!(terms(&first), terms(&again));

        let next_day = select_daily(&bank, &day("2024-03-02"), 5);
        assert_eq!(
            terms(&next_day),
            ["word-022", "word-149", "word-138", "word-105", "word-083"]
        );
    }

    #[test]
    fn pinned_selection_over_builtin_bank() {
        let bank = WordBank::builtin().unwrap();
        let words = select_daily(&bank, &day("2024-03-01"), 5);
        assert_eq!(
            terms(&words),
            ["verbose", "ephemeral", "perfunctory", "frugal", "ubiquitous"]
        );
    }

    #[test]
    fn different_days_differ() {
        let bank = synthetic_bank(160);
        let mut distinct = std::collections::HashSet::new();
        for d in 1..=28 {
            let key = day(&format!("2024-02-{d:02}"));
            distinct.insert(terms(&select_daily(&bank, &key, 5)));
        }
        assert_eq!(distinct.len(), 28);
    }

    #[test]
    fn count_is_clamped_to_bank_size() {
        let bank = synthetic_bank(3);
        let words = select_daily(&bank, &day("2024-03-01"), 10);
        assert_eq!(words.len(), 3);
        let mut sorted = terms(&words);
        sorted.sort();
        assert_eq!(sorted, ["word-000", "word-001", "word-002"]);
    }

    #[test]
    fn smaller_counts_are_prefixes() {
        let bank = synthetic_bank(160);
        let key = day("2024-03-01");
        let three = terms(&select_daily(&bank, &key, 3));
        let five = terms(&select_daily(&bank, &key, 5));
        assert_eq!(three[..], five[..3]);
    }

    #[test]
    fn permutation_covers_every_index_once() {
        let mut order = day_permutation(&day("2024-12-25"), 50);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn empty_and_single_permutations() {
        assert!(day_permutation(&day("2024-03-01"), 0).is_empty());
        assert_eq!(day_permutation(&day("2024-03-01"), 1), vec![0]);
    }
}
