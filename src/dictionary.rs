// Term storage with handles that stay valid across growth and erasure.
//
// Entries live in an append-only slot arena; the delete index refers to
// them by slot index. Erasing tombstones the slot instead of shifting, so
// outstanding handles never dangle. A side table accumulates counts for
// words still below the activation threshold.

use crate::text;
use ahash::AHashMap;

pub(crate) type Handle = u32;

#[derive(Debug)]
pub(crate) struct Slot {
    pub term: Box<str>,
    pub count: i64,
    pub live: bool,
}

/// Outcome of accumulating a count into the dictionary. Only `NewlyActive`
/// requires the caller to index the key's deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upsert {
    NewlyActive(Handle),
    AccumulatedInActive,
    AccumulatedInBelowThreshold,
    StillBelowThreshold,
    Rejected,
}

#[derive(Debug, Default)]
pub(crate) struct Dictionary {
    slots: Vec<Slot>,
    by_term: AHashMap<Box<str>, Handle>,
    below_threshold: AHashMap<Box<str>, i64>,
    max_word_length: i64,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `delta` into `key` under `count_threshold` activation
    /// rules. Counts saturate at `i64::MAX`.
    pub fn upsert(&mut self, key: &str, delta: i64, count_threshold: i64) -> Upsert {
        let mut count = delta;
        if count <= 0 {
            if count_threshold > 0 {
                // no point doing anything if the count cannot change state
                return Upsert::Rejected;
            }
            count = 0;
        }

        // below-threshold entries only exist for thresholds above 1
        if count_threshold > 1 {
            if let Some(previous) = self.below_threshold.get_mut(key) {
                count = previous.saturating_add(count);
                if count >= count_threshold {
                    self.below_threshold.remove(key);
                    let handle = self.insert_active(key, count);
                    return Upsert::NewlyActive(handle);
                }
                *previous = count;
                return Upsert::AccumulatedInBelowThreshold;
            }
        }

        if let Some(&handle) = self.by_term.get(key) {
            let slot = &mut self.slots[handle as usize];
            slot.count = slot.count.saturating_add(count);
            return Upsert::AccumulatedInActive;
        }

        if count < count_threshold {
            self.below_threshold.insert(key.into(), count);
            return Upsert::StillBelowThreshold;
        }

        let handle = self.insert_active(key, count);
        Upsert::NewlyActive(handle)
    }

    /// Append an active entry directly, bypassing threshold accounting.
    /// Used when rebuilding from a serialized words table, where handles
    /// must match the stored insertion order.
    pub(crate) fn insert_active(&mut self, key: &str, count: i64) -> Handle {
        let handle = self.slots.len() as Handle;
        self.slots.push(Slot {
            term: key.into(),
            count,
            live: true,
        });
        self.by_term.insert(key.into(), handle);

        let key_len = text::len(key) as i64;
        if key_len > self.max_word_length {
            self.max_word_length = key_len;
        }
        handle
    }

    /// Tombstone an active entry. Returns its handle, or None if the key
    /// is not active (below-threshold entries are not erasable).
    pub fn erase(&mut self, key: &str) -> Option<Handle> {
        let handle = self.by_term.remove(key)?;
        self.slots[handle as usize].live = false;

        if text::len(key) as i64 == self.max_word_length {
            self.max_word_length = self
                .by_term
                .keys()
                .map(|term| text::len(term) as i64)
                .max()
                .unwrap_or(0);
        }
        Some(handle)
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.by_term
            .get(key)
            .map(|&handle| self.slots[handle as usize].count)
    }

    pub fn term(&self, handle: Handle) -> &str {
        &self.slots[handle as usize].term
    }

    pub fn count(&self, handle: Handle) -> i64 {
        self.slots[handle as usize].count
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.slots[handle as usize].live
    }

    pub fn word_count(&self) -> usize {
        self.by_term.len()
    }

    pub fn max_word_length(&self) -> i64 {
        self.max_word_length
    }

    pub fn set_max_word_length(&mut self, value: i64) {
        self.max_word_length = value;
    }

    pub fn purge_below_threshold(&mut self) {
        self.below_threshold.clear();
    }

    pub fn below_threshold_len(&self) -> usize {
        self.below_threshold.len()
    }

    pub fn below_threshold_iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.below_threshold
            .iter()
            .map(|(key, &count)| (key.as_ref(), count))
    }

    pub fn insert_below_threshold(&mut self, key: &str, count: i64) {
        self.below_threshold.insert(key.into(), count);
    }

    /// Live slots in insertion order, with their handles.
    pub fn live_slots(&self) -> impl Iterator<Item = (Handle, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.live)
            .map(|(i, slot)| (i as Handle, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_activates_at_threshold() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.upsert("word", 3, 10), Upsert::StillBelowThreshold);
        assert_eq!(
            dict.upsert("word", 4, 10),
            Upsert::AccumulatedInBelowThreshold
        );
        assert!(dict.get("word").is_none());
        assert!(matches!(dict.upsert("word", 5, 10), Upsert::NewlyActive(_)));
        // accumulated across the promotion: 3 + 4 + 5
        assert_eq!(dict.get("word"), Some(12));
        assert_eq!(dict.below_threshold_len(), 0);
    }

    #[test]
    fn upsert_rejects_non_positive_counts_under_positive_threshold() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.upsert("word", 0, 1), Upsert::Rejected);
        assert_eq!(dict.upsert("word", -5, 1), Upsert::Rejected);
        // threshold 0 admits anything, clamped to zero
        assert!(matches!(dict.upsert("word", -5, 0), Upsert::NewlyActive(_)));
        assert_eq!(dict.get("word"), Some(0));
    }

    #[test]
    fn upsert_saturates_instead_of_overflowing() {
        let mut dict = Dictionary::new();
        assert!(matches!(
            dict.upsert("word", i64::MAX - 1, 1),
            Upsert::NewlyActive(_)
        ));
        assert_eq!(dict.upsert("word", 10, 1), Upsert::AccumulatedInActive);
        assert_eq!(dict.get("word"), Some(i64::MAX));
    }

    #[test]
    fn erase_tombstones_and_recomputes_max_length() {
        let mut dict = Dictionary::new();
        dict.upsert("apple", 10, 1);
        dict.upsert("apples", 10, 1);
        assert_eq!(dict.max_word_length(), 6);

        let handle = dict.erase("apples").unwrap();
        assert!(!dict.is_live(handle));
        assert_eq!(dict.max_word_length(), 5);
        assert!(dict.erase("apples").is_none());
        assert_eq!(dict.word_count(), 1);

        dict.erase("apple");
        assert_eq!(dict.max_word_length(), 0);
    }

    #[test]
    fn handles_stay_stable_across_growth_and_erase() {
        let mut dict = Dictionary::new();
        let a = match dict.upsert("alpha", 1, 1) {
            Upsert::NewlyActive(h) => h,
            other => panic!("unexpected outcome {other:?}"),
        };
        for i in 0..100 {
            dict.upsert(&format!("filler{i}"), 1, 1);
        }
        dict.erase("filler0");
        assert_eq!(dict.term(a), "alpha");
        assert_eq!(dict.count(a), 1);
    }
}
