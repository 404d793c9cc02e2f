// The delete index: precomputed deletes of dictionary keys, bucketed by a
// compact string hash. Collisions are tolerated; lookup verifies every
// surviving candidate with a real edit distance.

use crate::dictionary::Handle;
use crate::text;
use ahash::{AHashMap, AHashSet};

/// Mask applied to the hash body; the low two bits stay free for the
/// length tag. Higher compact levels trade hash width for memory.
pub(crate) fn compact_mask(compact_level: u8) -> u32 {
    (u32::MAX >> (3 + u32::from(compact_level))) << 2
}

/// Deterministic FNV-1a hash over the term bytes, folded to the compact
/// width, with min(char count, 3) embedded in the low two bits. Stable
/// across runs and across serialization for a fixed compact level.
pub(crate) fn prefix_hash(s: &str, mask: u32) -> i32 {
    let len_mask = text::len(s).min(3) as u32;

    let mut hash: u32 = 2_166_136_261;
    for byte in s.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }

    hash &= mask;
    hash |= len_mask;
    hash as i32
}

// Deletes only, no transposes + replaces + inserts. Replaces and inserts
// are expensive and language dependent (Chinese has 70,000 Unicode Han
// characters).
fn edits(word: &str, edit_distance: i64, max_edit_distance: i64, delete_words: &mut AHashSet<String>) {
    let edit_distance = edit_distance + 1;
    let word_len = text::len(word);

    if word_len > 1 {
        for i in 0..word_len {
            let delete = text::remove(word, i);
            if delete_words.insert(delete.clone()) && edit_distance < max_edit_distance {
                edits(&delete, edit_distance, max_edit_distance, delete_words);
            }
        }
    }
}

/// All distinct deletes of the length-capped prefix of `key`, up to
/// `max_edit_distance` removed characters, plus the prefix itself.
pub(crate) fn edits_prefix(
    key: &str,
    prefix_length: i64,
    max_edit_distance: i64,
) -> AHashSet<String> {
    let mut delete_words = AHashSet::new();
    let key_len = text::len(key) as i64;

    if key_len <= max_edit_distance {
        delete_words.insert(String::new());
    }

    if key_len > prefix_length {
        let shortened_key = text::slice(key, 0, prefix_length as usize);
        delete_words.insert(shortened_key.clone());
        edits(&shortened_key, 0, max_edit_distance, &mut delete_words);
    } else {
        delete_words.insert(key.to_string());
        edits(key, 0, max_edit_distance, &mut delete_words);
    }

    delete_words
}

/// Hash -> dictionary-entry handles. Handles are appended in insertion
/// order; one handle appears at most once per bucket by construction.
#[derive(Debug, Default)]
pub(crate) struct DeleteIndex {
    buckets: AHashMap<i32, Vec<Handle>>,
}

impl DeleteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: i32, handle: Handle) {
        self.buckets.entry(hash).or_default().push(handle);
    }

    /// Remove the single occurrence of `handle` from the bucket, dropping
    /// the bucket once empty.
    pub fn remove(&mut self, hash: i32, handle: Handle) {
        if let Some(bucket) = self.buckets.get_mut(&hash) {
            if let Some(pos) = bucket.iter().position(|&h| h == handle) {
                bucket.remove(pos);
            }
            if bucket.is_empty() {
                self.buckets.remove(&hash);
            }
        }
    }

    pub fn get(&self, hash: i32) -> Option<&[Handle]> {
        self.buckets.get(&hash).map(Vec::as_slice)
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.buckets.reserve(additional);
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Handle])> {
        self.buckets
            .iter()
            .map(|(&hash, bucket)| (hash, bucket.as_slice()))
    }

    fn bucket_entry(&mut self, hash: i32) -> &mut Vec<Handle> {
        self.buckets.entry(hash).or_default()
    }
}

#[derive(Debug, Clone, Copy)]
struct StageEntry {
    count: u32,
    first: i32,
}

#[derive(Debug, Clone, Copy)]
struct StageNode {
    handle: Handle,
    next: i32,
}

/// Bulk-build buffer for the delete index.
///
/// During a dictionary load many keys expand to overlapping hashes; staging
/// them as head-inserted linked lists in one node arena avoids rehashing
/// and repeated bucket growth, then a single commit emits every bucket at
/// its final size.
#[derive(Debug, Default)]
pub(crate) struct SuggestionStage {
    deletes: AHashMap<i32, StageEntry>,
    nodes: Vec<StageNode>,
}

impl SuggestionStage {
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            deletes: AHashMap::with_capacity(initial_capacity),
            nodes: Vec::new(),
        }
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add(&mut self, hash: i32, handle: Handle) {
        let entry = self
            .deletes
            .entry(hash)
            .or_insert(StageEntry { count: 0, first: -1 });
        let next = entry.first;
        entry.count += 1;
        entry.first = self.nodes.len() as i32;
        self.nodes.push(StageNode { handle, next });
    }

    /// Drain every staged list into `target`, reserving per-bucket
    /// capacity up front. The stage is empty afterwards.
    pub fn commit_to(&mut self, target: &mut DeleteIndex) {
        for (&hash, entry) in &self.deletes {
            let bucket = target.bucket_entry(hash);
            bucket.reserve(entry.count as usize);
            let mut next = entry.first;
            while next >= 0 {
                let node = self.nodes[next as usize];
                bucket.push(node.handle);
                next = node.next;
            }
        }
        self.deletes.clear();
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_mask_leaves_length_tag_bits_free() {
        assert_eq!(compact_mask(0), (u32::MAX >> 3) << 2);
        assert_eq!(compact_mask(16), (u32::MAX >> 19) << 2);
        assert_eq!(compact_mask(5) & 0b11, 0);
    }

    #[test]
    fn prefix_hash_embeds_capped_length() {
        let mask = compact_mask(5);
        assert_eq!(prefix_hash("", mask) as u32 & 0b11, 0);
        assert_eq!(prefix_hash("a", mask) as u32 & 0b11, 1);
        assert_eq!(prefix_hash("ab", mask) as u32 & 0b11, 2);
        assert_eq!(prefix_hash("abc", mask) as u32 & 0b11, 3);
        assert_eq!(prefix_hash("abcdef", mask) as u32 & 0b11, 3);
        // stable across calls
        assert_eq!(prefix_hash("stable", mask), prefix_hash("stable", mask));
    }

    #[test]
    fn edits_prefix_enumerates_distinct_deletes() {
        // d=1: the key itself plus one delete per position
        let deletes = edits_prefix("abc", 7, 1);
        let expected: AHashSet<String> = ["abc", "bc", "ac", "ab"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(deletes, expected);

        // duplicates from different delete paths collapse
        let deletes = edits_prefix("aab", 7, 2);
        assert!(deletes.contains("a"));
        assert!(deletes.contains("ab"));
        assert!(deletes.contains("aa"));
        assert!(deletes.contains("aab"));
        assert_eq!(deletes.len(), 5); // aab, ab, aa, a, b
    }

    #[test]
    fn edits_prefix_includes_empty_for_short_keys() {
        let deletes = edits_prefix("ab", 7, 2);
        assert!(deletes.contains(""));
        let deletes = edits_prefix("abc", 7, 2);
        assert!(!deletes.contains(""));
    }

    #[test]
    fn edits_prefix_caps_at_prefix_length() {
        let deletes = edits_prefix("abcdefghij", 7, 1);
        assert!(deletes.contains("abcdefg"));
        assert!(!deletes.contains("abcdefghij"));
        for delete in &deletes {
            assert!(delete.chars().count() <= 7);
        }
    }

    #[test]
    fn remove_drops_empty_buckets() {
        let mut index = DeleteIndex::new();
        index.insert(42, 0);
        index.insert(42, 1);
        index.remove(42, 0);
        assert_eq!(index.get(42), Some(&[1][..]));
        index.remove(42, 1);
        assert!(index.get(42).is_none());
        assert_eq!(index.entry_count(), 0);
    }

    #[test]
    fn stage_commit_matches_direct_inserts() {
        let mut direct = DeleteIndex::new();
        let mut staged = DeleteIndex::new();
        let mut stage = SuggestionStage::with_capacity(4);

        let pairs = [(1, 10), (1, 11), (2, 10), (3, 12), (1, 13)];
        for &(hash, handle) in &pairs {
            direct.insert(hash, handle);
            stage.add(hash, handle);
        }
        assert_eq!(stage.node_count(), pairs.len());
        assert_eq!(stage.delete_count(), 3);

        stage.commit_to(&mut staged);
        assert_eq!(stage.node_count(), 0);
        assert_eq!(stage.delete_count(), 0);

        assert_eq!(direct.entry_count(), staged.entry_count());
        for (hash, bucket) in direct.iter() {
            let mut expected: Vec<Handle> = bucket.to_vec();
            let mut actual: Vec<Handle> = staged.get(hash).unwrap().to_vec();
            expected.sort_unstable();
            actual.sort_unstable();
            assert_eq!(expected, actual, "bucket {hash}");
        }
    }
}
