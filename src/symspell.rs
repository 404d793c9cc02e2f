// SymSpell: 1 million times faster through Symmetric Delete spelling correction algorithm
//
// The Symmetric Delete spelling correction algorithm reduces the complexity of edit candidate generation and dictionary lookup
// for a given Damerau-Levenshtein distance. It is six orders of magnitude faster and language independent.
// Opposite to other algorithms only deletes are required, no transposes + replaces + inserts.
// Transposes + replaces + inserts of the input term are transformed into deletes of the dictionary term.
// Replaces and inserts are expensive and language dependent: e.g. Chinese has 70,000 Unicode Han characters!
//
// SymSpell supports compound splitting / decompounding of multi-word input strings with three cases:
// 1. mistakenly inserted space into a correct word led to two incorrect terms
// 2. mistakenly omitted space between two correct words led to one incorrect combined term
// 3. multiple independent input terms with/without spelling errors

use std::cmp::{self, min, Ordering};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use tracing::warn;

use crate::casing;
use crate::dictionary::{Dictionary, Upsert};
use crate::distance::{DistanceAlgorithm, EditDistance};
use crate::error::{Result, SymSpellError};
use crate::index::{compact_mask, edits_prefix, prefix_hash, DeleteIndex, SuggestionStage};
use crate::text;

pub const DEFAULT_MAX_EDIT_DISTANCE: i64 = 2;
pub const DEFAULT_PREFIX_LENGTH: i64 = 7;
pub const DEFAULT_COUNT_THRESHOLD: i64 = 1;
pub const DEFAULT_COMPACT_LEVEL: u8 = 5;

// Number of all words in the corpus used to generate the frequency dictionary.
// This is used to calculate the word occurrence probability p from word counts c : p=c/N
// N equals the sum of all counts c in the dictionary only if the dictionary is complete,
// but not if the dictionary is truncated or filtered.
pub(crate) const N: i64 = 1_024_908_267_229;

/// Controls the closeness/quantity of returned spelling suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Top suggestion with the highest term frequency of the suggestions of smallest edit distance found.
    Top,
    /// All suggestions of smallest edit distance found, suggestions ordered by term frequency.
    Closest,
    /// All suggestions within maxEditDistance, suggestions ordered by edit distance, then by term frequency (slower, no early termination)
    All,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suggestion {
    /// The suggested correctly spelled word.
    pub term: String,
    /// Edit distance between searched for word and suggestion.
    pub distance: i64,
    /// Frequency of suggestion in the dictionary (a measure of how common the word is).
    pub count: i64,
}

impl Suggestion {
    pub fn new(term: impl Into<String>, distance: i64, count: i64) -> Suggestion {
        Suggestion {
            term: term.into(),
            distance,
            count,
        }
    }
}

// Order by distance ascending, then by frequency count descending, then by
// term for a stable total order.
impl Ord for Suggestion {
    fn cmp(&self, other: &Suggestion) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.term.cmp(&other.term))
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Suggestion) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Suggestion) -> bool {
        self.term == other.term && self.distance == other.distance && self.count == other.count
    }
}

impl Eq for Suggestion {}

/// Result of `word_segmentation`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Composition {
    /// The word segmented string with the original spelling kept.
    pub segmented_string: String,
    /// The word segmented and spelling corrected string.
    pub corrected_string: String,
    /// The edit distance sum between input string and corrected string.
    pub distance_sum: i64,
    /// The sum of word occurrence probabilities in log scale (a measure of
    /// how common and probable the corrected segmentation is).
    pub prob_log_sum: f64,
}

/// SymSpell spell checker and corrector.
pub struct SymSpell {
    // Maximum edit distance for dictionary precalculation.
    pub(crate) max_dictionary_edit_distance: i64,
    // The length of word prefixes, from which deletes are generated. (5..7).
    pub(crate) prefix_length: i64,
    // The minimum frequency count for dictionary words to be considered a valid word for spelling correction.
    pub(crate) count_threshold: i64,
    pub(crate) compact_mask: u32,
    pub(crate) distance_algorithm: DistanceAlgorithm,
    // Unique correct spelling words with frequency counts, plus the below
    // threshold side table. Owns entry storage; the delete index refers
    // into it by handle.
    pub(crate) dictionary: Dictionary,
    // Mapping of prefix-delete hashes to the dictionary entries whose
    // deletes reach that hash. Hash collisions are tolerated, because
    // suggestions are ultimately verified via an edit distance function.
    pub(crate) deletes: DeleteIndex,
    // Bigrams optionally used for improved correction quality in lookup_compound.
    pub(crate) bigrams: AHashMap<Box<str>, i64>,
    // Minimum bigram count in the bigram dictionary.
    pub(crate) bigram_count_min: i64,
}

impl Default for SymSpell {
    fn default() -> Self {
        Self {
            max_dictionary_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
            prefix_length: DEFAULT_PREFIX_LENGTH,
            count_threshold: DEFAULT_COUNT_THRESHOLD,
            compact_mask: compact_mask(DEFAULT_COMPACT_LEVEL),
            distance_algorithm: DistanceAlgorithm::DamerauOsa,
            dictionary: Dictionary::new(),
            deletes: DeleteIndex::new(),
            bigrams: AHashMap::new(),
            bigram_count_min: i64::MAX,
        }
    }
}

impl SymSpell {
    /// Creates a new SymSpell instance.
    ///
    /// # Arguments
    ///
    /// * `max_dictionary_edit_distance` - Maximum edit distance for doing lookups.
    /// * `prefix_length` - The length of word prefixes used for spell checking (5..7).
    /// * `count_threshold` - The minimum frequency count for dictionary words to be considered correct spellings.
    /// * `compact_level` - Degree of favoring lower memory use over speed (0=fastest/most memory, 16=slowest/least memory).
    /// * `distance_algorithm` - The edit distance used to verify candidates.
    pub fn new(
        max_dictionary_edit_distance: i64,
        prefix_length: i64,
        count_threshold: i64,
        compact_level: u8,
        distance_algorithm: DistanceAlgorithm,
    ) -> Result<Self> {
        if max_dictionary_edit_distance < 0 {
            return Err(SymSpellError::InvalidConfiguration(
                "max_dictionary_edit_distance cannot be negative".to_string(),
            ));
        }
        if prefix_length < 1 || prefix_length <= max_dictionary_edit_distance {
            return Err(SymSpellError::InvalidConfiguration(
                "prefix_length cannot be less than 1 or smaller than max_dictionary_edit_distance"
                    .to_string(),
            ));
        }
        if count_threshold < 0 {
            return Err(SymSpellError::InvalidConfiguration(
                "count_threshold cannot be negative".to_string(),
            ));
        }
        if compact_level > 16 {
            return Err(SymSpellError::InvalidConfiguration(
                "compact_level cannot be greater than 16".to_string(),
            ));
        }

        Ok(Self {
            max_dictionary_edit_distance,
            prefix_length,
            count_threshold,
            compact_mask: compact_mask(compact_level),
            distance_algorithm,
            ..Self::default()
        })
    }

    pub fn max_dictionary_edit_distance(&self) -> i64 {
        self.max_dictionary_edit_distance
    }

    pub fn prefix_length(&self) -> i64 {
        self.prefix_length
    }

    pub fn count_threshold(&self) -> i64 {
        self.count_threshold
    }

    pub fn distance_algorithm(&self) -> DistanceAlgorithm {
        self.distance_algorithm
    }

    /// Length of the longest word in the dictionary, or 0 when empty.
    pub fn max_length(&self) -> i64 {
        self.dictionary.max_word_length()
    }

    /// Number of unique correct spelling words in the dictionary.
    pub fn word_count(&self) -> usize {
        self.dictionary.word_count()
    }

    /// Number of delete buckets in the index.
    pub fn entry_count(&self) -> usize {
        self.deletes.entry_count()
    }

    /// Number of loaded bigrams.
    pub fn bigram_count(&self) -> usize {
        self.bigrams.len()
    }

    /// Create/update an entry in the dictionary.
    ///
    /// For every new correct word, deletes with an edit distance of
    /// 1..max_edit_distance are derived from its prefix and added to the
    /// delete index, pointing back at the entry.
    ///
    /// Returns true if the word was added as a new correctly spelled word,
    /// or false if it was added as a below threshold word or updated an
    /// existing entry.
    pub fn create_dictionary_entry(&mut self, key: &str, count: i64) -> bool {
        match self.dictionary.upsert(key, count, self.count_threshold) {
            Upsert::NewlyActive(handle) => {
                for delete in
                    edits_prefix(key, self.prefix_length, self.max_dictionary_edit_distance)
                {
                    self.deletes
                        .insert(prefix_hash(&delete, self.compact_mask), handle);
                }
                true
            }
            _ => false,
        }
    }

    // Staged variant used by the bulk loaders.
    fn create_dictionary_entry_staged(
        &mut self,
        key: &str,
        count: i64,
        staging: &mut SuggestionStage,
    ) -> bool {
        match self.dictionary.upsert(key, count, self.count_threshold) {
            Upsert::NewlyActive(handle) => {
                for delete in
                    edits_prefix(key, self.prefix_length, self.max_dictionary_edit_distance)
                {
                    staging.add(prefix_hash(&delete, self.compact_mask), handle);
                }
                true
            }
            _ => false,
        }
    }

    /// Remove a word and all delete-index references to it.
    ///
    /// Returns false if the word is not an active dictionary entry.
    pub fn delete_dictionary_entry(&mut self, key: &str) -> bool {
        let Some(handle) = self.dictionary.erase(key) else {
            return false;
        };

        for delete in edits_prefix(key, self.prefix_length, self.max_dictionary_edit_distance) {
            self.deletes
                .remove(prefix_hash(&delete, self.compact_mask), handle);
        }
        true
    }

    /// Move staged delete entries into the live index.
    pub(crate) fn commit_staged(&mut self, staging: &mut SuggestionStage) {
        if self.deletes.is_empty() {
            self.deletes.reserve(staging.delete_count());
        }
        staging.commit_to(&mut self.deletes);
    }

    /// Remove all below threshold words from the dictionary. This can be
    /// used to reduce memory consumption after populating the dictionary
    /// from a corpus using `create_dictionary`.
    pub fn purge_below_threshold_words(&mut self) {
        self.dictionary.purge_below_threshold();
    }

    /// Load multiple dictionary entries from a file of word/frequency count pairs.
    /// Merges with any dictionary data already loaded.
    ///
    /// # Arguments
    ///
    /// * `corpus` - The path+filename of the file.
    /// * `term_index` - The column position of the word.
    /// * `count_index` - The column position of the frequency count.
    /// * `separator` - Separator between word and frequency.
    ///
    /// Returns true if the file was loaded, false if it could not be opened.
    pub fn load_dictionary(
        &mut self,
        corpus: impl AsRef<Path>,
        term_index: i64,
        count_index: i64,
        separator: &str,
    ) -> bool {
        let Ok(file) = File::open(corpus.as_ref()) else {
            return false;
        };
        self.load_dictionary_reader(BufReader::new(file), term_index, count_index, separator)
    }

    /// Reader variant of [`SymSpell::load_dictionary`].
    pub fn load_dictionary_reader(
        &mut self,
        reader: impl BufRead,
        term_index: i64,
        count_index: i64,
        separator: &str,
    ) -> bool {
        let mut staging = SuggestionStage::with_capacity(16384);
        let min_terms = cmp::max(term_index, count_index) as usize;

        for line in reader.lines().map_while(std::result::Result::ok) {
            let mut token: &str = &line;
            let mut count: i64 = 1;

            for (i, term) in line.split(separator).take(min_terms + 1).enumerate() {
                if i as i64 == term_index {
                    token = term;
                }
                if i as i64 == count_index {
                    match term.parse::<i64>() {
                        Ok(parsed) => count = parsed,
                        Err(_) => warn!("cannot convert {term} to integer"),
                    }
                }
            }

            self.create_dictionary_entry_staged(token, count, &mut staging);
        }

        self.commit_staged(&mut staging);
        self.entry_count() != 0
    }

    /// Load multiple bigram entries from a file of bigram/frequency count pairs.
    /// Only used in `lookup_compound` for improved compound splitting/merging/correction quality.
    ///
    /// With the default space separator the bigram occupies two adjacent
    /// fields joined by a single space; with any other separator it is a
    /// single field.
    pub fn load_bigram_dictionary(
        &mut self,
        corpus: impl AsRef<Path>,
        term_index: i64,
        count_index: i64,
        separator: &str,
    ) -> bool {
        let Ok(file) = File::open(corpus.as_ref()) else {
            return false;
        };
        self.load_bigram_dictionary_reader(BufReader::new(file), term_index, count_index, separator)
    }

    /// Reader variant of [`SymSpell::load_bigram_dictionary`].
    pub fn load_bigram_dictionary_reader(
        &mut self,
        reader: impl BufRead,
        term_index: i64,
        count_index: i64,
        separator: &str,
    ) -> bool {
        let term_add: i64 = if separator == " " { 1 } else { 0 };
        let second_term_index = term_index + term_add;
        let min_terms = cmp::max(second_term_index, count_index) as usize;
        let term_count = (term_add + 1) as usize;

        for line in reader.lines().map_while(std::result::Result::ok) {
            let mut count: i64 = 1;
            let mut tokens: Vec<&str> = Vec::with_capacity(term_count);

            for (i, term) in line.split(separator).take(min_terms + 1).enumerate() {
                if i as i64 == term_index || i as i64 == second_term_index {
                    tokens.push(term);
                }
                if i as i64 == count_index {
                    match term.parse::<i64>() {
                        Ok(parsed) => count = parsed,
                        Err(_) => warn!("cannot convert {term} to integer"),
                    }
                }
            }

            let token = if tokens.len() < term_count {
                line.clone()
            } else if term_count == 1 {
                tokens[0].to_string()
            } else {
                [tokens[0], tokens[1]].join(" ")
            };

            self.bigrams.insert(token.into_boxed_str(), count);
            if count < self.bigram_count_min {
                self.bigram_count_min = count;
            }
        }

        !self.bigrams.is_empty()
    }

    /// Load dictionary words from a file containing plain text, counting
    /// each occurrence. Merges with any dictionary data already loaded.
    pub fn create_dictionary(&mut self, corpus: impl AsRef<Path>) -> bool {
        let Ok(file) = File::open(corpus.as_ref()) else {
            return false;
        };
        self.create_dictionary_reader(BufReader::new(file))
    }

    /// Reader variant of [`SymSpell::create_dictionary`].
    pub fn create_dictionary_reader(&mut self, reader: impl BufRead) -> bool {
        let mut staging = SuggestionStage::with_capacity(16384);

        for line in reader.lines().map_while(std::result::Result::ok) {
            for key in text::parse_words(&line) {
                self.create_dictionary_entry_staged(&key, 1, &mut staging);
            }
        }

        self.commit_staged(&mut staging);
        self.entry_count() != 0
    }

    /// Find suggested spellings for a given input word.
    ///
    /// # Arguments
    ///
    /// * `input` - The word being spell checked.
    /// * `verbosity` - The value controlling the quantity/closeness of the returned suggestions.
    /// * `max_edit_distance` - The maximum edit distance between input and suggested words.
    /// * `include_unknown` - Include the input word in the suggestions, if no words within edit distance were found.
    /// * `transfer_casing` - Spell check case insensitively, transferring the input casing onto the suggestions.
    ///
    /// Returns suggestions sorted by edit distance, and secondarily by count frequency.
    pub fn lookup(
        &self,
        input: &str,
        verbosity: Verbosity,
        max_edit_distance: i64,
        include_unknown: bool,
        transfer_casing: bool,
    ) -> Result<Vec<Suggestion>> {
        if self.deletes.is_empty() {
            return Ok(Vec::new());
        }
        if max_edit_distance > self.max_dictionary_edit_distance {
            return Err(SymSpellError::InvalidArgument(
                "max_edit_distance is bigger than max_dictionary_edit_distance".to_string(),
            ));
        }

        let original_input = input;
        let lower_input;
        let input = if transfer_casing {
            lower_input = original_input.to_lowercase();
            lower_input.as_str()
        } else {
            original_input
        };

        let mut suggestions: Vec<Suggestion> = Vec::new();
        let input_len = text::len(input) as i64;
        // early termination - word is too big to possibly match any words
        let mut skip = input_len - max_edit_distance > self.max_length();

        if !skip {
            if let Some(suggestion_count) = self.dictionary.get(input) {
                suggestions.push(Suggestion::new(
                    if transfer_casing { original_input } else { input },
                    0,
                    suggestion_count,
                ));
                // early termination - return exact match, unless caller wants all matches
                if verbosity != Verbosity::All {
                    skip = true;
                }
            }
        }

        // early termination, if we only want to check whether the word is in
        // the dictionary or get its frequency, e.g. for word segmentation
        if max_edit_distance == 0 {
            skip = true;
        }

        if !skip {
            // deletes of the input we have already enqueued
            let mut considered_deletes: AHashSet<String> = AHashSet::new();
            // suggestions we have already measured
            let mut considered_suggestions: AHashSet<String> = AHashSet::new();
            considered_suggestions.insert(input.to_string());

            let mut max_edit_distance2 = max_edit_distance;
            let mut candidates: VecDeque<String> = VecDeque::new();

            let mut input_prefix_len = input_len;
            if input_prefix_len > self.prefix_length {
                input_prefix_len = self.prefix_length;
                candidates.push_back(text::slice(input, 0, input_prefix_len as usize));
            } else {
                candidates.push_back(input.to_string());
            }

            let mut distance_comparer = EditDistance::new(self.distance_algorithm);

            while let Some(candidate) = candidates.pop_front() {
                let candidate_len = text::len(&candidate) as i64;
                let length_diff = input_prefix_len - candidate_len;

                // save some time - early termination:
                // if candidate distance is already higher than suggestion distance, then there are no better suggestions to be expected
                if length_diff > max_edit_distance2 {
                    // skip to next candidate if Verbosity::All, look no further if Verbosity::Top or Closest
                    // (candidates are ordered by delete distance, so none are closer than the current)
                    if verbosity == Verbosity::All {
                        continue;
                    }
                    break;
                }

                // read candidate entry from the delete index
                if let Some(bucket) = self.deletes.get(prefix_hash(&candidate, self.compact_mask)) {
                    // iterate through suggestions (to other correct dictionary items) of delete item and add them to suggestion list
                    for &handle in bucket {
                        let suggestion = self.dictionary.term(handle);
                        let suggestion_len = text::len(suggestion) as i64;

                        if suggestion == input {
                            continue;
                        }

                        if (suggestion_len - input_len).abs() > max_edit_distance2 // input and sugg lengths diff > allowed/current best distance
                            || suggestion_len < candidate_len // sugg must be for a different delete string, in same bin only because of hash collision
                            || (suggestion_len == candidate_len && suggestion != candidate)
                        // if sugg len = delete len, then it either equals delete or is in same bin only because of hash collision
                        {
                            continue;
                        }

                        let sugg_prefix_len = min(suggestion_len, self.prefix_length);
                        if sugg_prefix_len > input_prefix_len
                            && sugg_prefix_len - candidate_len > max_edit_distance2
                        {
                            continue;
                        }

                        // We allow simultaneous edits (deletes) of max_edit_distance on both the dictionary and the input term.
                        // For replaces and adjacent transposes the resulting edit distance stays <= max_edit_distance.
                        // For inserts and deletes the resulting edit distance might exceed max_edit_distance.
                        // To prevent suggestions of a higher edit distance, we need to calculate the resulting edit distance, if there are simultaneous edits on both sides.
                        // Example: (bank==bnak and bank==bink, but bank!=kanb and bank!=xban and bank!=baxn for max_edit_distance=1)
                        // Two deletes on each side of a pair makes them all equal, but the first two pairs have edit distance=1, the others edit distance=2.
                        let distance;
                        if candidate_len == 0 {
                            // suggestions which have no common chars with input (input_len<=max_edit_distance && suggestion_len<=max_edit_distance)
                            distance = cmp::max(input_len, suggestion_len);
                            if distance > max_edit_distance2
                                || !considered_suggestions.insert(suggestion.to_string())
                            {
                                continue;
                            }
                        } else if suggestion_len == 1 {
                            distance = if suggestion
                                .chars()
                                .next()
                                .is_some_and(|ch| input.contains(ch))
                            {
                                input_len - 1
                            } else {
                                input_len
                            };
                            if distance > max_edit_distance2
                                || !considered_suggestions.insert(suggestion.to_string())
                            {
                                continue;
                            }
                        // number of edits in prefix == max_edit_distance AND no identical suffix:
                        // then edit distance > max_edit_distance and no need for a DP calculation
                        // (input_len >= prefix_length) && (suggestion_len >= prefix_length)
                        } else if self.has_different_suffix(
                            max_edit_distance,
                            input,
                            input_len,
                            candidate_len,
                            suggestion,
                            suggestion_len,
                        ) {
                            continue;
                        } else {
                            // delete_in_suggestion_prefix is somewhat expensive, and only pays off when verbosity is Top or Closest
                            if verbosity != Verbosity::All
                                && !delete_in_suggestion_prefix(
                                    &candidate,
                                    suggestion,
                                    self.prefix_length,
                                )
                            {
                                continue;
                            }
                            if !considered_suggestions.insert(suggestion.to_string()) {
                                continue;
                            }
                            distance =
                                distance_comparer.compare(input, suggestion, max_edit_distance2);
                            if distance < 0 {
                                continue;
                            }
                        }

                        // do not process higher distances than those already found, if verbosity < All
                        // (note: max_edit_distance2 will always equal max_edit_distance when Verbosity::All)
                        if distance <= max_edit_distance2 {
                            let suggestion_count = self.dictionary.count(handle);
                            let si = Suggestion::new(suggestion, distance, suggestion_count);

                            if !suggestions.is_empty() {
                                match verbosity {
                                    Verbosity::Closest => {
                                        // we will calculate DamLev distance only to the smallest found distance so far
                                        if distance < max_edit_distance2 {
                                            suggestions.clear();
                                        }
                                    }
                                    Verbosity::Top => {
                                        if distance < max_edit_distance2
                                            || suggestion_count > suggestions[0].count
                                        {
                                            max_edit_distance2 = distance;
                                            suggestions[0] = si;
                                        }
                                        continue;
                                    }
                                    Verbosity::All => (),
                                }
                            }

                            if verbosity != Verbosity::All {
                                max_edit_distance2 = distance;
                            }
                            suggestions.push(si);
                        }
                    }
                }

                // add edits: derive edits (deletes) from candidate (input) and add them to the candidates list
                // this is a recursive process until the maximum edit distance has been reached
                if length_diff < max_edit_distance && candidate_len <= self.prefix_length {
                    // do not create edits with edit distance smaller than suggestions already found
                    if verbosity != Verbosity::All && length_diff >= max_edit_distance2 {
                        continue;
                    }

                    for i in 0..candidate_len as usize {
                        let delete = text::remove(&candidate, i);
                        if considered_deletes.insert(delete.clone()) {
                            candidates.push_back(delete);
                        }
                    }
                }
            }

            // sort by ascending edit distance, then by descending word frequency
            if suggestions.len() > 1 {
                suggestions.sort();
            }

            if transfer_casing {
                for suggestion in &mut suggestions {
                    suggestion.term =
                        casing::transfer_casing_similar(original_input, &suggestion.term);
                }
            }
        }

        if include_unknown && suggestions.is_empty() {
            suggestions.push(Suggestion::new(original_input, max_edit_distance + 1, 0));
        }

        Ok(suggestions)
    }

    /// Find suggested spellings for a multi-word input string (supports word splitting/merging).
    ///
    /// lookup_compound supports compound aware automatic spelling correction of multi-word input strings with three cases:
    /// 1. mistakenly inserted space into a correct word led to two incorrect terms
    /// 2. mistakenly omitted space between two correct words led to one incorrect combined term
    /// 3. multiple independent input terms with/without spelling errors
    ///
    /// Returns a single suggestion holding the whole corrected line.
    pub fn lookup_compound(
        &self,
        input: &str,
        edit_distance_max: i64,
        transfer_casing: bool,
    ) -> Result<Vec<Suggestion>> {
        // parse input string into single terms
        let term_list = text::parse_words(input);

        let mut suggestions: Vec<Suggestion>; // suggestions for a single term
        let mut suggestion_parts: Vec<Suggestion> = Vec::new(); // 1 line with separate parts
        let mut distance_comparer = EditDistance::new(self.distance_algorithm);

        // translate every term to its best suggestion, otherwise it remains unchanged
        let mut last_combi = false;

        for (i, term) in term_list.iter().enumerate() {
            suggestions = self.lookup(term, Verbosity::Top, edit_distance_max, false, false)?;

            // combi check, always before split
            if i > 0 && !last_combi {
                let combined = [term_list[i - 1].as_str(), term.as_str()].join("");
                let mut suggestions_combi =
                    self.lookup(&combined, Verbosity::Top, edit_distance_max, false, false)?;

                if let (Some(combi), Some(best1)) =
                    (suggestions_combi.first_mut(), suggestion_parts.last())
                {
                    let best2 = if let Some(best) = suggestions.first() {
                        best.clone()
                    } else {
                        // unknown word: estimated edit distance and count
                        Suggestion::new(
                            term.as_str(),
                            edit_distance_max + 1,
                            estimated_word_count(text::len(term)),
                        )
                    };

                    // distance1 = edit distance between the 2 split terms and their best corrections, as comparative value for the combination
                    let distance1 = best1.distance + best2.distance;
                    if distance1 >= 0
                        && (combi.distance + 1 < distance1
                            || (combi.distance + 1 == distance1
                                && combi.count as f64
                                    > best1.count as f64 / N as f64 * best2.count as f64))
                    {
                        combi.distance += 1;
                        let merged = combi.clone();
                        if let Some(last) = suggestion_parts.last_mut() {
                            *last = merged;
                        }
                        last_combi = true;
                        continue;
                    }
                }
            }
            last_combi = false;

            let term_len = text::len(term);

            // always split terms without suggestion / never split terms with suggestion ed=0 / never split single char terms
            if suggestions
                .first()
                .is_some_and(|s| s.distance == 0 || term_len == 1)
            {
                // choose best suggestion
                suggestion_parts.push(suggestions[0].clone());
            } else {
                // if no perfect suggestion, split word into pairs
                let mut suggestion_split_best: Option<Suggestion> = suggestions.first().cloned();

                if term_len > 1 {
                    for j in 1..term_len {
                        let part1 = text::slice(term, 0, j);
                        let part2 = text::slice(term, j, term_len);

                        let suggestions1 =
                            self.lookup(&part1, Verbosity::Top, edit_distance_max, false, false)?;
                        let Some(sugg1) = suggestions1.first() else {
                            continue;
                        };
                        let suggestions2 =
                            self.lookup(&part2, Verbosity::Top, edit_distance_max, false, false)?;
                        let Some(sugg2) = suggestions2.first() else {
                            continue;
                        };

                        // select best suggestion for split pair
                        let split_term = [sugg1.term.as_str(), sugg2.term.as_str()].join(" ");
                        let compared =
                            distance_comparer.compare(term, &split_term, edit_distance_max);
                        let distance2 = if compared < 0 {
                            edit_distance_max + 1
                        } else {
                            compared
                        };

                        if let Some(best) = &suggestion_split_best {
                            if distance2 > best.distance {
                                continue;
                            }
                            if distance2 < best.distance {
                                suggestion_split_best = None;
                            }
                        }

                        let split_count = match self.bigrams.get(split_term.as_str()) {
                            // the bigram exists in the bigram dictionary
                            Some(&bigram_count) => {
                                let rejoined = [sugg1.term.as_str(), sugg2.term.as_str()].join("");
                                if let Some(best_si) = suggestions.first() {
                                    // increase count, if the split corrections are part of or identical to the input:
                                    // a single term correction exists
                                    if rejoined == *term {
                                        // make count bigger than the count of the single term correction
                                        cmp::max(bigram_count, best_si.count + 2)
                                    } else if sugg1.term == best_si.term
                                        || sugg2.term == best_si.term
                                    {
                                        // make count bigger than the count of the single term correction
                                        cmp::max(bigram_count, best_si.count + 1)
                                    } else {
                                        bigram_count
                                    }
                                // no single term correction exists
                                } else if rejoined == *term {
                                    cmp::max(
                                        bigram_count,
                                        cmp::max(sugg1.count, sugg2.count) + 2,
                                    )
                                } else {
                                    bigram_count
                                }
                            }
                            None => {
                                // The Naive Bayes probability of the word combination is the product of the two word probabilities: P(AB) = P(A) * P(B).
                                // Use it to estimate the frequency count of the combination, which then ranks/selects the best splitting variant.
                                min(
                                    self.bigram_count_min,
                                    (sugg1.count as f64 / N as f64 * sugg2.count as f64) as i64,
                                )
                            }
                        };

                        let suggestion_split = Suggestion::new(split_term, distance2, split_count);

                        match &suggestion_split_best {
                            Some(best) if suggestion_split.count <= best.count => {}
                            _ => suggestion_split_best = Some(suggestion_split),
                        }
                    }

                    if let Some(best) = suggestion_split_best {
                        // select best suggestion for split pair
                        suggestion_parts.push(best);
                    } else {
                        suggestion_parts.push(Suggestion::new(
                            term.as_str(),
                            edit_distance_max + 1,
                            estimated_word_count(term_len),
                        ));
                    }
                } else {
                    suggestion_parts.push(Suggestion::new(
                        term.as_str(),
                        edit_distance_max + 1,
                        estimated_word_count(term_len),
                    ));
                }
            }
        }

        let mut count = N as f64;
        let mut joined = String::new();
        for si in &suggestion_parts {
            joined.push_str(&si.term);
            joined.push(' ');
            count *= si.count as f64 / N as f64;
        }
        let mut joined = joined.trim_end().to_string();

        if transfer_casing && !joined.is_empty() {
            joined = casing::transfer_casing_similar(input, &joined);
        }

        let distance = distance_comparer.compare(input, &joined, i64::MAX);
        Ok(vec![Suggestion::new(joined, distance, count as i64)])
    }

    /// Divide a string into words by inserting missing spaces at the
    /// appropriate positions, using the longest dictionary word as the
    /// window limit.
    ///
    /// Misspelled words are corrected and do not affect segmentation;
    /// existing spaces are allowed and considered for optimum segmentation.
    ///
    /// word_segmentation uses a novel approach *without* recursion.
    /// While each string of length n can be segmented into 2^n-1 possible compositions
    /// <https://en.wikipedia.org/wiki/Composition_(combinatorics)>
    /// word_segmentation has a linear runtime O(n) to find the optimum composition.
    pub fn word_segmentation(&self, input: &str, max_edit_distance: i64) -> Result<Composition> {
        self.word_segmentation_with_limit(input, max_edit_distance, self.max_length())
    }

    /// [`SymSpell::word_segmentation`] with an explicit maximum word length
    /// to consider.
    pub fn word_segmentation_with_limit(
        &self,
        input: &str,
        max_edit_distance: i64,
        max_segmentation_word_length: i64,
    ) -> Result<Composition> {
        // normalize ligatures ("scientiﬁc" "ﬁelds" "ﬁnal") and remove hyphens
        let input = text::unicode_normalization_form_kc(input).replace('\u{002D}', "");
        let input = input.as_str();

        let input_len = text::len(input);
        let array_size = min(max_segmentation_word_length, input_len as i64);
        if array_size < 1 {
            return Ok(Composition::default());
        }
        let array_size = array_size as usize;

        // a ring buffer of the best composition per window offset is all
        // the O(n*W) DP needs to keep
        let mut compositions: Vec<Composition> = vec![Composition::default(); array_size];
        let mut circular_index: isize = -1;

        // outer loop (column): all possible part start positions
        for j in 0..input_len {
            // inner loop (row): all possible part lengths (from start position):
            // a part can't be bigger than the longest word in the dictionary (other than long unknown words)
            let imax = min(input_len - j, array_size);
            for i in 1..=imax {
                // get the top spelling correction for the part
                let mut part = text::slice(input, j, j + i);

                let mut separator_length: i64 = 0;
                let mut top_ed: i64 = 0;

                if part.chars().next().is_some_and(char::is_whitespace) {
                    // remove space for the edit distance calculation
                    part = text::remove(&part, 0);
                } else {
                    // add ed+1: space did not exist, had to be inserted
                    separator_length = 1;
                }

                // remove spaces from the part, add number of removed spaces to top_ed
                top_ed += text::len(&part) as i64;
                part = part.replace(' ', "");
                top_ed -= text::len(&part) as i64;

                // lookup against the lowercase term: the input casing is
                // retained in the output segmentation
                let results = self.lookup(
                    &part.to_lowercase(),
                    Verbosity::Top,
                    max_edit_distance,
                    false,
                    false,
                )?;

                let (top_result, top_prob_log) = if let Some(top) = results.first() {
                    let mut top_result = top.term.clone();
                    // retain/preserve upper case of the first letter
                    if part.chars().next().is_some_and(char::is_uppercase) {
                        let mut rest = top_result.chars();
                        if let Some(first) = rest.next() {
                            top_result = first.to_uppercase().chain(rest).collect();
                        }
                    }
                    top_ed += top.distance;

                    // Naive Bayes Rule: we assume the word probabilities of two words to be independent,
                    // therefore the resulting probability of the word combination is the product of the two word probabilities.
                    // Instead of computing the product of probabilities we compute the sum of the logarithm of probabilities,
                    // because the probabilities of words are about 10^-10 and the product of many such small numbers
                    // could underflow the floating point range and become zero. log(ab)=log(a)+log(b)
                    let prob_log = (top.count as f64 / N as f64).log10();
                    (top_result, prob_log)
                } else {
                    let part_len = text::len(&part);
                    // default, if word not found: otherwise long input text would win as one long
                    // unknown word (with ed=edmax+1), although there should be many spaces inserted
                    top_ed += part_len as i64;
                    let prob_log = (10.0 / (N as f64 * 10.0f64.powi(part_len as i32))).log10();
                    (part.clone(), prob_log)
                };

                let destination_index =
                    ((i as isize + circular_index) % array_size as isize) as usize;

                // set values in the first loop
                if j == 0 {
                    compositions[destination_index] = Composition {
                        segmented_string: part,
                        corrected_string: top_result,
                        distance_sum: top_ed,
                        prob_log_sum: top_prob_log,
                    };
                    continue;
                }

                let circular = compositions[circular_index as usize].clone();
                let destination = &compositions[destination_index];

                // replace values if the probability log sum is better at the same edit
                // distance (with or without a separator), or if the edit distance is smaller
                if i == array_size
                    || ((circular.distance_sum + top_ed == destination.distance_sum
                        || circular.distance_sum + separator_length + top_ed
                            == destination.distance_sum)
                        && destination.prob_log_sum < circular.prob_log_sum + top_prob_log)
                    || circular.distance_sum + separator_length + top_ed < destination.distance_sum
                {
                    // keep punctuation or apostrophe adjacent to the previous word
                    let glue_to_previous = (text::len(&top_result) == 1
                        && top_result
                            .chars()
                            .next()
                            .is_some_and(|ch| ch.is_ascii_punctuation()))
                        || top_result == "’";

                    compositions[destination_index] = if glue_to_previous {
                        Composition {
                            segmented_string: [circular.segmented_string.as_str(), &part].join(""),
                            corrected_string: [circular.corrected_string.as_str(), &top_result]
                                .join(""),
                            distance_sum: circular.distance_sum + top_ed,
                            prob_log_sum: circular.prob_log_sum + top_prob_log,
                        }
                    } else {
                        Composition {
                            segmented_string: [circular.segmented_string.as_str(), &part].join(" "),
                            corrected_string: [circular.corrected_string.as_str(), &top_result]
                                .join(" "),
                            distance_sum: circular.distance_sum + separator_length + top_ed,
                            prob_log_sum: circular.prob_log_sum + top_prob_log,
                        }
                    };
                }
            }

            circular_index += 1;
            if circular_index == array_size as isize {
                circular_index = 0;
            }
        }

        Ok(compositions[circular_index as usize].clone())
    }

    // Tail-mismatch fast reject. Once a candidate has spent the entire edit
    // budget inside the prefix (candidate_len == prefix_length - max_edit_distance),
    // the tails beyond the shared prefix must agree up to what a single
    // boundary transposition can still repair, otherwise the pair cannot
    // meet the bound and the DP is skipped.
    fn has_different_suffix(
        &self,
        max_edit_distance: i64,
        input: &str,
        input_len: i64,
        candidate_len: i64,
        suggestion: &str,
        suggestion_len: i64,
    ) -> bool {
        if self.prefix_length - max_edit_distance != candidate_len {
            return false;
        }

        // length of the tail both strings carry beyond the prefix
        let min_len = min(input_len, suggestion_len) - self.prefix_length;

        if min_len > 1
            && text::suffix(input, (input_len + 1 - min_len) as usize)
                != text::suffix(suggestion, (suggestion_len + 1 - min_len) as usize)
        {
            return true;
        }

        min_len > 0
            && text::at(input, (input_len - min_len) as isize)
                != text::at(suggestion, (suggestion_len - min_len) as isize)
            && (text::at(input, (input_len - min_len - 1) as isize)
                != text::at(suggestion, (suggestion_len - min_len) as isize)
                || text::at(input, (input_len - min_len) as isize)
                    != text::at(suggestion, (suggestion_len - min_len - 1) as isize))
    }
}

impl std::fmt::Display for SymSpell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SymSpell(word_count={}, entry_count={}, count_threshold={}, \
             max_dictionary_edit_distance={}, prefix_length={}, max_length={}, \
             distance_algorithm={})",
            self.word_count(),
            self.entry_count(),
            self.count_threshold,
            self.max_dictionary_edit_distance,
            self.prefix_length,
            self.max_length(),
            self.distance_algorithm,
        )
    }
}

// Norvig estimate for the count of a word missing from the dictionary:
// P = 10 / (N * 10^word_length), so C = 10 / 10^word_length.
// (Natural Language Corpus Data, page 224, http://norvig.com/ngrams/ch14.pdf)
fn estimated_word_count(term_length: usize) -> i64 {
    (10f64 / 10f64.powi(term_length as i32)) as i64
}

// Check whether all delete chars are present in the suggestion prefix in
// the correct order, otherwise this is just a hash collision.
fn delete_in_suggestion_prefix(delete: &str, suggestion: &str, prefix_length: i64) -> bool {
    let capped = min(prefix_length as usize, text::len(suggestion));
    let mut suggestion_chars = suggestion.chars().take(capped);

    'delete: for del_char in delete.chars() {
        for sugg_char in suggestion_chars.by_ref() {
            if sugg_char == del_char {
                continue 'delete;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(max_edit: i64, prefix_length: i64) -> SymSpell {
        SymSpell::new(max_edit, prefix_length, 1, 5, DistanceAlgorithm::DamerauOsa).unwrap()
    }

    #[test]
    fn new_validates_configuration() {
        assert!(SymSpell::new(-1, 7, 1, 5, DistanceAlgorithm::DamerauOsa).is_err());
        assert!(SymSpell::new(2, 2, 1, 5, DistanceAlgorithm::DamerauOsa).is_err());
        assert!(SymSpell::new(2, 0, 1, 5, DistanceAlgorithm::DamerauOsa).is_err());
        assert!(SymSpell::new(2, 7, -1, 5, DistanceAlgorithm::DamerauOsa).is_err());
        assert!(SymSpell::new(2, 7, 1, 17, DistanceAlgorithm::DamerauOsa).is_err());
        assert!(SymSpell::new(2, 7, 1, 16, DistanceAlgorithm::DamerauOsa).is_ok());
    }

    #[test]
    fn lookup_rejects_oversized_edit_distance() {
        let mut sym = engine(2, 7);
        sym.create_dictionary_entry("word", 10);
        assert!(matches!(
            sym.lookup("word", Verbosity::Top, 3, false, false),
            Err(SymSpellError::InvalidArgument(_))
        ));
    }

    #[test]
    fn lookup_on_empty_engine_returns_nothing() {
        let sym = engine(2, 7);
        let results = sym
            .lookup("anything", Verbosity::Top, 2, true, false)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn exact_match_short_circuits_for_top() {
        let mut sym = engine(2, 7);
        sym.create_dictionary_entry("apple", 100);
        sym.create_dictionary_entry("apples", 80);

        let results = sym.lookup("apple", Verbosity::Top, 2, false, false).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0], Suggestion::new("apple", 0, 100));

        // Verbosity::All keeps scanning past the exact match
        let results = sym.lookup("apple", Verbosity::All, 2, false, false).unwrap();
        assert!(results.len() > 1);
        assert_eq!(results[0], Suggestion::new("apple", 0, 100));
    }

    #[test]
    fn delete_in_suggestion_prefix_requires_ordered_membership() {
        assert!(delete_in_suggestion_prefix("ale", "apple", 7));
        assert!(delete_in_suggestion_prefix("", "apple", 7));
        assert!(!delete_in_suggestion_prefix("pal", "apple", 7));
        // chars beyond the prefix cap do not count
        assert!(!delete_in_suggestion_prefix("xyz", "abcdefxyz", 7));
    }

    #[test]
    fn display_summarizes_the_engine() {
        let mut sym = engine(2, 7);
        sym.create_dictionary_entry("word", 10);
        let shown = sym.to_string();
        assert!(shown.contains("word_count=1"));
        assert!(shown.contains("distance_algorithm=DamerauOsa"));
    }
}
