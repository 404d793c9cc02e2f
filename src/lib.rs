/*!

Spelling correction & word segmentation based on the Symmetric Delete spelling correction algorithm.

#### Single word spelling correction

```rust
use symspell_core::{DistanceAlgorithm, SymSpell, Verbosity};

let max_edit_distance_dictionary = 2; // maximum edit distance per dictionary precalculation
let mut symspell = SymSpell::new(max_edit_distance_dictionary, 7, 1, 5, DistanceAlgorithm::DamerauOsa).unwrap();

// a frequency dictionary can also be loaded from a file with load_dictionary
symspell.create_dictionary_entry("house", 231_310_420);
symspell.create_dictionary_entry("hours", 34_222_560);

// lookup suggestions for single-word input strings
let input_term = "hous";
let suggestion_verbosity = Verbosity::Closest; // Top, Closest, All
let max_edit_distance_lookup = 1; // max edit distance per lookup (<= dictionary precalculation)
let suggestions = symspell.lookup(input_term, suggestion_verbosity, max_edit_distance_lookup, false, false).unwrap();
// display suggestions, edit distance and term frequency
println!("{:?}", suggestions);
assert_eq!(suggestions[0].term, "house");
```

#### Compound aware multi-word spelling correction

```rust
use symspell_core::{SymSpell, Verbosity};

let mut symspell = SymSpell::default();

for (term, count) in [("where", 12_000), ("is", 26_000), ("the", 92_000), ("love", 8_000)] {
    symspell.create_dictionary_entry(term, count);
}
// bigram evidence improves splitting/merging quality
symspell.load_bigram_dictionary_reader("where is 5200\nis the 8700\nthe love 890\n".as_bytes(), 0, 2, " ");

// lookup suggestions for multi-word input strings (supports compound splitting & merging)
let compound_suggestions = symspell.lookup_compound("whereis th elove", 2, false).unwrap();
assert_eq!(compound_suggestions[0].term, "where is the love");
```

#### Word segmentation of noisy text

```rust
use symspell_core::SymSpell;

let mut symspell = SymSpell::default();
for (term, count) in [("the", 92_000), ("quick", 3_400), ("brown", 2_500), ("fox", 1_900)] {
    symspell.create_dictionary_entry(term, count);
}

// word segmentation and correction for multi-word input strings with/without spaces
let result = symspell.word_segmentation("thequickbrownfox", 0).unwrap();
assert_eq!(result.corrected_string, "the quick brown fox");
```

#### Serialization

```rust
use symspell_core::SymSpell;

let mut symspell = SymSpell::default();
symspell.create_dictionary_entry("house", 231_310_420);

// the precalculated delete index round-trips with the dictionary
let bytes = symspell.to_bytes().unwrap();
let restored = SymSpell::from_bytes(&bytes).unwrap();
assert_eq!(restored.word_count(), 1);
```

*/

mod casing;
mod dictionary;
mod distance;
mod error;
mod index;
mod serialization;
mod symspell;
mod text;

pub use casing::{transfer_casing_for_matching_text, transfer_casing_for_similar_text};
pub use distance::{DistanceAlgorithm, EditDistance};
pub use error::SymSpellError;
pub use symspell::{
    Composition, Suggestion, SymSpell, Verbosity, DEFAULT_COMPACT_LEVEL, DEFAULT_COUNT_THRESHOLD,
    DEFAULT_MAX_EDIT_DISTANCE, DEFAULT_PREFIX_LENGTH,
};
pub use text::{parse_words, unicode_normalization_form_kc};
