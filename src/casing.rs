// Letter-case transfer between a cased source and an uncased correction.
//
// The similar-text variant aligns the lowercased source against the target
// with a Ratcliff/Obershelp sequence matcher and applies per-opcode rules,
// so casing survives corrections that insert, drop or replace characters.

use crate::error::{Result, SymSpellError};
use ahash::AHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

#[derive(Debug, Clone, Copy)]
struct Opcode {
    tag: OpTag,
    i1: usize,
    i2: usize,
    j1: usize,
    j2: usize,
}

// Longest matching block in a[alo..ahi] / b[blo..bhi], favoring the
// earliest match like difflib does.
fn longest_match(
    a: &[char],
    b2j: &AHashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best_i = alo;
    let mut best_j = blo;
    let mut best_size = 0usize;
    let mut j2len: AHashMap<usize, usize> = AHashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut new_j2len: AHashMap<usize, usize> = AHashMap::new();
        if let Some(indices) = b2j.get(ch) {
            for &j in indices {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev).copied())
                    .unwrap_or(0)
                    + 1;
                new_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = new_j2len;
    }

    (best_i, best_j, best_size)
}

fn matching_blocks(a: &[char], b: &[char]) -> Vec<(usize, usize, usize)> {
    let mut b2j: AHashMap<char, Vec<usize>> = AHashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut queue = vec![(0usize, a.len(), 0usize, b.len())];
    let mut blocks = Vec::new();
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k > 0 {
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
    }
    blocks.sort_unstable();

    // collapse adjacent blocks
    let mut merged: Vec<(usize, usize, usize)> = Vec::with_capacity(blocks.len() + 1);
    for (i, j, k) in blocks {
        match merged.last_mut() {
            Some(last) if last.0 + last.2 == i && last.1 + last.2 == j => last.2 += k,
            _ => merged.push((i, j, k)),
        }
    }
    merged.push((a.len(), b.len(), 0));
    merged
}

fn opcodes(a: &[char], b: &[char]) -> Vec<Opcode> {
    let mut ops = Vec::new();
    let mut i = 0usize;
    let mut j = 0usize;
    for (ai, bj, size) in matching_blocks(a, b) {
        let tag = match (i < ai, j < bj) {
            (true, true) => Some(OpTag::Replace),
            (true, false) => Some(OpTag::Delete),
            (false, true) => Some(OpTag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            ops.push(Opcode {
                tag,
                i1: i,
                i2: ai,
                j1: j,
                j2: bj,
            });
        }
        if size > 0 {
            ops.push(Opcode {
                tag: OpTag::Equal,
                i1: ai,
                i2: ai + size,
                j1: bj,
                j2: bj + size,
            });
        }
        i = ai + size;
        j = bj + size;
    }
    ops
}

fn push_upper(out: &mut String, ch: char) {
    out.extend(ch.to_uppercase());
}

fn push_lower(out: &mut String, ch: char) {
    out.extend(ch.to_lowercase());
}

// Equal-length char-wise transfer, callers have validated lengths.
fn transfer_matching(w_casing: &[char], wo_casing: &[char], out: &mut String) {
    for (w, wo) in w_casing.iter().zip(wo_casing.iter()) {
        if w.is_uppercase() {
            push_upper(out, *wo);
        } else {
            push_lower(out, *wo);
        }
    }
}

// Assumes both inputs are non-empty.
pub(crate) fn transfer_casing_similar(text_w_casing: &str, text_wo_casing: &str) -> String {
    let cased: Vec<char> = text_w_casing.chars().collect();
    let cased_lower: Vec<char> = text_w_casing.to_lowercase().chars().collect();
    let uncased: Vec<char> = text_wo_casing.chars().collect();

    let mut response = String::with_capacity(text_wo_casing.len());
    for op in opcodes(&cased_lower, &uncased) {
        match op.tag {
            OpTag::Equal => {
                // the cased text and the lowercase alignment share offsets
                // only while lowercasing is 1:1, which holds for the
                // dictionary languages this engine targets
                response.extend(cased[op.i1.min(cased.len())..op.i2.min(cased.len())].iter());
            }
            OpTag::Delete => {}
            OpTag::Insert => {
                // inserted at a word boundary: mimic the casing of the
                // following cased char, otherwise of the preceding one
                let upper = if op.i1 == 0 || cased.get(op.i1 - 1) == Some(&' ') {
                    cased.get(op.i1).is_some_and(|c| c.is_uppercase())
                } else {
                    cased[op.i1 - 1].is_uppercase()
                };
                for &ch in &uncased[op.j1..op.j2] {
                    if upper {
                        push_upper(&mut response, ch);
                    } else {
                        push_lower(&mut response, ch);
                    }
                }
            }
            OpTag::Replace => {
                let w = &cased[op.i1.min(cased.len())..op.i2.min(cased.len())];
                let wo = &uncased[op.j1..op.j2];
                if w.len() == wo.len() {
                    transfer_matching(w, wo, &mut response);
                } else {
                    // char-wise over the shared prefix, then keep the last
                    // seen casing for the remainder
                    let mut last_upper = false;
                    for (idx, &ch) in wo.iter().enumerate() {
                        if idx < w.len() {
                            last_upper = w[idx].is_uppercase();
                        }
                        if last_upper {
                            push_upper(&mut response, ch);
                        } else {
                            push_lower(&mut response, ch);
                        }
                    }
                }
            }
        }
    }
    response
}

/// Transfer casing char-by-char between two equal-length strings.
pub fn transfer_casing_for_matching_text(
    text_w_casing: &str,
    text_wo_casing: &str,
) -> Result<String> {
    let w: Vec<char> = text_w_casing.chars().collect();
    let wo: Vec<char> = text_wo_casing.chars().collect();
    if w.len() != wo.len() {
        return Err(SymSpellError::InvalidArgument(
            "transfer_casing_for_matching_text requires equal-length inputs; \
             use transfer_casing_for_similar_text instead"
                .to_string(),
        ));
    }
    let mut out = String::with_capacity(text_wo_casing.len());
    transfer_matching(&w, &wo, &mut out);
    Ok(out)
}

/// Transfer casing between two similar strings of possibly different
/// lengths, e.g. an original input and its spelling correction.
pub fn transfer_casing_for_similar_text(
    text_w_casing: &str,
    text_wo_casing: &str,
) -> Result<String> {
    if text_wo_casing.is_empty() {
        return Ok(String::new());
    }
    if text_w_casing.is_empty() {
        return Err(SymSpellError::InvalidArgument(
            "text_w_casing is required to know what casing to transfer".to_string(),
        ));
    }
    Ok(transfer_casing_similar(text_w_casing, text_wo_casing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_text_copies_case_charwise() {
        assert_eq!(
            transfer_casing_for_matching_text("SaMpLe", "letter").unwrap(),
            "LeTtEr"
        );
        assert!(transfer_casing_for_matching_text("short", "longer").is_err());
    }

    #[test]
    fn similar_text_equal_strings() {
        assert_eq!(
            transfer_casing_for_similar_text("Hello World", "hello world").unwrap(),
            "Hello World"
        );
    }

    #[test]
    fn similar_text_with_deletion() {
        assert_eq!(
            transfer_casing_for_similar_text("HELLLO", "hello").unwrap(),
            "HELLO"
        );
    }

    #[test]
    fn similar_text_with_insertion_follows_neighbor_casing() {
        assert_eq!(
            transfer_casing_for_similar_text("New York", "new yorkers").unwrap(),
            "New Yorkers"
        );
        assert_eq!(
            transfer_casing_for_similar_text("WETHER", "weather").unwrap(),
            "WEATHER"
        );
    }

    #[test]
    fn similar_text_unequal_replace_keeps_last_casing() {
        assert_eq!(
            transfer_casing_for_similar_text("aB", "xyz").unwrap(),
            "xYZ"
        );
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(transfer_casing_for_similar_text("ABC", "").unwrap(), "");
        assert!(transfer_casing_for_similar_text("", "abc").is_err());
    }

    #[test]
    fn similar_text_handles_multichar_case_mappings() {
        let source = "STRASSE BERLIN";
        let target = "strasse berlin";
        assert_eq!(
            transfer_casing_for_similar_text(source, target).unwrap(),
            "STRASSE BERLIN"
        );
    }
}
