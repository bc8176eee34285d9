//! Inverted index over phoneme codes: a coarse, cheap filter that shortlists
//! hotword candidates before the precise DP matcher runs (spec §4.3).

use crate::phoneme::PhonemeSequence;
use std::collections::HashMap;

/// Encodes phoneme atom values to compact integer codes, assigned
/// monotonically on first sight. Built once per hotword-store snapshot;
/// readers see an immutable mapping (spec §5).
#[derive(Debug, Default, Clone)]
pub struct CodeTable {
    codes: HashMap<String, u32>,
    next: u32,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or allocate a code for `value`.
    pub fn intern(&mut self, value: &str) -> u32 {
        if let Some(&c) = self.codes.get(value) {
            return c;
        }
        let c = self.next;
        self.next += 1;
        self.codes.insert(value.to_string(), c);
        c
    }

    /// Look up a code without allocating; `None` for an unseen value.
    pub fn get(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    pub fn encode(&mut self, seq: &PhonemeSequence) -> Vec<u32> {
        seq.iter().map(|p| self.intern(&p.value)).collect()
    }

    pub fn encode_readonly(&self, seq: &PhonemeSequence) -> Vec<u32> {
        seq.iter().filter_map(|p| self.get(&p.value)).collect()
    }
}

/// A hotword entry's code array plus the characters it was matched against,
/// used after retrieval to run the precise boundary-constrained matcher.
#[derive(Debug, Clone)]
pub struct IndexedHotword {
    pub hotword: String,
    pub codes: Vec<u32>,
    pub phonemes: PhonemeSequence,
}

#[derive(Debug, Default, Clone)]
pub struct FastIndex {
    codes: CodeTable,
    /// code -> candidate indices into `entries`
    index: HashMap<u32, Vec<usize>>,
    entries: Vec<IndexedHotword>,
}

impl FastIndex {
    pub fn build(hotwords: &[(String, PhonemeSequence)]) -> Self {
        let mut codes = CodeTable::new();
        let mut entries = Vec::with_capacity(hotwords.len());
        let mut index: HashMap<u32, Vec<usize>> = HashMap::new();

        for (word, seq) in hotwords {
            let full_codes = codes.encode(seq);
            let idx = entries.len();
            for &c in full_codes.iter().take(2) {
                index.entry(c).or_default().push(idx);
            }
            entries.push(IndexedHotword {
                hotword: word.clone(),
                codes: full_codes,
                phonemes: seq.clone(),
            });
        }

        Self { codes, index, entries }
    }

    /// Coarse filter: return up to `top_k` candidates by exact-code distance
    /// score, keeping only those scoring at least `threshold` (spec §4.3
    /// rule 4).
    pub fn search(&self, query: &PhonemeSequence, threshold: f64, top_k: usize) -> Vec<&IndexedHotword> {
        let query_codes = self.codes.encode_readonly(query);
        if query_codes.is_empty() {
            return Vec::new();
        }
        let mut unique_codes: Vec<u32> = query_codes.clone();
        unique_codes.sort_unstable();
        unique_codes.dedup();

        let mut seen = std::collections::HashSet::new();
        let mut scored: Vec<(f64, usize)> = Vec::new();

        for code in &unique_codes {
            let Some(candidates) = self.index.get(code) else { continue };
            for &idx in candidates {
                if !seen.insert(idx) {
                    continue;
                }
                let entry = &self.entries[idx];
                if entry.codes.len() > query_codes.len() + 3 {
                    continue;
                }
                let dist = code_distance(&entry.codes, &query_codes);
                let score = if entry.codes.is_empty() {
                    0.0
                } else {
                    1.0 - dist as f64 / entry.codes.len() as f64
                };
                if score >= threshold {
                    scored.push((score, idx));
                }
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(_, idx)| &self.entries[idx])
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plain Levenshtein distance over integer code arrays, exact-only cost
/// (substitution cost is 1 unless codes are equal) — the cheap pure-code
/// distance used by the coarse filter.
fn code_distance(a: &[u32], b: &[u32]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let sub = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + sub);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::phonemize;

    #[test]
    fn finds_candidate_sharing_first_codes() {
        let hotwords = vec![("麦当劳".to_string(), phonemize("麦当劳", true))];
        let index = FastIndex::build(&hotwords);
        let query = phonemize("买当劳", true);
        let results = index.search(&query, 0.0, 100);
        assert!(results.iter().any(|r| r.hotword == "麦当劳"));
    }

    #[test]
    fn rejects_candidates_much_longer_than_query() {
        let hotwords = vec![("一二三四五六七八九十".to_string(), phonemize("一二三四五六七八九十", true))];
        let index = FastIndex::build(&hotwords);
        let query = phonemize("一", true);
        let results = index.search(&query, 0.0, 100);
        assert!(results.is_empty());
    }

    #[test]
    fn filters_out_candidates_below_threshold() {
        let hotwords = vec![("麦当劳".to_string(), phonemize("麦当劳", true))];
        let index = FastIndex::build(&hotwords);
        let query = phonemize("买当劳", true);
        let results = index.search(&query, 0.99, 100);
        assert!(results.is_empty());
    }
}
