//! Rectification-history RAG (spec §4.9): mine wrong⇒right sentence pairs
//! into retrievable phoneme fragments for LLM context.

use crate::config::RectificationConfig;
use crate::fuzzy_matcher::fuzzy_substring_distance;
use crate::phoneme::{phonemize, Lang, PhonemeSequence};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    phonemes: PhonemeSequence,
}

#[derive(Debug, Clone)]
struct Record {
    wrong: String,
    right: String,
    fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectifyMatch {
    pub wrong: String,
    pub right: String,
    pub score: f64,
}

/// Word-boundary token span: CJK per character, ASCII-alnum runs further
/// broken on case transitions (mirrors Phonemizer's own tokenization,
/// spec §4.1).
fn tokenize(s: &str) -> Vec<(usize, usize)> {
    let chars: Vec<char> = s.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
            spans.push((i, i + 1));
            i += 1;
            continue;
        }
        if c.is_ascii_alphanumeric() {
            let start = i;
            let mut j = i + 1;
            let mut prev_kind = ascii_kind(c);
            while j < chars.len() && chars[j].is_ascii_alphanumeric() {
                let kind = ascii_kind(chars[j]);
                if kind != prev_kind {
                    break;
                }
                prev_kind = kind;
                j += 1;
            }
            spans.push((start, j));
            i = j;
            continue;
        }
        i += 1;
    }
    spans
}

fn ascii_kind(c: char) -> u8 {
    if c.is_ascii_digit() {
        0
    } else if c.is_ascii_lowercase() {
        1
    } else {
        2
    }
}

/// Longest-common-subsequence-based opcode extraction (spec §4.9): diff the
/// wrong/right token sequences and collect the raw text slice for each
/// non-equal opcode.
fn diff_fragments(wrong: &str, right: &str) -> Vec<String> {
    let wrong_chars: Vec<char> = wrong.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    let wrong_spans = tokenize(wrong);
    let right_spans = tokenize(right);

    let wrong_tokens: Vec<String> = wrong_spans.iter().map(|&(s, e)| wrong_chars[s..e].iter().collect()).collect();
    let right_tokens: Vec<String> = right_spans.iter().map(|&(s, e)| right_chars[s..e].iter().collect()).collect();

    let n = wrong_tokens.len();
    let m = right_tokens.len();
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if wrong_tokens[i - 1] == right_tokens[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    // Backtrack to opcodes, collecting contiguous non-equal runs.
    let mut i = n;
    let mut j = m;
    let mut wrong_run_end: Option<usize> = None;
    let mut right_run_end: Option<usize> = None;
    let mut fragments = Vec::new();

    let flush = |wrong_run_end: &mut Option<usize>,
                 right_run_end: &mut Option<usize>,
                 wrong_start: usize,
                 right_start: usize,
                 fragments: &mut Vec<String>| {
        if let Some(we) = wrong_run_end.take() {
            if we > wrong_start {
                fragments.push(wrong_chars[wrong_spans[wrong_start].0..wrong_spans[we - 1].1].iter().collect());
            }
        }
        if let Some(re) = right_run_end.take() {
            if re > right_start {
                fragments.push(right_chars[right_spans[right_start].0..right_spans[re - 1].1].iter().collect());
            }
        }
    };

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && wrong_tokens[i - 1] == right_tokens[j - 1] {
            flush(&mut wrong_run_end, &mut right_run_end, i, j, &mut fragments);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            if right_run_end.is_none() {
                right_run_end = Some(j);
            }
            j -= 1;
        } else if i > 0 {
            if wrong_run_end.is_none() {
                wrong_run_end = Some(i);
            }
            i -= 1;
        }
    }
    flush(&mut wrong_run_end, &mut right_run_end, 0, 0, &mut fragments);
    fragments.reverse();

    let mut seen = std::collections::HashSet::new();
    fragments.retain(|f| seen.insert(f.clone()));
    fragments
}

fn expand_fragment(source: &str, fragment: &str, expand_words: usize) -> String {
    let Some(byte_idx) = source.find(fragment) else { return fragment.to_string() };
    let spans = tokenize(source);
    let chars: Vec<char> = source.chars().collect();
    let char_idx = source[..byte_idx].chars().count();
    let frag_len = fragment.chars().count();

    let Some(start_tok) = spans.iter().position(|&(s, _)| s == char_idx) else { return fragment.to_string() };
    let Some(end_tok) = spans.iter().position(|&(_, e)| e == char_idx + frag_len) else { return fragment.to_string() };

    let new_start_tok = start_tok.saturating_sub(expand_words);
    let new_end_tok = (end_tok + expand_words).min(spans.len() - 1);
    let (from, _) = spans[new_start_tok];
    let (_, to) = spans[new_end_tok];
    chars[from..to].iter().collect()
}

struct Store {
    records: Vec<Record>,
}

/// Loads wrong⇒right records, diffs into fragments, retrieves
/// phoneme-matched records for a query (spec §4.9).
pub struct RectificationRAG {
    store: RwLock<Arc<Store>>,
    config: RectificationConfig,
}

impl RectificationRAG {
    pub fn new(config: RectificationConfig) -> Self {
        Self { store: RwLock::new(Arc::new(Store { records: Vec::new() })), config }
    }

    /// File is UTF-8, records separated by lines equal to `---`; within a
    /// record, `#`-prefixed and blank lines are ignored; the first two
    /// content lines are `wrong`, `right` (spec §4.9, §6).
    pub fn load_from_str(&self, text: &str) -> usize {
        let mut records = Vec::new();
        for block in text.split("\n---\n").flat_map(|b| b.split("---")) {
            let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#'));
            let Some(wrong) = lines.next() else { continue };
            let Some(right) = lines.next() else { continue };
            let raw_fragments = diff_fragments(wrong, right);

            let mut fragments = Vec::new();
            let mut seen_text = std::collections::HashSet::new();
            for raw in raw_fragments {
                let phonemes = phonemize(&raw, true);
                let has_non_zh = phonemes.iter().any(|p| p.lang != Lang::Zh);
                let final_text = if has_non_zh || phonemes.len() >= self.config.zh_min_phonemes {
                    raw.clone()
                } else {
                    let source = if wrong.contains(&raw) { wrong } else { right };
                    expand_fragment(source, &raw, self.config.expand_words)
                };
                if seen_text.insert(final_text.clone()) {
                    let final_phonemes = phonemize(&final_text, true);
                    fragments.push(Fragment { text: final_text, phonemes: final_phonemes });
                }
            }

            // A diff with no extractable fragment (e.g. wrong == right)
            // would otherwise leave the record permanently unmatchable in
            // search(); fall back to the whole wrong sentence as a fragment.
            if fragments.is_empty() {
                fragments.push(Fragment { text: wrong.to_string(), phonemes: phonemize(wrong, true) });
            }

            records.push(Record { wrong: wrong.to_string(), right: right.to_string(), fragments });
        }

        let count = records.len();
        let arc = Arc::new(Store { records });
        match self.store.write() {
            Ok(mut guard) => *guard = arc,
            Err(poisoned) => *poisoned.into_inner() = arc,
        }
        info!(count, "loaded rectification records");
        count
    }

    pub fn load_from_path(&self, path: &std::path::Path) -> usize {
        match std::fs::read_to_string(path) {
            Ok(text) => self.load_from_str(&text),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load rectification file");
                0
            }
        }
    }

    fn snapshot(&self) -> Arc<Store> {
        match self.store.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// `search(query_text, top_k)` per spec §4.9.
    pub fn search(&self, query_text: &str, top_k: usize) -> Vec<RectifyMatch> {
        let store = self.snapshot();
        let query = phonemize(query_text, true);
        let mut results: Vec<RectifyMatch> = Vec::new();

        for record in &store.records {
            let mut best = 0.0f64;
            for frag in &record.fragments {
                if frag.phonemes.is_empty() {
                    continue;
                }
                let dist = fuzzy_substring_distance(&frag.phonemes, &query);
                let score = (1.0 - dist / frag.phonemes.len() as f64).max(0.0);
                if score > best {
                    best = score;
                }
            }
            if best + crate::phoneme::cost::EPSILON >= self.config.threshold {
                results.push(RectifyMatch {
                    wrong: record.wrong.clone(),
                    right: record.right.clone(),
                    score: (best * 1000.0).round() / 1000.0,
                });
            }
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        results
    }

    /// `format_prompt(query, top_k, prefix)` per spec §4.9.
    pub fn format_prompt(&self, query: &str, top_k: usize, prefix: &str) -> String {
        let matches = self.search(query, top_k);
        if matches.is_empty() {
            return String::new();
        }
        let mut out = prefix.to_string();
        for m in matches {
            out.push_str(&format!("\n- {} => {}", m.wrong, m.right));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectification_rag_scenario_from_spec() {
        let rag = RectificationRAG::new(RectificationConfig { threshold: 0.4, zh_min_phonemes: 4, expand_words: 1 });
        rag.load_from_str("Cloud Code 很好用\nClaude Code 很好用");
        let results = rag.search("我用Cloud Code", 5);
        assert!(results.iter().any(|r| r.wrong == "Cloud Code 很好用" && r.right == "Claude Code 很好用"));
    }

    #[test]
    fn separator_records_are_loaded() {
        let rag = RectificationRAG::new(RectificationConfig::default());
        let count = rag.load_from_str("科大迅飞\n科大讯飞\n---\n买当劳\n麦当劳\n");
        assert_eq!(count, 2);
    }

    #[test]
    fn monotonicity_raising_threshold_cannot_increase_results() {
        let low = RectificationRAG::new(RectificationConfig { threshold: 0.1, zh_min_phonemes: 4, expand_words: 1 });
        let high = RectificationRAG::new(RectificationConfig { threshold: 0.9, zh_min_phonemes: 4, expand_words: 1 });
        let text = "科大迅飞\n科大讯飞\n---\n买当劳\n麦当劳\n";
        low.load_from_str(text);
        high.load_from_str(text);
        assert!(high.search("科大迅飞", 10).len() <= low.search("科大迅飞", 10).len());
    }

    #[test]
    fn identical_wrong_and_right_still_matches_on_whole_sentence() {
        let rag = RectificationRAG::new(RectificationConfig { threshold: 0.4, zh_min_phonemes: 4, expand_words: 1 });
        rag.load_from_str("麦当劳很好吃\n麦当劳很好吃\n");
        let results = rag.search("麦当劳很好吃", 5);
        assert!(results.iter().any(|r| r.wrong == "麦当劳很好吃"));
    }

    #[test]
    fn empty_store_returns_no_results() {
        let rag = RectificationRAG::new(RectificationConfig::default());
        assert!(rag.search("anything", 5).is_empty());
        assert_eq!(rag.format_prompt("anything", 5, "hints:"), "");
    }
}
