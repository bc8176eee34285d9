use crate::config::HotwordConfig;
use crate::fast_index::FastIndex;
use crate::phoneme::cost::cost;
use crate::phoneme::{phonemize, PhonemeSequence};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub hotword: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionResult {
    pub text: String,
    pub matches: Vec<MatchRecord>,
    pub similars: Vec<MatchRecord>,
}

struct Store {
    hotwords: Vec<(String, PhonemeSequence)>,
    index: FastIndex,
}

impl Store {
    fn empty() -> Self {
        Self { hotwords: Vec::new(), index: FastIndex::build(&[]) }
    }

    fn from_entries(entries: Vec<(String, PhonemeSequence)>) -> Self {
        let index = FastIndex::build(&entries);
        Self { hotwords: entries, index }
    }
}

/// Orchestrates Phonemizer + FastIndex + FuzzyMatcher: resolves overlapping
/// matches and splices replacements into text (spec §4.5).
pub struct HotwordCorrector {
    store: RwLock<Arc<Store>>,
    config: HotwordConfig,
}

struct Candidate {
    char_start: usize,
    char_end: usize,
    score: f64,
    hotword: String,
}

impl HotwordCorrector {
    pub fn new(config: HotwordConfig) -> Self {
        Self { store: RwLock::new(Arc::new(Store::empty())), config }
    }

    /// Parse lines (drop `#` comments and blanks), phonemize each, and
    /// atomically replace the hotword store. Returns the loaded count.
    pub fn load_from_str(&self, text: &str) -> usize {
        let mut entries = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let seq = phonemize(trimmed, true);
            entries.push((trimmed.to_string(), seq));
        }
        let count = entries.len();
        let store = Arc::new(Store::from_entries(entries));
        match self.store.write() {
            Ok(mut guard) => *guard = store,
            Err(poisoned) => *poisoned.into_inner() = store,
        }
        info!(count, "loaded hotwords");
        count
    }

    pub fn load_from_path(&self, path: &std::path::Path) -> usize {
        match std::fs::read_to_string(path) {
            Ok(text) => self.load_from_str(&text),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load hotword file");
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

    /// Pipeline per spec §4.5: phonemize, coarse-filter, window-score,
    /// resolve, splice.
    pub fn correct(&self, text: &str) -> CorrectionResult {
        let store = self.snapshot();
        if store.hotwords.is_empty() {
            return CorrectionResult { text: text.to_string(), matches: Vec::new(), similars: Vec::new() };
        }

        let chars: Vec<char> = text.chars().collect();
        let query = phonemize(text, true);
        if query.is_empty() {
            return CorrectionResult { text: text.to_string(), matches: Vec::new(), similars: Vec::new() };
        }

        let candidates = store.index.search(&query, self.config.fast_index_threshold, self.config.fast_index_top_k);

        let mut scored: Vec<Candidate> = Vec::new();
        for cand in &candidates {
            let hw_len = cand.phonemes.len();
            if hw_len == 0 || hw_len > query.len() {
                continue;
            }
            for start in 0..=(query.len() - hw_len) {
                if !query[start].is_word_start {
                    continue;
                }
                let window = &query[start..start + hw_len];
                let mut cost_sum = 0.0;
                for (a, b) in window.iter().zip(cand.phonemes.iter()) {
                    cost_sum += cost(a, b);
                }
                let score = 1.0 - cost_sum / hw_len as f64;
                if score < self.config.similar_threshold {
                    continue;
                }
                let char_start = window.first().unwrap().char_start;
                let char_end = window.last().unwrap().char_end;
                debug!(hotword = %cand.hotword, score, char_start, char_end, "candidate window scored");
                scored.push(Candidate { char_start, char_end, score, hotword: cand.hotword.clone() });
            }
        }

        // Resolve: accept non-overlapping matches, highest score and longest
        // span first.
        let mut accept_pool: Vec<&Candidate> =
            scored.iter().filter(|c| c.score + crate::phoneme::cost::EPSILON >= self.config.threshold).collect();
        accept_pool.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then((b.char_end - b.char_start).cmp(&(a.char_end - a.char_start)))
        });

        let mut accepted: Vec<&Candidate> = Vec::new();
        for cand in accept_pool {
            let overlaps = accepted.iter().any(|a| cand.char_start < a.char_end && a.char_start < cand.char_end);
            if !overlaps {
                accepted.push(cand);
            }
        }
        accepted.sort_by_key(|c| c.char_start);

        let mut applied: Vec<(usize, usize, MatchRecord)> = Vec::new();
        for cand in &accepted {
            let original: String = chars[cand.char_start..cand.char_end].iter().collect();
            if original == cand.hotword {
                continue;
            }
            applied.push((cand.char_start, cand.char_end, MatchRecord { hotword: cand.hotword.clone(), score: cand.score }));
        }

        let mut out_chars = chars.clone();
        for (start, end, rec) in applied.iter().rev() {
            let replacement: Vec<char> = rec.hotword.chars().collect();
            out_chars.splice(*start..*end, replacement);
        }
        let corrected: String = out_chars.into_iter().collect();

        // Similars: dedup by hotword keeping the highest score, top-K.
        // Computed independently of which candidates got applied above — a
        // hotword that was just corrected into the text can still surface
        // here if another window also scored it as a near-miss.
        let mut best_by_word: HashMap<&str, f64> = HashMap::new();
        for cand in &scored {
            let entry = best_by_word.entry(&cand.hotword).or_insert(0.0);
            if cand.score > *entry {
                *entry = cand.score;
            }
        }
        let mut similars: Vec<MatchRecord> = best_by_word
            .into_iter()
            .map(|(word, score)| MatchRecord { hotword: word.to_string(), score })
            .collect();
        similars.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        similars.truncate(self.config.top_k_similars);

        CorrectionResult {
            text: corrected,
            matches: applied.into_iter().map(|(_, _, r)| r).collect(),
            similars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> HotwordCorrector {
        HotwordCorrector::new(HotwordConfig::default())
    }

    #[test]
    fn corrects_a_misrecognized_brand_name() {
        let c = corrector();
        c.load_from_str("麦当劳");
        let result = c.correct("我想去吃买当劳");
        assert_eq!(result.text, "我想去吃麦当劳");
        assert!(result.matches.iter().any(|m| m.hotword == "麦当劳" && m.score >= 0.7));
    }

    #[test]
    fn similar_threshold_surfaces_near_miss_brand() {
        let c = corrector();
        c.load_from_str("肯德基");
        let result = c.correct("肯得鸡很好吃");
        assert!(result.text.contains("肯德基"));
    }

    #[test]
    fn empty_store_is_identity() {
        let c = corrector();
        let result = c.correct("随便什么文本");
        assert_eq!(result.text, "随便什么文本");
        assert!(result.matches.is_empty());
    }

    #[test]
    fn non_expansion_of_noise_when_nothing_similar() {
        let c = corrector();
        c.load_from_str("麦当劳");
        let result = c.correct("今天天气真好");
        assert_eq!(result.text, "今天天气真好");
    }

    #[test]
    fn skips_replacement_when_text_already_matches_hotword() {
        let c = corrector();
        c.load_from_str("麦当劳");
        let result = c.correct("我要去麦当劳吃饭");
        assert_eq!(result.text, "我要去麦当劳吃饭");
        assert!(result.matches.is_empty());
    }

    #[test]
    fn comments_and_blanks_are_dropped_on_load() {
        let c = corrector();
        let count = c.load_from_str("# comment\n麦当劳\n\n肯德基\n");
        assert_eq!(count, 2);
    }
}
