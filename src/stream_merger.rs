//! Streaming text merger (spec §4.10): deduplicate overlapping text between
//! successive streaming ASR chunks using fuzzy-tolerant suffix/prefix
//! matching. Owned by exactly one connection; no internal locking (spec §5).

use crate::config::StreamMergerConfig;
use strsim::levenshtein;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub len: usize,
    pub exact: bool,
}

pub struct StreamMerger {
    buffer: String,
    config: StreamMergerConfig,
}

fn char_suffix(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}

fn char_prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn drop_prefix_chars(s: &str, n: usize) -> String {
    s.chars().skip(n).collect()
}

impl StreamMerger {
    pub fn new(config: StreamMergerConfig) -> Self {
        Self { buffer: String::new(), config }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// `find_overlap(old, new)` per spec §4.10: maximal exact suffix/prefix
    /// match first, then fuzzy (bounded edit distance) fallback.
    pub fn find_overlap(&self, old: &str, new: &str) -> Overlap {
        let m = char_len(old).min(char_len(new)).min(self.config.max_overlap_check);
        if m == 0 {
            return Overlap { len: 0, exact: false };
        }

        let exact_max = m.min(self.config.overlap_chars);
        for l in (1..=exact_max).rev() {
            if char_suffix(old, l) == char_prefix(new, l) {
                return Overlap { len: l, exact: true };
            }
        }

        for l in (2..=self.config.overlap_chars).rev() {
            if char_len(old) >= l && char_len(new) >= l {
                let dist = levenshtein(&char_suffix(old, l), &char_prefix(new, l));
                if dist <= self.config.error_tolerance {
                    return Overlap { len: l, exact: false };
                }
            }
        }

        Overlap { len: 0, exact: false }
    }

    /// `merge(new)` per spec §4.10: append the non-overlapping suffix of
    /// `new` to the buffer and return that delta.
    pub fn merge(&mut self, new: &str) -> String {
        if new.is_empty() {
            return String::new();
        }
        if self.buffer.is_empty() {
            self.buffer = new.to_string();
            return new.to_string();
        }
        let overlap = self.find_overlap(&self.buffer, new);
        let delta = drop_prefix_chars(new, overlap.len);
        self.buffer.push_str(&delta);
        delta
    }

    fn common_prefix_len(a: &str, b: &str) -> usize {
        a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
    }

    /// `merge_final(final_text)` per spec §4.10: two-arm policy, preserving
    /// the documented double-count risk in the second arm (spec §9).
    pub fn merge_final(&mut self, final_text: &str) -> String {
        let buf_len = char_len(&self.buffer);
        let final_len = char_len(final_text);

        if buf_len == 0 || final_len as f64 >= 0.8 * buf_len as f64 {
            self.buffer = final_text.to_string();
            return self.buffer.clone();
        }

        let c = Self::common_prefix_len(&self.buffer, final_text);
        if c > 0 {
            let remainder = drop_prefix_chars(&self.buffer, c);
            if !final_text.ends_with(remainder.as_str()) {
                self.buffer = format!("{final_text}{remainder}");
                return self.buffer.clone();
            }
        }
        self.buffer = final_text.to_string();
        self.buffer.clone()
    }

    /// Long-audio chunk-stitching alternative (spec §4.10): `rfind` over a
    /// tail window of `prev`, decreasing the candidate match length until a
    /// match is found anywhere in the window (not just at its boundary),
    /// permitting skipping up to `max_skip_new` leading noise characters in
    /// `new`; exact first, then fuzzy with `error_tolerance`. Truncates the
    /// buffer at the match position, discarding any trailing junk. Leading
    /// punctuation in `new` and trailing punctuation in the buffer are
    /// stripped only for the matching view, not from the stitched output.
    pub fn merge_by_text(&mut self, new: &str) -> String {
        if new.is_empty() {
            return String::new();
        }
        if self.buffer.is_empty() {
            self.buffer = new.to_string();
            return new.to_string();
        }

        let prev_chars: Vec<char> = self.buffer.chars().collect();
        let mut prev_clean_len = prev_chars.len();
        while prev_clean_len > 0 && is_merge_punctuation(prev_chars[prev_clean_len - 1]) {
            prev_clean_len -= 1;
        }
        let prev_clean = &prev_chars[..prev_clean_len];

        let new_chars: Vec<char> = new.chars().collect();
        let mut new_match_start = 0;
        while new_match_start < new_chars.len() && is_merge_punctuation(new_chars[new_match_start]) {
            new_match_start += 1;
        }
        let new_clean = &new_chars[new_match_start..];

        if prev_clean.is_empty() || new_clean.is_empty() {
            self.buffer.push_str(new);
            return new.to_string();
        }

        let overlap_chars = self.config.overlap_chars;
        let window_offset = if overlap_chars == 0 { 0 } else { prev_clean.len().saturating_sub(overlap_chars) };
        let search_window = &prev_clean[window_offset..];

        let max_to_check = search_window.len().min(new_clean.len());
        let min_exact_len = 2usize;
        let error_tolerance = self.config.error_tolerance;
        let min_fuzzy_len = error_tolerance + 2;

        let mut found: Option<(usize, usize, usize)> = None; // (skip_new, pos_in_window, match_len)

        if max_to_check >= min_exact_len {
            'exact: for match_len in (min_exact_len..=max_to_check).rev() {
                let max_skip = self.config.max_skip_new.min(new_clean.len() - match_len);
                for skip_new in 0..=max_skip {
                    let target = &new_clean[skip_new..skip_new + match_len];
                    if let Some(idx) = rfind_subslice(search_window, target) {
                        found = Some((skip_new, idx, match_len));
                        break 'exact;
                    }
                }
            }
        }

        if found.is_none() && error_tolerance > 0 && max_to_check >= min_fuzzy_len {
            'fuzzy: for match_len in (min_fuzzy_len..=max_to_check).rev() {
                let max_skip = self.config.max_skip_new.min(new_clean.len() - match_len);
                for skip_new in 0..=max_skip {
                    let target = &new_clean[skip_new..skip_new + match_len];
                    if search_window.len() >= match_len {
                        let mut pos = None;
                        for i in (0..=search_window.len() - match_len).rev() {
                            if fuzzy_match_chars(&search_window[i..i + match_len], target, error_tolerance) {
                                pos = Some(i);
                                break;
                            }
                        }
                        if let Some(idx) = pos {
                            found = Some((skip_new, idx, match_len));
                            break 'fuzzy;
                        }
                    }
                }
            }
        }

        if let Some((skip_new, pos_in_window, _)) = found {
            let keep_prev_len = window_offset + pos_in_window;
            let res_prev: String = prev_clean[..keep_prev_len].iter().collect();
            let res_new: String = new_chars[new_match_start + skip_new..].iter().collect();
            self.buffer = format!("{res_prev}{res_new}");
            return res_new;
        }

        self.buffer.push_str(new);
        new.to_string()
    }
}

fn is_merge_punctuation(c: char) -> bool {
    " \t\r\n,.?!:;()[]{}<>\"'`，。？！：；、（）【】《》〈〉「」『』“”‘’…—".contains(c)
}

fn fuzzy_match_chars(a: &[char], b: &[char], max_errors: usize) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut errors = 0;
    for (ca, cb) in a.iter().zip(b.iter()) {
        if ca != cb {
            errors += 1;
            if errors > max_errors {
                return false;
            }
        }
    }
    true
}

fn rfind_subslice(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&start| &haystack[start..start + needle.len()] == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merger() -> StreamMerger {
        StreamMerger::new(StreamMergerConfig { overlap_chars: 5, error_tolerance: 1, max_overlap_check: 20, max_skip_new: 3 })
    }

    #[test]
    fn streaming_scenario_from_spec() {
        let mut m = merger();
        let d1 = m.merge("今天天气");
        let d2 = m.merge("天气很好");
        let d3 = m.merge("很好明天见");
        assert_eq!(m.buffer(), "今天天气很好明天见");
        assert_eq!(d1, "今天天气");
        assert_eq!(d2, "很好");
        assert_eq!(d3, "明天见");
    }

    #[test]
    fn monotonicity_buffer_never_shortens() {
        let mut m = merger();
        let mut prev_len = 0;
        for chunk in ["今天", "天天气", "气很好"] {
            m.merge(chunk);
            assert!(char_len(m.buffer()) >= prev_len);
            prev_len = char_len(m.buffer());
        }
    }

    #[test]
    fn empty_new_returns_empty() {
        let mut m = merger();
        m.merge("你好");
        assert_eq!(m.merge(""), "");
    }

    #[test]
    fn merge_final_replaces_when_final_is_close_in_length() {
        let mut m = merger();
        m.merge("今天天气很");
        let out = m.merge_final("今天天气很好");
        assert_eq!(out, "今天天气很好");
    }

    #[test]
    fn merge_by_text_discards_trailing_junk_before_match() {
        let mut m = StreamMerger::new(StreamMergerConfig {
            overlap_chars: 6,
            error_tolerance: 1,
            max_overlap_check: 20,
            max_skip_new: 3,
        });
        m.buffer = "ABCDEFGXX".to_string();
        m.merge_by_text("DEFGHIJK");
        assert_eq!(m.buffer(), "ABCDEFGHIJK");
    }

    #[test]
    fn merge_by_text_skips_leading_noise_in_new() {
        let mut m = StreamMerger::new(StreamMergerConfig {
            overlap_chars: 10,
            error_tolerance: 1,
            max_overlap_check: 20,
            max_skip_new: 3,
        });
        m.buffer = "今天天气很好".to_string();
        m.merge_by_text("呃很好明天见");
        assert_eq!(m.buffer(), "今天天气很好明天见");
    }

    #[test]
    fn reset_clears_buffer() {
        let mut m = merger();
        m.merge("你好");
        m.reset();
        assert_eq!(m.buffer(), "");
    }
}
