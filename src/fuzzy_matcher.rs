//! Boundary-constrained fuzzy substring search over phoneme sequences
//! (spec §4.4): Levenshtein-style DP with insertion/deletion cost 1 and
//! substitution cost `phoneme::cost::cost`.

use crate::phoneme::cost::{cost, EPSILON};
use crate::phoneme::PhonemeSequence;

const INF: f64 = f64::INFINITY;

/// Variant A: longest single match of `sub` somewhere inside `main`,
/// anchored to a word-start in `main`.
pub fn find_best_match(main: &PhonemeSequence, sub: &PhonemeSequence) -> Option<(f64, usize, usize)> {
    let n = sub.len();
    let m = main.len();
    if n == 0 || m == 0 {
        return None;
    }

    let mut dp = vec![vec![INF; m + 1]; n + 1];
    let mut back = vec![vec![0usize; m + 1]; n + 1];

    for j in 0..=m {
        if j == 0 || main[j - 1].is_word_start {
            dp[0][j] = 0.0;
        }
        back[0][j] = j;
    }
    for i in 0..=n {
        dp[i][0] = i as f64;
        back[i][0] = 0;
    }

    for i in 1..=n {
        for j in 1..=m {
            let sub_cost = cost(&sub[i - 1], &main[j - 1]);
            let diag = dp[i - 1][j - 1] + sub_cost;
            let up = dp[i - 1][j] + 1.0;
            let left = dp[i][j - 1] + 1.0;

            let mut best = diag;
            let mut from = back[i - 1][j - 1];
            if up < best - EPSILON {
                best = up;
                from = back[i - 1][j];
            }
            if left < best - EPSILON {
                best = left;
                from = back[i][j - 1];
            }
            dp[i][j] = best;
            back[i][j] = from;
        }
    }

    let mut best_j = 0;
    let mut best_dist = INF;
    for j in 0..=m {
        if dp[n][j] < best_dist - EPSILON {
            best_dist = dp[n][j];
            best_j = j;
        }
    }
    if !best_dist.is_finite() {
        return None;
    }
    let start = back[n][best_j];
    if start < main.len() && !main[start].is_word_start {
        return None;
    }
    let score = (1.0 - best_dist / n as f64).max(0.0);
    Some((score, start, best_j))
}

/// Variant B: all boundary-constrained candidate matches of `hw` inside
/// `input` scoring above `threshold` (spec §4.4).
pub fn fuzzy_substring_search_constrained(
    hw: &PhonemeSequence,
    input: &PhonemeSequence,
    threshold: f64,
) -> Vec<(f64, usize, usize)> {
    let n = hw.len();
    let m = input.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let mut dp = vec![vec![INF; m + 1]; n + 1];
    let mut back = vec![vec![0usize; m + 1]; n + 1];

    for j in 0..=m {
        dp[0][j] = 0.0;
        back[0][j] = j;
    }
    for i in 0..=n {
        dp[i][0] = i as f64;
    }

    for i in 1..=n {
        for j in 1..=m {
            let sub_cost = cost(&hw[i - 1], &input[j - 1]);
            let diag = dp[i - 1][j - 1] + sub_cost;
            let up = dp[i - 1][j] + 1.0;
            let left = dp[i][j - 1] + 1.0;

            let mut best = diag;
            let mut from = back[i - 1][j - 1];
            if up < best - EPSILON {
                best = up;
                from = back[i - 1][j];
            }
            if left < best - EPSILON {
                best = left;
                from = back[i][j - 1];
            }
            dp[i][j] = best;
            back[i][j] = from;
        }
    }

    let mut by_end: std::collections::HashMap<usize, (f64, usize)> = std::collections::HashMap::new();
    for j in 1..=m {
        if !input[j - 1].is_word_end {
            continue;
        }
        let dist = dp[n][j];
        if !dist.is_finite() || dist >= n as f64 * 0.8 {
            continue;
        }
        let score = (1.0 - dist / n as f64).max(0.0);
        if score + EPSILON < threshold {
            continue;
        }
        let start = back[n][j];
        let better = by_end.get(&j).map(|(s, _)| score > *s + EPSILON).unwrap_or(true);
        if better {
            by_end.insert(j, (score, start));
        }
    }

    let mut results: Vec<(f64, usize, usize)> = by_end
        .into_iter()
        .map(|(end, (score, start))| (score, start, end))
        .collect();
    results.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    results
}

/// Local fuzzy distance of `pattern` against the best-aligned window of
/// `text`, used by RectificationRAG (spec §4.9) and FastIndex-adjacent
/// scoring. Returns the minimal edit distance of `pattern` against any
/// substring of `text` (unconstrained start/end, for scoring purposes only).
pub fn fuzzy_substring_distance(pattern: &PhonemeSequence, text: &PhonemeSequence) -> f64 {
    let n = pattern.len();
    let m = text.len();
    if n == 0 {
        return 0.0;
    }
    if m == 0 {
        return n as f64;
    }

    let mut prev = vec![0.0f64; m + 1];
    let mut cur = vec![0.0f64; m + 1];

    for i in 1..=n {
        cur[0] = i as f64;
        for j in 1..=m {
            let sub_cost = cost(&pattern[i - 1], &text[j - 1]);
            let diag = prev[j - 1] + sub_cost;
            let up = prev[j] + 1.0;
            let left = cur[j - 1] + 1.0;
            cur[j] = diag.min(up).min(left);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    let mut best = INF;
    for j in 0..=m {
        if prev[j] < best {
            best = prev[j];
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::phonemize;

    #[test]
    fn find_best_match_anchors_at_word_start() {
        let main = phonemize("我想去吃买当劳", true);
        let sub = phonemize("麦当劳", true);
        let result = find_best_match(&main, &sub);
        assert!(result.is_some());
        let (score, _start, _end) = result.unwrap();
        assert!(score > 0.5);
    }

    #[test]
    fn constrained_search_respects_threshold() {
        let input = phonemize("肯得鸡很好吃", true);
        let hw = phonemize("肯德基", true);
        let results = fuzzy_substring_search_constrained(&hw, &input, 0.6);
        assert!(!results.is_empty());
    }

    #[test]
    fn fuzzy_distance_zero_for_exact_substring() {
        let pattern = phonemize("麦当劳", true);
        let text = phonemize("我爱麦当劳啊", true);
        assert!(fuzzy_substring_distance(&pattern, &text) < EPSILON);
    }
}
