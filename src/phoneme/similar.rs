//! The fixed global family of Mandarin confusable phoneme pairs (spec §3).
//!
//! Represented as a flat list of families (sets of mutually-confusable
//! values); membership test is "both values in the pair appear in the same
//! family", i.e. the pair is a subset of some family.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// 前后鼻音 (front/back nasal finals), 平翘舌 (retroflex/non-retroflex
/// initials), 鼻/边 (nasal/lateral), 清/浊 and 送气/不送气 (aspiration)
/// confusions, and common vowel pairs.
static FAMILIES: Lazy<Vec<HashSet<&'static str>>> = Lazy::new(|| {
    vec![
        // 前后鼻音: an/ang, en/eng, in/ing, uan/uang
        ["an", "ang"].into_iter().collect(),
        ["en", "eng"].into_iter().collect(),
        ["in", "ing"].into_iter().collect(),
        ["uan", "uang"].into_iter().collect(),
        ["ian", "iang"].into_iter().collect(),
        // 平翘舌: z/zh, c/ch, s/sh
        ["z", "zh"].into_iter().collect(),
        ["c", "ch"].into_iter().collect(),
        ["s", "sh"].into_iter().collect(),
        // 鼻/边音
        ["n", "l"].into_iter().collect(),
        // 清/浊与送气/不送气 confusions common in ASR
        ["b", "p"].into_iter().collect(),
        ["d", "t"].into_iter().collect(),
        ["g", "k"].into_iter().collect(),
        ["j", "q"].into_iter().collect(),
        ["zh", "ch"].into_iter().collect(),
        ["z", "c"].into_iter().collect(),
        // f/h confusion (common in some dialect-influenced ASR)
        ["f", "h"].into_iter().collect(),
        // r/l confusion
        ["r", "l"].into_iter().collect(),
        // common vowel pairs
        ["e", "o"].into_iter().collect(),
        ["ei", "ui"].into_iter().collect(),
        ["ou", "uo"].into_iter().collect(),
        ["ie", "ve"].into_iter().collect(),
        ["in", "ing", "en"].into_iter().collect(),
    ]
});

/// Whether `a` and `b` are Mandarin-confusable, i.e. `{a, b}` is a subset of
/// some family. Two distinct tone digits are always similar (spec §4.2).
pub fn is_similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if is_tone_digit(a) && is_tone_digit(b) {
        return true;
    }
    FAMILIES.iter().any(|fam| fam.contains(a) && fam.contains(b))
}

fn is_tone_digit(v: &str) -> bool {
    v.len() == 1 && v.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_back_nasal_finals_are_similar() {
        assert!(is_similar("an", "ang"));
        assert!(is_similar("in", "ing"));
    }

    #[test]
    fn retroflex_pairs_are_similar() {
        assert!(is_similar("z", "zh"));
        assert!(is_similar("s", "sh"));
    }

    #[test]
    fn tone_digits_are_always_similar() {
        assert!(is_similar("1", "3"));
    }

    #[test]
    fn unrelated_values_are_not_similar() {
        assert!(!is_similar("b", "zh"));
    }
}
