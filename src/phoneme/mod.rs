//! Text → phoneme-atom decomposition (spec §4.1).
//!
//! Mandarin syllables are split into initial/final/tone via the `pinyin`
//! crate's `with_tone_num_end()` romanization, then re-segmented the way
//! `kokorox`'s `parse_pinyin` does it (initials tried longest-first,
//! zh/ch/sh before the single-letter initials, then the zi/ci/si,
//! zhi/chi/shi/ri, iu/ui/un and post-jqxy-u special-case finals).

pub mod cost;
pub mod similar;

use pinyin::ToPinyin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Zh,
    En,
    Num,
    Other,
}

/// A single phoneme atom: a Mandarin initial/final/tone digit, an ASCII
/// character, or (on phonemization failure) a whole Han character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phoneme {
    pub value: String,
    pub lang: Lang,
    pub is_word_start: bool,
    pub is_word_end: bool,
    pub char_start: usize,
    pub char_end: usize,
}

impl Phoneme {
    pub fn is_tone(&self) -> bool {
        self.value.len() == 1 && self.value.chars().next().is_some_and(|c| c.is_ascii_digit())
    }
}

pub type PhonemeSequence = Vec<Phoneme>;

const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r",
    "z", "c", "s", "y", "w",
];

/// Split a toned pinyin romanization (e.g. "zhong1") into (initial, final, tone).
fn split_initial_final(romanized: &str) -> (Option<&'static str>, String, Option<char>) {
    let (base, tone) = match romanized.chars().last() {
        Some(c) if c.is_ascii_digit() => (&romanized[..romanized.len() - 1], Some(c)),
        _ => (romanized, None),
    };

    let mut initial: Option<&'static str> = None;
    let mut rest = base;
    for candidate in INITIALS {
        if base.starts_with(candidate) {
            initial = Some(candidate);
            rest = &base[candidate.len()..];
            break;
        }
    }

    let fin = match (initial, rest) {
        (Some("z"), "i") | (Some("c"), "i") | (Some("s"), "i") => "ii".to_string(),
        (Some("zh"), "i") | (Some("ch"), "i") | (Some("sh"), "i") | (Some("r"), "i") => {
            "iii".to_string()
        }
        (_, "iu") => "iou".to_string(),
        (_, "ui") => "uei".to_string(),
        (_, "un") => "uen".to_string(),
        (Some("j"), f) | (Some("q"), f) | (Some("x"), f) | (Some("y"), f)
            if f.starts_with('u') && !f.starts_with("ua") && !f.starts_with("uo") =>
        {
            f.replacen('u', "v", 1)
        }
        (_, f) => f.to_string(),
    };

    (initial, fin, tone)
}

/// Phonemize a single Han character. Returns `None` on pinyin-resolution
/// failure so the caller can fall back to a single whole-character atom.
fn phonemize_han(ch: char, char_index: usize) -> Option<Vec<Phoneme>> {
    let py = ch.to_pinyin()?;
    let romanized = py.with_tone_num_end();
    let (initial, fin, tone) = split_initial_final(romanized);

    let mut atoms = Vec::with_capacity(3);
    let has_initial = initial.map(|s| !s.is_empty()).unwrap_or(false);
    if let Some(init) = initial.filter(|s| !s.is_empty()) {
        atoms.push(Phoneme {
            value: init.to_string(),
            lang: Lang::Zh,
            is_word_start: true,
            is_word_end: false,
            char_start: char_index,
            char_end: char_index + 1,
        });
    }
    if !fin.is_empty() {
        atoms.push(Phoneme {
            value: fin,
            lang: Lang::Zh,
            is_word_start: !has_initial,
            is_word_end: false,
            char_start: char_index,
            char_end: char_index + 1,
        });
    }
    if let Some(t) = tone {
        atoms.push(Phoneme {
            value: t.to_string(),
            lang: Lang::Zh,
            is_word_start: atoms.is_empty(),
            is_word_end: true,
            char_start: char_index,
            char_end: char_index + 1,
        });
    } else if let Some(last) = atoms.last_mut() {
        last.is_word_end = true;
    }

    if atoms.is_empty() {
        return None;
    }
    Some(atoms)
}

fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

fn ascii_alnum_class(c: char) -> Option<u8> {
    if c.is_ascii_digit() {
        Some(0)
    } else if c.is_ascii_lowercase() {
        Some(1)
    } else if c.is_ascii_uppercase() {
        Some(2)
    } else {
        None
    }
}

/// Tokenize `text` into a phoneme sequence (spec §4.1).
///
/// `split_ascii_per_char` controls whether ASCII-alnum runs are split one
/// atom per character (the hotword-matching path) or emitted as a single
/// atom per run.
pub fn phonemize(text: &str, split_ascii_per_char: bool) -> PhonemeSequence {
    let chars: Vec<char> = text.chars().collect();
    let mut seq = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_han(c) {
            match phonemize_han(c, i) {
                Some(mut atoms) => seq.append(&mut atoms),
                None => seq.push(Phoneme {
                    value: c.to_string(),
                    lang: Lang::Zh,
                    is_word_start: true,
                    is_word_end: true,
                    char_start: i,
                    char_end: i + 1,
                }),
            }
            i += 1;
            continue;
        }
        if ascii_alnum_class(c).is_some() {
            let start = i;
            let mut j = i + 1;
            let mut prev_class = ascii_alnum_class(c);
            while j < chars.len() {
                let class = ascii_alnum_class(chars[j]);
                if class.is_none() || class != prev_class {
                    break;
                }
                prev_class = class;
                j += 1;
            }
            let run = &chars[start..j];
            if split_ascii_per_char {
                for (k, rc) in run.iter().enumerate() {
                    let lang = if rc.is_ascii_digit() { Lang::Num } else { Lang::En };
                    seq.push(Phoneme {
                        value: rc.to_ascii_lowercase().to_string(),
                        lang,
                        is_word_start: k == 0,
                        is_word_end: k == run.len() - 1,
                        char_start: start + k,
                        char_end: start + k + 1,
                    });
                }
            } else {
                let value: String = run.iter().map(|c| c.to_ascii_lowercase()).collect();
                let lang = if run[0].is_ascii_digit() { Lang::Num } else { Lang::En };
                seq.push(Phoneme {
                    value,
                    lang,
                    is_word_start: true,
                    is_word_end: true,
                    char_start: start,
                    char_end: j,
                });
            }
            i = j;
            continue;
        }
        i += 1;
    }
    seq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phonemizes_han_into_up_to_three_atoms() {
        let seq = phonemize("中", true);
        assert!(seq.len() <= 3);
        assert!(seq.iter().all(|a| a.char_start == 0 && a.char_end == 1));
        assert!(seq.first().unwrap().is_word_start);
        assert!(seq.last().unwrap().is_word_end);
    }

    #[test]
    fn ascii_run_splits_on_case_and_digit_transitions() {
        let seq = phonemize("ab12CD", true);
        let values: Vec<&str> = seq.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "1", "2", "c", "d"]);
    }

    #[test]
    fn spans_are_contiguous_slices_of_input() {
        let text = "你好ab";
        for atom in phonemize(text, true) {
            let slice: String = text.chars().skip(atom.char_start).take(atom.char_end - atom.char_start).collect();
            assert_eq!(slice.chars().count(), atom.char_end - atom.char_start);
        }
    }
}
