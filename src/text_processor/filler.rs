//! Filler-word removal (spec §4.11), grounded on
//! `original_source/src/core/text_processor/filler_remover.py`.

const SINGLE_CHAR_FILLERS: &[char] = &['呃', '啊', '嗯', '哦', '噢', '哼', '唔', '额', '诶', '欸'];

const MULTI_CHAR_FILLERS: &[&str] = &[
    "就是说", "就是那个", "那个那个", "然后呢", "然后吧", "所以说", "所以呢", "那个", "就是", "然后", "这个", "那么", "其实", "反正",
];

const REPEATED_EMPHASIS_FILLERS: &[&str] =
    &["对对对", "好好好", "是是是", "嗯嗯嗯", "啊啊啊", "对对", "好好", "是是", "嗯嗯"];

fn is_punctuation_or_space(c: char) -> bool {
    c.is_whitespace() || "，。！？；：,.!?;:".contains(c)
}

pub fn remove_fillers(text: &str, aggressive: bool, custom: &[String]) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut phrases: Vec<&str> = MULTI_CHAR_FILLERS.to_vec();
    for c in custom {
        phrases.push(c.as_str());
    }
    if aggressive {
        phrases.extend_from_slice(REPEATED_EMPHASIS_FILLERS);
    }
    phrases.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut at_boundary = true;

    while i < chars.len() {
        let remaining: String = chars[i..].iter().collect();
        let mut matched_phrase = false;
        for phrase in &phrases {
            if remaining.starts_with(phrase) {
                i += phrase.chars().count();
                matched_phrase = true;
                break;
            }
        }
        if matched_phrase {
            continue;
        }

        let c = chars[i];
        if SINGLE_CHAR_FILLERS.contains(&c) {
            let next_is_boundary = chars.get(i + 1).map(|&n| is_punctuation_or_space(n)).unwrap_or(true);
            if at_boundary || (aggressive && next_is_boundary) {
                i += 1;
                continue;
            }
        }

        at_boundary = is_punctuation_or_space(c);
        out.push(c);
        i += 1;
    }

    collapse_and_trim(&out)
}

fn collapse_and_trim(s: &str) -> String {
    let mut collapsed = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(c);
            last_was_space = false;
        }
    }

    let mut out = String::with_capacity(collapsed.len());
    let chars: Vec<char> = collapsed.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' && chars.get(i + 1).map(|n| "，。！？；：,.!?;:".contains(*n)).unwrap_or(false) {
            continue;
        }
        out.push(c);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_multi_char_fillers_unconditionally() {
        assert_eq!(remove_fillers("我就是说想去那个公司", false, &[]), "我想去公司");
    }

    #[test]
    fn conservative_mode_keeps_mid_sentence_single_char_fillers() {
        let out = remove_fillers("呃我觉得啊这样挺好", false, &[]);
        assert!(out.starts_with("我觉得"));
    }

    #[test]
    fn aggressive_mode_removes_repeated_emphasis() {
        let out = remove_fillers("对对对就是这样", true, &[]);
        assert!(!out.starts_with("对对对"));
    }

    #[test]
    fn custom_fillers_extend_the_phrase_set() {
        let out = remove_fillers("你懂的这句话", false, &["你懂的".to_string()]);
        assert_eq!(out, "这句话");
    }

    #[test]
    fn empty_input_short_circuits() {
        assert_eq!(remove_fillers("", false, &[]), "");
    }
}
