//! Punctuation fullwidth/halfwidth conversion (spec §4.13), grounded on
//! `original_source/src/core/text_processor/punctuation.py`.

const PAIRS: &[(char, char)] = &[
    ('，', ','),
    ('。', '.'),
    ('？', '?'),
    ('！', '!'),
    ('：', ':'),
    ('；', ';'),
    ('（', '('),
    ('）', ')'),
    ('【', '['),
    ('】', ']'),
    ('「', '"'),
    ('」', '"'),
    ('『', '\''),
    ('』', '\''),
    ('“', '"'),
    ('”', '"'),
    ('‘', '\''),
    ('’', '\''),
];

fn to_halfwidth(c: char) -> Option<char> {
    PAIRS.iter().find(|(full, _)| *full == c).map(|(_, half)| *half)
}

fn to_fullwidth(c: char) -> Option<char> {
    PAIRS.iter().find(|(_, half)| *half == c).map(|(full, _)| *full)
}

/// Convert punctuation to halfwidth (or fullwidth when `prefer_chinese`),
/// optionally inserting a space after the halfwidth form, and collapsing
/// duplicate punctuation marks.
pub fn convert_punctuation(text: &str, add_space: bool, prefer_chinese: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_punct: Option<char> = None;

    for c in text.chars() {
        let converted = if prefer_chinese { to_fullwidth(c).or(Some(c)) } else { to_halfwidth(c).or(Some(c)) };
        let converted = converted.unwrap();
        let is_punct = to_halfwidth(c).is_some() || to_fullwidth(c).is_some();

        if is_punct {
            if last_punct == Some(converted) {
                continue;
            }
            out.push(converted);
            if add_space && !prefer_chinese {
                out.push(' ');
            }
            last_punct = Some(converted);
        } else {
            out.push(converted);
            last_punct = None;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_fullwidth_to_halfwidth() {
        assert_eq!(convert_punctuation("你好，世界！", false, false), "你好,世界!");
    }

    #[test]
    fn collapses_duplicate_punctuation() {
        assert_eq!(convert_punctuation("真的吗，，，", false, false), "真的吗,");
    }

    #[test]
    fn prefer_chinese_converts_to_fullwidth() {
        assert_eq!(convert_punctuation("hello, world!", false, true), "hello， world！");
    }

    #[test]
    fn adds_space_after_halfwidth_when_requested() {
        assert_eq!(convert_punctuation("你好，世界", true, false), "你好, 世界");
    }
}
