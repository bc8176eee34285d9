//! Idiom blacklist (spec §4.7 rule 1): fixed phrases containing numerals
//! that must never be touched by ITN.

/// Private-use-area codepoint used to build unique per-idiom placeholders.
/// Ordinary ASR output and hotword text never contains PUA codepoints, so
/// this never collides with real content.
const PLACEHOLDER_BASE: char = '\u{E000}';

pub static IDIOM_BLACKLIST: &[&str] = &[
    "乱七八糟",
    "三十六计",
    "九九八十一",
    "一五一十",
    "四分五裂",
    "九牛一毛",
    "十全十美",
    "五花八门",
    "七上八下",
    "一石二鸟",
    "三心二意",
    "七嘴八舌",
    "八九不离十",
    "一举两得",
    "两败俱伤",
    "三言两语",
    "四面八方",
    "五湖四海",
    "六神无主",
    "七零八落",
];

/// Replace every blacklisted idiom occurrence with a unique placeholder so
/// later numeral-rewriting passes cannot touch it, returning the rewritten
/// text plus the substitutions to undo at the end of the pipeline.
pub fn protect(text: &str) -> (String, Vec<(String, String)>) {
    let mut out = text.to_string();
    let mut placeholders = Vec::new();
    for (i, idiom) in IDIOM_BLACKLIST.iter().enumerate() {
        if out.contains(idiom) {
            let placeholder = format!("{PLACEHOLDER_BASE}{i}{PLACEHOLDER_BASE}");
            out = out.replace(idiom, &placeholder);
            placeholders.push((placeholder, idiom.to_string()));
        }
    }
    (out, placeholders)
}

pub fn restore(text: &str, placeholders: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (placeholder, idiom) in placeholders {
        out = out.replace(placeholder, idiom);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protects_and_restores_idiom_text() {
        let (protected, placeholders) = protect("他做事乱七八糟的");
        assert!(!protected.contains("乱七八糟"));
        let restored = restore(&protected, &placeholders);
        assert_eq!(restored, "他做事乱七八糟的");
    }

    #[test]
    fn leaves_text_without_idioms_untouched() {
        let (protected, placeholders) = protect("今天天气很好");
        assert_eq!(protected, "今天天气很好");
        assert!(placeholders.is_empty());
    }
}
