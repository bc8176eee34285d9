//! Chinese-numeral parsing primitives and the unit dictionary (spec §4.7).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Fixed dictionary of Chinese units mapped to their symbolic/Latin form.
/// Units not present here are preserved verbatim.
pub static UNIT_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("个", "个"),
        ("只", "只"),
        ("分", "分"),
        ("万", "万"),
        ("亿", "亿"),
        ("秒", "秒"),
        ("年", "年"),
        ("月", "月"),
        ("日", "日"),
        ("天", "天"),
        ("时", "时"),
        ("钟", "钟"),
        ("人", "人"),
        ("层", "层"),
        ("楼", "楼"),
        ("倍", "倍"),
        ("块", "块"),
        ("次", "次"),
        ("克", "g"),
        ("千克", "kg"),
        ("米", "米"),
        ("千米", "千米"),
        ("千米每小时", "km/h"),
    ]
    .into_iter()
    .collect()
});

pub fn map_unit(unit: &str) -> String {
    UNIT_MAP.get(unit).map(|s| s.to_string()).unwrap_or_else(|| unit.to_string())
}

pub(crate) fn digit_value(c: char) -> Option<i64> {
    match c {
        '零' | '〇' => Some(0),
        '一' | '壹' => Some(1),
        '二' | '两' | '贰' => Some(2),
        '三' | '叁' => Some(3),
        '四' | '肆' => Some(4),
        '五' | '伍' => Some(5),
        '六' | '陆' => Some(6),
        '七' | '柒' => Some(7),
        '八' | '捌' => Some(8),
        '九' | '玖' => Some(9),
        _ => None,
    }
}

pub(crate) fn unit_multiplier(c: char) -> Option<i64> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1000),
        _ => None,
    }
}

/// Parse a single Chinese numeral expression using an accumulator that
/// respects 十/百/千/万/亿 semantics (spec §4.7 rule 7):
/// - 万 flushes the running section into the result and opens a new base.
/// - 亿 does the same at a higher magnitude.
/// - 百/千/十 fold the pending digit by their multiplier into the section.
/// - 零 resets the pending digit (acts as a separator, contributes nothing).
/// - A leading 十 with no preceding digit means 10.
pub fn parse_chinese_number(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    let mut result: i64 = 0;
    let mut section: i64 = 0;
    let mut pending: Option<i64> = None;
    let mut saw_any = false;

    for c in s.chars() {
        if let Some(d) = digit_value(c) {
            pending = Some(d);
            saw_any = true;
        } else if let Some(mult) = unit_multiplier(c) {
            let digit = pending.take().unwrap_or(1);
            section += digit * mult;
            saw_any = true;
        } else if c == '万' {
            section += pending.take().unwrap_or(0);
            result += section * 10_000;
            section = 0;
            saw_any = true;
        } else if c == '亿' {
            section += pending.take().unwrap_or(0);
            result = (result + section) * 100_000_000;
            section = 0;
            saw_any = true;
        } else {
            return None;
        }
    }
    if !saw_any {
        return None;
    }
    section += pending.unwrap_or(0);
    Some(result + section)
}

/// Convert a run of single Chinese digits (no units) to an Arabic digit
/// string, character by character, e.g. "二零二五" -> "2025".
pub fn digits_to_arabic(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.chars().count());
    for c in s.chars() {
        out.push_str(&digit_value(c)?.to_string());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_with_units() {
        assert_eq!(parse_chinese_number("一百零一"), Some(101));
        assert_eq!(parse_chinese_number("三千五百"), Some(3500));
        assert_eq!(parse_chinese_number("一万二千"), Some(12_000));
        assert_eq!(parse_chinese_number("十一"), Some(11));
        assert_eq!(parse_chinese_number("十"), Some(10));
    }

    #[test]
    fn digits_to_arabic_converts_char_by_char() {
        assert_eq!(digits_to_arabic("二零二五"), Some("2025".to_string()));
    }

    #[test]
    fn unit_map_passes_through_unknown_units() {
        assert_eq!(map_unit("克"), "g");
        assert_eq!(map_unit("斤"), "斤");
    }
}
