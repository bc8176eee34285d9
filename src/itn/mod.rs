//! Inverse text normalization (spec §4.7): a high-recall scan collects
//! maximal runs of numeral-ish characters, then an ordered classifier
//! assigns each run to exactly one normalizer. First match wins.

mod idiom;
mod units;

use units::{digit_value, digits_to_arabic, map_unit, parse_chinese_number, unit_multiplier};

const FUZZY_MARKER: char = '几';

fn is_digit_char(c: char) -> bool {
    digit_value(c).is_some()
}

fn is_unit_char(c: char) -> bool {
    unit_multiplier(c).is_some() || c == '万' || c == '亿'
}

fn is_marker_char(c: char) -> bool {
    is_digit_char(c) || is_unit_char(c) || c.is_ascii_digit() || matches!(c, '分' | '之' | '比' | '点' | '秒' | '年' | '月' | '日' | '号' | FUZZY_MARKER)
}

/// Unit words recognized as an optional trailing suffix on a range or
/// digit-run expression, longest first so `千克`/`千米` aren't cut short by
/// `克`/`米`.
fn suffix_unit_at(chars: &[char], from: usize) -> Option<(usize, String)> {
    const KNOWN: &[&str] = &[
        "千米每小时",
        "千克",
        "千米",
        "个",
        "只",
        "万",
        "亿",
        "秒",
        "年",
        "月",
        "日",
        "天",
        "时",
        "钟",
        "人",
        "层",
        "楼",
        "倍",
        "块",
        "次",
        "克",
        "米",
    ];
    for word in KNOWN {
        let wlen = word.chars().count();
        if from + wlen > chars.len() {
            continue;
        }
        let slice: String = chars[from..from + wlen].iter().collect();
        if &slice == word {
            return Some((wlen, map_unit(word)));
        }
    }
    None
}

/// Character-kind signature ('D' for digit, 'U' for unit) used to test
/// structural homogeneity between candidate chunks in the compound rule.
fn kind_signature(s: &str) -> String {
    s.chars()
        .map(|c| if is_digit_char(c) { 'D' } else { 'U' })
        .collect()
}

fn try_range(candidate: &[char], chars: &[char], after: usize) -> Option<(String, usize)> {
    // digit digit unit [suffix]
    if candidate.len() == 3 && is_digit_char(candidate[0]) && is_digit_char(candidate[1]) {
        if let Some(mult) = unit_multiplier(candidate[2]) {
            let a = digit_value(candidate[0])? * mult;
            let b = digit_value(candidate[1])? * mult;
            let (extra, suffix) = suffix_unit_at(chars, after).unwrap_or((0, String::new()));
            return Some((format!("{a}~{b}{suffix}"), extra));
        }
    }
    // tens-prefix + digit + digit [suffix]
    if candidate.len() >= 3 {
        let last_two = &candidate[candidate.len() - 2..];
        if is_digit_char(last_two[0]) && is_digit_char(last_two[1]) {
            let prefix: String = candidate[..candidate.len() - 2].iter().collect();
            if prefix.ends_with('十') {
                if let Some(base) = parse_chinese_number(&prefix) {
                    let a = base + digit_value(last_two[0])?;
                    let b = base + digit_value(last_two[1])?;
                    let (extra, suffix) = suffix_unit_at(chars, after).unwrap_or((0, String::new()));
                    return Some((format!("{a}~{b}{suffix}"), extra));
                }
            }
        }
    }
    // bare digit digit (candidate is exactly two digits — already boundary-
    // isolated since the caller passed us a maximal marker run)
    if candidate.len() == 2 && is_digit_char(candidate[0]) && is_digit_char(candidate[1]) {
        let a = digit_value(candidate[0])?;
        let b = digit_value(candidate[1])?;
        let (extra, suffix) = suffix_unit_at(chars, after).unwrap_or((0, String::new()));
        return Some((format!("{a}~{b}{suffix}"), extra));
    }
    None
}

fn try_time(candidate: &str) -> Option<String> {
    let (hour_part, rest) = candidate.split_once('点')?;
    let (min_part, sec_part) = match rest.split_once('秒') {
        Some((before_sec, _)) => (before_sec, true),
        None => (rest, false),
    };
    let min_part = min_part.strip_suffix('分').unwrap_or(min_part);
    let hour = parse_any_number(hour_part)?;
    let minute = parse_any_number(min_part)?;
    let mut out = format!("{hour:02}:{minute:02}");
    if sec_part {
        if let Some((_, sec_str)) = rest.split_once('分') {
            let sec_str = sec_str.trim_end_matches('秒');
            if let Some(sec) = parse_any_number(sec_str) {
                out.push_str(&format!(":{sec:02}"));
            }
        }
    }
    Some(out)
}

fn parse_any_number(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }
    parse_chinese_number(s)
}

fn try_digit_run(candidate: &[char], chars: &[char], after: usize, strict: bool) -> Option<(String, usize)> {
    if candidate.is_empty() || !candidate.iter().all(|&c| is_digit_char(c)) {
        return None;
    }
    if candidate.len() == 1 && candidate[0] == '一' && !strict {
        return None;
    }
    let digits: String = candidate.iter().map(|&c| digit_value(c).unwrap().to_string()).collect();
    let (extra, suffix) = suffix_unit_at(chars, after).unwrap_or((0, String::new()));
    Some((format!("{digits}{suffix}"), extra))
}

fn try_compound(candidate: &str) -> Option<String> {
    let chars: Vec<char> = candidate.chars().collect();
    let len = chars.len();
    if len < 4 {
        return None;
    }
    for chunk_len in 2..=(len / 2) {
        if len % chunk_len != 0 {
            continue;
        }
        let count = len / chunk_len;
        if count < 2 {
            continue;
        }
        let chunks: Vec<String> = chars.chunks(chunk_len).map(|c| c.iter().collect()).collect();
        let sig = kind_signature(&chunks[0]);
        if !chunks.iter().all(|c| kind_signature(c) == sig) {
            continue;
        }
        let values: Option<Vec<i64>> = chunks.iter().map(|c| parse_chinese_number(c)).collect();
        if let Some(values) = values {
            if values.iter().all(|v| *v > 0) {
                return Some(values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" "));
            }
        }
    }
    None
}

fn try_percent(candidate: &str) -> Option<String> {
    let rest = candidate.strip_prefix("百分之")?;
    let value = parse_any_number(rest)?;
    Some(format!("{value}%"))
}

fn try_fraction(candidate: &str) -> Option<String> {
    let (x, y) = candidate.split_once("分之")?;
    let x = parse_any_number(x)?;
    let y = parse_any_number(y)?;
    Some(format!("{y}/{x}"))
}

fn try_ratio(candidate: &str) -> Option<String> {
    let (a, b) = candidate.split_once('比')?;
    let a = parse_any_number(a)?;
    let b = parse_any_number(b)?;
    Some(format!("{a}:{b}"))
}

/// Date numeral fields follow two conventions: a year is read digit-by-digit
/// ("二零二五" -> 2025) while month/day use place-value semantics ("三十" ->
/// 30), distinguished by whether the field contains a big-unit character.
fn parse_date_field(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }
    if s.chars().any(|c| unit_multiplier(c).is_some() || c == '万' || c == '亿') {
        parse_chinese_number(s)
    } else {
        digits_to_arabic(s)?.parse().ok()
    }
}

fn try_date(candidate: &str) -> Option<String> {
    if !candidate.contains('年') && !candidate.contains('月') && !candidate.contains('日') && !candidate.contains('号') {
        return None;
    }
    let mut out = String::new();
    let mut rest = candidate;
    if let Some((y, r)) = rest.split_once('年') {
        out.push_str(&parse_date_field(y)?.to_string());
        out.push('年');
        rest = r;
    }
    if let Some((m, r)) = rest.split_once('月') {
        out.push_str(&parse_date_field(m)?.to_string());
        out.push('月');
        rest = r;
    }
    let (day_marker, day_part) = if let Some((d, r)) = rest.split_once('日') {
        (Some(('日', r)), d)
    } else if let Some((d, r)) = rest.split_once('号') {
        (Some(('号', r)), d)
    } else {
        (None, rest)
    };
    if let Some((marker, _)) = day_marker {
        out.push_str(&parse_date_field(day_part)?.to_string());
        out.push(marker);
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Run the full ITN classifier cascade over `text`. `strict` controls
/// whether a standalone "一" is preserved (non-strict, the default) or
/// converted to "1".
pub fn normalize(text: &str, strict: bool) -> String {
    let (protected, placeholders) = idiom::protect(text);
    let chars: Vec<char> = protected.chars().collect();
    let mut out = String::with_capacity(protected.len());
    let mut i = 0;
    while i < chars.len() {
        if !is_marker_char(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i;
        while j < chars.len() && is_marker_char(chars[j]) {
            j += 1;
        }
        let candidate_chars = &chars[start..j];
        let candidate: String = candidate_chars.iter().collect();

        if candidate.contains(FUZZY_MARKER) {
            out.push_str(&candidate);
            i = j;
            continue;
        }

        let has_special = candidate.chars().any(|c| matches!(c, '点' | '分' | '之' | '比' | '年' | '月' | '日' | '号'));

        let (replacement, extra) = if !has_special {
            if let Some((r, extra)) = try_range(candidate_chars, &chars, j) {
                (r, extra)
            } else if let Some((r, extra)) = try_digit_run(candidate_chars, &chars, j, strict) {
                (r, extra)
            } else if let Some(r) = try_compound(&candidate) {
                (r, 0)
            } else if let Some(n) = parse_chinese_number(&candidate) {
                (n.to_string(), 0)
            } else {
                (candidate.clone(), 0)
            }
        } else if candidate.contains('点') {
            (try_time(&candidate).unwrap_or_else(|| candidate.clone()), 0)
        } else if candidate.starts_with("百分之") {
            (try_percent(&candidate).unwrap_or_else(|| candidate.clone()), 0)
        } else if candidate.contains("分之") {
            (try_fraction(&candidate).unwrap_or_else(|| candidate.clone()), 0)
        } else if candidate.contains('比') {
            (try_ratio(&candidate).unwrap_or_else(|| candidate.clone()), 0)
        } else {
            (try_date(&candidate).unwrap_or_else(|| candidate.clone()), 0)
        };

        out.push_str(&replacement);
        i = j + extra;
    }

    idiom::restore(&out, &placeholders)
}

/// Erhua removal (spec §4.7 closing paragraph): drop a trailing 儿 unless
/// the bigram is in a curated whitelist.
pub fn remove_erhua(text: &str) -> String {
    const WHITELIST: &[&str] = &["女儿", "儿童", "儿子", "婴儿", "儿歌", "儿科", "孤儿"];
    let placeholder_base = '\u{E100}';
    let mut protected = text.to_string();
    let mut placeholders = Vec::new();
    for (i, word) in WHITELIST.iter().enumerate() {
        if protected.contains(word) {
            let ph = format!("{placeholder_base}{i}{placeholder_base}");
            protected = protected.replace(word, &ph);
            placeholders.push((ph, word.to_string()));
        }
    }

    let chars: Vec<char> = protected.chars().collect();
    let mut out = String::with_capacity(protected.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '儿' && i > 0 {
            i += 1;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }

    for (ph, word) in placeholders {
        out = out.replace(&ph, &word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_scenario() {
        assert_eq!(normalize("今天是二零二五年一月三十日", false), "今天是2025年1月30日");
    }

    #[test]
    fn range_scenario() {
        assert_eq!(normalize("三五百人", false), "300~500人");
    }

    #[test]
    fn idiom_preserved() {
        assert_eq!(normalize("乱七八糟", false), "乱七八糟");
        assert_eq!(normalize("他做事乱七八糟别管他", false), "他做事乱七八糟别管他");
    }

    #[test]
    fn fuzzy_marker_preserved() {
        assert_eq!(normalize("十几个人", false), "十几个人");
    }

    #[test]
    fn percent_and_fraction_and_ratio() {
        assert_eq!(normalize("百分之五十", false), "50%");
        assert_eq!(normalize("三分之一", false), "1/3");
        assert_eq!(normalize("三比一", false), "3:1");
    }

    #[test]
    fn standalone_one_is_preserved_unless_strict() {
        assert_eq!(normalize("一", false), "一");
        assert_eq!(normalize("一", true), "1");
    }

    #[test]
    fn compound_consecutive_values() {
        assert_eq!(normalize("十一十二十三", false), "11 12 13");
        assert_eq!(normalize("一百零一一百零二", false), "101 102");
    }

    #[test]
    fn erhua_removed_except_whitelist() {
        assert_eq!(remove_erhua("这个事儿"), "这个事");
        assert_eq!(remove_erhua("我的女儿"), "我的女儿");
    }

    #[test]
    fn time_expression() {
        assert_eq!(normalize("三点二十分", false), "03:20");
    }
}
