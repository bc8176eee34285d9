//! zh-variant (Simplified/Traditional locale) conversion (spec §4.8, §6).
//!
//! The dictionary schema (`zh2Hans, zh2Hant, zh2CN, zh2TW, zh2HK, zh2SG,
//! SIMPONLY, TRADONLY`) is spec-mandated (spec §6); a missing or malformed
//! dictionary disables this stage with a log line rather than failing the
//! pipeline (spec §7 DependencyMissing).

use crate::config::ZhVariantLocale;
use crate::error::CoreError;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

const EMBEDDED_DICT: &str = include_str!("../../data/zh_variants.json");

pub struct Dict {
    zh2hans: Vec<(String, String)>,
    zh2hant: Vec<(String, String)>,
    zh2cn: Vec<(String, String)>,
    zh2tw: Vec<(String, String)>,
    zh2hk: Vec<(String, String)>,
    zh2sg: Vec<(String, String)>,
}

fn to_sorted_pairs(map: HashMap<String, String>) -> Vec<(String, String)> {
    let mut v: Vec<(String, String)> = map.into_iter().collect();
    v.sort_by_key(|(k, _)| std::cmp::Reverse(k.chars().count()));
    v
}

impl Dict {
    fn load(json: &str) -> Result<Self, CoreError> {
        #[derive(Deserialize)]
        struct Schema {
            #[serde(rename = "zh2Hans")]
            zh2_hans: HashMap<String, String>,
            #[serde(rename = "zh2Hant")]
            zh2_hant: HashMap<String, String>,
            #[serde(rename = "zh2CN")]
            zh2_cn: HashMap<String, String>,
            #[serde(rename = "zh2TW")]
            zh2_tw: HashMap<String, String>,
            #[serde(rename = "zh2HK")]
            zh2_hk: HashMap<String, String>,
            #[serde(rename = "zh2SG")]
            zh2_sg: HashMap<String, String>,
        }
        let schema: Schema = serde_json::from_str(json)
            .map_err(|err| CoreError::Parse { what: "zh-variant dictionary", detail: err.to_string() })?;
        Ok(Self {
            zh2hans: to_sorted_pairs(schema.zh2_hans),
            zh2hant: to_sorted_pairs(schema.zh2_hant),
            zh2cn: to_sorted_pairs(schema.zh2_cn),
            zh2tw: to_sorted_pairs(schema.zh2_tw),
            zh2hk: to_sorted_pairs(schema.zh2_hk),
            zh2sg: to_sorted_pairs(schema.zh2_sg),
        })
    }

    fn chain_for(&self, locale: ZhVariantLocale) -> Vec<&[(String, String)]> {
        match locale {
            ZhVariantLocale::ZhCn | ZhVariantLocale::ZhHans => vec![&self.zh2hans, &self.zh2cn],
            ZhVariantLocale::ZhSg | ZhVariantLocale::ZhMy => vec![&self.zh2hans, &self.zh2sg],
            ZhVariantLocale::ZhTw => vec![&self.zh2hant, &self.zh2tw],
            ZhVariantLocale::ZhHk | ZhVariantLocale::ZhMo => vec![&self.zh2hant, &self.zh2hk],
            ZhVariantLocale::ZhHant => vec![&self.zh2hant],
        }
    }
}

static DICT: Lazy<Option<Dict>> = Lazy::new(|| match Dict::load(EMBEDDED_DICT) {
    Ok(d) => Some(d),
    Err(err) => {
        warn!(error = %err, "zh-variant dictionary unavailable, zh_convert stage disabled");
        None
    }
});

fn apply_longest_match(text: &str, dict: &[(String, String)]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let remaining: String = chars[i..].iter().collect();
        let hit = dict.iter().find(|(k, _)| remaining.starts_with(k.as_str()));
        if let Some((k, v)) = hit {
            out.push_str(v);
            i += k.chars().count();
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Longest-match rewrite using the locale-specific dictionary with fallback
/// chain (spec §4.8): script-level mapping first, then locale phrase
/// overrides. No-op (with a log already emitted at load time) if the
/// embedded dictionary failed to parse.
pub fn convert(text: &str, locale: ZhVariantLocale) -> String {
    let Some(dict) = DICT.as_ref() else {
        return text.to_string();
    };
    let mut out = text.to_string();
    for stage in dict.chain_for(locale) {
        out = apply_longest_match(&out, stage);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_traditional_to_simplified_for_cn_locale() {
        assert_eq!(convert("我的軟體和網絡", ZhVariantLocale::ZhCn), "我的软件和网络");
    }

    #[test]
    fn converts_simplified_to_traditional_for_tw_locale() {
        assert_eq!(convert("我的软件和网络", ZhVariantLocale::ZhTw), "我的軟體和網絡");
    }

    #[test]
    fn leaves_already_matching_locale_text_unchanged() {
        assert_eq!(convert("今天天气很好", ZhVariantLocale::ZhCn), "今天天气很好");
    }
}
