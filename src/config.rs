//! Plain-data configuration structs. No file IO or env lookup lives here —
//! that is host glue. Every struct implements `Default` matching the
//! documented defaults and is `serde`-(de)serializable so a host can load it
//! from whatever config format it prefers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotwordConfig {
    pub threshold: f64,
    pub similar_threshold: f64,
    pub top_k_similars: usize,
    pub fast_index_top_k: usize,
    pub fast_index_threshold: f64,
}

impl Default for HotwordConfig {
    fn default() -> Self {
        let threshold = 0.8;
        let similar_threshold = threshold - 0.2;
        Self {
            threshold,
            similar_threshold,
            top_k_similars: 5,
            fast_index_top_k: 100,
            fast_index_threshold: threshold.min(similar_threshold) - 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RectificationConfig {
    pub threshold: f64,
    pub zh_min_phonemes: usize,
    pub expand_words: usize,
}

impl Default for RectificationConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            zh_min_phonemes: 4,
            expand_words: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZhVariantLocale {
    #[serde(rename = "zh-cn")]
    ZhCn,
    #[serde(rename = "zh-hans")]
    ZhHans,
    #[serde(rename = "zh-tw")]
    ZhTw,
    #[serde(rename = "zh-hk")]
    ZhHk,
    #[serde(rename = "zh-mo")]
    ZhMo,
    #[serde(rename = "zh-sg")]
    ZhSg,
    #[serde(rename = "zh-my")]
    ZhMy,
    #[serde(rename = "zh-hant")]
    ZhHant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessorSettings {
    pub filler_remove_enable: bool,
    pub filler_aggressive: bool,
    pub filler_custom: Vec<String>,

    pub normalize_fullwidth_letters: bool,
    pub normalize_fullwidth_digits: bool,
    pub normalize_fullwidth_space: bool,

    pub itn_enable: bool,
    pub itn_erhua_remove: bool,
    pub itn_strict: bool,

    pub spacing_enable: bool,

    pub zh_convert_enable: bool,
    pub zh_convert_locale: ZhVariantLocale,

    pub punc_convert_enable: bool,
    pub punc_add_space: bool,
    pub punc_prefer_chinese: bool,
}

impl Default for PostProcessorSettings {
    fn default() -> Self {
        Self {
            filler_remove_enable: true,
            filler_aggressive: false,
            filler_custom: Vec::new(),

            normalize_fullwidth_letters: true,
            normalize_fullwidth_digits: true,
            normalize_fullwidth_space: true,

            itn_enable: true,
            itn_erhua_remove: false,
            itn_strict: false,

            spacing_enable: true,

            zh_convert_enable: false,
            zh_convert_locale: ZhVariantLocale::ZhCn,

            punc_convert_enable: true,
            punc_add_space: false,
            punc_prefer_chinese: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamMergerConfig {
    pub overlap_chars: usize,
    pub error_tolerance: usize,
    pub max_overlap_check: usize,
    pub max_skip_new: usize,
}

impl Default for StreamMergerConfig {
    fn default() -> Self {
        Self {
            overlap_chars: 5,
            error_tolerance: 1,
            max_overlap_check: 20,
            max_skip_new: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hotword: HotwordConfig,
    pub rectification: RectificationConfig,
    pub post_processor: PostProcessorSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hotword: HotwordConfig::default(),
            rectification: RectificationConfig::default(),
            post_processor: PostProcessorSettings::default(),
        }
    }
}
