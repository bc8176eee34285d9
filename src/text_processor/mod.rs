//! Composes filler-removal, fullwidth-normalization, ITN, CJK/ASCII
//! spacing, zh-variant conversion, and punctuation normalization in the
//! spec-fixed order (spec §4.8).

mod filler;
mod fullwidth;
mod punctuation;
mod spacing;
pub mod zh_convert;

use crate::config::PostProcessorSettings;
use crate::itn;

pub struct TextPostProcessor {
    settings: PostProcessorSettings,
}

impl TextPostProcessor {
    pub fn new(settings: PostProcessorSettings) -> Self {
        Self { settings }
    }

    /// Order is fixed: filler -> fullwidth -> ITN -> spacing -> zh-convert
    /// -> punctuation. Empty input short-circuits to empty.
    pub fn process(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let s = &self.settings;
        let mut out = text.to_string();

        if s.filler_remove_enable {
            out = filler::remove_fillers(&out, s.filler_aggressive, &s.filler_custom);
        }

        out = fullwidth::normalize_fullwidth(
            &out,
            s.normalize_fullwidth_letters,
            s.normalize_fullwidth_digits,
            s.normalize_fullwidth_space,
        );

        if s.itn_enable {
            if s.itn_erhua_remove {
                out = itn::remove_erhua(&out);
            }
            out = itn::normalize(&out, s.itn_strict);
        }

        if s.spacing_enable {
            out = spacing::insert_spacing(&out);
        }

        if s.zh_convert_enable {
            out = zh_convert::convert(&out, s.zh_convert_locale);
        }

        if s.punc_convert_enable {
            out = punctuation::convert_punctuation(&out, s.punc_add_space, s.punc_prefer_chinese);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_short_circuits_to_empty() {
        let p = TextPostProcessor::new(PostProcessorSettings::default());
        assert_eq!(p.process(""), "");
    }

    #[test]
    fn composes_filler_and_itn_and_punctuation() {
        let p = TextPostProcessor::new(PostProcessorSettings::default());
        let out = p.process("呃今天是二零二五年一月三十日，天气很好");
        assert!(out.contains("2025年1月30日"));
        assert!(!out.starts_with('呃'));
    }

    #[test]
    fn stages_are_individually_switchable() {
        let mut settings = PostProcessorSettings::default();
        settings.itn_enable = false;
        let p = TextPostProcessor::new(settings);
        let out = p.process("三五百人");
        assert_eq!(out, "三五百人");
    }
}
