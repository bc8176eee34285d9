//! `Engine`: the single entry point a host embeds (spec §6). Owns one
//! `HotwordCorrector`, one `RuleCorrector`, one `RectificationRAG`, and one
//! `TextPostProcessor`, and applies them in the fixed order hotwords -> rules
//! -> post-processing.

use crate::config::{EngineConfig, StreamMergerConfig};
use crate::hotword::HotwordCorrector;
use crate::rectification::RectificationRAG;
use crate::rule_corrector::RuleCorrector;
use crate::stream_merger::StreamMerger;
use crate::text_processor::TextPostProcessor;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Per-connection streaming state, keyed by an opaque stream id so a single
/// `Engine` can serve many concurrent streams (spec §6).
pub struct Engine {
    hotwords: HotwordCorrector,
    rules: RuleCorrector,
    rectification: RectificationRAG,
    post_processor: TextPostProcessor,
    stream_config: StreamMergerConfig,
    streams: Mutex<HashMap<String, StreamMerger>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            hotwords: HotwordCorrector::new(config.hotword),
            rules: RuleCorrector::new(),
            rectification: RectificationRAG::new(config.rectification),
            post_processor: TextPostProcessor::new(config.post_processor),
            stream_config: StreamMergerConfig::default(),
            streams: Mutex::new(HashMap::new()),
        }
    }

    pub fn new_stream_merger(&self, config: StreamMergerConfig) -> StreamMerger {
        StreamMerger::new(config)
    }

    pub fn load_hotwords_file(&self, path: &Path) -> usize {
        self.hotwords.load_from_path(path)
    }

    pub fn load_hotwords_str(&self, text: &str) -> usize {
        self.hotwords.load_from_str(text)
    }

    pub fn load_rules_file(&self, path: &Path) -> usize {
        self.rules.load_from_path(path)
    }

    pub fn load_rules_str(&self, text: &str) -> usize {
        self.rules.load_from_str(text)
    }

    pub fn load_rectify_file(&self, path: &Path) -> usize {
        self.rectification.load_from_path(path)
    }

    pub fn load_rectify_str(&self, text: &str) -> usize {
        self.rectification.load_from_str(text)
    }

    /// Fixed order per spec §4.5/§6: hotwords, then rules, then post-processing.
    pub fn apply_corrections(&self, text: &str) -> String {
        let after_hotwords = self.hotwords.correct(text).text;
        let after_rules = self.rules.substitute(&after_hotwords);
        self.post_processor.process(&after_rules)
    }

    /// Streaming online pass: merge `delta` into the named stream's buffer
    /// and run corrections over the newly-settled suffix only.
    pub fn correct_streaming_online(&self, delta: &str, stream_id: &str) -> String {
        let mut streams = self.streams.lock().unwrap_or_else(|p| p.into_inner());
        let merger = streams.entry(stream_id.to_string()).or_insert_with(|| StreamMerger::new(self.stream_config.clone()));
        let new_text = merger.merge(delta);
        self.apply_corrections(&new_text)
    }

    /// Streaming final pass: reconcile the stream's buffer against the ASR
    /// engine's own final transcript, then run corrections once more and
    /// drop the stream's state.
    pub fn correct_streaming_final(&self, final_text: &str, stream_id: &str) -> String {
        let mut streams = self.streams.lock().unwrap_or_else(|p| p.into_inner());
        let reconciled = match streams.get_mut(stream_id) {
            Some(merger) => merger.merge_final(final_text),
            None => final_text.to_string(),
        };
        streams.remove(stream_id);
        drop(streams);
        self.apply_corrections(&reconciled)
    }

    pub fn retrieve_rectify_prompt(&self, query: &str, top_k: usize) -> String {
        self.rectification.format_prompt(query, top_k, "Known corrections:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn applies_hotwords_then_rules_then_post_processing() {
        let engine = Engine::new(EngineConfig::default());
        engine.load_hotwords_str("麦当劳");
        engine.load_rules_str("呃 = ");
        let out = engine.apply_corrections("我想去吃买当劳");
        assert_eq!(out, "我想去吃麦当劳");
    }

    #[test]
    fn streaming_online_then_final_round_trip() {
        let engine = Engine::new(EngineConfig::default());
        let d1 = engine.correct_streaming_online("今天天气", "s1");
        let d2 = engine.correct_streaming_online("天气很好", "s1");
        assert!(!d1.is_empty());
        assert!(!d2.is_empty());
        let out = engine.correct_streaming_final("今天天气很好", "s1");
        assert!(out.contains("今天天气很好"));
    }

    #[test]
    fn rectify_prompt_empty_when_store_empty() {
        let engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.retrieve_rectify_prompt("anything", 3), "");
    }
}
