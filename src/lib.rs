//! Chinese-centric ASR post-processing core.
//!
//! Phonemizes Mandarin and mixed-language text, corrects hotwords and
//! user-defined rules against streaming or batch transcripts, normalizes
//! numerals/dates/percentages (ITN), and retrieves phoneme-matched
//! correction history for LLM-assisted rectification. See [`Engine`] for
//! the single entry point a host embeds.

pub mod config;
pub mod error;
pub mod fast_index;
pub mod fuzzy_matcher;
pub mod hotword;
pub mod itn;
pub mod orchestrator;
pub mod phoneme;
pub mod rectification;
pub mod rule_corrector;
pub mod stream_merger;
pub mod text_processor;

pub use config::EngineConfig;
pub use error::CoreError;
pub use orchestrator::Engine;
pub use stream_merger::StreamMerger;
