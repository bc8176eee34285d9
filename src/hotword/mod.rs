//! Phoneme-based fuzzy hotword corrector (spec §4.5).

mod corrector;

pub use corrector::{CorrectionResult, HotwordCorrector, MatchRecord};
