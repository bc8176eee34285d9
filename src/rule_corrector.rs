//! Regex-based rewrite store with thread-safe reload (spec §4.6).

use regex::Regex;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    replacement: String,
}

pub struct RuleCorrector {
    rules: RwLock<Arc<Vec<Rule>>>,
}

impl Default for RuleCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleCorrector {
    pub fn new() -> Self {
        Self { rules: RwLock::new(Arc::new(Vec::new())) }
    }

    /// Each non-comment line splits on the first `" = "`; invalid lines are
    /// dropped (spec §4.6).
    pub fn load_from_str(&self, text: &str) -> usize {
        let mut rules = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some(idx) = trimmed.find(" = ") else { continue };
            let (pattern, replacement) = trimmed.split_at(idx);
            let replacement = &replacement[" = ".len()..];
            if pattern.is_empty() {
                continue;
            }
            rules.push(Rule { pattern: pattern.to_string(), replacement: replacement.to_string() });
        }
        let count = rules.len();
        let arc = Arc::new(rules);
        match self.rules.write() {
            Ok(mut guard) => *guard = arc,
            Err(poisoned) => *poisoned.into_inner() = arc,
        }
        info!(count, "loaded rules");
        count
    }

    pub fn load_from_path(&self, path: &std::path::Path) -> usize {
        match std::fs::read_to_string(path) {
            Ok(text) => self.load_from_str(&text),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load rule file");
                0
            }
        }
    }

    fn snapshot(&self) -> Arc<Vec<Rule>> {
        match self.rules.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply each regex substitution in insertion order. Regex-compile
    /// failures are silently skipped per-pattern (spec §4.6, §7 PatternError).
    pub fn substitute(&self, text: &str) -> String {
        let rules = self.snapshot();
        let mut out = text.to_string();
        for rule in rules.iter() {
            match Regex::new(&rule.pattern) {
                Ok(re) => {
                    out = re.replace_all(&out, rule.replacement.as_str()).into_owned();
                }
                Err(err) => {
                    warn!(pattern = %rule.pattern, error = %err, "skipping invalid rule pattern");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_rules_in_insertion_order() {
        let rc = RuleCorrector::new();
        rc.load_from_str("毫安时 = mAh\n伏特 = V\n赫兹 = Hz\n摄氏度 = °C\n");
        let out = rc.substitute("电池容量5000毫安时，电压3.7伏特，频率50赫兹，温度25摄氏度");
        assert!(out.contains("mAh"));
        assert!(out.contains("V"));
        assert!(out.contains("Hz"));
        assert!(out.contains("°C"));
    }

    #[test]
    fn chained_rules_compose_left_to_right() {
        let rc = RuleCorrector::new();
        rc.load_from_str("a = b\nb = c\n");
        assert_eq!(rc.substitute("a"), "c");
    }

    #[test]
    fn invalid_regex_pattern_is_skipped_not_fatal() {
        let rc = RuleCorrector::new();
        rc.load_from_str("( = x\ngood = ok\n");
        assert_eq!(rc.substitute("good"), "ok");
    }

    #[test]
    fn malformed_lines_without_separator_are_ignored() {
        let rc = RuleCorrector::new();
        let count = rc.load_from_str("no separator here\nfoo = bar\n");
        assert_eq!(count, 1);
    }
}
