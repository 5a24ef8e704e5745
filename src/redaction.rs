/*!
 * Censoring of configured words.
 *
 * Each censor word is applied in two passes:
 * - whole-word matches become `first + '*' * (len - 2) + last`
 * - matches inside a longer token become `first + "**"`, or `*` for a
 *   single-character word
 *
 * Matching is case-insensitive and the mask is built from the matched text,
 * so the original casing of the kept letters survives. Asterisks never match
 * a censor word, which makes redaction idempotent.
 */

use log::{debug, warn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::segmentation::SubtitleUnit;

/// Time span of a censored word, for an optional audio bleep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BleepSpan {
    pub start: f64,
    pub end: f64,
    /// The word as it read before masking
    pub text: String,
    /// Span was interpolated from untimed text
    pub estimated: bool,
}

#[derive(Debug, Clone)]
struct CensorRule {
    whole: Regex,
    partial: Regex,
}

/// Compiled censor list
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    rules: Vec<CensorRule>,
}

impl Redactor {
    /// Compile a censor list. Blank words and words containing `*` are
    /// skipped with a warning.
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let mut rules = Vec::with_capacity(words.len());
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            if word.contains('*') {
                warn!("Ignoring censor word '{}': asterisks are reserved for masks", word);
                continue;
            }

            let escaped = regex::escape(word);
            match (
                Regex::new(&format!(r"(?i)\b{}\b", escaped)),
                Regex::new(&format!(r"(?i){}", escaped)),
            ) {
                (Ok(whole), Ok(partial)) => rules.push(CensorRule { whole, partial }),
                (Err(e), _) | (_, Err(e)) => warn!("Ignoring censor word '{}': {}", word, e),
            }
        }
        Self { rules }
    }

    /// True when there is nothing to censor
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Mask every censored word in `text`
    pub fn redact_text(&self, text: &str) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            if let std::borrow::Cow::Owned(masked) = rule.whole.replace_all(&text, |caps: &Captures| mask_word(&caps[0])) {
                text = masked;
            }
            if let std::borrow::Cow::Owned(masked) = rule.partial.replace_all(&text, |caps: &Captures| mask_partial(&caps[0])) {
                text = masked;
            }
        }
        text
    }

    /// Redact a unit's text and words in place, returning the spans of the
    /// words that were altered
    pub fn redact_unit(&self, unit: &mut SubtitleUnit) -> Vec<BleepSpan> {
        if self.is_empty() {
            return Vec::new();
        }

        unit.text = self.redact_text(&unit.text);

        let mut bleeps = Vec::new();
        for word in &mut unit.words {
            let masked = self.redact_text(&word.text);
            if masked != word.text {
                bleeps.push(BleepSpan {
                    start: word.start,
                    end: word.end,
                    text: word.text.trim().to_string(),
                    estimated: unit.estimated_timing,
                });
                word.text = masked;
            }
        }
        bleeps
    }

    /// Redact every unit, collecting bleep spans in time order
    pub fn redact_units(&self, units: &mut [SubtitleUnit]) -> Vec<BleepSpan> {
        let bleeps: Vec<BleepSpan> = units.iter_mut().flat_map(|unit| self.redact_unit(unit)).collect();
        if !bleeps.is_empty() {
            debug!("Censored {} words", bleeps.len());
        }
        bleeps
    }
}

/// Keep first and last character, star the rest
pub fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => "*".to_string(),
        2 => format!("{}*", chars[0]),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    }
}

/// Fallback mask for a match inside a longer token. A single character is
/// starred outright so the mask never contains the match again.
pub fn mask_partial(word: &str) -> String {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (None, _) => String::new(),
        (Some(_), None) => "*".to_string(),
        (Some(first), Some(_)) => format!("{}**", first),
    }
}
