/*!
 * Subtitle segmentation pipeline.
 *
 * Re-chunks timed text into on-screen units by running an ordered set of
 * rules, each consuming the previous rule's output:
 * - `rules::split_by_punctuation`
 * - `rules::split_by_gap`
 * - `rules::merge_by_gap`
 * - `rules::split_by_length`
 *
 * Units are then placed on the timeline as frame-based cues by `cues`, which
 * also closes small gaps between consecutive cues.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::SegmentationConfig;
use crate::subtitle_processor::SubtitleEntry;
use crate::transcript::{MergedSegment, Word};

pub mod cues;
pub mod rules;

pub use cues::{build_cues, close_gaps, SubtitleCue};

/// A run of timed text on its way to becoming a cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleUnit {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Word timings were interpolated rather than measured
    #[serde(default)]
    pub estimated_timing: bool,
}

impl SubtitleUnit {
    /// Build a unit from a merged segment, synthesizing words when the
    /// transcriber supplied none
    pub fn from_merged(segment: &MergedSegment) -> Self {
        if segment.words.is_empty() {
            return Self::from_text(segment.start, segment.end, &segment.text, segment.speaker.clone());
        }
        Self {
            start: segment.start,
            end: segment.end,
            text: join_words(&segment.words),
            words: segment.words.clone(),
            speaker: segment.speaker.clone(),
            estimated_timing: false,
        }
    }

    /// Build a unit from a parsed SRT entry
    pub fn from_entry(entry: &SubtitleEntry) -> Self {
        let text = entry.text.replace('\n', " ");
        Self::from_text(
            entry.start_time_ms as f64 / 1000.0,
            entry.end_time_ms as f64 / 1000.0,
            &text,
            None,
        )
    }

    /// Build a unit from untimed text; each whitespace token gets a share of
    /// the span proportional to its length
    pub fn from_text(start: f64, end: f64, text: &str, speaker: Option<String>) -> Self {
        let words = synthesize_words(start, end, text);
        Self {
            start,
            end,
            text: join_words(&words),
            words,
            speaker,
            estimated_timing: true,
        }
    }

    /// Number of words in the unit
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of characters of the rendered text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Cut the unit into pieces, each new piece starting at one of the given
    /// word indices. Indices must be increasing and inside `1..len`.
    pub(crate) fn split_at(self, boundaries: &[usize]) -> Vec<SubtitleUnit> {
        if boundaries.is_empty() {
            return vec![self];
        }

        let last_piece = boundaries.len();
        let mut pieces = Vec::with_capacity(boundaries.len() + 1);
        let mut from = 0;
        for (n, &to) in boundaries.iter().chain(std::iter::once(&self.words.len())).enumerate() {
            let words = self.words[from..to].to_vec();
            let start = if n == 0 { self.start } else { words[0].start };
            let end = if n == last_piece { self.end } else { words[words.len() - 1].end };
            pieces.push(SubtitleUnit {
                start,
                end: end.max(start),
                text: join_words(&words),
                words,
                speaker: self.speaker.clone(),
                estimated_timing: self.estimated_timing,
            });
            from = to;
        }
        pieces
    }

    /// Append `next` to this unit
    pub(crate) fn absorb(&mut self, next: SubtitleUnit) {
        self.end = self.end.max(next.end);
        self.words.extend(next.words);
        self.text = join_words(&self.words);
        self.estimated_timing |= next.estimated_timing;
    }
}

/// Ordered rule chain over subtitle units
#[derive(Debug, Clone)]
pub struct SegmentationPipeline {
    config: SegmentationConfig,
}

impl SegmentationPipeline {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Run every rule in order
    pub fn run(&self, units: Vec<SubtitleUnit>) -> Vec<SubtitleUnit> {
        let input = units.len();

        let units = rules::split_by_punctuation(units, &self.config.punctuation_marks);
        debug!("Punctuation split: {} -> {} units", input, units.len());

        let before = units.len();
        let units = rules::split_by_gap(units, self.config.split_gap_seconds);
        debug!("Gap split: {} -> {} units", before, units.len());

        let before = units.len();
        let units = rules::merge_by_gap(units, self.config.merge_gap_seconds, self.config.merge_max_words);
        debug!("Gap merge: {} -> {} units", before, units.len());

        let before = units.len();
        let units = rules::split_by_length(units, self.config.max_words, self.config.max_chars);
        debug!("Length split: {} -> {} units", before, units.len());

        units
    }
}

/// Concatenate word tokens into display text.
///
/// Tokens keep their own leading whitespace; a space is only inserted between
/// two bare tokens when neither side is CJK.
pub fn join_words(words: &[Word]) -> String {
    let mut text = String::new();
    for word in words {
        let needs_space = match (text.chars().last(), word.text.chars().next()) {
            (Some(prev), Some(next)) => {
                !prev.is_whitespace() && !next.is_whitespace() && !is_cjk(prev) && !is_cjk(next)
            }
            _ => false,
        };
        if needs_space {
            text.push(' ');
        }
        text.push_str(&word.text);
    }
    text.trim().to_string()
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{30ff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{ac00}'..='\u{d7af}'
        | '\u{ff00}'..='\u{ffef}')
}

fn synthesize_words(start: f64, end: f64, text: &str) -> Vec<Word> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let total_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
    if tokens.is_empty() || total_chars == 0 {
        return Vec::new();
    }

    let span = (end - start).max(0.0);
    let mut cursor = start;
    let mut consumed = 0;
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            consumed += token.chars().count();
            let word_end = if i + 1 == tokens.len() {
                end.max(start)
            } else {
                start + span * consumed as f64 / total_chars as f64
            };
            let text = if i == 0 { token.to_string() } else { format!(" {}", token) };
            let word = Word::new(cursor, word_end, text);
            cursor = word_end;
            word
        })
        .collect()
}
