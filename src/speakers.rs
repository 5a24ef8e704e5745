/*!
 * Speaker registry for a single merge run.
 *
 * The registry hands out sequential labels ("Speaker 1", "Speaker 2", ...) in
 * order of first appearance, assigns each speaker a color from a call-scoped
 * pool, and accumulates per-speaker statistics:
 * - subtitle lines (segments attributed)
 * - word count (timed words in those segments)
 * - a sample window (span of the first attributed segment)
 */

use std::collections::{HashMap, VecDeque};

use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::transcript::TranscriptSegment;

/// Label and id of the reserved speaker for unmatched segments
pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// Fixed palette colors are drawn from, in order
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#0062ec", "#ed63d4", "#8b5eed", "#1a8bed", "#308800",
    "#886d4e", "#cb0000", "#6cb18c", "#d57312", "#000000",
];

/// Subtitle style hint for the placement collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeakerStyle {
    #[default]
    Outline,
    Fill,
    None,
}

/// Time window of a speaker's first attributed segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleWindow {
    pub start: f64,
    pub end: f64,
}

/// A speaker identified during the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub label: String,
    pub id: String,
    pub color: String,
    pub style: SpeakerStyle,
    pub sample: SampleWindow,
    pub subtitle_lines: usize,
    pub word_count: usize,
}

/// The speaker with the most subtitle lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSpeaker {
    pub label: String,
    pub id: String,
    pub percentage: u32,
}

/// Ordered color source owned by one registry.
#[derive(Debug, Clone)]
pub struct ColorPool {
    remaining: VecDeque<String>,
    synthesized: usize,
}

impl Default for ColorPool {
    fn default() -> Self {
        Self::with_palette(DEFAULT_PALETTE.iter().map(|c| c.to_string()))
    }
}

impl ColorPool {
    /// Create a pool over a custom palette
    pub fn with_palette<I: IntoIterator<Item = String>>(palette: I) -> Self {
        Self {
            remaining: palette.into_iter().collect(),
            synthesized: 0,
        }
    }

    /// Take the next color; once the palette is empty, derive one from `key`
    pub fn next_color(&mut self, key: &str) -> String {
        if let Some(color) = self.remaining.pop_front() {
            return color;
        }

        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update(self.synthesized.to_le_bytes());
        let digest = hasher.finalize();
        self.synthesized += 1;

        let color = format!("#{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2]);
        debug!("Palette exhausted, synthesized {} for speaker key {}", color, key);
        color
    }
}

/// Per-call registry of speakers
#[derive(Debug, Default)]
pub struct SpeakerRegistry {
    speakers: Vec<Speaker>,
    by_key: HashMap<String, usize>,
    unknown: Option<usize>,
    next_number: usize,
    colors: ColorPool,
}

impl SpeakerRegistry {
    /// Create an empty registry with the default palette
    pub fn new() -> Self {
        Self::with_colors(ColorPool::default())
    }

    /// Create an empty registry drawing from the given pool
    pub fn with_colors(colors: ColorPool) -> Self {
        Self {
            speakers: Vec::new(),
            by_key: HashMap::new(),
            unknown: None,
            next_number: 1,
            colors,
        }
    }

    /// Attribute a segment to the speaker behind `key`, registering it on
    /// first sighting. Returns the speaker's label.
    pub fn attribute(&mut self, key: &str, segment: &TranscriptSegment) -> String {
        let idx = match self.by_key.get(key) {
            Some(&idx) => idx,
            None => {
                let label = format!("Speaker {}", self.next_number);
                self.next_number += 1;
                let idx = self.register(label, key, segment);
                self.by_key.insert(key.to_string(), idx);
                idx
            }
        };
        self.count(idx, segment)
    }

    /// Attribute a segment to the reserved "Unknown" speaker
    pub fn attribute_unknown(&mut self, segment: &TranscriptSegment) -> String {
        let idx = match self.unknown {
            Some(idx) => idx,
            None => {
                let idx = self.register(UNKNOWN_SPEAKER.to_string(), UNKNOWN_SPEAKER, segment);
                self.unknown = Some(idx);
                idx
            }
        };
        self.count(idx, segment)
    }

    fn register(&mut self, label: String, key: &str, segment: &TranscriptSegment) -> usize {
        let color = self.colors.next_color(key);
        debug!("Registered {} (key {}) with color {}", label, key, color);
        self.speakers.push(Speaker {
            id: label.clone(),
            label,
            color,
            style: SpeakerStyle::Outline,
            sample: SampleWindow {
                start: segment.start,
                end: segment.end,
            },
            subtitle_lines: 0,
            word_count: 0,
        });
        self.speakers.len() - 1
    }

    fn count(&mut self, idx: usize, segment: &TranscriptSegment) -> String {
        let speaker = &mut self.speakers[idx];
        speaker.subtitle_lines += 1;
        speaker.word_count += segment.words.len();
        speaker.label.clone()
    }

    /// Speakers in registration order
    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    /// Number of segments attributed so far
    pub fn total_lines(&self) -> usize {
        self.speakers.iter().map(|s| s.subtitle_lines).sum()
    }

    /// Dominant speaker; ties go to the first registered
    pub fn top_speaker(&self, total_segments: usize) -> Option<TopSpeaker> {
        if total_segments == 0 {
            return None;
        }

        let mut top: Option<&Speaker> = None;
        for speaker in &self.speakers {
            if top.is_none_or(|t| speaker.subtitle_lines > t.subtitle_lines) {
                top = Some(speaker);
            }
        }

        top.map(|speaker| {
            let ratio = speaker.subtitle_lines as f64 / total_segments as f64;
            TopSpeaker {
                label: speaker.label.clone(),
                id: speaker.id.clone(),
                percentage: (ratio * 100.0).round().clamp(0.0, 100.0) as u32,
            }
        })
    }

    /// Consume the registry, yielding speakers in registration order
    pub fn into_speakers(self) -> Vec<Speaker> {
        self.speakers
    }
}
