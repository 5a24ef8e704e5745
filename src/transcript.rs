/*!
 * Input and output records shared by the merge engine and the pipeline.
 */

use serde::{Deserialize, Serialize};

/// A single timed word as emitted by the transcriber.
///
/// `text` is kept verbatim, including any leading whitespace the
/// transcriber attached to the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub start: f64,
    pub end: f64,
    #[serde(alias = "word")]
    pub text: String,
}

impl Word {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A speech segment of the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "word")]
    pub words: Vec<Word>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words,
        }
    }
}

/// Full transcriber payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Build a transcript from segments, deriving the full text
    pub fn from_segments(language: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            language: language.into(),
            segments,
        }
    }

    /// Total number of timed words across all segments
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }
}

/// A speaker turn from the diarization collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationTurn {
    pub start: f64,
    pub end: f64,
    /// Track label of the upstream (turn, track, speaker) triple
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    /// Opaque speaker key
    pub speaker: String,
}

impl DiarizationTurn {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            track: None,
            speaker: speaker.into(),
        }
    }
}

/// A transcript segment annotated with the label of its speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
}

impl MergedSegment {
    /// Attach a speaker label to a transcript segment without touching its span
    pub fn from_segment(segment: &TranscriptSegment, speaker: Option<String>) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            speaker,
            text: segment.text.clone(),
            words: segment.words.clone(),
        }
    }
}
