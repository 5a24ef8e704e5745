/*!
 * Interval merge of transcript segments against diarization turns.
 *
 * A single forward two-pointer sweep over both streams. Both inputs must be
 * sorted by start time; `validate_ordering` checks that precondition and is
 * meant to be run by the caller before merging.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::AlignError;
use crate::speakers::{Speaker, SpeakerRegistry, TopSpeaker};
use crate::transcript::{DiarizationTurn, MergedSegment, Transcript, TranscriptSegment};

/// How a segment overlapping several turns picks its speaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionPolicy {
    /// The first overlapping turn in scan order wins
    #[default]
    FirstContact,
    /// The overlapping turn covering most of the segment wins
    MajorityOverlap,
}

/// Merged, speaker-labeled transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTranscript {
    pub text: String,
    pub language: String,
    pub speakers: Vec<Speaker>,
    pub top_speaker: Option<TopSpeaker>,
    pub segments: Vec<MergedSegment>,
}

impl MergedTranscript {
    /// Wrap a transcript that was produced without diarization
    pub fn without_speakers(transcript: &Transcript) -> Self {
        Self {
            text: transcript.text.clone(),
            language: transcript.language.clone(),
            speakers: Vec::new(),
            top_speaker: None,
            segments: transcript
                .segments
                .iter()
                .map(|s| MergedSegment::from_segment(s, None))
                .collect(),
        }
    }
}

/// Check that both streams are sorted by start and have `end >= start`
pub fn validate_ordering(segments: &[TranscriptSegment], turns: &[DiarizationTurn]) -> Result<(), AlignError> {
    check_stream("transcript", segments.iter().map(|s| (s.start, s.end)))?;
    check_stream("diarization", turns.iter().map(|t| (t.start, t.end)))
}

fn check_stream<I>(stream: &'static str, spans: I) -> Result<(), AlignError>
where
    I: Iterator<Item = (f64, f64)>,
{
    let mut prev_start = f64::NEG_INFINITY;
    for (index, (start, end)) in spans.enumerate() {
        if start.is_nan() || end.is_nan() || end < start {
            return Err(AlignError::OrderingViolation {
                stream,
                index,
                reason: format!("invalid span {}..{}", start, end),
            });
        }
        if start < prev_start {
            return Err(AlignError::OrderingViolation {
                stream,
                index,
                reason: format!("starts at {} before previous start {}", start, prev_start),
            });
        }
        prev_start = start;
    }
    Ok(())
}

/// Merge a transcript with diarization turns.
///
/// For each segment the sweep compares it with the current turn:
/// - the turn ends at or before the segment start: advance the turn
/// - the segment ends at or before the turn start: the segment goes to "Unknown"
/// - otherwise they overlap: the whole segment goes to the turn's speaker and
///   only the segment cursor moves, so the same turn can claim the next segment
///
/// Segments left over once the turns run out go to "Unknown".
pub fn merge_diarization(
    transcript: &Transcript,
    turns: &[DiarizationTurn],
    policy: AttributionPolicy,
) -> MergedTranscript {
    let segments = &transcript.segments;
    let mut registry = SpeakerRegistry::new();
    let mut merged = Vec::with_capacity(segments.len());

    let (mut i, mut j) = (0, 0);
    while i < segments.len() && j < turns.len() {
        let segment = &segments[i];
        let turn = &turns[j];

        if turn.end <= segment.start {
            j += 1;
        } else if segment.end <= turn.start {
            let label = registry.attribute_unknown(segment);
            merged.push(MergedSegment::from_segment(segment, Some(label)));
            i += 1;
        } else {
            let winner = match policy {
                AttributionPolicy::FirstContact => turn,
                AttributionPolicy::MajorityOverlap => majority_turn(segment, &turns[j..]),
            };
            let label = registry.attribute(&winner.speaker, segment);
            merged.push(MergedSegment::from_segment(segment, Some(label)));
            i += 1;
        }
    }

    for segment in &segments[i..] {
        let label = registry.attribute_unknown(segment);
        merged.push(MergedSegment::from_segment(segment, Some(label)));
    }

    let top_speaker = registry.top_speaker(registry.total_lines());
    let speakers = registry.into_speakers();
    debug!(
        "Merged {} segments against {} turns: {} speakers",
        segments.len(),
        turns.len(),
        speakers.len()
    );

    MergedTranscript {
        text: transcript.text.clone(),
        language: transcript.language.clone(),
        speakers,
        top_speaker,
        segments: merged,
    }
}

/// Among the turns starting at the current one that overlap `segment`, pick the
/// one with the largest overlap; ties go to the earliest.
fn majority_turn<'a>(segment: &TranscriptSegment, turns: &'a [DiarizationTurn]) -> &'a DiarizationTurn {
    let mut best = &turns[0];
    let mut best_overlap = overlap(segment, best);

    for turn in turns.iter().skip(1).take_while(|t| t.start < segment.end) {
        let amount = overlap(segment, turn);
        if amount > best_overlap {
            best = turn;
            best_overlap = amount;
        }
    }
    best
}

fn overlap(segment: &TranscriptSegment, turn: &DiarizationTurn) -> f64 {
    (segment.end.min(turn.end) - segment.start.max(turn.start)).max(0.0)
}
