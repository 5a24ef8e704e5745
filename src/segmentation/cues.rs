/*!
 * Frame-based subtitle cues for the placement collaborator.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use super::SubtitleUnit;
use crate::app_config::{FormattingConfig, PlacementConfig};
use crate::timecode::{frames_at, FrameRate};

/// A subtitle placed on the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// First frame of the cue on the timeline
    pub timeline_pos: i64,
    /// Length of the cue in frames
    pub duration: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl SubtitleCue {
    pub fn new(timeline_pos: i64, duration: i64, text: impl Into<String>) -> Self {
        Self {
            timeline_pos,
            duration,
            text: text.into(),
            speaker: None,
        }
    }

    /// Frame at which the cue ends
    pub fn end(&self) -> i64 {
        self.timeline_pos + self.duration
    }
}

/// Convert segmented units into timeline cues and close small gaps.
///
/// Units must be in time order. Units starting after the configured end frame
/// stop the conversion; units whose formatted text is empty are skipped.
/// Cues left without a single frame after gap closing are dropped.
pub fn build_cues(
    units: &[SubtitleUnit],
    rate: FrameRate,
    placement: &PlacementConfig,
    formatting: &FormattingConfig,
) -> Vec<SubtitleCue> {
    let offset = placement.timeline_start_frame as i64;
    let mut cues = Vec::with_capacity(units.len());

    for unit in units {
        let timeline_pos = offset + frames_at(unit.start, rate) as i64;
        if let Some(end_frame) = placement.timeline_end_frame {
            if timeline_pos > end_frame as i64 {
                debug!("Cue at frame {} is past the end frame {}, stopping", timeline_pos, end_frame);
                break;
            }
        }

        let text = formatting.apply(&unit.text);
        if text.trim().is_empty() {
            continue;
        }

        let end = offset + frames_at(unit.end, rate) as i64;
        cues.push(SubtitleCue {
            timeline_pos,
            duration: (end - timeline_pos).max(0),
            text,
            speaker: unit.speaker.clone(),
        });
    }

    cues.sort_by_key(|cue| cue.timeline_pos);
    close_gaps(&mut cues, placement.gap_close_frames as i64);

    let before = cues.len();
    cues.retain(|cue| cue.duration > 0);
    if cues.len() < before {
        debug!("Dropped {} zero-length cues", before - cues.len());
    }
    cues
}

/// For every cue but the last: when the gap to the next cue is below
/// `threshold` frames, or the cues overlap, end the cue one frame before the
/// next one starts.
pub fn close_gaps(cues: &mut [SubtitleCue], threshold: i64) {
    let mut closed = 0;
    for i in 0..cues.len().saturating_sub(1) {
        let next_pos = cues[i + 1].timeline_pos;
        let cue = &mut cues[i];
        let gap = next_pos - cue.end();
        if gap < threshold || gap < 0 {
            cue.duration = (next_pos - cue.timeline_pos - 1).max(0);
            closed += 1;
        }
    }
    debug!("Closed {} gaps between {} cues", closed, cues.len());
}
