/*!
 * # autosubs - speaker-aware subtitle alignment
 *
 * Turns a timed transcript and a list of speaker turns into subtitle cues
 * ready to be placed on a video editing timeline.
 *
 * ## Features
 *
 * - Speaker attribution of transcript segments with a single forward sweep
 * - Stable speaker labels, colors and per-speaker statistics
 * - Re-chunking of segments into readable subtitle lines
 * - Case-insensitive censoring with optional bleep spans
 * - Frame-accurate cues with small gaps closed
 * - SRT import and export
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `transcript`: Input and output records
 * - `timecode`: Seconds/frames/timecode conversion
 * - `speakers`: Speaker registry and color pool
 * - `merge`: Transcript/diarization interval merge
 * - `segmentation`: Subtitle re-chunking rules and cue building:
 *   - `segmentation::rules`: Punctuation, gap and length rules
 *   - `segmentation::cues`: Frame cues and gap closing
 * - `redaction`: Censor word masking
 * - `subtitle_processor`: SRT parsing and writing
 * - `sources`: Transcript and diarization collaborators
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod merge;
pub mod redaction;
pub mod segmentation;
pub mod sources;
pub mod speakers;
pub mod subtitle_processor;
pub mod timecode;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{AlignmentOutput, Controller};
pub use errors::{AlignError, AppError, SourceError};
pub use merge::{merge_diarization, validate_ordering, AttributionPolicy, MergedTranscript};
pub use redaction::{BleepSpan, Redactor};
pub use segmentation::{SegmentationPipeline, SubtitleCue, SubtitleUnit};
pub use speakers::{Speaker, TopSpeaker};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use timecode::{to_frames, to_timecode, FrameRate, Timecode};
pub use transcript::{DiarizationTurn, MergedSegment, Transcript, TranscriptSegment, Word};
