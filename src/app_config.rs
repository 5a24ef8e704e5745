/*!
 * Application configuration: loading, validating and saving settings.
 */

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::merge::AttributionPolicy;
use crate::timecode::FrameRate;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Timeline frame rate used for cue placement
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Speaker attribution policy for segments spanning several turns
    #[serde(default)]
    pub attribution: AttributionPolicy,

    /// Reject unsorted transcript/diarization input before merging
    #[serde(default = "default_true")]
    pub validate_ordering: bool,

    /// Subtitle re-chunking rules
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Word censoring
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Timeline placement of cues
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Cue text formatting
    #[serde(default)]
    pub formatting: FormattingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Rules applied by the segmentation pipeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Maximum words per cue (0 disables the limit)
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Maximum characters per cue (0 disables the limit)
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Silence (seconds) above which a unit is split between two words
    #[serde(default = "default_split_gap_seconds")]
    pub split_gap_seconds: f64,

    /// Silence (seconds) below which adjacent units are joined
    #[serde(default = "default_merge_gap_seconds")]
    pub merge_gap_seconds: f64,

    /// Word cap for a unit produced by joining
    #[serde(default = "default_merge_max_words")]
    pub merge_max_words: usize,

    /// Marks ending a word that force a split after it
    #[serde(default = "default_punctuation_marks")]
    pub punctuation_marks: Vec<String>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            max_chars: default_max_chars(),
            split_gap_seconds: default_split_gap_seconds(),
            merge_gap_seconds: default_merge_gap_seconds(),
            merge_max_words: default_merge_max_words(),
            punctuation_marks: default_punctuation_marks(),
        }
    }
}

/// Word censoring settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RedactionConfig {
    /// Words to censor, matched case-insensitively
    #[serde(default)]
    pub censor_words: Vec<String>,
}

impl RedactionConfig {
    /// Parse a comma separated list such as "foo, bar,baz"
    pub fn from_list(list: &str) -> Self {
        Self {
            censor_words: list
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

/// Where cues land on the host timeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Frame of the timeline that corresponds to t = 0 of the audio
    #[serde(default)]
    pub timeline_start_frame: u64,

    /// Cues starting after this frame are dropped
    #[serde(default)]
    pub timeline_end_frame: Option<u64>,

    /// Gaps shorter than this many frames are closed
    #[serde(default = "default_gap_close_frames")]
    pub gap_close_frames: u64,

    /// Count frames in whole-number timecode base (23.976 -> 24)
    #[serde(default)]
    pub nominal_frame_rate: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            timeline_start_frame: 0,
            timeline_end_frame: None,
            gap_close_frames: default_gap_close_frames(),
            nominal_frame_rate: false,
        }
    }
}

/// Letter case applied to cue text
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    Original,
    Lower,
    Upper,
}

/// Cue text formatting
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct FormattingConfig {
    #[serde(default)]
    pub text_case: TextCase,

    /// Strip commas and full stops
    #[serde(default)]
    pub remove_punctuation: bool,
}

impl FormattingConfig {
    /// Apply case and punctuation settings to a line of text
    pub fn apply(&self, text: &str) -> String {
        let text = match self.text_case {
            TextCase::Original => text.to_string(),
            TextCase::Lower => text.to_lowercase(),
            TextCase::Upper => text.to_uppercase(),
        };
        if self.remove_punctuation {
            text.replace([',', '.'], "")
        } else {
            text
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_frame_rate() -> f64 {
    24.0
}

fn default_max_words() -> usize {
    8
}

fn default_max_chars() -> usize {
    42
}

fn default_split_gap_seconds() -> f64 {
    0.3
}

fn default_merge_gap_seconds() -> f64 {
    0.2
}

fn default_merge_max_words() -> usize {
    2
}

fn default_punctuation_marks() -> Vec<String> {
    [".", ",", "?", "!", "。", "，", "？", "！"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_gap_close_frames() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file, or write and return the default one if the
    /// file does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        FrameRate::new(self.frame_rate)?;

        let seg = &self.segmentation;
        if !seg.split_gap_seconds.is_finite() || seg.split_gap_seconds < 0.0 {
            return Err(anyhow!("split_gap_seconds must be a non-negative number"));
        }
        if !seg.merge_gap_seconds.is_finite() || seg.merge_gap_seconds < 0.0 {
            return Err(anyhow!("merge_gap_seconds must be a non-negative number"));
        }
        if seg.split_gap_seconds > 0.0 && seg.merge_gap_seconds > seg.split_gap_seconds {
            return Err(anyhow!(
                "merge_gap_seconds ({}) must not exceed split_gap_seconds ({})",
                seg.merge_gap_seconds,
                seg.split_gap_seconds
            ));
        }
        if seg.punctuation_marks.iter().any(|m| m.trim().is_empty()) {
            return Err(anyhow!("punctuation_marks must not contain blank entries"));
        }

        if let Some(end) = self.placement.timeline_end_frame {
            if end < self.placement.timeline_start_frame {
                return Err(anyhow!(
                    "timeline_end_frame ({}) is before timeline_start_frame ({})",
                    end,
                    self.placement.timeline_start_frame
                ));
            }
        }

        Ok(())
    }

    /// Frame rate cues are placed at, honoring the nominal timecode base
    pub fn placement_rate(&self) -> Result<FrameRate> {
        let rate = FrameRate::new(self.frame_rate)?;
        Ok(if self.placement.nominal_frame_rate { rate.nominal() } else { rate })
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            frame_rate: default_frame_rate(),
            attribution: AttributionPolicy::default(),
            validate_ordering: true,
            segmentation: SegmentationConfig::default(),
            redaction: RedactionConfig::default(),
            placement: PlacementConfig::default(),
            formatting: FormattingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
