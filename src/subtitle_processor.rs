use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AlignError;
use crate::segmentation::SubtitleCue;
use crate::timecode::FrameRate;

// @module: SRT interchange format

// @const: SRT timing line
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2},\d{3})$")
        .expect("timing line pattern is valid")
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Build an entry from a placed cue, mapping its frames back to audio
    /// time relative to `mark_in`
    pub fn from_cue(seq_num: usize, cue: &SubtitleCue, rate: FrameRate, mark_in: u64) -> Self {
        let to_ms = |frame: i64| seconds_to_ms((frame - mark_in as i64) as f64 / rate.fps());
        let start_time_ms = to_ms(cue.timeline_pos);
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms: to_ms(cue.end()).max(start_time_ms),
            text: cue.text.clone(),
        }
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split([':', ',']).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// Collection of subtitle entries
#[derive(Debug)]
pub struct SubtitleCollection {
    /// File the entries were read from or will be written to
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Entries for cues placed at `rate`, numbered from 1
    pub fn from_cues(source_file: PathBuf, cues: &[SubtitleCue], rate: FrameRate, mark_in: u64) -> Self {
        let entries = cues
            .iter()
            .enumerate()
            .map(|(i, cue)| SubtitleEntry::from_cue(i + 1, cue, rate, mark_in))
            .collect();
        SubtitleCollection { source_file, entries }
    }

    /// Read and strictly parse an SRT file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries = Self::parse_srt_file(path)?;
        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Render the whole collection as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        debug!("Wrote {} subtitle entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Parse SRT file content to subtitle entries
    pub fn parse_srt_file(path: &Path) -> Result<Vec<SubtitleEntry>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        Ok(Self::parse_srt_string(&content)?)
    }

    /// Parse SRT text into entries sorted by start time.
    ///
    /// Every block must be an index line, a timing line and at least one text
    /// line. Nothing is repaired: the first bad block fails the whole parse.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, AlignError> {
        let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

        let mut entries = Vec::new();
        let mut block: Vec<&str> = Vec::new();
        let mut block_num = 0;

        for line in content.lines().chain(std::iter::once("")) {
            if !line.trim().is_empty() {
                block.push(line);
                continue;
            }
            if block.is_empty() {
                continue;
            }
            block_num += 1;
            entries.push(Self::parse_block(block_num, &block)?);
            block.clear();
        }

        if entries.is_empty() {
            return Err(AlignError::EmptyInput("subtitle file contains no blocks".to_string()));
        }

        entries.sort_by_key(|entry| entry.start_time_ms);

        let overlap_count = entries
            .windows(2)
            .filter(|pair| pair[0].end_time_ms > pair[1].start_time_ms)
            .count();
        if overlap_count > 0 {
            warn!("Found {} overlapping subtitle entries", overlap_count);
        }

        Ok(entries)
    }

    fn parse_block(block_num: usize, lines: &[&str]) -> Result<SubtitleEntry, AlignError> {
        let malformed = |reason: String| AlignError::MalformedSubtitleFile {
            block: block_num,
            reason,
        };

        let seq_num: usize = lines[0]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("expected an index line, found '{}'", lines[0].trim())))?;

        let timing = lines
            .get(1)
            .map(|line| line.trim())
            .ok_or_else(|| malformed("missing timing line".to_string()))?;
        let caps = TIMING_LINE_REGEX
            .captures(timing)
            .ok_or_else(|| malformed(format!("expected 'HH:MM:SS,mmm --> HH:MM:SS,mmm', found '{}'", timing)))?;

        let start_time_ms = SubtitleEntry::parse_timestamp(&caps[1]).map_err(|e| malformed(e.to_string()))?;
        let end_time_ms = SubtitleEntry::parse_timestamp(&caps[2]).map_err(|e| malformed(e.to_string()))?;
        if end_time_ms < start_time_ms {
            return Err(malformed(format!(
                "end time {} is before start time {}",
                caps[2].to_string(),
                caps[1].to_string()
            )));
        }

        if lines.len() < 3 {
            return Err(malformed("missing subtitle text".to_string()));
        }
        let text = lines[2..].iter().map(|line| line.trim()).collect::<Vec<_>>().join("\n");

        Ok(SubtitleEntry::new(seq_num, start_time_ms, end_time_ms, text))
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
