use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::errors::{AlignError, AppError};
use crate::file_utils::{FileManager, TRANSCRIPT_SUFFIX};
use crate::merge::{merge_diarization, validate_ordering, MergedTranscript};
use crate::redaction::{BleepSpan, Redactor};
use crate::segmentation::{build_cues, SegmentationPipeline, SubtitleCue, SubtitleUnit};
use crate::sources::{DiarizationSource, JsonDiarizationFile, JsonTranscriptFile, TranscriptSource};
use crate::subtitle_processor::SubtitleCollection;
use crate::timecode::FrameRate;
use crate::transcript::{DiarizationTurn, MergedSegment, Transcript};

// @module: Application controller for subtitle alignment

/// Everything one alignment run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentOutput {
    #[serde(flatten)]
    pub transcript: MergedTranscript,

    /// Rate the cues were placed at
    pub frame_rate: f64,

    /// Timeline frame matching t = 0 of the audio
    pub mark_in: u64,

    pub cues: Vec<SubtitleCue>,

    #[serde(default)]
    pub bleeps: Vec<BleepSpan>,

    /// Segmented, redacted units the cues were built from
    #[serde(skip)]
    pub units: Vec<SubtitleUnit>,
}

/// Counts reported by a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    pipeline: SegmentationPipeline,
    redactor: Redactor,
    rate: FrameRate,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let rate = config.placement_rate()?;
        let pipeline = SegmentationPipeline::new(config.segmentation.clone());
        let redactor = Redactor::new(&config.redaction.censor_words);

        Ok(Self {
            config,
            pipeline,
            redactor,
            rate,
        })
    }

    /// Merge, segment, redact and place a transcript. Without turns the
    /// transcript passes through unattributed.
    pub fn align(&self, transcript: &Transcript, turns: Option<&[DiarizationTurn]>) -> Result<AlignmentOutput, AlignError> {
        let merged = match turns {
            Some(turns) => {
                if self.config.validate_ordering {
                    validate_ordering(&transcript.segments, turns)?;
                }
                merge_diarization(transcript, turns, self.config.attribution)
            }
            None => MergedTranscript::without_speakers(transcript),
        };

        let units = merged.segments.iter().map(SubtitleUnit::from_merged).collect();
        Ok(self.finish(merged, units))
    }

    /// Alignment path for a transcript produced without diarization
    pub fn transcribe_only(&self, transcript: &Transcript) -> Result<AlignmentOutput, AlignError> {
        self.align(transcript, None)
    }

    /// Flat subtitle path: an existing SRT file turned into cues
    pub fn subtitles_from_srt(&self, content: &str) -> Result<AlignmentOutput, AlignError> {
        let entries = SubtitleCollection::parse_srt_string(content)?;
        let units: Vec<SubtitleUnit> = entries.iter().map(SubtitleUnit::from_entry).collect();

        let segments: Vec<MergedSegment> = units
            .iter()
            .map(|unit| MergedSegment {
                start: unit.start,
                end: unit.end,
                speaker: None,
                text: unit.text.clone(),
                words: unit.words.clone(),
            })
            .collect();
        let merged = MergedTranscript {
            text: segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" "),
            language: String::new(),
            speakers: Vec::new(),
            top_speaker: None,
            segments,
        };

        Ok(self.finish(merged, units))
    }

    fn finish(&self, transcript: MergedTranscript, units: Vec<SubtitleUnit>) -> AlignmentOutput {
        let mut units = self.pipeline.run(units);
        let bleeps = self.redactor.redact_units(&mut units);
        let cues = build_cues(&units, self.rate, &self.config.placement, &self.config.formatting);

        debug!(
            "Aligned {} segments into {} cues ({} bleeps)",
            transcript.segments.len(),
            cues.len(),
            bleeps.len()
        );

        AlignmentOutput {
            transcript,
            frame_rate: self.rate.fps(),
            mark_in: self.config.placement.timeline_start_frame,
            cues,
            bleeps,
            units,
        }
    }

    /// Gather both collaborators concurrently, then align
    pub async fn run<T, D>(&self, transcript: &T, diarization: Option<&D>) -> Result<AlignmentOutput, AppError>
    where
        T: TranscriptSource + ?Sized,
        D: DiarizationSource + ?Sized,
    {
        let output = match diarization {
            Some(diarization) => {
                let (transcript, turns) = tokio::try_join!(transcript.transcript(), diarization.turns())?;
                self.align(&transcript, Some(turns.as_slice()))?
            }
            None => {
                let transcript = transcript.transcript().await?;
                self.transcribe_only(&transcript)?
            }
        };
        Ok(output)
    }

    /// Align one transcript file and write `<name>.subs.json` and `<name>.srt`
    /// into `output_dir`. A sibling `<name>.diarization.json` is picked up
    /// automatically unless `diarization_file` is given.
    pub async fn run_file(
        &self,
        transcript_file: &Path,
        diarization_file: Option<&Path>,
        output_dir: &Path,
    ) -> Result<AlignmentOutput> {
        if !FileManager::file_exists(transcript_file) {
            return Err(anyhow!("Input file does not exist: {:?}", transcript_file));
        }
        FileManager::ensure_dir(output_dir)?;

        let transcript = JsonTranscriptFile::new(transcript_file);
        let diarization = diarization_file
            .map(Path::to_path_buf)
            .or_else(|| FileManager::diarization_for(transcript_file))
            .map(JsonDiarizationFile::new);
        if diarization.is_none() {
            info!("No diarization found for {:?}, subtitles will have no speakers", transcript_file);
        }

        let output = self
            .run(&transcript, diarization.as_ref())
            .await
            .with_context(|| format!("Failed to align {:?}", transcript_file))?;

        self.write_outputs(&output, transcript_file, output_dir)?;
        Ok(output)
    }

    /// Convert an SRT file to cues and write `<name>.subs.json` and a
    /// re-segmented `<name>.cues.srt`
    pub fn run_srt_file(&self, srt_file: &Path, output_dir: &Path) -> Result<AlignmentOutput> {
        let content = FileManager::read_to_string(srt_file)?;
        let output = self
            .subtitles_from_srt(&content)
            .with_context(|| format!("Failed to parse subtitle file {:?}", srt_file))?;

        FileManager::ensure_dir(output_dir)?;
        let json_path = FileManager::generate_output_path(srt_file, output_dir, "subs.json");
        FileManager::write_json(&json_path, &output)?;
        let srt_path = FileManager::generate_output_path(srt_file, output_dir, "cues.srt");
        self.to_collection(&output, srt_path.clone()).write_to_srt(&srt_path)?;

        info!("Wrote {} cues to {:?}", output.cues.len(), json_path);
        Ok(output)
    }

    fn write_outputs(&self, output: &AlignmentOutput, input_file: &Path, output_dir: &Path) -> Result<()> {
        let json_path = FileManager::generate_output_path(input_file, output_dir, "subs.json");
        FileManager::write_json(&json_path, output)?;

        let srt_path = FileManager::generate_output_path(input_file, output_dir, "srt");
        self.to_collection(output, srt_path.clone()).write_to_srt(&srt_path)?;

        info!(
            "Wrote {} cues from {} speakers to {:?}",
            output.cues.len(),
            output.transcript.speakers.len(),
            json_path
        );
        Ok(())
    }

    /// SRT rendering of the final cues, so the file matches `cues` in the
    /// JSON output
    fn to_collection(&self, output: &AlignmentOutput, path: PathBuf) -> SubtitleCollection {
        SubtitleCollection::from_cues(path, &output.cues, self.rate, output.mark_in)
    }

    /// Format a duration in a human-readable way
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Align every `*.transcript.json` under `input_dir`, writing outputs next
    /// to each input. Files that already have output are skipped unless
    /// `force_overwrite` is set.
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let transcript_files = FileManager::find_files(input_dir, TRANSCRIPT_SUFFIX)?;
        if transcript_files.is_empty() {
            return Err(anyhow!("No transcript files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(transcript_files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));
        folder_pb.set_message("Aligning files");

        let mut summary = FolderSummary::default();

        for transcript_file in &transcript_files {
            let file_name = transcript_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = transcript_file.parent().unwrap_or(input_dir).to_path_buf();
            let output_path = FileManager::generate_output_path(transcript_file, &output_dir, "subs.json");
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {}, output already exists (use -f to force overwrite)", file_name);
                summary.skipped += 1;
                folder_pb.inc(1);
                continue;
            }

            match self.run_file(transcript_file, None, &output_dir).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let message = format!(
            "Folder processing completed: {} processed, {} skipped, {} errors - Duration: {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );
        info!("{}", message);

        let log_file = input_dir.join("autosubs.log");
        if let Err(e) = FileManager::append_to_log_file(&log_file, &message) {
            warn!("Failed to write folder log: {}", e);
        }

        Ok(summary)
    }
}
