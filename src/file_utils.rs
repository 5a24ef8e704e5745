use anyhow::{Context, Result};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Suffix of transcript payloads picked up in folder mode
pub const TRANSCRIPT_SUFFIX: &str = ".transcript.json";

/// Suffix of the diarization payload paired with a transcript
pub const DIARIZATION_SUFFIX: &str = ".diarization.json";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// File name without any of the known input suffixes
    /// ("talk.transcript.json" -> "talk", "talk.srt" -> "talk")
    pub fn base_name<P: AsRef<Path>>(input_file: P) -> String {
        let name = input_file
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        for suffix in [TRANSCRIPT_SUFFIX, DIARIZATION_SUFFIX, ".json", ".srt"] {
            if let Some(stripped) = name.strip_suffix(suffix) {
                if !stripped.is_empty() {
                    return stripped.to_string();
                }
            }
        }
        name
    }

    // @generates: Output path next to the input, e.g. "talk.subs.json"
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
    ) -> PathBuf {
        let file_name = format!("{}.{}", Self::base_name(input_file), suffix);
        output_dir.as_ref().join(file_name)
    }

    /// Sibling diarization file of a transcript file, if one exists
    pub fn diarization_for<P: AsRef<Path>>(transcript_file: P) -> Option<PathBuf> {
        let transcript_file = transcript_file.as_ref();
        let dir = transcript_file.parent().unwrap_or(Path::new("."));
        let candidate = dir.join(format!("{}{}", Self::base_name(transcript_file), DIARIZATION_SUFFIX));
        Self::file_exists(&candidate).then_some(candidate)
    }

    /// Find files whose name ends with `suffix` (case-insensitive), sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, suffix: &str) -> Result<Vec<PathBuf>> {
        let suffix = suffix.to_lowercase();
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                let name = entry.file_name().to_string_lossy().to_lowercase();
                if name.ends_with(&suffix) {
                    result.push(path.to_path_buf());
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Deserialize a JSON file
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let content = Self::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))
    }

    /// Serialize a value as pretty JSON
    pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        Self::write_to_file(path, &content)
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
