/*!
 * Upstream collaborators.
 *
 * Transcription and diarization run outside this crate. These traits are the
 * seam the controller talks to; the JSON-file implementations read payloads
 * that a transcriber or diarizer already wrote to disk.
 */

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::errors::SourceError;
use crate::transcript::{DiarizationTurn, Transcript};

/// Something that can produce a timed transcript
#[async_trait]
pub trait TranscriptSource: Send + Sync + Debug {
    /// Human readable name used in errors and logs
    fn name(&self) -> String;

    /// Produce the transcript
    async fn transcript(&self) -> Result<Transcript, SourceError>;
}

/// Something that can produce speaker turns
#[async_trait]
pub trait DiarizationSource: Send + Sync + Debug {
    /// Human readable name used in errors and logs
    fn name(&self) -> String;

    /// Produce the speaker turns, sorted by start time
    async fn turns(&self) -> Result<Vec<DiarizationTurn>, SourceError>;
}

/// Transcript stored as a JSON document
#[derive(Debug, Clone)]
pub struct JsonTranscriptFile {
    path: PathBuf,
}

impl JsonTranscriptFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl TranscriptSource for JsonTranscriptFile {
    fn name(&self) -> String {
        format!("transcript file {}", self.path.display())
    }

    async fn transcript(&self) -> Result<Transcript, SourceError> {
        let content = read_source(&self.name(), &self.path).await?;
        let transcript: Transcript = serde_json::from_str(&content).map_err(|e| SourceError::Parse {
            source_name: self.name(),
            message: e.to_string(),
        })?;
        debug!("Loaded {} transcript segments from {}", transcript.segments.len(), self.path.display());
        Ok(transcript)
    }
}

/// Diarization stored either as a bare array of turns or as `{"turns": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiarizationDocument {
    Bare(Vec<DiarizationTurn>),
    Wrapped { turns: Vec<DiarizationTurn> },
}

/// Speaker turns stored as a JSON document
#[derive(Debug, Clone)]
pub struct JsonDiarizationFile {
    path: PathBuf,
}

impl JsonDiarizationFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DiarizationSource for JsonDiarizationFile {
    fn name(&self) -> String {
        format!("diarization file {}", self.path.display())
    }

    async fn turns(&self) -> Result<Vec<DiarizationTurn>, SourceError> {
        let content = read_source(&self.name(), &self.path).await?;
        let document: DiarizationDocument = serde_json::from_str(&content).map_err(|e| SourceError::Parse {
            source_name: self.name(),
            message: e.to_string(),
        })?;
        let turns = match document {
            DiarizationDocument::Bare(turns) | DiarizationDocument::Wrapped { turns } => turns,
        };
        debug!("Loaded {} diarization turns from {}", turns.len(), self.path.display());
        Ok(turns)
    }
}

async fn read_source(name: &str, path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path).await.map_err(|e| SourceError::Io {
        source_name: name.to_string(),
        message: e.to_string(),
    })
}
