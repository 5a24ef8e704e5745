/*!
 * Integration tests for the alignment workflow through the controller
 */

use anyhow::Result;

use autosubs::app_config::{Config, RedactionConfig};
use autosubs::errors::{AlignError, AppError, SourceError};
use autosubs::file_utils::FileManager;
use autosubs::speakers::UNKNOWN_SPEAKER;
use autosubs::{AlignmentOutput, Controller};
use crate::common;
use crate::common::mock_sources::{MockDiarizer, MockFailure, MockTranscriber};

fn censoring_controller() -> Controller {
    let config = Config {
        redaction: RedactionConfig::from_list("kill"),
        ..Default::default()
    };
    Controller::with_config(config).unwrap()
}

fn assert_cues_well_formed(output: &AlignmentOutput) {
    assert!(!output.cues.is_empty());
    for pair in output.cues.windows(2) {
        assert!(pair[0].timeline_pos <= pair[1].timeline_pos);
        assert!(pair[0].end() < pair[1].timeline_pos || pair[0].duration == 0);
    }
    for cue in &output.cues {
        assert!(cue.duration >= 0);
        assert!(!cue.text.trim().is_empty());
    }
}

/// Test the full synchronous path
#[test]
fn test_align_withDiarization_shouldProduceLabeledRedactedCues() {
    common::init_logger();
    let controller = censoring_controller();

    let output = controller
        .align(&common::sample_transcript(), Some(common::sample_turns().as_slice()))
        .unwrap();

    assert_eq!(output.transcript.speakers.len(), 3);
    assert_eq!(output.transcript.top_speaker.as_ref().unwrap().label, "Speaker 1");
    assert_eq!(output.frame_rate, 24.0);
    assert_eq!(output.mark_in, 0);
    assert_cues_well_formed(&output);

    assert!(output.cues.iter().any(|c| c.text.contains("k**l")));
    assert!(output.cues.iter().all(|c| !c.text.contains("kill")));
    assert!(output.cues.iter().any(|c| c.speaker.as_deref() == Some(UNKNOWN_SPEAKER)));

    assert_eq!(output.bleeps.len(), 1);
    assert!(output.bleeps[0].start >= 7.5 && output.bleeps[0].end <= 9.0);
    assert!(!output.bleeps[0].estimated);

    // Merged segments keep the original, unredacted transcript text
    assert!(output.transcript.segments[3].text.contains("kill"));
}

/// Test the async path with mock collaborators
#[test]
fn test_run_withMockSources_shouldMatchSynchronousAlign() {
    let controller = censoring_controller();
    let transcriber = MockTranscriber::new(common::sample_transcript());
    let diarizer = MockDiarizer::new(common::sample_turns());

    let output = tokio_test::block_on(controller.run(&transcriber, Some(&diarizer))).unwrap();
    let expected = controller
        .align(&common::sample_transcript(), Some(common::sample_turns().as_slice()))
        .unwrap();

    assert_eq!(transcriber.call_count(), 1);
    assert_eq!(diarizer.call_count(), 1);
    assert_eq!(output.cues, expected.cues);
    assert_eq!(output.transcript, expected.transcript);
}

/// Test collaborator failures propagate
#[test]
fn test_run_withFailingDiarizer_shouldReturnSourceError() {
    let controller = censoring_controller();
    let transcriber = MockTranscriber::new(common::sample_transcript());

    let failed = tokio_test::block_on(controller.run(&transcriber, Some(&MockDiarizer::failing(MockFailure::Failed))));
    assert!(matches!(failed, Err(AppError::Source(SourceError::Failed { .. }))));

    let cancelled = tokio_test::block_on(controller.run(
        &MockTranscriber::failing(MockFailure::Cancelled),
        Some(&MockDiarizer::new(common::sample_turns())),
    ));
    assert!(matches!(cancelled, Err(AppError::Source(SourceError::Cancelled(_)))));
}

/// Test the transcription-only path
#[test]
fn test_run_withoutDiarization_shouldHaveNoSpeakers() {
    let controller = Controller::with_config(Config::default()).unwrap();
    let transcriber = MockTranscriber::new(common::sample_transcript());

    let output = tokio_test::block_on(controller.run(&transcriber, None::<&MockDiarizer>)).unwrap();

    assert!(output.transcript.speakers.is_empty());
    assert!(output.transcript.top_speaker.is_none());
    assert!(output.cues.iter().all(|c| c.speaker.is_none()));
    assert_cues_well_formed(&output);
}

/// Test ordering validation can be switched off
#[test]
fn test_align_withUnsortedTurns_shouldFollowValidationSetting() {
    let mut turns = common::sample_turns();
    turns.reverse();

    let strict = Controller::with_config(Config::default()).unwrap();
    let result = strict.align(&common::sample_transcript(), Some(turns.as_slice()));
    assert!(matches!(result, Err(AlignError::OrderingViolation { stream: "diarization", .. })));

    let lenient = Controller::with_config(Config {
        validate_ordering: false,
        ..Default::default()
    })
    .unwrap();
    let output = lenient.align(&common::sample_transcript(), Some(turns.as_slice())).unwrap();
    assert_eq!(output.transcript.segments.len(), 5);
}

/// Test the serialized shape of the output
#[test]
fn test_alignmentOutput_json_shouldFlattenMergedTranscript() {
    let controller = Controller::with_config(Config::default()).unwrap();
    let output = controller
        .align(&common::sample_transcript(), Some(common::sample_turns().as_slice()))
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    for key in ["text", "language", "speakers", "top_speaker", "segments", "cues", "bleeps", "mark_in", "frame_rate"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert!(json.get("units").is_none());
    assert_eq!(json["top_speaker"]["percentage"], 40);
    assert_eq!(json["speakers"][0]["style"], "Outline");
}

/// Test file based alignment with a sibling diarization file
#[test]
fn test_runFile_withSiblingDiarization_shouldWriteOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript_path = temp_dir.path().join("talk.transcript.json");
    FileManager::write_json(&transcript_path, &common::sample_transcript())?;
    FileManager::write_json(temp_dir.path().join("talk.diarization.json"), &common::sample_turns())?;

    let controller = Controller::with_config(Config::default())?;
    let out_dir = temp_dir.path().join("out");
    let output = tokio_test::block_on(controller.run_file(&transcript_path, None, &out_dir))?;

    assert_eq!(output.transcript.speakers.len(), 3);
    assert!(out_dir.join("talk.subs.json").exists());
    assert!(out_dir.join("talk.srt").exists());

    let written: serde_json::Value = FileManager::read_json(out_dir.join("talk.subs.json"))?;
    assert_eq!(written["cues"].as_array().map(|c| c.len()), Some(output.cues.len()));
    Ok(())
}
