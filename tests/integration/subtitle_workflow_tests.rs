/*!
 * Integration tests for the SRT workflow
 */

use anyhow::Result;

use autosubs::app_config::{Config, FormattingConfig, PlacementConfig, TextCase};
use autosubs::errors::AlignError;
use autosubs::subtitle_processor::SubtitleCollection;
use autosubs::Controller;
use crate::common;

/// Test converting an SRT file into cues
#[test]
fn test_subtitlesFromSrt_withSampleFile_shouldPlaceCues() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;
    let content = std::fs::read_to_string(&path)?;

    let config = Config {
        frame_rate: 25.0,
        placement: PlacementConfig {
            timeline_start_frame: 90_000,
            ..Default::default()
        },
        ..Default::default()
    };
    let controller = Controller::with_config(config)?;
    let output = controller.subtitles_from_srt(&content)?;

    assert_eq!(output.mark_in, 90_000);
    assert!(output.transcript.speakers.is_empty());
    assert_eq!(output.cues[0].timeline_pos, 90_025);
    // Punctuation and length rules still apply to imported text
    assert!(output.cues.len() >= 3);
    assert!(output.cues.iter().all(|cue| cue.speaker.is_none()));
    assert!(output.units.iter().all(|unit| unit.estimated_timing));
    Ok(())
}

/// Test writing both outputs and reading the generated SRT back
#[test]
fn test_runSrtFile_shouldWriteParsableCueSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let config = Config {
        formatting: FormattingConfig {
            text_case: TextCase::Upper,
            remove_punctuation: true,
        },
        ..Default::default()
    };
    let controller = Controller::with_config(config)?;
    let output = controller.run_srt_file(&path, temp_dir.path())?;

    let cue_srt = temp_dir.path().join("sample.cues.srt");
    assert!(temp_dir.path().join("sample.subs.json").exists());

    let reloaded = SubtitleCollection::load(&cue_srt)?;
    assert_eq!(reloaded.entries.len(), output.cues.len());
    assert_eq!(reloaded.entries[0].text, "THIS IS A TEST SUBTITLE");
    assert_eq!(reloaded.entries[0].start_time_ms, 1_000);
    Ok(())
}

/// Test that the written SRT follows the cut-off, gap-closed cue list
#[test]
fn test_runSrtFile_withEndFrame_shouldWriteOneEntryPerCue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = "1\n00:00:00,000 --> 00:00:01,000\nfirst line here\n\n\
               2\n00:00:01,100 --> 00:00:02,000\nsecond line here\n\n\
               3\n00:00:10,000 --> 00:00:11,000\nthird line here\n";
    let path = common::create_test_file(temp_dir.path(), "late.srt", srt)?;

    let config = Config {
        placement: PlacementConfig {
            timeline_end_frame: Some(48),
            ..Default::default()
        },
        ..Default::default()
    };
    let controller = Controller::with_config(config)?;
    let output = controller.run_srt_file(&path, temp_dir.path())?;

    assert_eq!(output.units.len(), 3);
    assert_eq!(output.cues.len(), 2);

    let reloaded = SubtitleCollection::load(temp_dir.path().join("late.cues.srt"))?;
    assert_eq!(reloaded.entries.len(), output.cues.len());
    // First cue was stretched to the frame before the second one (25 of 24 fps)
    assert_eq!(reloaded.entries[0].end_time_ms, 1_042);
    assert_eq!(reloaded.entries[1].start_time_ms, 1_083);
    assert_eq!(reloaded.entries[1].text, "second line here");
    Ok(())
}

/// Test censoring in the SRT path
#[test]
fn test_subtitlesFromSrt_withCensorList_shouldEstimateBleeps() -> Result<()> {
    let srt = "1\n00:00:00,000 --> 00:00:02,000\nthey will kill him\n";
    let mut config = Config::default();
    config.redaction.censor_words = vec!["kill".to_string()];
    let controller = Controller::with_config(config)?;

    let output = controller.subtitles_from_srt(srt)?;

    assert_eq!(output.cues[0].text, "they will k**l him");
    assert_eq!(output.bleeps.len(), 1);
    assert!(output.bleeps[0].estimated);
    assert!(output.bleeps[0].start > 0.0 && output.bleeps[0].end < 2.0);
    Ok(())
}

/// Test malformed and empty SRT input
#[test]
fn test_subtitlesFromSrt_withBadInput_shouldReturnTypedErrors() {
    let controller = Controller::with_config(Config::default()).unwrap();

    assert!(matches!(
        controller.subtitles_from_srt("1\n00:00:01 --> 00:00:02\ntext\n"),
        Err(AlignError::MalformedSubtitleFile { block: 1, .. })
    ));
    assert!(matches!(controller.subtitles_from_srt(""), Err(AlignError::EmptyInput(_))));
}
