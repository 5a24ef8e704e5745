/*!
 * Integration tests for folder mode
 */

use anyhow::Result;

use autosubs::app_config::Config;
use autosubs::file_utils::FileManager;
use autosubs::Controller;
use crate::common;

/// Test a folder with good, undiarized and broken inputs
#[test]
fn test_runFolder_withMixedInputs_shouldCountOutcomes() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let nested = dir.join("day2");

    FileManager::write_json(dir.join("a.transcript.json"), &common::sample_transcript())?;
    FileManager::write_json(dir.join("a.diarization.json"), &common::sample_turns())?;
    FileManager::write_json(nested.join("b.transcript.json"), &common::sample_transcript())?;
    common::create_test_file(dir, "c.transcript.json", "{ not json")?;

    let controller = Controller::with_config(Config::default())?;

    let summary = tokio_test::block_on(controller.run_folder(dir, false))?;
    assert_eq!((summary.processed, summary.skipped, summary.failed), (2, 0, 1));
    assert!(dir.join("a.subs.json").exists());
    assert!(nested.join("b.subs.json").exists());
    assert!(nested.join("b.srt").exists());
    assert!(dir.join("autosubs.log").exists());

    let with_speakers: serde_json::Value = FileManager::read_json(dir.join("a.subs.json"))?;
    let without_speakers: serde_json::Value = FileManager::read_json(nested.join("b.subs.json"))?;
    assert_eq!(with_speakers["speakers"].as_array().map(|s| s.len()), Some(3));
    assert_eq!(without_speakers["speakers"].as_array().map(|s| s.len()), Some(0));
    assert!(without_speakers["top_speaker"].is_null());

    let again = tokio_test::block_on(controller.run_folder(dir, false))?;
    assert_eq!((again.processed, again.skipped, again.failed), (0, 2, 1));

    let forced = tokio_test::block_on(controller.run_folder(dir, true))?;
    assert_eq!((forced.processed, forced.skipped, forced.failed), (2, 0, 1));
    Ok(())
}

/// Test a folder without transcripts
#[test]
fn test_runFolder_withNoTranscripts_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "only.srt")?;

    let controller = Controller::with_config(Config::default())?;
    assert!(tokio_test::block_on(controller.run_folder(temp_dir.path(), false)).is_err());
    assert!(tokio_test::block_on(controller.run_folder(&temp_dir.path().join("missing"), false)).is_err());
    Ok(())
}
