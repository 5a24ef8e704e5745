/*!
 * Tests for the transcript/diarization merge
 */

use autosubs::merge::{merge_diarization, validate_ordering, AttributionPolicy};
use autosubs::speakers::{SpeakerStyle, DEFAULT_PALETTE, UNKNOWN_SPEAKER};
use autosubs::transcript::{DiarizationTurn, Transcript};
use autosubs::AlignError;
use crate::common;

/// Test the full sample conversation
#[test]
fn test_merge_sampleConversation_shouldLabelSpeakersInOrderOfAppearance() {
    common::init_logger();
    let transcript = common::sample_transcript();

    let merged = merge_diarization(&transcript, &common::sample_turns(), AttributionPolicy::FirstContact);

    let labels: Vec<_> = merged.segments.iter().map(|s| s.speaker.clone().unwrap()).collect();
    assert_eq!(labels, vec!["Speaker 1", "Speaker 2", "Speaker 1", "Speaker 2", UNKNOWN_SPEAKER]);

    let speakers: Vec<_> = merged.speakers.iter().map(|s| (s.label.as_str(), s.subtitle_lines, s.word_count)).collect();
    assert_eq!(speakers, vec![("Speaker 1", 2, 12), ("Speaker 2", 2, 11), (UNKNOWN_SPEAKER, 1, 2)]);

    let top = merged.top_speaker.unwrap();
    assert_eq!(top.label, "Speaker 1");
    assert_eq!(top.percentage, 40);
}

/// Test speaker metadata
#[test]
fn test_merge_speakers_shouldCarryIdColorStyleAndSample() {
    let transcript = common::sample_transcript();
    let merged = merge_diarization(&transcript, &common::sample_turns(), AttributionPolicy::FirstContact);

    let first = &merged.speakers[0];
    assert_eq!(first.id, first.label);
    assert_eq!(first.color, DEFAULT_PALETTE[0]);
    assert_eq!(first.style, SpeakerStyle::Outline);
    assert_eq!((first.sample.start, first.sample.end), (0.0, 2.0));
    assert_ne!(merged.speakers[1].color, first.color);
}

/// Test that every segment keeps its span and words
#[test]
fn test_merge_generatedStreams_shouldConserveSegmentsAndWords() {
    for seed in 0..20u32 {
        let segments: Vec<_> = (0..30)
            .map(|i| {
                let start = i as f64 * 1.5 + (seed % 3) as f64 * 0.1;
                common::segment(start, start + 1.0 + (i % 4) as f64 * 0.2, "one two three")
            })
            .collect();
        let turns: Vec<_> = (0..12)
            .map(|k| {
                let start = k as f64 * 3.7 + seed as f64 * 0.05;
                DiarizationTurn::new(start, start + 2.0 + (k % 3) as f64, format!("SPK_{}", (k + seed as usize) % 4))
            })
            .collect();
        let transcript = Transcript::from_segments("en", segments.clone());

        for policy in [AttributionPolicy::FirstContact, AttributionPolicy::MajorityOverlap] {
            let merged = merge_diarization(&transcript, &turns, policy);

            assert_eq!(merged.segments.len(), segments.len());
            for (out, input) in merged.segments.iter().zip(&segments) {
                assert_eq!((out.start, out.end), (input.start, input.end));
                assert_eq!(out.words, input.words);
            }

            let lines: usize = merged.speakers.iter().map(|s| s.subtitle_lines).sum();
            let words: usize = merged.speakers.iter().map(|s| s.word_count).sum();
            assert_eq!(lines, segments.len());
            assert_eq!(words, transcript.word_count());

            let top = merged.top_speaker.as_ref().unwrap();
            let top_lines = merged.speakers.iter().find(|s| s.label == top.label).unwrap().subtitle_lines;
            let expected = (top_lines as f64 / segments.len() as f64 * 100.0).round() as u32;
            assert_eq!(top.percentage, expected);
            assert!(top.percentage <= 100);
        }
    }
}

/// Test majority overlap choosing the longer turn
#[test]
fn test_merge_majorityOverlap_shouldPickLongestOverlap() {
    let transcript = Transcript::from_segments(
        "en",
        vec![common::segment(0.0, 4.0, "a long sentence"), common::segment(5.0, 6.0, "more")],
    );
    let turns = vec![DiarizationTurn::new(0.0, 1.0, "A"), DiarizationTurn::new(1.0, 6.0, "B")];

    let first = merge_diarization(&transcript, &turns, AttributionPolicy::FirstContact);
    let majority = merge_diarization(&transcript, &turns, AttributionPolicy::MajorityOverlap);

    assert_eq!(first.speakers.len(), 2);
    assert_eq!(first.segments[1].speaker.as_deref(), Some("Speaker 2"));

    assert_eq!(majority.speakers.len(), 1);
    assert_eq!(majority.speakers[0].subtitle_lines, 2);
}

/// Test empty inputs
#[test]
fn test_merge_emptyInputs_shouldNotFail() {
    let empty = merge_diarization(&Transcript::default(), &common::sample_turns(), AttributionPolicy::FirstContact);
    assert!(empty.segments.is_empty());
    assert!(empty.speakers.is_empty());
    assert!(empty.top_speaker.is_none());

    let no_turns = merge_diarization(&common::sample_transcript(), &[], AttributionPolicy::FirstContact);
    assert_eq!(no_turns.speakers.len(), 1);
    assert_eq!(no_turns.speakers[0].label, UNKNOWN_SPEAKER);
    assert_eq!(no_turns.top_speaker.unwrap().percentage, 100);
}

/// Test ordering validation
#[test]
fn test_validateOrdering_withUnsortedTurns_shouldFailFast() {
    let transcript = common::sample_transcript();
    let mut turns = common::sample_turns();
    turns.swap(1, 2);

    match validate_ordering(&transcript.segments, &turns) {
        Err(AlignError::OrderingViolation { stream, index, .. }) => {
            assert_eq!(stream, "diarization");
            assert_eq!(index, 2);
        }
        other => panic!("expected ordering violation, got {:?}", other),
    }
    assert!(validate_ordering(&transcript.segments, &common::sample_turns()).is_ok());
}
