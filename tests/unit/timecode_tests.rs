/*!
 * Tests for frame and timecode conversion
 */

use autosubs::timecode::{millis_to_frames, seconds_to_frames, timecode_to_frames, to_frames, to_timecode, FrameRate, Timecode};
use autosubs::AlignError;

/// Test a typical SRT timestamp
#[test]
fn test_toFrames_withSrtTimestamp_shouldMatchFormula() {
    // (1*3600 + 2*60 + 3 + 0.4) * 25
    assert_eq!(to_frames(1, 2, 3, 400, 25.0).unwrap(), 93_085);
    assert_eq!(millis_to_frames(3_723_400, 25.0).unwrap(), 93_085);
    // 0.02s * 25 = 0.5 rounds up
    assert_eq!(to_frames(0, 0, 0, 20, 25.0).unwrap(), 1);
}

/// Test fractional NTSC rates
#[test]
fn test_toFrames_withNtscRate_shouldRoundHalfAwayFromZero() {
    // 10s * 29.97 = 299.7
    assert_eq!(seconds_to_frames(10.0, 29.97).unwrap(), 300);
    // 1s * 23.976 = 23.976
    assert_eq!(to_frames(0, 0, 1, 0, 23.976).unwrap(), 24);
}

/// Test invalid frame rates
#[test]
fn test_conversions_withInvalidRate_shouldReturnInvalidFrameRate() {
    assert_eq!(to_frames(0, 0, 0, 0, -25.0), Err(AlignError::InvalidFrameRate(-25.0)));
    assert!(matches!(millis_to_frames(0, 0.0), Err(AlignError::InvalidFrameRate(_))));
    assert!(FrameRate::new(f64::INFINITY).is_err());
    assert!(serde_json::from_str::<FrameRate>("0").is_err());
    assert_eq!(serde_json::from_str::<FrameRate>("24").unwrap().fps(), 24.0);
}

/// Test round trip over a range of frames and rates
#[test]
fn test_toTimecode_roundTrip_shouldBeExact() {
    for rate in [12.0, 23.976, 25.0, 29.97, 47.952, 50.0, 119.88] {
        for frame in (0..200_000u64).step_by(97) {
            let tc = to_timecode(frame, rate).unwrap();
            assert!(tc.minutes < 60 && tc.seconds < 60);
            assert_eq!(timecode_to_frames(&tc, rate).unwrap(), frame);
        }
    }
}

/// Test timecode display
#[test]
fn test_timecode_display_shouldBeZeroPadded() {
    let tc = Timecode { hours: 0, minutes: 5, seconds: 7, frames: 3 };
    assert_eq!(tc.to_string(), "00:05:07:03");
    assert_eq!(to_timecode(25 * 307 + 3, 25.0).unwrap(), tc);
}
