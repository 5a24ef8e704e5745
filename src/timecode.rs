/*!
 * Timecode and frame conversion.
 *
 * Converts wall-clock timestamps into integer frame positions for a given
 * frame rate and back. All rounding is half away from zero (`f64::round`), and
 * `to_timecode` is built so that `timecode_to_frames(to_timecode(f))` returns
 * exactly `f` for every non-negative frame.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AlignError;

/// A validated, positive frame rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FrameRate(f64);

impl FrameRate {
    /// Create a frame rate, rejecting zero, negative and non-finite values
    pub fn new(rate: f64) -> Result<Self, AlignError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AlignError::InvalidFrameRate(rate));
        }
        Ok(Self(rate))
    }

    /// The rate in frames per second
    pub fn fps(self) -> f64 {
        self.0
    }

    /// The integer timecode base hosts count frames in (23.976 -> 24)
    pub fn nominal(self) -> Self {
        Self(self.0.round().max(1.0))
    }
}

impl TryFrom<f64> for FrameRate {
    type Error = AlignError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<FrameRate> for f64 {
    fn from(rate: FrameRate) -> Self {
        rate.0
    }
}

/// Hours, minutes, seconds and frame-within-second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub frames: u64,
}

impl Timecode {
    /// Whole seconds represented by the h/m/s part
    pub fn whole_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Convert an `h:m:s,ms` timestamp into a frame number
pub fn to_frames(hours: u64, minutes: u64, seconds: u64, millis: u64, rate: f64) -> Result<u64, AlignError> {
    let rate = FrameRate::new(rate)?;
    let total = (hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0;
    Ok((total * rate.fps()).round() as u64)
}

/// Convert fractional seconds into a frame number; negative input clamps to 0
pub fn seconds_to_frames(seconds: f64, rate: f64) -> Result<u64, AlignError> {
    let rate = FrameRate::new(rate)?;
    Ok(frames_at(seconds, rate))
}

/// Convert a millisecond timestamp into a frame number
pub fn millis_to_frames(ms: u64, rate: f64) -> Result<u64, AlignError> {
    let rate = FrameRate::new(rate)?;
    Ok(((ms as f64 / 1000.0) * rate.fps()).round() as u64)
}

/// Infallible conversion for callers that already hold a validated rate
pub(crate) fn frames_at(seconds: f64, rate: FrameRate) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * rate.fps()).round() as u64
}

/// Frame at which a whole second starts
fn second_start_frame(whole_seconds: u64, rate: FrameRate) -> u64 {
    (whole_seconds as f64 * rate.fps()).round() as u64
}

/// Convert a frame number into a timecode
pub fn to_timecode(frame: u64, rate: f64) -> Result<Timecode, AlignError> {
    let rate = FrameRate::new(rate)?;

    let mut whole = (frame as f64 / rate.fps()).floor() as u64;
    // Division can land a hair above the true quotient; step back until the
    // second starts at or before the frame.
    while whole > 0 && second_start_frame(whole, rate) > frame {
        whole -= 1;
    }
    while second_start_frame(whole + 1, rate) <= frame {
        whole += 1;
    }
    let frames = frame - second_start_frame(whole, rate);

    Ok(Timecode {
        hours: whole / 3600,
        minutes: (whole % 3600) / 60,
        seconds: whole % 60,
        frames,
    })
}

/// Convert a timecode back into a frame number
pub fn timecode_to_frames(timecode: &Timecode, rate: f64) -> Result<u64, AlignError> {
    let rate = FrameRate::new(rate)?;
    Ok(second_start_frame(timecode.whole_seconds(), rate) + timecode.frames)
}
