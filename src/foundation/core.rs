use std::fmt;

use crate::foundation::error::{SequenceError, SequenceResult};

/// 0-based frame index in sequence timeline space.
///
/// Signed so that conversions from pts before the sequence origin stay representable; APIs that
/// position the cursor reject negative values.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub i64);

impl FrameIndex {
    /// Return `true` for indices before the sequence origin.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Index `delta` frames later (saturating).
    pub fn offset(self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open frame span `[start, end)` in sequence timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    /// Inclusive span start.
    pub start: FrameIndex,
    /// Exclusive span end.
    pub end: FrameIndex, // exclusive
}

impl FrameSpan {
    /// Create a validated span with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> SequenceResult<Self> {
        if start.0 > end.0 {
            return Err(SequenceError::invalid("FrameSpan start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the span.
    pub fn len_frames(self) -> i64 {
        self.end.0.saturating_sub(self.start.0).max(0)
    }

    /// Return `true` when the span has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 >= self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Last frame inside the span, `None` when empty.
    pub fn last(self) -> Option<FrameIndex> {
        if self.is_empty() {
            None
        } else {
            Some(FrameIndex(self.end.0 - 1))
        }
    }

    /// Clamp a frame index into this span.
    ///
    /// Empty spans clamp to `start`.
    pub fn clamp(self, f: FrameIndex) -> FrameIndex {
        match self.last() {
            None => self.start,
            Some(last) => FrameIndex(f.0.clamp(self.start.0, last.0)),
        }
    }
}

impl fmt::Display for FrameSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frames [{}, {})", self.start.0, self.end.0)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SequenceResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    /// Whole-number frame rate, e.g. `Fps::integer(30)`.
    pub fn integer(num: u32) -> SequenceResult<Self> {
        Self::new(num, 1)
    }

    /// Check the invariants enforced by [`Fps::new`]; used after deserialization.
    pub fn validate(self) -> SequenceResult<()> {
        if self.den == 0 {
            return Err(SequenceError::invalid("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(SequenceError::invalid("Fps num must be > 0"));
        }
        Ok(())
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{} fps", self.num)
        } else {
            write!(f, "{}/{} fps", self.num, self.den)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
