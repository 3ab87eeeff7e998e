use crate::foundation::core::{FrameIndex, FrameSpan};
use crate::timeline::clips::ClipId;

/// Convenience result type used across the sequence engine.
pub type SequenceResult<T> = Result<T, SequenceError>;

/// Top-level error taxonomy used by sequence APIs.
///
/// Reaching the end of the timeline is not an error: seeks report it through
/// [`crate::SeekStatus::EndOfSequence`] and reads through `Ok(None)`.
#[derive(thiserror::Error, Debug)]
pub enum SequenceError {
    /// Negative or out-of-range frame index, malformed time base or fps, bad clip metadata.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Seek target falls in a gap or before the first clip.
    #[error("no coverage: no clip covers frame {}{}", frame.0, describe_neighbours(*previous, *next))]
    NoCoverage {
        /// Requested frame.
        frame: FrameIndex,
        /// Span of the closest clip ending before `frame`, if any.
        previous: Option<FrameSpan>,
        /// Span of the closest clip starting after `frame`, if any.
        next: Option<FrameSpan>,
    },

    /// The referenced clip is not owned by this sequence.
    #[error("unknown clip: {0} is not part of this sequence")]
    UnknownClip(ClipId),

    /// Placing a clip at the requested position would intersect an existing clip.
    #[error("clip overlap: pts range [{start}, {end}) intersects {existing}")]
    Overlap {
        /// Requested start pts in sequence time base.
        start: i64,
        /// Requested exclusive end pts in sequence time base.
        end: i64,
        /// Clip already occupying part of the range.
        existing: ClipId,
    },

    /// Error reported by a clip source while reading or seeking.
    #[error("decode error: {clip} at frame {}: {source}", frame.0)]
    Decode {
        /// Clip whose source failed.
        clip: ClipId,
        /// Sequence frame the engine was positioned at.
        frame: FrameIndex,
        /// Error returned by the source.
        #[source]
        source: anyhow::Error,
    },

    /// Internal cursor/collection mismatch. Always a bug in this crate.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SequenceError {
    /// Build a [`SequenceError::InvalidParameter`] value.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`SequenceError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`SequenceError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors raised by a clip source.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

fn describe_neighbours(previous: Option<FrameSpan>, next: Option<FrameSpan>) -> String {
    match (previous, next) {
        (None, None) => String::new(),
        (Some(p), None) => format!(" (previous clip covers {p})"),
        (None, Some(n)) => format!(" (next clip covers {n})"),
        (Some(p), Some(n)) => format!(" (previous clip covers {p}, next clip covers {n})"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
