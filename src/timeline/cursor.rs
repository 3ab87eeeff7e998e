use crate::foundation::core::FrameIndex;
use crate::timeline::clips::ClipId;

/// Observable state of the read/seek surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlaybackState {
    /// No position resolved yet (fresh sequence, or after a removal or time base change).
    #[default]
    Uninitialized,
    /// Cursor points at a clip; reads produce packets.
    Ready,
    /// Timeline exhausted; reads return end of sequence until a successful seek.
    PastEnd,
    /// The last seek or read failed. The cursor is unchanged, so reads retry from it.
    Errored,
}

/// Where the next read comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Position {
    Unresolved,
    At(ClipId),
    PastEnd,
}

/// Current clip plus the next frame to read.
///
/// The clip is held by id, so insertions and moves never leave a dangling position.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor {
    pub(crate) position: Position,
    pub(crate) frame: FrameIndex,
    errored: bool,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Self {
            position: Position::Unresolved,
            frame: FrameIndex(0),
            errored: false,
        }
    }

    pub(crate) fn state(&self) -> PlaybackState {
        if self.errored {
            return PlaybackState::Errored;
        }
        match self.position {
            Position::Unresolved => PlaybackState::Uninitialized,
            Position::At(_) => PlaybackState::Ready,
            Position::PastEnd => PlaybackState::PastEnd,
        }
    }

    pub(crate) fn clip(&self) -> Option<ClipId> {
        match self.position {
            Position::At(id) => Some(id),
            Position::Unresolved | Position::PastEnd => None,
        }
    }

    pub(crate) fn place(&mut self, clip: ClipId, frame: FrameIndex) {
        self.position = Position::At(clip);
        self.frame = frame;
        self.errored = false;
    }

    pub(crate) fn advance_to(&mut self, frame: FrameIndex) {
        self.frame = frame;
        self.errored = false;
    }

    pub(crate) fn past_end(&mut self) {
        self.position = Position::PastEnd;
        self.errored = false;
    }

    /// Record a failure without moving.
    pub(crate) fn fail(&mut self) {
        self.errored = true;
    }

    /// Forget the clip, keeping the frame so the next read resolves it again.
    pub(crate) fn unresolve(&mut self) {
        self.position = Position::Unresolved;
        self.errored = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/cursor.rs"]
mod tests;
