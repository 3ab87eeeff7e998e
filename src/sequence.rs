use std::fmt;

use crate::config::{SequenceConfig, SequenceOpts};
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{SequenceError, SequenceResult};
use crate::foundation::rational::Rational;
use crate::media::packet::Packet;
use crate::media::source::ClipSource;
use crate::timeline::clips::{ClipCollection, ClipId, ClipInfo};
use crate::timeline::clock::FrameClock;
use crate::timeline::cursor::{Cursor, PlaybackState};
use crate::timeline::reader;
use crate::timeline::seek::{self, SeekStatus};

/// An editing sequence: clips placed on one timeline, read back as a single packet stream.
///
/// The sequence owns every clip added to it. Seeking positions a cursor on the clip that covers a
/// frame; reading continues from the cursor and moves into the next clip when the current one
/// runs out. Packets come back with pts in the sequence time base.
///
/// A sequence is driven from one thread at a time; every operation needs `&mut self`.
pub struct Sequence {
    clock: FrameClock,
    clips: ClipCollection,
    cursor: Cursor,
    opts: SequenceOpts,
}

impl Sequence {
    /// Create an empty sequence with default options.
    pub fn new(time_base: Rational, fps: Fps) -> SequenceResult<Self> {
        Self::with_opts(time_base, fps, SequenceOpts::default())
    }

    /// Create an empty sequence.
    pub fn with_opts(time_base: Rational, fps: Fps, opts: SequenceOpts) -> SequenceResult<Self> {
        let clock = FrameClock::new(time_base, fps)?;
        tracing::debug!(
            %time_base,
            %fps,
            frame_duration = clock.frame_duration(),
            "sequence initialized"
        );
        Ok(Self {
            clock,
            clips: ClipCollection::new(),
            cursor: Cursor::new(),
            opts,
        })
    }

    /// Create an empty sequence from a config.
    pub fn from_config(cfg: &SequenceConfig) -> SequenceResult<Self> {
        Self::with_opts(cfg.time_base, cfg.fps, cfg.opts)
    }

    /// Current timing and options as a config.
    pub fn config(&self) -> SequenceConfig {
        SequenceConfig {
            time_base: self.clock.time_base(),
            fps: self.clock.fps(),
            opts: self.opts,
        }
    }

    /// Seek/read options.
    pub fn opts(&self) -> SequenceOpts {
        self.opts
    }

    /// Replace seek/read options. Takes effect on the next seek or read.
    pub fn set_opts(&mut self, opts: SequenceOpts) {
        self.opts = opts;
    }

    // Timing

    /// Sequence time base.
    pub fn time_base(&self) -> Rational {
        self.clock.time_base()
    }

    /// Sequence frame rate.
    pub fn fps(&self) -> Fps {
        self.clock.fps()
    }

    /// Duration of one frame in time base ticks.
    pub fn video_frame_duration(&self) -> i64 {
        self.clock.frame_duration()
    }

    /// The frame/pts mapping currently in effect.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Change the sequence time base.
    ///
    /// Clip positions are rescaled into the new base and the cursor must be resolved again. Fails
    /// without changing anything when rounding into the new base would leave a clip empty or make
    /// two clips overlap.
    #[tracing::instrument(skip(self))]
    pub fn set_time_base(&mut self, time_base: Rational) -> SequenceResult<()> {
        let clock = FrameClock::new(time_base, self.clock.fps())?;
        self.clips
            .rescale_starts(self.clock.time_base(), time_base)?;
        self.clock = clock;
        self.cursor.unresolve();
        Ok(())
    }

    /// Change the sequence frame rate. The cursor must be resolved again.
    pub fn set_fps(&mut self, fps: Fps) -> SequenceResult<()> {
        self.clock = FrameClock::new(self.clock.time_base(), fps)?;
        tracing::debug!(%fps, frame_duration = self.clock.frame_duration(), "fps changed");
        self.cursor.unresolve();
        Ok(())
    }

    /// Pts at which `frame` starts.
    pub fn frame_to_pts(&self, frame: FrameIndex) -> i64 {
        self.clock.frame_to_pts(frame)
    }

    /// Frame containing `pts`.
    pub fn pts_to_frame(&self, pts: i64) -> FrameIndex {
        self.clock.pts_to_frame(pts)
    }

    /// Clip-relative offset of `frame` in the clip's time base, `None` when the clip does not
    /// contain the frame.
    pub fn frame_within_clip(&self, id: ClipId, frame: FrameIndex) -> SequenceResult<Option<i64>> {
        let info = self.clip_info(id).ok_or(SequenceError::UnknownClip(id))?;
        Ok(self.clock.frame_within(&info, frame))
    }

    // Clip collection

    /// Insert a clip starting at `start` (sequence frame).
    pub fn add_clip<S: ClipSource + 'static>(
        &mut self,
        source: S,
        start: FrameIndex,
    ) -> SequenceResult<ClipId> {
        let start_pts = self.start_pts_for(start)?;
        self.add_clip_pts(source, start_pts)
    }

    /// Insert a clip starting at `start_pts` (sequence time base).
    ///
    /// Clips with equal starts keep insertion order, although a non-empty clip can never share
    /// a start with another since overlaps are rejected.
    pub fn add_clip_pts<S: ClipSource + 'static>(
        &mut self,
        source: S,
        start_pts: i64,
    ) -> SequenceResult<ClipId> {
        let label = source.label().to_owned();
        let id = self
            .clips
            .insert(Box::new(source), start_pts, self.clock.time_base())?;
        tracing::debug!(clip = %id, %label, start_pts, "clip added");
        Ok(id)
    }

    /// Insert a clip directly after the last one, or at the origin of an empty sequence.
    pub fn append_clip<S: ClipSource + 'static>(&mut self, source: S) -> SequenceResult<ClipId> {
        let start_pts = self.clips.end_pts(self.clock.time_base());
        self.add_clip_pts(source, start_pts)
    }

    /// Move a clip so it starts at `start` (sequence frame).
    pub fn move_clip(&mut self, id: ClipId, start: FrameIndex) -> SequenceResult<()> {
        let start_pts = self.start_pts_for(start)?;
        self.move_clip_pts(id, start_pts)
    }

    /// Move a clip so it starts at `start_pts` (sequence time base).
    ///
    /// Moving the clip under the cursor seeks the current frame again under the configured
    /// [`crate::SeekMode`]. If the frame is no longer covered the sequence becomes
    /// [`PlaybackState::Errored`] with the cursor still on the moved clip, so reading resumes from
    /// the clip at its new position. The move itself still succeeds.
    #[tracing::instrument(skip(self))]
    pub fn move_clip_pts(&mut self, id: ClipId, start_pts: i64) -> SequenceResult<()> {
        self.clips
            .reposition(id, start_pts, self.clock.time_base())?;
        if self.cursor.clip() == Some(id) {
            let frame = self.cursor.frame;
            match seek::seek(
                &mut self.clips,
                &self.clock,
                &mut self.cursor,
                frame,
                self.opts.seek_mode,
            ) {
                Ok(status) => tracing::debug!(?status, "cursor re-resolved after move"),
                Err(err) => tracing::debug!(error = %err, "cursor left on moved clip"),
            }
        }
        Ok(())
    }

    /// Take a clip out of the sequence and hand its source back.
    ///
    /// Removing the clip under the cursor leaves the cursor unresolved at the same frame.
    pub fn remove_clip(&mut self, id: ClipId) -> SequenceResult<Box<dyn ClipSource>> {
        let clip = self.clips.remove(id).ok_or(SequenceError::UnknownClip(id))?;
        if self.cursor.clip() == Some(id) {
            self.cursor.unresolve();
        }
        tracing::debug!(clip = %id, "clip removed");
        Ok(clip.source)
    }

    /// Release every clip and reset the cursor to the origin.
    pub fn clear(&mut self) -> usize {
        let released = self.clips.clear();
        self.cursor = Cursor::new();
        tracing::debug!(released, "sequence cleared");
        released
    }

    /// Source under the cursor, `None` when unresolved or past the end.
    pub fn get_current_clip(&self) -> Option<&dyn ClipSource> {
        let id = self.cursor.clip()?;
        let idx = self.clips.index_of(id)?;
        self.clips.get(idx).map(|c| c.source.as_ref())
    }

    /// Id of the clip under the cursor.
    pub fn current_clip_id(&self) -> Option<ClipId> {
        self.cursor.clip()
    }

    /// Next frame to be read: the seek target, or the frame after the last packet returned.
    pub fn current_frame(&self) -> FrameIndex {
        self.cursor.frame
    }

    /// State of the read/seek surface.
    pub fn state(&self) -> PlaybackState {
        self.cursor.state()
    }

    /// Placement of every clip in timeline order.
    pub fn clips(&self) -> impl Iterator<Item = ClipInfo> + '_ {
        self.clips.iter().map(|c| c.info(&self.clock))
    }

    /// Placement of one clip.
    pub fn clip_info(&self, id: ClipId) -> Option<ClipInfo> {
        let idx = self.clips.index_of(id)?;
        self.clips.get(idx).map(|c| c.info(&self.clock))
    }

    /// Number of clips.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Return `true` when the sequence holds no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Exclusive end of the last clip in sequence time base; `0` when empty.
    pub fn end_pts(&self) -> i64 {
        self.clips.end_pts(self.clock.time_base())
    }

    /// First frame past the last clip; `0` when empty.
    pub fn end_frame(&self) -> FrameIndex {
        self.clock.pts_to_frame_ceil(self.end_pts())
    }

    // Seek and read

    /// Position the cursor at `frame`.
    ///
    /// `Ok(SeekStatus::EndOfSequence)` when `frame` lies past the last clip. Frames in a gap fail
    /// with [`SequenceError::NoCoverage`] under [`crate::SeekMode::Strict`].
    #[tracing::instrument(skip(self))]
    pub fn seek(&mut self, frame: FrameIndex) -> SequenceResult<SeekStatus> {
        seek::seek(
            &mut self.clips,
            &self.clock,
            &mut self.cursor,
            frame,
            self.opts.seek_mode,
        )
    }

    /// Read the next packet, `Ok(None)` at end of sequence.
    ///
    /// End of sequence is sticky until a successful seek. On a source error the cursor stays
    /// put so the read can be retried.
    pub fn read_packet(&mut self) -> SequenceResult<Option<Packet>> {
        reader::read_next(
            &mut self.clips,
            &self.clock,
            &mut self.cursor,
            self.opts.seek_mode,
        )
    }

    /// Iterate packets from the cursor until end of sequence or the first error.
    pub fn packets(&mut self) -> Packets<'_> {
        Packets {
            seq: self,
            done: false,
        }
    }

    fn start_pts_for(&self, start: FrameIndex) -> SequenceResult<i64> {
        if start.is_negative() {
            return Err(SequenceError::invalid(format!(
                "clip start frame must be >= 0, got {start}"
            )));
        }
        Ok(self.clock.frame_to_pts(start))
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("time_base", &self.clock.time_base())
            .field("fps", &self.clock.fps())
            .field("frame_duration", &self.clock.frame_duration())
            .field("clips", &self.clips.len())
            .field("state", &self.cursor.state())
            .field("current_frame", &self.cursor.frame)
            .finish()
    }
}

/// Iterator returned by [`Sequence::packets`].
///
/// Yields `Err` at most once and then stops.
pub struct Packets<'a> {
    seq: &'a mut Sequence,
    done: bool,
}

impl Iterator for Packets<'_> {
    type Item = SequenceResult<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.seq.read_packet() {
            Ok(Some(p)) => Some(Ok(p)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/sequence.rs"]
mod tests;
