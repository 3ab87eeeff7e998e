use crate::foundation::core::{FrameIndex, FrameSpan, Fps};
use crate::foundation::error::{SequenceError, SequenceResult};
use crate::foundation::rational::{Rational, rescale};
use crate::timeline::clips::ClipInfo;

/// Mapping between sequence frame indices and sequence pts.
///
/// Frame `f` starts at pts `f * frame_duration`. The duration is derived from the time base and
/// fps and is never set directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    time_base: Rational,
    fps: Fps,
    frame_duration: i64,
}

impl FrameClock {
    /// Build a clock; fails when either input is malformed or a frame is shorter than one tick.
    pub fn new(time_base: Rational, fps: Fps) -> SequenceResult<Self> {
        time_base.validate_time_base()?;
        fps.validate()?;
        let frame_duration = frame_duration(time_base, fps)?;
        Ok(Self {
            time_base,
            fps,
            frame_duration,
        })
    }

    /// Sequence time base.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Sequence frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Duration of one frame in time base ticks.
    pub fn frame_duration(&self) -> i64 {
        self.frame_duration
    }

    /// Pts at which `frame` starts. Saturates instead of overflowing.
    pub fn frame_to_pts(&self, frame: FrameIndex) -> i64 {
        frame.0.saturating_mul(self.frame_duration)
    }

    /// Frame containing `pts`; pts between frame boundaries truncate to the earlier frame.
    pub fn pts_to_frame(&self, pts: i64) -> FrameIndex {
        FrameIndex(pts.div_euclid(self.frame_duration))
    }

    /// First frame whose start pts is `>= pts`.
    pub fn pts_to_frame_ceil(&self, pts: i64) -> FrameIndex {
        let floor = pts.div_euclid(self.frame_duration);
        if pts.rem_euclid(self.frame_duration) == 0 {
            FrameIndex(floor)
        } else {
            FrameIndex(floor + 1)
        }
    }

    /// Frames whose start pts falls inside `[start_pts, end_pts)`.
    pub fn span_of(&self, start_pts: i64, end_pts: i64) -> FrameSpan {
        let start = self.pts_to_frame_ceil(start_pts);
        let end = self.pts_to_frame_ceil(end_pts).max(start);
        FrameSpan { start, end }
    }

    /// Offset of `frame` from the clip's origin, in the clip's own time base.
    ///
    /// `Some(0)` is the clip's first frame. `None` when the frame's pts lies outside the clip's
    /// sequence range.
    pub fn frame_within(&self, clip: &ClipInfo, frame: FrameIndex) -> Option<i64> {
        let pts = self.frame_to_pts(frame);
        if pts < clip.start_pts || pts >= clip.end_pts {
            return None;
        }
        Some(rescale(
            pts - clip.start_pts,
            self.time_base,
            clip.source_time_base,
        ))
    }
}

fn frame_duration(time_base: Rational, fps: Fps) -> SequenceResult<i64> {
    // (1 / fps) / time_base, in whole ticks.
    let num = i128::from(time_base.den) * i128::from(fps.den);
    let den = i128::from(time_base.num) * i128::from(fps.num);
    let duration = num / den;
    if duration <= 0 {
        return Err(SequenceError::invalid(format!(
            "time base {time_base} is too coarse for {fps}: a frame must span at least one tick"
        )));
    }
    if num % den != 0 {
        tracing::debug!(
            %time_base,
            %fps,
            duration = %duration,
            "frame duration is not a whole number of ticks; truncating"
        );
    }
    i64::try_from(duration)
        .map_err(|_| SequenceError::invalid("frame duration does not fit in i64"))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
