use crate::config::SeekMode;
use crate::foundation::core::{FrameIndex, FrameSpan};
use crate::foundation::error::{SequenceError, SequenceResult};
use crate::timeline::clips::{ClipCollection, Lookup};
use crate::timeline::clock::FrameClock;
use crate::timeline::cursor::Cursor;

/// Outcome of a successful seek.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekStatus {
    /// The cursor now points at the clip containing the frame.
    Positioned,
    /// The frame lies past the end of the last clip; reads return end of sequence.
    EndOfSequence,
}

/// Where a requested frame lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Clip at `index` contains `frame`; `offset` is clip-relative, in the clip's time base.
    Clip {
        index: usize,
        frame: FrameIndex,
        offset: i64,
    },
    EndOfSequence,
}

/// Resolve `frame` against the collection without touching any source.
pub(crate) fn locate(
    clips: &ClipCollection,
    clock: &FrameClock,
    frame: FrameIndex,
    mode: SeekMode,
) -> SequenceResult<Resolution> {
    if frame.is_negative() {
        return Err(SequenceError::invalid(format!(
            "seek frame must be >= 0, got {frame}"
        )));
    }

    match clips.lookup(clock.frame_to_pts(frame), clock.time_base()) {
        Lookup::Inside(index) => inside(clips, clock, index, frame),
        Lookup::Gap { next: None, .. } => Ok(Resolution::EndOfSequence),
        Lookup::Gap { previous, next } => {
            let previous_span = previous.and_then(|i| span_at(clips, clock, i));
            let next_span = next.and_then(|i| span_at(clips, clock, i));
            if mode == SeekMode::Nearest {
                if let Some((index, snapped)) =
                    nearest(frame, previous.zip(previous_span), next.zip(next_span))
                {
                    tracing::debug!(
                        requested = frame.0,
                        snapped = snapped.0,
                        "seek snapped to nearest clip"
                    );
                    return inside(clips, clock, index, snapped);
                }
            }
            Err(SequenceError::NoCoverage {
                frame,
                previous: previous_span,
                next: next_span,
            })
        }
    }
}

/// Resolve `frame` and position both the clip source and the cursor on success.
///
/// On any error the cursor keeps its clip and frame and is flagged as errored.
pub(crate) fn seek(
    clips: &mut ClipCollection,
    clock: &FrameClock,
    cursor: &mut Cursor,
    frame: FrameIndex,
    mode: SeekMode,
) -> SequenceResult<SeekStatus> {
    let resolution = match locate(clips, clock, frame, mode) {
        Ok(r) => r,
        Err(err) => {
            tracing::warn!(requested = frame.0, error = %err, "seek rejected");
            cursor.fail();
            return Err(err);
        }
    };

    match resolution {
        Resolution::EndOfSequence => {
            tracing::debug!(requested = frame.0, "seek past end of sequence");
            cursor.past_end();
            cursor.frame = frame;
            Ok(SeekStatus::EndOfSequence)
        }
        Resolution::Clip {
            index,
            frame,
            offset,
        } => {
            let Some(clip) = clips.get_mut(index) else {
                cursor.fail();
                return Err(SequenceError::invariant(format!(
                    "resolved clip index {index} is out of bounds"
                )));
            };
            if let Err(source) = clip.source.seek(offset) {
                tracing::warn!(
                    clip = %clip.id,
                    requested = frame.0,
                    offset,
                    error = %source,
                    "clip source failed to seek"
                );
                cursor.fail();
                return Err(SequenceError::Decode {
                    clip: clip.id,
                    frame,
                    source,
                });
            }
            tracing::debug!(clip = %clip.id, frame = frame.0, offset, "seek positioned");
            cursor.place(clip.id, frame);
            Ok(SeekStatus::Positioned)
        }
    }
}

fn inside(
    clips: &ClipCollection,
    clock: &FrameClock,
    index: usize,
    frame: FrameIndex,
) -> SequenceResult<Resolution> {
    let info = clips
        .get(index)
        .map(|c| c.info(clock))
        .ok_or_else(|| SequenceError::invariant(format!("clip index {index} is out of bounds")))?;
    let offset = clock.frame_within(&info, frame).ok_or_else(|| {
        tracing::error!(clip = %info.id, frame = frame.0, "lookup and containment disagree");
        debug_assert!(false, "lookup and containment disagree");
        SequenceError::invariant(format!("{} does not contain frame {frame}", info.id))
    })?;
    Ok(Resolution::Clip {
        index,
        frame,
        offset,
    })
}

fn span_at(clips: &ClipCollection, clock: &FrameClock, index: usize) -> Option<FrameSpan> {
    clips.get(index).map(|c| c.info(clock).span)
}

/// Closest covered frame to `frame` among the two neighbours; ties favour `next`.
fn nearest(
    frame: FrameIndex,
    previous: Option<(usize, FrameSpan)>,
    next: Option<(usize, FrameSpan)>,
) -> Option<(usize, FrameIndex)> {
    let before = previous.and_then(|(i, span)| span.last().map(|last| (i, last)));
    let after = next.and_then(|(i, span)| (!span.is_empty()).then_some((i, span.start)));
    match (before, after) {
        (Some(b), Some(a)) => {
            if frame.0 - b.1.0 < a.1.0 - frame.0 {
                Some(b)
            } else {
                Some(a)
            }
        }
        (b, a) => a.or(b),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/seek.rs"]
mod tests;
