use crate::config::SeekMode;
use crate::foundation::error::{SequenceError, SequenceResult};
use crate::media::packet::Packet;
use crate::timeline::clips::ClipCollection;
use crate::timeline::clock::FrameClock;
use crate::timeline::cursor::{Cursor, Position};
use crate::timeline::seek::{self, SeekStatus};

/// Produce the next packet of the sequence, crossing clip boundaries as needed.
///
/// `Ok(None)` is end of sequence. Source errors leave the cursor where it was.
pub(crate) fn read_next(
    clips: &mut ClipCollection,
    clock: &FrameClock,
    cursor: &mut Cursor,
    mode: SeekMode,
) -> SequenceResult<Option<Packet>> {
    loop {
        let id = match cursor.position {
            Position::PastEnd => {
                cursor.past_end();
                return Ok(None);
            }
            Position::Unresolved => {
                if resume(clips, clock, cursor, mode)? == SeekStatus::EndOfSequence {
                    tracing::debug!(frame = cursor.frame.0, "end of sequence");
                    return Ok(None);
                }
                continue;
            }
            Position::At(id) => id,
        };

        let Some(index) = clips.index_of(id) else {
            cursor.fail();
            tracing::error!(clip = %id, "cursor refers to a clip that is not in the sequence");
            debug_assert!(false, "cursor refers to a missing clip");
            return Err(SequenceError::invariant(format!(
                "cursor refers to {id}, which is not in the sequence"
            )));
        };
        let Some(clip) = clips.get_mut(index) else {
            cursor.fail();
            tracing::error!(clip = %id, index, "clip index is out of bounds");
            debug_assert!(false, "clip index is out of bounds");
            return Err(SequenceError::invariant(format!(
                "clip index {index} is out of bounds"
            )));
        };

        let source_tb = clip.source.time_base();
        let origin = clip.source.origin_pts();
        let end = clip.source.end_pts();

        match clip.source.read_packet() {
            Err(source) => {
                tracing::warn!(
                    clip = %id,
                    frame = cursor.frame.0,
                    error = %source,
                    "clip source failed to read"
                );
                cursor.fail();
                return Err(SequenceError::Decode {
                    clip: id,
                    frame: cursor.frame,
                    source,
                });
            }
            Ok(Some(mut packet)) => {
                packet.rescale_to(source_tb);
                if packet.pts < origin {
                    tracing::trace!(clip = %id, pts = packet.pts, "skipping pre-roll packet");
                    continue;
                }
                if packet.pts < end {
                    packet.retime(origin, clip.start_pts, clock.time_base());
                    let frame = clock.pts_to_frame(packet.pts);
                    // The cursor names the next frame to read.
                    cursor.advance_to(frame.offset(1));
                    tracing::trace!(clip = %id, pts = packet.pts, frame = frame.0, "packet");
                    return Ok(Some(packet));
                }
                // Past the out point: the clip is done even if the source has more.
            }
            Ok(None) => {}
        }

        if !advance(clips, clock, cursor, index)? {
            tracing::debug!(clip = %id, frame = cursor.frame.0, "end of sequence");
            return Ok(None);
        }
    }
}

/// Move the cursor from the exhausted clip at `index` to the start of the next one.
///
/// Returns `false` when there is no next clip; the cursor is then past the end.
fn advance(
    clips: &mut ClipCollection,
    clock: &FrameClock,
    cursor: &mut Cursor,
    index: usize,
) -> SequenceResult<bool> {
    let Some(next) = clips.get_mut(index + 1) else {
        cursor.past_end();
        return Ok(false);
    };
    if let Err(source) = next.source.seek(0) {
        tracing::warn!(clip = %next.id, error = %source, "next clip failed to seek to its origin");
        cursor.fail();
        return Err(SequenceError::Decode {
            clip: next.id,
            frame: cursor.frame,
            source,
        });
    }
    let info = next.info(clock);
    tracing::debug!(
        from = cursor.frame.0,
        to = %info.id,
        start = info.span.start.0,
        "advancing to next clip"
    );
    cursor.place(info.id, info.span.start);
    Ok(true)
}

/// Resolve an unresolved cursor at its frame.
///
/// A frame in a gap resumes at the following clip, the same way sequential reads cross gaps.
fn resume(
    clips: &mut ClipCollection,
    clock: &FrameClock,
    cursor: &mut Cursor,
    mode: SeekMode,
) -> SequenceResult<SeekStatus> {
    let frame = cursor.frame;
    let target = match seek::locate(clips, clock, frame, mode) {
        Err(SequenceError::NoCoverage {
            next: Some(span), ..
        }) => span.start,
        _ => frame,
    };
    seek::seek(clips, clock, cursor, target, mode)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/reader.rs"]
mod tests;
