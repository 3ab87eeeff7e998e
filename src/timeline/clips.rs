use std::fmt;

use crate::foundation::core::FrameSpan;
use crate::foundation::error::{SequenceError, SequenceResult};
use crate::foundation::rational::{Rational, rescale};
use crate::media::source::ClipSource;
use crate::timeline::clock::FrameClock;

/// Stable identifier of a clip within one sequence. Survives moves.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClipId(pub(crate) u64);

impl ClipId {
    /// Raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Snapshot of a clip's placement on the sequence timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipInfo {
    /// Clip id.
    pub id: ClipId,
    /// Sequence start, sequence time base.
    pub start_pts: i64,
    /// Exclusive sequence end, sequence time base.
    pub end_pts: i64,
    /// Time base of the clip's source.
    pub source_time_base: Rational,
    /// Sequence frames covered by the clip.
    pub span: FrameSpan,
}

/// A source placed on the timeline. Owned by the collection.
pub(crate) struct Clip {
    pub(crate) id: ClipId,
    /// Sequence start, sequence time base.
    pub(crate) start_pts: i64,
    pub(crate) source: Box<dyn ClipSource>,
}

impl Clip {
    pub(crate) fn end_pts(&self, seq_tb: Rational) -> i64 {
        self.start_pts
            .saturating_add(sequence_duration(self.source.as_ref(), seq_tb))
    }

    pub(crate) fn info(&self, clock: &FrameClock) -> ClipInfo {
        let end_pts = self.end_pts(clock.time_base());
        ClipInfo {
            id: self.id,
            start_pts: self.start_pts,
            end_pts,
            source_time_base: self.source.time_base(),
            span: clock.span_of(self.start_pts, end_pts),
        }
    }
}

fn sequence_duration(source: &dyn ClipSource, seq_tb: Rational) -> i64 {
    rescale(source.duration_pts(), source.time_base(), seq_tb)
}

/// Result of looking up a sequence pts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// The clip at this index contains the pts.
    Inside(usize),
    /// No clip contains the pts; indices of the neighbours on either side.
    Gap {
        previous: Option<usize>,
        next: Option<usize>,
    },
}

/// Clips ordered by ascending sequence start.
///
/// Clips never overlap: every insertion and move is checked against its neighbours, which keeps
/// "the clip containing pts" unique and lets lookups binary-search on start positions.
#[derive(Default)]
pub(crate) struct ClipCollection {
    clips: Vec<Clip>,
    next_id: u64,
}

impl ClipCollection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.clips.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&Clip> {
        self.clips.get(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Clip> {
        self.clips.get_mut(idx)
    }

    pub(crate) fn index_of(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// End of the last clip, or `0` for an empty collection.
    pub(crate) fn end_pts(&self, seq_tb: Rational) -> i64 {
        self.clips.last().map_or(0, |c| c.end_pts(seq_tb))
    }

    /// Insert `source` at `start_pts`, after any clip with an equal start.
    pub(crate) fn insert(
        &mut self,
        source: Box<dyn ClipSource>,
        start_pts: i64,
        seq_tb: Rational,
    ) -> SequenceResult<ClipId> {
        validate_source(source.as_ref())?;
        let end_pts = checked_start(start_pts)?
            .saturating_add(sequence_duration(source.as_ref(), seq_tb));
        if end_pts <= start_pts {
            return Err(SequenceError::invalid(format!(
                "clip '{}' is shorter than one sequence tick",
                source.label()
            )));
        }
        self.check_free(start_pts, end_pts, seq_tb, None)?;

        let id = ClipId(self.next_id);
        self.next_id += 1;
        let at = self.clips.partition_point(|c| c.start_pts <= start_pts);
        self.clips.insert(
            at,
            Clip {
                id,
                start_pts,
                source,
            },
        );
        self.debug_check_sorted();
        Ok(id)
    }

    /// Move clip `id` to `start_pts`, keeping sort order. Leaves the collection unchanged on error.
    pub(crate) fn reposition(
        &mut self,
        id: ClipId,
        start_pts: i64,
        seq_tb: Rational,
    ) -> SequenceResult<()> {
        checked_start(start_pts)?;
        let idx = self.index_of(id).ok_or(SequenceError::UnknownClip(id))?;
        let duration = sequence_duration(self.clips[idx].source.as_ref(), seq_tb);
        self.check_free(start_pts, start_pts.saturating_add(duration), seq_tb, Some(id))?;

        let mut clip = self.clips.remove(idx);
        clip.start_pts = start_pts;
        let at = self.clips.partition_point(|c| c.start_pts <= start_pts);
        self.clips.insert(at, clip);
        self.debug_check_sorted();
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let idx = self.index_of(id)?;
        Some(self.clips.remove(idx))
    }

    /// Drop every clip, returning how many were released.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.clips.len();
        self.clips.clear();
        n
    }

    /// Re-express every start position in a new sequence time base.
    ///
    /// Starts and durations round independently, so the new layout is checked for empty clips and
    /// overlaps first. Leaves the collection unchanged on error.
    pub(crate) fn rescale_starts(&mut self, from: Rational, to: Rational) -> SequenceResult<()> {
        let starts: Vec<i64> = self
            .clips
            .iter()
            .map(|c| rescale(c.start_pts, from, to))
            .collect();

        let mut previous: Option<(ClipId, i64)> = None;
        for (clip, &start_pts) in self.clips.iter().zip(&starts) {
            let end_pts = start_pts.saturating_add(sequence_duration(clip.source.as_ref(), to));
            if end_pts <= start_pts {
                return Err(SequenceError::invalid(format!(
                    "{} ('{}') is shorter than one tick of time base {to}",
                    clip.id,
                    clip.source.label()
                )));
            }
            if let Some((existing, prev_end)) = previous {
                if prev_end > start_pts {
                    return Err(SequenceError::Overlap {
                        start: start_pts,
                        end: end_pts,
                        existing,
                    });
                }
            }
            previous = Some((clip.id, end_pts));
        }

        for (clip, start_pts) in self.clips.iter_mut().zip(starts) {
            clip.start_pts = start_pts;
        }
        self.debug_check_sorted();
        Ok(())
    }

    /// Find the clip containing `pts`, or its neighbours when `pts` falls in a gap.
    pub(crate) fn lookup(&self, pts: i64, seq_tb: Rational) -> Lookup {
        let after = self.clips.partition_point(|c| c.start_pts <= pts);
        if let Some(prev) = after.checked_sub(1) {
            if self.clips[prev].end_pts(seq_tb) > pts {
                return Lookup::Inside(prev);
            }
        }
        Lookup::Gap {
            previous: after.checked_sub(1),
            next: (after < self.clips.len()).then_some(after),
        }
    }

    fn check_free(
        &self,
        start_pts: i64,
        end_pts: i64,
        seq_tb: Rational,
        ignore: Option<ClipId>,
    ) -> SequenceResult<()> {
        let after = self.clips.partition_point(|c| c.start_pts <= start_pts);
        let before = self.clips[..after]
            .iter()
            .rev()
            .find(|c| Some(c.id) != ignore);
        let following = self.clips[after..].iter().find(|c| Some(c.id) != ignore);

        if let Some(prev) = before {
            if prev.end_pts(seq_tb) > start_pts {
                return Err(SequenceError::Overlap {
                    start: start_pts,
                    end: end_pts,
                    existing: prev.id,
                });
            }
        }
        if let Some(next) = following {
            if next.start_pts < end_pts {
                return Err(SequenceError::Overlap {
                    start: start_pts,
                    end: end_pts,
                    existing: next.id,
                });
            }
        }
        Ok(())
    }

    fn debug_check_sorted(&self) {
        debug_assert!(
            self.clips.is_sorted_by_key(|c| c.start_pts),
            "clip collection lost its ordering"
        );
    }
}

fn checked_start(start_pts: i64) -> SequenceResult<i64> {
    if start_pts < 0 {
        return Err(SequenceError::invalid(format!(
            "clip start pts must be >= 0, got {start_pts}"
        )));
    }
    Ok(start_pts)
}

fn validate_source(source: &dyn ClipSource) -> SequenceResult<()> {
    source.time_base().validate_time_base()?;
    if source.end_pts() <= source.origin_pts() {
        return Err(SequenceError::invalid(format!(
            "clip '{}' has an empty window [{}, {})",
            source.label(),
            source.origin_pts(),
            source.end_pts()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clips.rs"]
mod tests;
