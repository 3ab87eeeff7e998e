use crate::foundation::rational::Rational;
use crate::media::packet::Packet;

/// Contract for the media behind a clip.
///
/// A source exposes a window `[origin_pts, end_pts)` of its own stream, in its own time base.
/// The sequence engine places that window on the sequence timeline and drives it with
/// [`ClipSource::seek`] and [`ClipSource::read_packet`]; demuxing and decoding stay behind this
/// trait.
///
/// Ordering contract: after `seek(offset)`, `read_packet` yields packets in non-decreasing pts order
/// starting at the first packet whose pts is `>= origin_pts + offset`. Packets outside the window
/// may be returned; the engine skips pre-roll and treats a packet at or past `end_pts` as the end
/// of the clip.
pub trait ClipSource: Send {
    /// Time base of every pts this source produces or accepts.
    fn time_base(&self) -> Rational;

    /// In point of the clip in source time base; clip-relative offset `0`.
    fn origin_pts(&self) -> i64;

    /// Exclusive out point of the clip in source time base.
    fn end_pts(&self) -> i64;

    /// Read the next packet, `Ok(None)` once the source is exhausted.
    fn read_packet(&mut self) -> anyhow::Result<Option<Packet>>;

    /// Reposition so the next read starts at `origin_pts() + offset`.
    fn seek(&mut self, offset: i64) -> anyhow::Result<()>;

    /// Human-readable label used in logs.
    fn label(&self) -> &str {
        "clip"
    }

    /// Clip length in source time base.
    fn duration_pts(&self) -> i64 {
        self.end_pts().saturating_sub(self.origin_pts())
    }
}

impl std::fmt::Debug for dyn ClipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipSource")
            .field("label", &self.label())
            .field("time_base", &self.time_base())
            .field("origin_pts", &self.origin_pts())
            .field("end_pts", &self.end_pts())
            .finish()
    }
}
