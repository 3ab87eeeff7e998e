use crate::foundation::rational::{Rational, rescale};

/// An encoded media packet.
///
/// The payload is opaque to the sequence engine: only `pts`, `duration` and `time_base` are read
/// or rewritten when a packet crosses from clip time into sequence time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Encoded payload bytes.
    pub data: Vec<u8>,
    /// Presentation timestamp in `time_base` units.
    pub pts: i64,
    /// Packet duration in `time_base` units (0 when unknown).
    pub duration: i64,
    /// Time base in which `pts` and `duration` are expressed.
    pub time_base: Rational,
    /// Whether the packet starts a decodable unit.
    pub keyframe: bool,
}

impl Packet {
    /// Create a packet with the given payload and timestamp.
    pub fn new(data: Vec<u8>, pts: i64, time_base: Rational) -> Self {
        Self {
            data,
            pts,
            duration: 0,
            time_base,
            keyframe: false,
        }
    }

    /// Builder-style duration setter.
    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    /// Builder-style keyframe flag setter.
    pub fn with_keyframe(mut self, keyframe: bool) -> Self {
        self.keyframe = keyframe;
        self
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Re-express `pts` and `duration` in `target`.
    pub fn rescale_to(&mut self, target: Rational) {
        if self.time_base == target {
            return;
        }
        self.pts = rescale(self.pts, self.time_base, target);
        self.duration = rescale(self.duration, self.time_base, target);
        self.time_base = target;
    }

    /// Move the packet onto another timeline: `pts` becomes `offset + (pts - origin)` re-expressed in
    /// `target`, where `origin` is in the packet's current time base and `offset` in `target`.
    pub(crate) fn retime(&mut self, origin: i64, offset: i64, target: Rational) {
        let rel = rescale(self.pts.saturating_sub(origin), self.time_base, target);
        self.pts = offset.saturating_add(rel);
        self.duration = rescale(self.duration, self.time_base, target);
        self.time_base = target;
    }
}
