use anyhow::bail;

use crate::foundation::error::{SequenceError, SequenceResult};
use crate::foundation::rational::Rational;
use crate::media::packet::Packet;
use crate::media::source::ClipSource;

/// In-memory clip source for tests, previews and debugging.
///
/// Holds a pre-built, pts-sorted packet list and serves it through [`ClipSource`]. Read and seek
/// failures can be injected to exercise error paths.
#[derive(Clone, Debug)]
pub struct MemoryClip {
    label: String,
    time_base: Rational,
    origin_pts: i64,
    end_pts: i64,
    packets: Vec<Packet>,
    pos: usize,
    fail_read_at: Option<i64>,
    fail_seeks: bool,
}

impl MemoryClip {
    /// Build a source from packets; they are sorted by pts and re-stamped with `time_base`.
    pub fn from_packets(
        label: impl Into<String>,
        time_base: Rational,
        origin_pts: i64,
        end_pts: i64,
        mut packets: Vec<Packet>,
    ) -> SequenceResult<Self> {
        time_base.validate_time_base()?;
        if end_pts <= origin_pts {
            return Err(SequenceError::invalid(format!(
                "MemoryClip end_pts ({end_pts}) must be > origin_pts ({origin_pts})"
            )));
        }
        packets.sort_by_key(|p| p.pts);
        for p in &mut packets {
            p.time_base = time_base;
        }
        Ok(Self {
            label: label.into(),
            time_base,
            origin_pts,
            end_pts,
            packets,
            pos: 0,
            fail_read_at: None,
            fail_seeks: false,
        })
    }

    /// Build a constant-rate source of `count` packets, `step` ticks apart, starting at `origin_pts`.
    ///
    /// Each payload is the packet's ordinal as little-endian `u32`, which makes read order easy to
    /// assert on.
    pub fn frames(
        label: impl Into<String>,
        time_base: Rational,
        origin_pts: i64,
        count: u32,
        step: i64,
    ) -> SequenceResult<Self> {
        if step <= 0 {
            return Err(SequenceError::invalid("MemoryClip step must be > 0"));
        }
        let packets = (0..count)
            .map(|i| {
                Packet::new(
                    i.to_le_bytes().to_vec(),
                    origin_pts + i64::from(i) * step,
                    time_base,
                )
                .with_duration(step)
                .with_keyframe(true)
            })
            .collect();
        let end_pts = origin_pts + i64::from(count) * step;
        Self::from_packets(label, time_base, origin_pts, end_pts, packets)
    }

    /// Narrow the exposed window to `[origin_pts, end_pts)` without dropping packets.
    ///
    /// Packets outside the window act as pre-roll or tail and are skipped by the engine.
    pub fn trimmed(mut self, origin_pts: i64, end_pts: i64) -> SequenceResult<Self> {
        if end_pts <= origin_pts {
            return Err(SequenceError::invalid(format!(
                "MemoryClip end_pts ({end_pts}) must be > origin_pts ({origin_pts})"
            )));
        }
        self.origin_pts = origin_pts;
        self.end_pts = end_pts;
        Ok(self)
    }

    /// Fail the next read that would return the packet at `pts`. One-shot.
    pub fn fail_read_at(mut self, pts: i64) -> Self {
        self.fail_read_at = Some(pts);
        self
    }

    /// Make every seek fail.
    pub fn fail_seeks(mut self, fail: bool) -> Self {
        self.fail_seeks = fail;
        self
    }

    /// Number of packets held, including pre-roll and tail.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Return `true` when no packets are held.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

impl ClipSource for MemoryClip {
    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn origin_pts(&self) -> i64 {
        self.origin_pts
    }

    fn end_pts(&self) -> i64 {
        self.end_pts
    }

    fn read_packet(&mut self) -> anyhow::Result<Option<Packet>> {
        let Some(packet) = self.packets.get(self.pos) else {
            return Ok(None);
        };
        if self.fail_read_at == Some(packet.pts) {
            self.fail_read_at = None;
            bail!("{}: corrupt packet at pts {}", self.label, packet.pts);
        }
        let packet = packet.clone();
        self.pos += 1;
        Ok(Some(packet))
    }

    fn seek(&mut self, offset: i64) -> anyhow::Result<()> {
        if self.fail_seeks {
            bail!("{}: seek to offset {offset} failed", self.label);
        }
        let target = self.origin_pts.saturating_add(offset);
        self.pos = self.packets.partition_point(|p| p.pts < target);
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/memory.rs"]
mod tests;
