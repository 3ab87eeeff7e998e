//! Timeline engine for realtime video editing.
//!
//! A [`Sequence`] owns clips placed on a single timeline and serves them back as one packet
//! stream:
//!
//! 1. **Place**: add, append or move clips; the collection stays sorted by start and clips never
//!    overlap.
//! 2. **Seek**: `FrameIndex -> (clip, clip-relative offset)`, positioning both the cursor and the
//!    clip's [`ClipSource`].
//! 3. **Read**: pull packets from the clip under the cursor, hop into the next clip when it runs
//!    out, and rewrite each packet's pts into the sequence time base.
//!
//! Frame `f` starts at pts `f * video_frame_duration`, where the duration is derived from the
//! sequence time base and fps (`1/90000` at 30 fps gives `3000`).
//!
//! Demuxing and decoding live behind [`ClipSource`]; [`MemoryClip`] is an in-memory
//! implementation for tests and previews.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod foundation;
mod media;
mod sequence;
mod timeline;

pub use config::{SeekMode, SequenceConfig, SequenceOpts};
pub use foundation::core::{FrameIndex, FrameSpan, Fps};
pub use foundation::error::{SequenceError, SequenceResult};
pub use foundation::rational::{Rational, rescale};
pub use media::memory::MemoryClip;
pub use media::packet::Packet;
pub use media::source::ClipSource;
pub use sequence::{Packets, Sequence};
pub use timeline::clips::{ClipId, ClipInfo};
pub use timeline::clock::FrameClock;
pub use timeline::cursor::PlaybackState;
pub use timeline::seek::SeekStatus;
