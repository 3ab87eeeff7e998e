use crate::foundation::core::Fps;
use crate::foundation::error::{SequenceError, SequenceResult};
use crate::foundation::rational::Rational;
use crate::timeline::clock::FrameClock;

/// How a seek into uncovered timeline is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekMode {
    /// Frames in a gap or before the first clip fail with [`SequenceError::NoCoverage`].
    #[default]
    Strict,
    /// Snap to the closest covered frame; ties go to the following clip.
    Nearest,
}

/// Options controlling sequence seek/read behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceOpts {
    /// Gap policy for seeks, including the re-seek performed after moving the current clip.
    #[serde(default)]
    pub seek_mode: SeekMode,
}

/// Serializable description of a sequence's timing and options.
///
/// ```json
/// { "time_base": { "num": 1, "den": 90000 }, "fps": { "num": 30, "den": 1 } }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceConfig {
    /// Unit of sequence-level timestamps.
    pub time_base: Rational,
    /// Sequence frame rate.
    pub fps: Fps,
    /// Seek/read options.
    #[serde(default)]
    pub opts: SequenceOpts,
}

impl SequenceConfig {
    /// Config with default options.
    pub fn new(time_base: Rational, fps: Fps) -> Self {
        Self {
            time_base,
            fps,
            opts: SequenceOpts::default(),
        }
    }

    /// Check the time base and fps, and that one frame spans at least one tick.
    pub fn validate(&self) -> SequenceResult<()> {
        FrameClock::new(self.time_base, self.fps).map(|_| ())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> SequenceResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| SequenceError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_string(&self) -> SequenceResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SequenceError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
