use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

/// Absolute frame number in timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Inclusive frame span `[start, end]` in timeline space.
///
/// Timeline segments and render chunks are both expressed with inclusive bounds, matching the
/// frame arguments handed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    /// First frame (inclusive).
    pub start: u64,
    /// Last frame (inclusive).
    pub end: u64,
}

impl FrameSpan {
    /// Create a validated span with `start <= end`.
    pub fn new(start: u64, end: u64) -> ReelResult<Self> {
        if start > end {
            return Err(ReelError::validation(format!(
                "frame span start ({start}) must be <= end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the span, saturating at `u64::MAX` for `0..=u64::MAX`.
    pub fn len_frames(self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Return `true` when `f` is inside `[start, end]`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start <= f.0 && f.0 <= self.end
    }

    /// Frame at `fraction` of the way through the span, rounded down.
    pub fn frame_at_fraction(self, fraction: f64) -> FrameIndex {
        let fraction = fraction.clamp(0.0, 1.0);
        let offset = ((self.end - self.start) as f64 * fraction).floor() as u64;
        FrameIndex(self.start + offset)
    }
}

impl fmt::Display for FrameSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 24, den: 1 }
    }
}

/// Location, Euler rotation (radians) and scale of an actor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform3D {
    /// World-space location.
    pub location: [f64; 3],
    /// XYZ Euler rotation in radians.
    pub rotation: [f64; 3],
    /// Per-axis scale, default `(1, 1, 1)`.
    pub scale: [f64; 3],
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform3D {
    /// Transform placed at `location` with identity rotation and scale.
    pub fn at(location: [f64; 3]) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
