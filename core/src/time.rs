//! Per-frame timing handed to every tick.

/// Elapsed time for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub delta_seconds: f32,
    /// Monotonic frame counter, starting at 0.
    pub frame: u64,
}

impl FrameTime {
    /// A frame with the given delta at frame 0.
    pub const fn from_delta(delta_seconds: f32) -> Self {
        Self {
            delta_seconds,
            frame: 0,
        }
    }

    /// The following frame, keeping the same delta.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            delta_seconds: self.delta_seconds,
            frame: self.frame + 1,
        }
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        // 60 Hz
        Self::from_delta(1.0 / 60.0)
    }
}
