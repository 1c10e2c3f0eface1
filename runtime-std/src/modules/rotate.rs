use modkit_core::math::Vec3;
use modkit_runtime::{Module, ModuleContext, Reflect};
use serde::{Deserialize, Serialize};

use super::SAMPLE;

/// Spins the host about a local axis by a fixed angle every tick.
///
/// The step ignores frame time: `speed` is degrees per tick, not per second.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect)]
#[module(family = SAMPLE)]
#[serde(default)]
pub struct Rotate {
    /// Degrees per tick.
    pub speed: f32,
    /// Local rotation axis; normalized when applied.
    pub axis: Vec3,
}

impl Rotate {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_axis(mut self, axis: Vec3) -> Self {
        self.axis = axis;
        self
    }
}

impl Default for Rotate {
    fn default() -> Self {
        Self {
            speed: 0.0,
            axis: Vec3::ONE,
        }
    }
}

impl Module for Rotate {
    fn on_tick(&mut self, cx: &mut ModuleContext<'_>) {
        cx.host().rotate_local(self.axis, self.speed.to_radians());
    }
}
