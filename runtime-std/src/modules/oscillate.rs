//! Ping-pong movement along a single local axis.

use modkit_core::math::{axis_component, with_axis_component};
use modkit_runtime::{Module, ModuleContext, Reflect};
use serde::{Deserialize, Serialize};

use super::SAMPLE;

const AXIS_X: usize = 0;
const AXIS_Y: usize = 1;

/// Runtime state shared by the axis movers.
///
/// The coordinate advances by the frame delta (one unit per second) and
/// reverses only after it has passed `origin ± amplitude`. Nothing is
/// clamped, so a large delta overshoots the bound before turning around.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Oscillator {
    origin: f32,
    returning: bool,
}

impl Oscillator {
    fn reset(&mut self, origin: f32) {
        self.origin = origin;
        self.returning = false;
    }

    fn step(&mut self, current: f32, delta: f32, amplitude: f32) -> f32 {
        if self.returning {
            let next = current - delta;
            if next < self.origin - amplitude {
                self.returning = false;
            }
            next
        } else {
            let next = current + delta;
            if next > self.origin + amplitude {
                self.returning = true;
            }
            next
        }
    }

    fn attach(&mut self, axis: usize, cx: &mut ModuleContext<'_>) {
        let origin = axis_component(cx.host_ref().local_position(), axis);
        self.reset(origin);
        log::debug!("oscillator on axis {axis} anchored at {origin}");
    }

    fn tick(&mut self, axis: usize, amplitude: f32, cx: &mut ModuleContext<'_>) {
        let delta = cx.delta_seconds();
        let host = cx.host();
        let position = host.local_position();
        let next = self.step(axis_component(position, axis), delta, amplitude);
        host.set_local_position(with_axis_component(position, axis, next));
    }
}

/// Moves the host back and forth along its local X axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Reflect)]
#[module(family = SAMPLE)]
#[serde(default)]
pub struct MoveX {
    /// Distance from the starting X before turning around.
    pub amplitude: f32,
    #[serde(skip)]
    _state: Oscillator,
}

impl MoveX {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            _state: Oscillator::default(),
        }
    }

    /// X the host had when this module was attached.
    pub fn origin(&self) -> f32 {
        self._state.origin
    }

    /// `true` while moving toward the lower bound.
    pub fn is_returning(&self) -> bool {
        self._state.returning
    }
}

impl Module for MoveX {
    fn on_attach(&mut self, cx: &mut ModuleContext<'_>) {
        self._state.attach(AXIS_X, cx);
    }

    fn on_tick(&mut self, cx: &mut ModuleContext<'_>) {
        self._state.tick(AXIS_X, self.amplitude, cx);
    }
}

/// Moves the host back and forth along its local Y axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Reflect)]
#[module(family = SAMPLE)]
#[serde(default)]
pub struct MoveY {
    /// Distance from the starting Y before turning around.
    pub amplitude: f32,
    #[serde(skip)]
    _state: Oscillator,
}

impl MoveY {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            _state: Oscillator::default(),
        }
    }

    pub fn origin(&self) -> f32 {
        self._state.origin
    }

    pub fn is_returning(&self) -> bool {
        self._state.returning
    }
}

impl Module for MoveY {
    fn on_attach(&mut self, cx: &mut ModuleContext<'_>) {
        self._state.attach(AXIS_Y, cx);
    }

    fn on_tick(&mut self, cx: &mut ModuleContext<'_>) {
        self._state.tick(AXIS_Y, self.amplitude, cx);
    }
}
