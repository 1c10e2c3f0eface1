//! The host mutation surface.
//!
//! Modules never own their host object. While being attached and on every
//! tick they receive a `&mut dyn Host` through their context and read or
//! write the owner's local position and orientation through it.

use crate::math::{Quat, Vec3, normalize_axis};

/// Opaque capability exposing the owner's local transform.
pub trait Host {
    /// Local position relative to the parent (or origin).
    fn local_position(&self) -> Vec3;

    /// Overwrite the local position.
    fn set_local_position(&mut self, position: Vec3);

    /// Local orientation relative to the parent.
    fn local_rotation(&self) -> Quat;

    /// Overwrite the local orientation.
    fn set_local_rotation(&mut self, rotation: Quat);

    /// Rotate by `radians` about `axis` expressed in local space.
    ///
    /// The axis is normalized first; a zero axis rotates about +Y.
    fn rotate_local(&mut self, axis: Vec3, radians: f32) {
        let delta = Quat::from_axis_angle(normalize_axis(axis), radians);
        let rotation = (self.local_rotation() * delta).normalize();
        self.set_local_rotation(rotation);
    }

    /// Move by `offset` in parent space.
    fn translate(&mut self, offset: Vec3) {
        let position = self.local_position() + offset;
        self.set_local_position(position);
    }
}
