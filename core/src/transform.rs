//! Local transform implementing the [`Host`] surface.

use serde::{Deserialize, Serialize};

use crate::host::Host;
use crate::math::{Quat, Vec3};

/// Position, rotation, and scale of a host object relative to its parent.
///
/// # Example
///
/// ```
/// use modkit_core::{Host, Transform};
/// use modkit_core::math::Vec3;
///
/// let mut t = Transform::from_xyz(1.0, 2.0, 3.0);
/// t.translate(Vec3::X);
/// assert_eq!(t.translation, Vec3::new(2.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to parent (or world origin if no parent).
    pub translation: Vec3,
    /// Rotation relative to parent.
    pub rotation: Quat,
    /// Scale relative to parent.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform with no translation, no rotation, and uniform scale of 1.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a transform at the given position with default rotation and scale.
    #[inline]
    pub const fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    /// Creates a transform with the given translation.
    #[inline]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Returns this transform with a different rotation.
    #[inline]
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

impl Host for Transform {
    fn local_position(&self) -> Vec3 {
        self.translation
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.translation = position;
    }

    fn local_rotation(&self) -> Quat {
        self.rotation
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;

    #[test]
    fn identity_default() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }

    #[test]
    fn rotate_local_accumulates() {
        let mut t = Transform::IDENTITY;
        t.rotate_local(Vec3::Y, 0.25);
        t.rotate_local(Vec3::Y, 0.25);
        let (axis, angle) = t.rotation.to_axis_angle();
        assert!((angle - 0.5).abs() < EPSILON);
        assert!((axis - Vec3::Y).length() < EPSILON);
    }

    #[test]
    fn zero_axis_rotates_about_up() {
        let mut t = Transform::IDENTITY;
        t.rotate_local(Vec3::ZERO, 1.0);
        let (axis, _) = t.rotation.to_axis_angle();
        assert!((axis - Vec3::Y).length() < EPSILON);
    }
}
