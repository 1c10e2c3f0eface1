//! Math type aliases and rotation helpers.
//!
//! All module math is f32 and backed by [`glam`].

pub use glam;

/// 3D vector (f32).
pub type Vec3 = glam::Vec3;

/// Quaternion (f32).
pub type Quat = glam::Quat;

/// Tolerance used when comparing rotations and positions in tests and
/// editor read-outs.
pub const EPSILON: f32 = 1e-4;

/// Normalize `axis`, falling back to +Y when it has no usable length.
pub fn normalize_axis(axis: Vec3) -> Vec3 {
    axis.try_normalize().unwrap_or(Vec3::Y)
}

/// Rotation of `degrees` about `axis` (the axis need not be normalized).
pub fn quat_from_axis_degrees(axis: Vec3, degrees: f32) -> Quat {
    Quat::from_axis_angle(normalize_axis(axis), degrees.to_radians())
}

/// Angle in radians between two rotations, in `[0, PI]`.
pub fn angle_between(a: Quat, b: Quat) -> f32 {
    a.angle_between(b)
}

/// Component of `v` along one of the three local axes.
pub fn axis_component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Copy of `v` with the component along `axis` replaced.
pub fn with_axis_component(mut v: Vec3, axis: usize, value: f32) -> Vec3 {
    match axis {
        0 => v.x = value,
        1 => v.y = value,
        _ => v.z = value,
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_axis_falls_back_to_up() {
        assert_eq!(normalize_axis(Vec3::ZERO), Vec3::Y);
        assert!((normalize_axis(Vec3::ONE).length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn degrees_rotation_matches_radians() {
        let q = quat_from_axis_degrees(Vec3::Z, 90.0);
        let (axis, angle) = q.to_axis_angle();
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < EPSILON);
        assert!((axis - Vec3::Z).length() < EPSILON);
    }

    #[test]
    fn axis_component_roundtrip() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(axis_component(v, 1), 2.0);
        let w = with_axis_component(v, 2, 9.0);
        assert_eq!(w, Vec3::new(1.0, 2.0, 9.0));
    }
}
