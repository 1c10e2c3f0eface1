//! # modkit core
//!
//! Foundation types shared by the module runtime and the authoring tool.
//!
//! - [`Host`] : the mutation surface a module drives on its owner
//! - [`Transform`] : the in-crate [`Host`] implementation (local TRS)
//! - [`FrameTime`] : per-frame elapsed time handed to every tick
//! - [`math`] : glam re-exports and small rotation helpers

pub mod host;
pub mod math;
pub mod time;
pub mod transform;

pub use host::Host;
pub use time::FrameTime;
pub use transform::Transform;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
