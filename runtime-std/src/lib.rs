//! # modkit sample modules
//!
//! A small family of ready-made modules that drive a host's local transform.
//!
//! ## Modules
//!
//! - [`MoveX`] / [`MoveY`]: ping-pong along one local axis around the
//!   position the host had when the module was attached
//! - [`Rotate`]: constant spin about a local axis, a fixed angle per tick
//!
//! All three belong to [`SAMPLE`], which derives from the root family.
//!
//! ## Controls
//!
//! - [`sample_control`] / [`wake_sample_control`]: build or load a control
//!   that accepts the sample family
//!
//! With the `inspector` feature, [`ui::register_sample_editors`] also
//! registers the modules with an editor catalog, including the custom
//! drawer for [`Rotate`].

mod control;
pub mod modules;
#[cfg(feature = "inspector")]
pub mod ui;

pub use control::{sample_control, wake_sample_control};
pub use modules::{MoveX, MoveY, Rotate, SAMPLE};

use modkit_runtime::ModuleRegistry;

/// Register every sample module type, in a stable order.
pub fn register_sample_modules(registry: &mut ModuleRegistry) {
    registry.register::<MoveX>();
    registry.register::<MoveY>();
    registry.register::<Rotate>();
}
