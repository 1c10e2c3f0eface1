//! Sample module types.

mod oscillate;
mod rotate;

pub use oscillate::{MoveX, MoveY};
pub use rotate::Rotate;

use modkit_runtime::ModuleFamily;

/// Base family of the sample modules.
pub static SAMPLE: ModuleFamily = ModuleFamily::new("Sample", &ModuleFamily::ROOT);
