//! # modkit demos
//!
//! Headless binaries exercising the runtime and the authoring tools.
//!
//! ## Available Demos
//!
//! - `tick_demo` - load a control from RON, set it up against a transform and
//!   log the motion the sample modules produce
//! - `edit_session` - scripted attach/detach/edit session with undo, saved
//!   back to RON

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for `tick_demo`, loaded from `demo.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// RON file holding the control to load.
    pub control: PathBuf,
    pub ticks: u32,
    pub delta_seconds: f32,
    /// Log the host transform every this many ticks (0 = only at the end).
    pub log_every: u32,
    /// Initial local position of the host.
    pub start: [f32; 3],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            control: PathBuf::from("demos/data/sample_control.ron"),
            ticks: 120,
            delta_seconds: 1.0 / 60.0,
            log_every: 30,
            start: [0.0; 3],
        }
    }
}

/// Load a demo config from a TOML file.
pub fn load_config(path: &Path) -> Result<DemoConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Load a demo config, falling back to defaults if the file is missing.
pub fn load_or_default(path: &Path) -> DemoConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!("Loaded demo config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("No demo config ({e}), using defaults");
            DemoConfig::default()
        }
    }
}

/// Initialise logging the way every demo binary does.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
