//! Tick Demo
//!
//! Loads a control from RON, wakes it against a transform and ticks it,
//! logging where the sample modules move the host.
//!
//! Usage: `tick_demo [demo.toml]`

use std::path::PathBuf;
use std::process::ExitCode;

use modkit_demos::{init_logging, load_or_default};
use modkit_runtime::math::Vec3;
use modkit_runtime::{FrameTime, Host, ModuleRegistry, Transform};
use modkit_std::{register_sample_modules, wake_sample_control};

fn main() -> ExitCode {
    init_logging();
    log::info!("modkit tick demo v{}", modkit_demos::VERSION);

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("demos/data/demo.toml"), PathBuf::from);
    let config = load_or_default(&config_path);

    let mut registry = ModuleRegistry::new();
    register_sample_modules(&mut registry);

    let text = match std::fs::read_to_string(&config.control) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to read {}: {e}", config.control.display());
            return ExitCode::FAILURE;
        }
    };

    let [x, y, z] = config.start;
    let mut host = Transform::from_xyz(x, y, z);
    let mut control = match wake_sample_control(&registry, &text, &mut host) {
        Ok(control) => control,
        Err(e) => {
            log::error!("Failed to load {}: {e}", config.control.display());
            return ExitCode::FAILURE;
        }
    };

    let names: Vec<_> = control.iter().map(|m| m.module_name()).collect();
    log::info!("{} modules in tick order: {}", control.len(), names.join(", "));

    let mut time = FrameTime::from_delta(config.delta_seconds);
    for tick in 1..=config.ticks {
        control.tick(&mut host, time);
        time = time.next();
        if config.log_every > 0 && tick % config.log_every == 0 {
            report(tick, &host);
        }
    }
    report(config.ticks, &host);
    ExitCode::SUCCESS
}

fn report(tick: u32, host: &Transform) {
    let p = host.local_position();
    let (axis, angle) = host.local_rotation().to_axis_angle();
    let axis = if angle.abs() < f32::EPSILON { Vec3::ZERO } else { axis };
    log::info!(
        "tick {tick:>4}: position ({:>6.3}, {:>6.3}, {:>6.3})  rotation {:>7.2}° about ({:.2}, {:.2}, {:.2})",
        p.x,
        p.y,
        p.z,
        angle.to_degrees(),
        axis.x,
        axis.y,
        axis.z
    );
}
