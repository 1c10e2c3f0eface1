//! Editor integration for the sample modules.

use modkit_editor::{CustomEditor, ModuleCatalog, SerializedModule};
use modkit_runtime::{ModuleControl, ModuleType};
use modkit_runtime::serialize::Value;

use crate::modules::{MoveX, MoveY, Rotate};

const AXIS_PRESETS: [(&str, [f32; 3]); 4] = [
    ("X", [1.0, 0.0, 0.0]),
    ("Y", [0.0, 1.0, 0.0]),
    ("Z", [0.0, 0.0, 1.0]),
    ("Diagonal", [1.0, 1.0, 1.0]),
];

/// Register the sample modules with an editor catalog, in the same order as
/// [`register_sample_modules`](crate::register_sample_modules).
pub fn register_sample_editors(catalog: &mut ModuleCatalog) {
    catalog.register::<MoveX>();
    catalog.register::<MoveY>();
    catalog.register_with_editor::<Rotate>();
}

fn stage(module: &mut SerializedModule, path: &str, value: f32) {
    if let Err(e) = module.set_property(path, Value::F32(value)) {
        log::warn!("Rotate editor: {e}");
    }
}

impl CustomEditor for Rotate {
    fn draw_editor(ui: &mut egui::Ui, control: &ModuleControl, module: &mut SerializedModule) {
        let rotates = control
            .iter()
            .filter(|m| m.module_name() == Rotate::NAME)
            .count();
        if rotates > 1 {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                format!("{rotates} Rotate modules on this control; only the last is shown"),
            );
        }

        let mut speed = module
            .find_property("speed")
            .and_then(Value::as_f64)
            .unwrap_or_default() as f32;
        ui.horizontal(|ui| {
            ui.label("Speed");
            if ui
                .add(egui::DragValue::new(&mut speed).speed(0.1).suffix("°/tick"))
                .changed()
            {
                stage(module, "speed", speed);
            }
        });

        let mut axis = [0.0f32; 3];
        for (i, component) in axis.iter_mut().enumerate() {
            *component = module
                .find_property(&format!("axis[{i}]"))
                .and_then(Value::as_f64)
                .unwrap_or_default() as f32;
        }
        ui.horizontal(|ui| {
            ui.label("Axis");
            for (i, label) in ["X", "Y", "Z"].into_iter().enumerate() {
                if ui
                    .add(egui::DragValue::new(&mut axis[i]).speed(0.01).prefix(format!("{label} ")))
                    .changed()
                {
                    stage(module, &format!("axis[{i}]"), axis[i]);
                }
            }
        });
        ui.horizontal(|ui| {
            for (label, preset) in AXIS_PRESETS {
                if ui.small_button(label).clicked() {
                    for (i, value) in preset.into_iter().enumerate() {
                        stage(module, &format!("axis[{i}]"), value);
                    }
                }
            }
        });
        if axis.iter().all(|c| *c == 0.0) {
            ui.weak("A zero axis falls back to Y.");
        }
    }
}
