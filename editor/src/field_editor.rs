//! Generic egui editor for a module's reflected fields.

use modkit_runtime::ModuleControl;
use modkit_runtime::serialize::Value;

use crate::catalog::ModuleCatalog;
use crate::property::SerializedModule;
use crate::settings::EditorSettings;

const INDENT: f32 = 14.0;

/// Draw the editor body for one module.
///
/// Types registered with a custom drawer get the whole body to themselves;
/// everything else goes through [`draw_fields`]. Edits are staged in
/// `module`; the caller decides when to commit them.
pub fn draw_module_editor(
    ui: &mut egui::Ui,
    catalog: &ModuleCatalog,
    settings: &EditorSettings,
    control: &ModuleControl,
    module: &mut SerializedModule,
) {
    match catalog.custom_editor(module.type_name()) {
        Some(draw) => draw(ui, control, module),
        None => {
            draw_fields(ui, settings, module);
        }
    }
}

/// One row per visible property, depth-first, indented by depth.
///
/// Lists and maps are collapsible; their open state lives in egui's
/// temporary memory. Returns `true` if any value was staged this frame.
pub fn draw_fields(ui: &mut egui::Ui, settings: &EditorSettings, module: &mut SerializedModule) -> bool {
    let base = egui::Id::new(("modkit-fields", module.type_name(), module.index()));
    let mut changed = false;
    let mut cursor = module.cursor();
    let mut enter = true;

    while cursor.next_visible(enter) {
        enter = false;
        let is_type = cursor.is_type_field();
        if is_type && !settings.show_type_field {
            continue;
        }
        let depth = cursor.depth();
        let label = cursor.display_name().to_string();

        ui.horizontal(|ui| {
            ui.add_space(depth as f32 * INDENT);
            if cursor.has_children() {
                let id = base.with(cursor.path());
                let mut open = ui.data(|d| d.get_temp::<bool>(id)).unwrap_or(false);
                let icon = if open { "⏷" } else { "⏵" };
                if ui.small_button(icon).clicked() {
                    open = !open;
                    ui.data_mut(|d| d.insert_temp(id, open));
                }
                ui.label(label);
                enter = open;
                return;
            }

            ui.label(label);
            let Some(value) = cursor.value() else {
                return;
            };
            if is_type {
                ui.weak(value.to_string());
                return;
            }
            if let Some(edited) = edit_value(ui, value, settings.drag_speed) {
                match cursor.set_value(edited) {
                    Ok(()) => changed = true,
                    Err(e) => log::warn!("rejected edit of '{}': {e}", cursor.path()),
                }
            }
        });
    }
    changed
}

/// Show a widget for a leaf value. Returns the new value if it was edited.
fn edit_value(ui: &mut egui::Ui, value: &Value, drag_speed: f64) -> Option<Value> {
    let mut value = value.clone();
    let changed = match &mut value {
        Value::Bool(v) => ui.checkbox(v, "").changed(),
        Value::I64(v) => ui.add(egui::DragValue::new(v).speed(drag_speed)).changed(),
        Value::U64(v) => ui.add(egui::DragValue::new(v).speed(drag_speed)).changed(),
        Value::F32(v) => ui.add(egui::DragValue::new(v).speed(drag_speed)).changed(),
        Value::F64(v) => ui.add(egui::DragValue::new(v).speed(drag_speed)).changed(),
        Value::String(v) => ui.text_edit_singleline(v).changed(),
        Value::Null => {
            ui.weak("()");
            false
        }
        Value::List(_) | Value::Map(_) => false,
    };
    changed.then_some(value)
}
