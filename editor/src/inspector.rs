//! Inspector panel for one [`ModuleDocument`].

use std::collections::HashMap;
use std::sync::Arc;

use modkit_runtime::ControlId;

use crate::catalog::ModuleCatalog;
use crate::document::ModuleDocument;
use crate::field_editor::draw_module_editor;
use crate::property::{PropertyError, SerializedModule};
use crate::resolver::AttachmentResolver;
use crate::settings::EditorSettings;

/// Something the operator asked for while the panel was drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle(&'static str),
    Commit(usize),
    Undo,
    Redo,
}

/// Renders a control's candidate modules, their editors and an undo strip.
///
/// Interactions are collected while drawing and applied afterwards, so the
/// document is never mutated mid-frame.
///
/// ```ignore
/// let mut inspector = ModuleInspector::new(Arc::new(catalog), settings);
/// egui::SidePanel::right("modules").show(ctx, |ui| {
///     inspector.show(ui, &mut doc);
/// });
/// ```
pub struct ModuleInspector {
    catalog: Arc<ModuleCatalog>,
    settings: EditorSettings,
    resolver: Option<AttachmentResolver>,
    control: Option<ControlId>,
    /// Staged snapshots by collection index, valid for `cache_revision`.
    cache: HashMap<usize, SerializedModule>,
    cache_revision: u64,
    last_error: Option<String>,
}

impl ModuleInspector {
    pub fn new(catalog: Arc<ModuleCatalog>, settings: EditorSettings) -> Self {
        Self {
            catalog,
            settings,
            resolver: None,
            control: None,
            cache: HashMap::new(),
            cache_revision: 0,
            last_error: None,
        }
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn resolver(&self) -> Option<&AttachmentResolver> {
        self.resolver.as_ref()
    }

    /// The message from the last failed interaction, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The staged snapshot of the module at `index`, created on demand.
    pub fn snapshot_mut(
        &mut self,
        doc: &ModuleDocument,
        index: usize,
    ) -> Result<&mut SerializedModule, PropertyError> {
        self.prepare(doc);
        if !self.cache.contains_key(&index) {
            let snapshot = SerializedModule::from_control(doc.control(), index)?;
            self.cache.insert(index, snapshot);
        }
        self.cache
            .get_mut(&index)
            .ok_or(PropertyError::UnknownModule { index })
    }

    fn prepare(&mut self, doc: &ModuleDocument) {
        let id = doc.control().id();
        if self.control != Some(id) {
            self.resolver = Some(AttachmentResolver::new(&self.catalog, doc.control()));
            self.control = Some(id);
            self.cache.clear();
            self.cache_revision = doc.revision();
        }
        if self.cache_revision != doc.revision() {
            self.cache.clear();
            self.cache_revision = doc.revision();
        }
        if let Some(resolver) = &mut self.resolver {
            resolver.sync(doc);
        }
    }

    /// Draw the panel and apply whatever the operator did.
    ///
    /// Returns `true` if the document changed.
    pub fn show(&mut self, ui: &mut egui::Ui, doc: &mut ModuleDocument) -> bool {
        self.prepare(doc);
        let mut commands = Vec::new();

        self.draw_header(ui, doc);
        ui.separator();
        self.draw_modules(ui, doc, &mut commands);
        ui.separator();
        draw_history_strip(ui, doc, &mut commands);

        if let Some(err) = &self.last_error {
            ui.colored_label(ui.visuals().error_fg_color, err.as_str());
        }

        let dragging = ui.ctx().dragged_id().is_some();
        let before = doc.revision();
        // Commits address modules by index, so they run before anything that
        // can shift the collection.
        commands.sort_by_key(|command| !matches!(command, Command::Commit(_)));
        for command in commands {
            self.apply(command, doc, dragging);
        }
        doc.revision() != before
    }

    fn draw_header(&self, ui: &mut egui::Ui, doc: &ModuleDocument) {
        let control = doc.control();
        ui.horizontal(|ui| {
            ui.heading(control.module_family().name());
            ui.weak(control.id().to_string());
            if doc.is_modified() {
                ui.label("●").on_hover_text("Unsaved changes");
            }
        });
        ui.weak(format!("{} modules", control.len()));
    }

    fn draw_modules(&mut self, ui: &mut egui::Ui, doc: &ModuleDocument, commands: &mut Vec<Command>) {
        let Self {
            catalog,
            settings,
            resolver,
            cache,
            ..
        } = self;
        let Some(resolver) = resolver else {
            return;
        };

        if resolver.entries().is_empty() {
            ui.label("No module types registered for this family.");
        }

        for info in resolver.entries() {
            ui.horizontal(|ui| {
                let mut attached = info.is_attached();
                let enabled = attached || info.constructible;
                let toggle = ui
                    .add_enabled(enabled, egui::Checkbox::new(&mut attached, info.display_name.as_str()))
                    .on_disabled_hover_text("This module type cannot be created here");
                if toggle.changed() {
                    commands.push(Command::Toggle(info.name));
                }
                if info.custom_editor {
                    ui.weak("custom");
                }
            });

            let Some(index) = info.index else {
                continue;
            };
            if !cache.contains_key(&index) {
                match SerializedModule::from_control(doc.control(), index) {
                    Ok(snapshot) => {
                        cache.insert(index, snapshot);
                    }
                    Err(e) => {
                        ui.colored_label(ui.visuals().error_fg_color, e.to_string());
                        continue;
                    }
                }
            }
            let Some(snapshot) = cache.get_mut(&index) else {
                continue;
            };
            ui.indent(("modkit-module", index), |ui| {
                draw_module_editor(ui, catalog, settings, doc.control(), snapshot);
            });
            if snapshot.is_modified() {
                commands.push(Command::Commit(index));
            }
        }
    }

    fn apply(&mut self, command: Command, doc: &mut ModuleDocument, dragging: bool) {
        let result = match command {
            Command::Toggle(name) => match &mut self.resolver {
                Some(resolver) => resolver
                    .toggle(&self.catalog, doc, name)
                    .map(|_| ())
                    .map_err(|e| e.to_string()),
                None => Ok(()),
            },
            Command::Commit(index) => self.commit(index, doc, dragging),
            Command::Undo => doc.undo().map_err(|e| e.to_string()),
            Command::Redo => doc.redo().map_err(|e| e.to_string()),
        };
        match result {
            Ok(()) => self.last_error = None,
            Err(message) => {
                log::warn!("inspector: {message}");
                self.last_error = Some(message);
            }
        }
    }

    fn commit(&mut self, index: usize, doc: &mut ModuleDocument, dragging: bool) -> Result<(), String> {
        let Some(mut snapshot) = self.cache.remove(&index) else {
            return Ok(());
        };
        let result = snapshot.apply_modified_properties(doc, self.catalog.registry());
        if result.is_err() {
            snapshot.revert();
        }
        self.cache.insert(index, snapshot);
        if !dragging {
            doc.break_merge();
        }
        result.map(|_| ()).map_err(|e| e.to_string())
    }
}

fn draw_history_strip(ui: &mut egui::Ui, doc: &ModuleDocument, commands: &mut Vec<Command>) {
    let history = doc.history();
    ui.horizontal(|ui| {
        let undo = ui.add_enabled(history.can_undo(), egui::Button::new("Undo"));
        let undo = match history.undo_descriptions().next() {
            Some(desc) => undo.on_hover_text(desc),
            None => undo,
        };
        if undo.clicked() {
            commands.push(Command::Undo);
        }

        let redo = ui.add_enabled(history.can_redo(), egui::Button::new("Redo"));
        let redo = match history.redo_descriptions().next() {
            Some(desc) => redo.on_hover_text(desc),
            None => redo,
        };
        if redo.clicked() {
            commands.push(Command::Redo);
        }

        ui.weak(format!("{} / {}", history.undo_count(), history.max_undo()));
    });
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use modkit_runtime::serialize::Value;
    use modkit_runtime::{Module, ModuleControl, ModuleFamily, Reflect};

    static LAMPS: ModuleFamily = ModuleFamily::new("Lamps", &ModuleFamily::ROOT);

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = LAMPS)]
    struct Dimmer {
        level: f32,
        warm: bool,
    }
    impl Module for Dimmer {}

    fn frame(inspector: &mut ModuleInspector, doc: &mut ModuleDocument) -> bool {
        let ctx = egui::Context::default();
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = inspector.show(ui, doc);
            });
        });
        changed
    }

    fn setup() -> (ModuleInspector, ModuleDocument) {
        let mut catalog = ModuleCatalog::new();
        catalog.register::<Dimmer>();
        let mut control = ModuleControl::new(&LAMPS);
        control.push_module(Box::new(Dimmer {
            level: 0.5,
            warm: false,
        }));
        (
            ModuleInspector::new(Arc::new(catalog), EditorSettings::default()),
            ModuleDocument::new(control, 10),
        )
    }

    #[test]
    fn idle_frame_changes_nothing() {
        let (mut inspector, mut doc) = setup();
        assert!(!frame(&mut inspector, &mut doc));
        assert!(!doc.is_modified());
        assert_eq!(inspector.resolver().unwrap().entry("Dimmer").unwrap().index, Some(0));
    }

    #[test]
    fn staged_edits_commit_as_one_step() {
        let (mut inspector, mut doc) = setup();
        let snapshot = inspector.snapshot_mut(&doc, 0).unwrap();
        snapshot.set_property("level", Value::F32(0.9)).unwrap();
        snapshot.set_property("warm", Value::Bool(true)).unwrap();

        assert!(frame(&mut inspector, &mut doc));
        let dimmer = doc.control().find::<Dimmer>().unwrap();
        assert_eq!(dimmer.level, 0.9);
        assert!(dimmer.warm);
        assert_eq!(doc.history().undo_count(), 1);
        assert!(inspector.last_error().is_none());

        doc.undo().unwrap();
        assert_eq!(doc.control().find::<Dimmer>().unwrap().level, 0.5);
        assert!(!frame(&mut inspector, &mut doc));
    }
}
