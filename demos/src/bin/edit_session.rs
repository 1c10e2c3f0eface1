//! Edit Session Demo
//!
//! Drives the authoring tools without a window: attaches and detaches sample
//! modules through the attachment resolver, stages field edits, undoes and
//! redoes, then writes the control to RON.
//!
//! Usage: `edit_session [output.ron] [editor.toml]`

use std::path::PathBuf;
use std::process::ExitCode;

use modkit_demos::init_logging;
use modkit_editor::{
    AttachmentResolver, ModuleCatalog, ModuleDocument, SerializedModule, settings,
};
use modkit_runtime::serialize::{Format, Value};
use modkit_std::sample_control;
use modkit_std::ui::register_sample_editors;

fn main() -> ExitCode {
    init_logging();

    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map_or_else(|| std::env::temp_dir().join("modkit_session.ron"), PathBuf::from);
    let settings_path = args
        .next()
        .map_or_else(|| PathBuf::from("demos/data/editor.toml"), PathBuf::from);
    let settings = settings::load_or_default(&settings_path);

    let mut catalog = ModuleCatalog::new();
    register_sample_editors(&mut catalog);
    catalog.apply_settings(&settings);

    match run(&catalog, settings.max_undo, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Edit session failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    catalog: &ModuleCatalog,
    max_undo: usize,
    output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = ModuleDocument::new(sample_control(), max_undo);
    let mut resolver = AttachmentResolver::new(catalog, doc.control());

    for info in resolver.entries() {
        log::info!(
            "candidate {:<8} \"{}\"{}",
            info.name,
            info.display_name,
            if info.custom_editor { " (custom editor)" } else { "" }
        );
    }

    for name in ["MoveX", "MoveY", "Rotate"] {
        resolver.toggle(catalog, &mut doc, name)?;
    }
    log_order("attached all", &doc);

    resolver.toggle(catalog, &mut doc, "MoveY")?;
    log_order("detached MoveY", &doc);
    resolver.toggle(catalog, &mut doc, "MoveY")?;
    log_order("re-attached MoveY at the tail", &doc);

    if let Some(index) = resolver.entry("Rotate").and_then(|info| info.index) {
        let mut snapshot = SerializedModule::from_control(doc.control(), index)?;
        snapshot.set_property("speed", Value::F32(4.5))?;
        snapshot.set_property("axis[0]", Value::F32(0.0))?;
        snapshot.set_property("axis[2]", Value::F32(0.0))?;
        snapshot.apply_modified_properties(&mut doc, catalog.registry())?;
        log::info!("edited Rotate: speed 4.5 about +Y");
    }
    if let Some(index) = resolver.entry("MoveX").and_then(|info| info.index) {
        let mut snapshot = SerializedModule::from_control(doc.control(), index)?;
        snapshot.set_property("amplitude", Value::F32(3.0))?;
        snapshot.apply_modified_properties(&mut doc, catalog.registry())?;
    }

    doc.undo()?;
    resolver.sync(&doc);
    log::info!(
        "undo -> MoveX amplitude back to default; redo available: {}",
        doc.history().can_redo()
    );
    doc.redo()?;
    resolver.sync(&doc);

    for desc in doc.history().undo_descriptions() {
        log::info!("history: {desc}");
    }

    log::info!("\n{}", doc.save_to_string(Format::Ron)?);
    doc.save(output)?;
    log::info!(
        "wrote {} (modified after save: {})",
        output.display(),
        doc.is_modified()
    );
    Ok(())
}

fn log_order(step: &str, doc: &ModuleDocument) {
    let names: Vec<_> = doc.control().iter().map(|m| m.module_name()).collect();
    log::info!("{step}: [{}]", names.join(", "));
}
