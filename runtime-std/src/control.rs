use modkit_core::Host;
use modkit_runtime::serialize::{DeserializeError, SerializedControl, decode};
use modkit_runtime::{ModuleControl, ModuleRegistry};

use crate::modules::SAMPLE;

/// An empty control accepting the sample family.
pub fn sample_control() -> ModuleControl {
    ModuleControl::new(&SAMPLE)
}

/// Load a control from RON text and set it up against `host` straight away.
///
/// The persisted family must be the sample family or derive from it.
pub fn wake_sample_control(
    registry: &ModuleRegistry,
    text: &str,
    host: &mut dyn Host,
) -> Result<ModuleControl, DeserializeError> {
    let data: SerializedControl = decode(text)?;
    let mut control = registry.load_control(&data)?;
    if !control.module_family().derives_from(&SAMPLE) {
        return Err(DeserializeError::FamilyMismatch {
            module: String::new(),
            family: control.module_family().name().to_string(),
            expected: SAMPLE.name().to_string(),
        });
    }
    let attached = control.set_up(host);
    log::info!("woke sample control {} ({attached} modules)", control.id());
    Ok(control)
}
