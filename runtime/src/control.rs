//! The composition root.

use std::any::TypeId;
use std::fmt;

use modkit_core::{FrameTime, Host};

use crate::family::ModuleFamily;
use crate::module::{ControlId, Module, ModuleSlot};
use crate::serialize::{SerializeError, SerializedControl, SerializedModuleRecord};

/// The control's own per-tick behavior, run before any module.
pub trait ControlHook: Send + Sync + 'static {
    fn on_update(&mut self, _host: &mut dyn Host, _time: FrameTime) {}
}

/// Owns an ordered collection of modules and drives them.
///
/// Collection order is tick order. A control declares a [`ModuleFamily`];
/// editors only offer module types from that family, the control itself does
/// not police what is pushed into it.
pub struct ModuleControl {
    id: ControlId,
    family: &'static ModuleFamily,
    slots: Vec<ModuleSlot>,
    hook: Option<Box<dyn ControlHook>>,
    is_set_up: bool,
}

impl ModuleControl {
    /// An empty control accepting modules of `family`.
    pub fn new(family: &'static ModuleFamily) -> Self {
        Self {
            id: ControlId::next(),
            family,
            slots: Vec::new(),
            hook: None,
            is_set_up: false,
        }
    }

    pub fn with_hook(family: &'static ModuleFamily, hook: impl ControlHook) -> Self {
        let mut control = Self::new(family);
        control.hook = Some(Box::new(hook));
        control
    }

    pub fn set_hook(&mut self, hook: impl ControlHook) {
        self.hook = Some(Box::new(hook));
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    /// The declared base family. Only used for discovery by tooling.
    pub fn module_family(&self) -> &'static ModuleFamily {
        self.family
    }

    pub fn is_set_up(&self) -> bool {
        self.is_set_up
    }

    // -- lifecycle --

    /// Attach every module, in collection order, to this control.
    ///
    /// Slots already attached to this control are skipped, so calling this
    /// again only wires up modules added since the last call. Returns the
    /// number of modules whose `on_attach` ran.
    pub fn set_up(&mut self, host: &mut dyn Host) -> usize {
        if self.is_set_up {
            log::debug!("{} already set up; attaching new modules only", self.id);
        }
        let mut attached = 0;
        for slot in &mut self.slots {
            if slot.attach(self.id, host) {
                attached += 1;
            }
        }
        self.is_set_up = true;
        log::debug!(
            "{} set up: {attached} of {} modules attached",
            self.id,
            self.slots.len()
        );
        attached
    }

    /// Run the control hook, then every module in collection order.
    pub fn tick(&mut self, host: &mut dyn Host, time: FrameTime) {
        if let Some(hook) = &mut self.hook {
            hook.on_update(host, time);
        }
        for slot in &mut self.slots {
            slot.update_from_owner(host, time);
        }
    }

    // -- typed lookup --

    /// The first module whose runtime type is exactly `T`.
    pub fn find<T: Module>(&self) -> Option<&T> {
        self.slots.iter().find_map(ModuleSlot::downcast_ref::<T>)
    }

    pub fn find_mut<T: Module>(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find_map(ModuleSlot::downcast_mut::<T>)
    }

    /// Same as [`find`](Self::find).
    pub fn try_get_module<T: Module>(&self) -> Option<&T> {
        self.find::<T>()
    }

    pub fn contains<T: Module>(&self) -> bool {
        self.index_of::<T>().is_some()
    }

    /// Position of the first module of type `T`.
    pub fn index_of<T: Module>(&self) -> Option<usize> {
        self.index_of_type(TypeId::of::<T>())
    }

    pub fn index_of_type(&self, type_id: TypeId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.module_type_id() == type_id)
    }

    // -- collection access --

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ModuleSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&ModuleSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut ModuleSlot> {
        self.slots.get_mut(index)
    }

    /// Modules in tick order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Module> {
        self.slots.iter().map(ModuleSlot::module)
    }

    // -- mutation --

    /// Append an unattached module. Returns its index.
    pub fn push_module(&mut self, module: Box<dyn Module>) -> usize {
        self.slots.push(ModuleSlot::new(module));
        self.slots.len() - 1
    }

    /// Append a module and attach it right away.
    pub fn push_module_attached(&mut self, module: Box<dyn Module>, host: &mut dyn Host) -> usize {
        let index = self.push_module(module);
        self.slots[index].attach(self.id, host);
        index
    }

    /// Insert an unattached module at `index`, shifting later modules.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_module(&mut self, index: usize, module: Box<dyn Module>) {
        self.slots.insert(index, ModuleSlot::new(module));
    }

    /// Remove the module at `index`, shifting later modules down.
    pub fn remove_module(&mut self, index: usize) -> Option<Box<dyn Module>> {
        if index >= self.slots.len() {
            return None;
        }
        let slot = self.slots.remove(index);
        log::debug!("{}: removed {} at {index}", self.id, slot.module_name());
        Some(slot.into_module())
    }

    /// Swap the module at `index` for `module`, keeping its position.
    ///
    /// The new module starts unattached. Hands `module` back when `index` is
    /// out of range.
    pub fn replace_module(
        &mut self,
        index: usize,
        module: Box<dyn Module>,
    ) -> Result<Box<dyn Module>, Box<dyn Module>> {
        match self.slots.get_mut(index) {
            Some(slot) => Ok(slot.replace_module(module)),
            None => Err(module),
        }
    }

    // -- persistence --

    /// Serialize every module, in collection order.
    pub fn save(&self) -> Result<SerializedControl, SerializeError> {
        let modules = self
            .slots
            .iter()
            .map(|slot| {
                let module = slot.module();
                Ok(SerializedModuleRecord {
                    type_name: module.module_name().to_string(),
                    data: module.to_value()?,
                })
            })
            .collect::<Result<Vec<_>, SerializeError>>()?;
        Ok(SerializedControl {
            family: self.family.name().to_string(),
            modules,
        })
    }
}

impl fmt::Debug for ModuleControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleControl")
            .field("id", &self.id)
            .field("family", &self.family.name())
            .field("slots", &self.slots)
            .field("has_hook", &self.hook.is_some())
            .field("is_set_up", &self.is_set_up)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use modkit_core::Transform;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{ModuleContext, Reflect};

    type Journal = Arc<Mutex<Vec<String>>>;

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = ModuleFamily::ROOT)]
    struct Probe {
        tag: String,
        #[serde(skip)]
        _journal: Journal,
    }

    impl Probe {
        fn boxed(tag: &str, journal: &Journal) -> Box<dyn Module> {
            Box::new(Probe {
                tag: tag.to_string(),
                _journal: journal.clone(),
            })
        }
    }

    impl Module for Probe {
        fn on_attach(&mut self, cx: &mut ModuleContext<'_>) {
            self._journal
                .lock()
                .unwrap()
                .push(format!("attach {} to {}", self.tag, cx.owner().raw()));
        }

        fn on_tick(&mut self, _cx: &mut ModuleContext<'_>) {
            self._journal.lock().unwrap().push(format!("tick {}", self.tag));
        }
    }

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = ModuleFamily::ROOT)]
    struct Other {
        weight: f32,
    }

    impl Module for Other {}

    struct JournalHook(Journal);

    impl ControlHook for JournalHook {
        fn on_update(&mut self, _host: &mut dyn Host, _time: FrameTime) {
            self.0.lock().unwrap().push("hook".to_string());
        }
    }

    fn entries(journal: &Journal) -> Vec<String> {
        std::mem::take(&mut *journal.lock().unwrap())
    }

    #[test]
    fn find_on_empty_control_is_none() {
        let control = ModuleControl::new(&ModuleFamily::ROOT);
        assert!(control.find::<Probe>().is_none());
        assert!(control.try_get_module::<Probe>().is_none());
        assert_eq!(control.index_of::<Probe>(), None);
    }

    #[test]
    fn find_returns_first_exact_match() {
        let journal = Journal::default();
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Box::new(Other { weight: 1.0 }));
        control.push_module(Probe::boxed("first", &journal));
        control.push_module(Probe::boxed("second", &journal));

        assert_eq!(control.find::<Probe>().unwrap().tag, "first");
        assert_eq!(control.index_of::<Probe>(), Some(1));
        assert_eq!(control.find::<Other>().unwrap().weight, 1.0);

        control.find_mut::<Probe>().unwrap().tag = "edited".into();
        assert_eq!(control.slots()[1].downcast_ref::<Probe>().unwrap().tag, "edited");
    }

    #[test]
    fn set_up_attaches_every_module_in_order() {
        let journal = Journal::default();
        let mut host = Transform::IDENTITY;
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Probe::boxed("a", &journal));
        control.push_module(Probe::boxed("b", &journal));

        assert_eq!(control.set_up(&mut host), 2);
        let id = control.id().raw();
        assert_eq!(
            entries(&journal),
            [format!("attach a to {id}"), format!("attach b to {id}")]
        );
        assert!(control.slots().iter().all(|slot| slot.owner() == Some(control.id())));
    }

    #[test]
    fn set_up_is_single_fire_per_module() {
        let journal = Journal::default();
        let mut host = Transform::IDENTITY;
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Probe::boxed("a", &journal));
        control.set_up(&mut host);
        entries(&journal);

        control.push_module(Probe::boxed("late", &journal));
        assert_eq!(control.set_up(&mut host), 1);
        assert_eq!(entries(&journal), [format!("attach late to {}", control.id().raw())]);
    }

    #[test]
    fn tick_runs_hook_then_modules_in_order() {
        let journal = Journal::default();
        let mut host = Transform::IDENTITY;
        let mut control =
            ModuleControl::with_hook(&ModuleFamily::ROOT, JournalHook(journal.clone()));
        control.push_module(Probe::boxed("a", &journal));
        control.push_module(Probe::boxed("b", &journal));
        control.push_module(Probe::boxed("c", &journal));
        control.set_up(&mut host);
        entries(&journal);

        control.tick(&mut host, FrameTime::default());
        assert_eq!(entries(&journal), ["hook", "tick a", "tick b", "tick c"]);
    }

    #[test]
    fn tick_before_set_up_only_runs_hook() {
        let journal = Journal::default();
        let mut host = Transform::IDENTITY;
        let mut control =
            ModuleControl::with_hook(&ModuleFamily::ROOT, JournalHook(journal.clone()));
        control.push_module(Probe::boxed("a", &journal));

        control.tick(&mut host, FrameTime::default());
        assert_eq!(entries(&journal), ["hook"]);
    }

    #[test]
    fn remove_shifts_later_modules() {
        let journal = Journal::default();
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Probe::boxed("a", &journal));
        control.push_module(Box::new(Other::default()));
        control.push_module(Probe::boxed("c", &journal));

        let removed = control.remove_module(0).unwrap();
        assert_eq!(removed.module_name(), "Probe");
        assert_eq!(control.index_of::<Other>(), Some(0));
        assert_eq!(control.find::<Probe>().unwrap().tag, "c");
        assert!(control.remove_module(5).is_none());
    }

    #[test]
    fn replace_keeps_position_and_detaches() {
        let journal = Journal::default();
        let mut host = Transform::IDENTITY;
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Probe::boxed("a", &journal));
        control.push_module(Box::new(Other::default()));
        control.set_up(&mut host);

        let old = control
            .replace_module(1, Box::new(Other { weight: 3.0 }))
            .unwrap();
        assert_eq!(old.module_name(), "Other");
        assert_eq!(control.find::<Other>().unwrap().weight, 3.0);
        assert!(!control.slots()[1].is_attached());
        assert!(control.replace_module(9, Box::new(Other::default())).is_err());
    }

    #[test]
    fn save_keeps_order_and_skips_runtime_state() {
        let journal = Journal::default();
        let mut control = ModuleControl::new(&ModuleFamily::ROOT);
        control.push_module(Box::new(Other { weight: 2.0 }));
        control.push_module(Probe::boxed("p", &journal));

        let saved = control.save().unwrap();
        assert_eq!(saved.family, "Module");
        assert_eq!(saved.type_names().collect::<Vec<_>>(), ["Other", "Probe"]);
        assert!(saved.modules[1].data.get("_journal").is_none());
        assert_eq!(
            saved.modules[1].data.get("tag").and_then(|v| v.as_str()),
            Some("p")
        );
    }
}
