//! Modules and the slots that bind them to their owner.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use modkit_core::{FrameTime, Host};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::family::ModuleFamily;
use crate::reflect::Reflect;
use crate::serialize::{DeserializeError, Value, from_value};

/// Identity of a [`ModuleControl`](crate::ModuleControl).
///
/// Slots store this instead of a pointer to their owner: a plain,
/// non-owning handle that is unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(u64);

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

impl ControlId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// Passed to module hooks. Gives access to the owner's host surface.
pub struct ModuleContext<'a> {
    owner: ControlId,
    host: &'a mut dyn Host,
    time: FrameTime,
}

impl<'a> ModuleContext<'a> {
    pub fn new(owner: ControlId, host: &'a mut dyn Host, time: FrameTime) -> Self {
        Self { owner, host, time }
    }

    pub fn owner(&self) -> ControlId {
        self.owner
    }

    pub fn host(&mut self) -> &mut dyn Host {
        &mut *self.host
    }

    pub fn host_ref(&self) -> &dyn Host {
        &*self.host
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn delta_seconds(&self) -> f32 {
        self.time.delta_seconds
    }
}

/// An attachable behavior unit.
///
/// Both hooks default to no-ops. `on_attach` runs once when the module is
/// bound to a control; `on_tick` runs every frame while it stays bound.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Serialize, Deserialize, Reflect)]
/// #[module(family = ModuleFamily::ROOT)]
/// struct Drift {
///     speed: f32,
/// }
///
/// impl Module for Drift {
///     fn on_tick(&mut self, cx: &mut ModuleContext<'_>) {
///         let step = Vec3::X * self.speed * cx.delta_seconds();
///         cx.host().translate(step);
///     }
/// }
/// ```
pub trait Module: Reflect {
    /// Called when the module is attached to an owner.
    fn on_attach(&mut self, _cx: &mut ModuleContext<'_>) {}

    /// Called once per tick while attached.
    fn on_tick(&mut self, _cx: &mut ModuleContext<'_>) {}
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.module_name()).finish_non_exhaustive()
    }
}

/// Static information about a concrete module type.
///
/// `#[derive(Reflect)]` with `#[module(family = ...)]` implements this.
pub trait ModuleType: Module + Serialize + DeserializeOwned + Sized {
    /// Registered type name, also written into persisted records.
    const NAME: &'static str;

    /// The family this type belongs to.
    fn family() -> &'static ModuleFamily;

    /// Rebuild an instance from its persisted field map.
    fn from_value(value: Value) -> Result<Self, DeserializeError> {
        from_value(value).map_err(|err| match err {
            DeserializeError::MissingField { field, .. } => DeserializeError::MissingField {
                field,
                module: Self::NAME.to_string(),
            },
            other => other,
        })
    }
}

/// A module together with its back-reference to the owning control.
///
/// A slot is either unattached (`owner()` is `None`, ticks do nothing) or
/// attached to exactly one control.
pub struct ModuleSlot {
    owner: Option<ControlId>,
    module: Box<dyn Module>,
}

impl ModuleSlot {
    /// Wrap a module in an unattached slot.
    pub fn new(module: Box<dyn Module>) -> Self {
        Self {
            owner: None,
            module,
        }
    }

    pub fn from_module<T: Module>(module: T) -> Self {
        Self::new(Box::new(module))
    }

    pub fn owner(&self) -> Option<ControlId> {
        self.owner
    }

    pub fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    /// Bind the slot to `owner` and run the module's `on_attach` hook.
    ///
    /// Returns `false` without running the hook when the slot is already
    /// bound to `owner`. Binding to a different owner re-points the slot and
    /// runs the hook again; there is no detach hook.
    pub fn attach(&mut self, owner: ControlId, host: &mut dyn Host) -> bool {
        if self.owner == Some(owner) {
            return false;
        }
        if let Some(previous) = self.owner {
            log::debug!(
                "re-pointing {} from {previous} to {owner}",
                self.module.module_name()
            );
        }
        self.owner = Some(owner);
        let mut cx = ModuleContext::new(owner, host, FrameTime::from_delta(0.0));
        self.module.on_attach(&mut cx);
        true
    }

    /// Run the module's `on_tick` hook if the slot is attached.
    pub fn update_from_owner(&mut self, host: &mut dyn Host, time: FrameTime) {
        let Some(owner) = self.owner else {
            return;
        };
        let mut cx = ModuleContext::new(owner, host, time);
        self.module.on_tick(&mut cx);
    }

    /// Drop the back-reference. The module becomes inert until re-attached.
    pub fn detach(&mut self) {
        self.owner = None;
    }

    pub fn module(&self) -> &dyn Module {
        &*self.module
    }

    pub fn module_mut(&mut self) -> &mut dyn Module {
        &mut *self.module
    }

    pub fn into_module(self) -> Box<dyn Module> {
        self.module
    }

    pub fn module_name(&self) -> &'static str {
        self.module.module_name()
    }

    /// Runtime type of the contained module.
    pub fn module_type_id(&self) -> TypeId {
        self.module.as_any().type_id()
    }

    pub fn is<T: Module>(&self) -> bool {
        self.module_type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Module>(&self) -> Option<&T> {
        self.module.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Module>(&mut self) -> Option<&mut T> {
        self.module.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn replace_module(&mut self, module: Box<dyn Module>) -> Box<dyn Module> {
        self.owner = None;
        std::mem::replace(&mut self.module, module)
    }
}

impl fmt::Debug for ModuleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSlot")
            .field("module", &self.module.module_name())
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;
    use modkit_core::Transform;
    use modkit_core::math::Vec3;
    use serde::Deserialize;

    #[derive(Default, Serialize, Deserialize, Reflect)]
    #[module(family = ModuleFamily::ROOT)]
    struct Counter {
        step: u32,
        #[serde(skip)]
        _attached: u32,
        #[serde(skip)]
        _ticks: u32,
    }

    impl Module for Counter {
        fn on_attach(&mut self, _cx: &mut ModuleContext<'_>) {
            self._attached += 1;
        }

        fn on_tick(&mut self, cx: &mut ModuleContext<'_>) {
            self._ticks += self.step;
            cx.host().translate(Vec3::X);
        }
    }

    #[test]
    fn unattached_tick_is_noop() {
        let mut host = Transform::IDENTITY;
        let mut slot = ModuleSlot::from_module(Counter {
            step: 1,
            ..Default::default()
        });
        slot.update_from_owner(&mut host, FrameTime::default());
        assert!(!slot.is_attached());
        assert_eq!(slot.downcast_ref::<Counter>().unwrap()._ticks, 0);
        assert_eq!(host, Transform::IDENTITY);
    }

    #[test]
    fn attach_records_owner_and_fires_hook_once() {
        let mut host = Transform::IDENTITY;
        let owner = ControlId::next();
        let mut slot = ModuleSlot::from_module(Counter::default());

        assert!(slot.attach(owner, &mut host));
        assert!(!slot.attach(owner, &mut host));
        assert_eq!(slot.owner(), Some(owner));
        assert_eq!(slot.downcast_ref::<Counter>().unwrap()._attached, 1);
    }

    #[test]
    fn attach_to_other_owner_repoints() {
        let mut host = Transform::IDENTITY;
        let first = ControlId::next();
        let second = ControlId::next();
        let mut slot = ModuleSlot::from_module(Counter::default());

        slot.attach(first, &mut host);
        assert!(slot.attach(second, &mut host));
        assert_eq!(slot.owner(), Some(second));
        assert_eq!(slot.downcast_ref::<Counter>().unwrap()._attached, 2);
    }

    #[test]
    fn attached_tick_runs_hook() {
        let mut host = Transform::IDENTITY;
        let mut slot = ModuleSlot::from_module(Counter {
            step: 2,
            ..Default::default()
        });
        slot.attach(ControlId::next(), &mut host);
        slot.update_from_owner(&mut host, FrameTime::default());
        slot.update_from_owner(&mut host, FrameTime::default());

        assert_eq!(slot.downcast_ref::<Counter>().unwrap()._ticks, 4);
        assert_eq!(host.translation, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn detach_makes_slot_inert() {
        let mut host = Transform::IDENTITY;
        let mut slot = ModuleSlot::from_module(Counter {
            step: 1,
            ..Default::default()
        });
        slot.attach(ControlId::next(), &mut host);
        slot.detach();
        slot.update_from_owner(&mut host, FrameTime::default());
        assert_eq!(slot.downcast_ref::<Counter>().unwrap()._ticks, 0);
    }

    #[test]
    fn control_ids_are_unique() {
        let a = ControlId::next();
        let b = ControlId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn slot_reports_concrete_type() {
        let slot = ModuleSlot::from_module(Counter::default());
        assert!(slot.is::<Counter>());
        assert_eq!(slot.module_type_id(), TypeId::of::<Counter>());
        assert_eq!(slot.module_name(), "Counter");
    }
}
