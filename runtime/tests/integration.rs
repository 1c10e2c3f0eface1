//! End-to-end checks across controls, the registry, and RON persistence.

use modkit_core::math::{EPSILON, Vec3};
use modkit_runtime::serialize::{DeserializeError, Format, SerializedControl, decode, encode};
use modkit_runtime::{
    ControlHook, FrameTime, Host, Module, ModuleContext, ModuleControl, ModuleFamily,
    ModuleRegistry, ModuleType, Reflect, Transform,
};
use serde::{Deserialize, Serialize};

static MOTION: ModuleFamily = ModuleFamily::new("Motion", &ModuleFamily::ROOT);
static LINEAR: ModuleFamily = ModuleFamily::new("Linear", &MOTION);

#[derive(Default, Serialize, Deserialize, Reflect)]
#[module(family = LINEAR)]
#[serde(default)]
struct Push {
    velocity: Vec3,
    #[serde(skip)]
    _frames: u64,
}

impl Module for Push {
    fn on_tick(&mut self, cx: &mut ModuleContext<'_>) {
        self._frames = cx.time().frame;
        let step = self.velocity * cx.delta_seconds();
        cx.host().translate(step);
    }
}

#[derive(Default, Serialize, Deserialize, Reflect)]
#[module(family = MOTION)]
struct Anchor {
    home: Vec3,
    #[serde(skip)]
    _attached: bool,
}

impl Module for Anchor {
    fn on_attach(&mut self, cx: &mut ModuleContext<'_>) {
        self._attached = true;
        cx.host().set_local_position(self.home);
    }
}

/// Doubles every position the modules produced on the previous frame.
struct Doubler;

impl ControlHook for Doubler {
    fn on_update(&mut self, host: &mut dyn Host, _time: FrameTime) {
        let p = host.local_position();
        host.set_local_position(p * 2.0);
    }
}

fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register::<Anchor>();
    registry.register::<Push>();
    registry
}

fn motion_control() -> ModuleControl {
    let mut control = ModuleControl::new(&MOTION);
    control.push_module(Box::new(Anchor {
        home: Vec3::new(0.0, 1.0, 0.0),
        ..Default::default()
    }));
    control.push_module(Box::new(Push {
        velocity: Vec3::new(2.0, 0.0, 0.0),
        ..Default::default()
    }));
    control
}

#[test]
fn set_up_then_tick_drives_host() {
    let mut host = Transform::IDENTITY;
    let mut control = motion_control();

    control.set_up(&mut host);
    assert_eq!(host.translation, Vec3::new(0.0, 1.0, 0.0));
    assert!(control.find::<Anchor>().is_some_and(|a| a._attached));

    let mut time = FrameTime::from_delta(0.5);
    for _ in 0..4 {
        control.tick(&mut host, time);
        time = time.next();
    }
    assert!((host.translation.x - 4.0).abs() < EPSILON);
    assert_eq!(control.find::<Push>().map(|p| p._frames), Some(3));
}

#[test]
fn hook_runs_before_modules() {
    let mut host = Transform::from_xyz(1.0, 0.0, 0.0);
    let mut control = ModuleControl::with_hook(&MOTION, Doubler);
    control.push_module(Box::new(Push {
        velocity: Vec3::X,
        ..Default::default()
    }));
    control.set_up(&mut host);

    control.tick(&mut host, FrameTime::from_delta(1.0));
    // doubled first (1 -> 2), then pushed (2 -> 3)
    assert_eq!(host.translation.x, 3.0);
}

#[test]
fn ron_round_trip_preserves_order_and_values() {
    let control = motion_control();
    let text = encode(&control.save().unwrap(), Format::Ron).unwrap();
    assert!(text.contains("Anchor"));
    assert!(!text.contains("_attached"));

    let saved: SerializedControl = decode(&text).unwrap();
    let loaded = registry().load_control(&saved).unwrap();

    let names: Vec<_> = loaded.iter().map(|m| m.module_name()).collect();
    assert_eq!(names, [Anchor::NAME, Push::NAME]);
    assert_eq!(loaded.module_family().name(), "Motion");
    assert_eq!(
        loaded.find::<Push>().map(|p| p.velocity),
        Some(Vec3::new(2.0, 0.0, 0.0))
    );
    assert!(loaded.slots().iter().all(|slot| !slot.is_attached()));
}

#[test]
fn hand_written_ron_loads_with_defaults() {
    let text = r#"(
        family: "Motion",
        modules: [
            (type_name: "Push", data: {}),
            (type_name: "Anchor", data: {"home": [1.0, 2.0, 3.0]}),
        ],
    )"#;
    let saved: SerializedControl = decode(text).unwrap();
    let loaded = registry().load_control(&saved).unwrap();

    assert_eq!(loaded.index_of::<Push>(), Some(0));
    assert_eq!(loaded.find::<Push>().map(|p| p.velocity), Some(Vec3::ZERO));
    assert_eq!(
        loaded.find::<Anchor>().map(|a| a.home),
        Some(Vec3::new(1.0, 2.0, 3.0))
    );
}

#[test]
fn unknown_record_fails_cleanly() {
    let text = r#"(family: "Motion", modules: [(type_name: "Teleport", data: {})])"#;
    let saved: SerializedControl = decode(text).unwrap();
    let result = registry().load_control(&saved);
    assert!(matches!(
        result,
        Err(DeserializeError::UnknownModule { ref type_name }) if type_name == "Teleport"
    ));
}

#[test]
fn narrower_family_rejects_broader_modules() {
    let mut control = ModuleControl::new(&LINEAR);
    control.push_module(Box::new(Anchor::default()));
    let saved = control.save().unwrap();

    assert!(matches!(
        registry().load_control(&saved),
        Err(DeserializeError::FamilyMismatch { .. })
    ));
}

#[test]
fn lookup_on_empty_control_never_panics() {
    let control = ModuleControl::new(&MOTION);
    assert!(control.find::<Push>().is_none());
    assert!(control.try_get_module::<Anchor>().is_none());
    assert!(control.is_empty());
}
