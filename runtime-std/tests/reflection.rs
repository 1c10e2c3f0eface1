use modkit_runtime::serialize::{Format, Value, decode, encode};
use modkit_runtime::{FieldKind, ModuleFamily, ModuleRegistry, ModuleType, Reflect};
use modkit_std::{MoveX, MoveY, Rotate, SAMPLE, register_sample_modules, sample_control};

#[test]
fn runtime_state_is_not_reflected() {
    let module = MoveX::new(1.5);
    let names: Vec<_> = module.field_infos().iter().map(|f| f.name).collect();
    assert_eq!(names, ["amplitude"]);
    assert_eq!(module.field_infos()[0].kind, FieldKind::F32);

    let value = module.to_value().unwrap();
    assert_eq!(value, Value::Map(vec![("amplitude".into(), Value::F32(1.5))]));
}

#[test]
fn rotate_exposes_speed_and_axis() {
    let module = Rotate::new(10.0);
    let infos = module.field_infos();
    let fields: Vec<_> = infos.iter().map(|f| (f.name, f.kind)).collect();
    assert_eq!(fields, [("speed", FieldKind::F32), ("axis", FieldKind::Vec3)]);
    assert_eq!(infos[1].display_name(), "Axis");
    assert_eq!(module.to_value().unwrap().get("speed"), Some(&Value::F32(10.0)));
}

#[test]
fn sample_family_and_registration_order() {
    assert_eq!(MoveY::family(), &SAMPLE);
    assert!(SAMPLE.derives_from(&ModuleFamily::ROOT));

    let mut registry = ModuleRegistry::new();
    register_sample_modules(&mut registry);
    let names: Vec<_> = registry.candidates(&SAMPLE).map(|e| e.name()).collect();
    assert_eq!(names, ["MoveX", "MoveY", "Rotate"]);
}

#[test]
fn sample_control_round_trips_through_ron() {
    let mut control = sample_control();
    control.push_module(Box::new(MoveY::new(0.5)));
    control.push_module(Box::new(Rotate::new(15.0)));
    let text = encode(&control.save().unwrap(), Format::Ron).unwrap();
    assert!(text.contains("MoveY"));

    let mut registry = ModuleRegistry::new();
    register_sample_modules(&mut registry);
    let loaded = registry.load_control(&decode(&text).unwrap()).unwrap();
    let names: Vec<_> = loaded.iter().map(|m| m.module_name()).collect();
    assert_eq!(names, ["MoveY", "Rotate"]);
    assert_eq!(loaded.find::<Rotate>().unwrap().speed, 15.0);
    assert_eq!(loaded.module_family(), &SAMPLE);
}

#[cfg(feature = "inspector")]
mod inspector {
    use modkit_editor::{AttachmentResolver, ModuleCatalog, ModuleDocument, SerializedModule};
    use modkit_runtime::serialize::Value;
    use modkit_std::ui::register_sample_editors;
    use modkit_std::{Rotate, sample_control};

    #[test]
    fn only_rotate_has_a_custom_editor() {
        let mut catalog = ModuleCatalog::new();
        register_sample_editors(&mut catalog);
        let resolver = AttachmentResolver::new(&catalog, &sample_control());
        let flags: Vec<_> = resolver
            .entries()
            .iter()
            .map(|e| (e.name, e.custom_editor))
            .collect();
        assert_eq!(flags, [("MoveX", false), ("MoveY", false), ("Rotate", true)]);
    }

    #[test]
    fn rotate_axis_edit_commits() {
        let mut catalog = ModuleCatalog::new();
        register_sample_editors(&mut catalog);
        let mut doc = ModuleDocument::new(sample_control(), 10);
        let mut resolver = AttachmentResolver::new(&catalog, doc.control());
        let index = resolver.attach(&catalog, &mut doc, "Rotate").unwrap();

        let mut snapshot = SerializedModule::from_control(doc.control(), index).unwrap();
        for (i, v) in [0.0, 0.0, 1.0].into_iter().enumerate() {
            snapshot
                .set_property(&format!("axis[{i}]"), Value::F32(v))
                .unwrap();
        }
        assert!(
            snapshot
                .apply_modified_properties(&mut doc, catalog.registry())
                .unwrap()
        );
        assert_eq!(
            doc.control().find::<Rotate>().unwrap().axis,
            modkit_core::math::Vec3::Z
        );
        assert_eq!(doc.history().undo_count(), 2);
    }
}
