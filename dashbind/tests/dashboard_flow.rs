mod support;

use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::time::{Duration, Instant};

use dashbind::prelude::*;
use serial_test::serial;
use support::{binder, drive};

#[derive(Default)]
struct Pose {
    x: f64,
    y: f64,
}

#[derive(Default)]
struct Field {
    poses: Vec<Rc<RefCell<Pose>>>,
}

#[test]
fn drive_enabled_scenario() {
    let bus = LocalBus::new();
    let drive = drive();
    drive.borrow_mut().enabled = true;
    let mut registry = TabRegistry::new();

    binder(&bus, "").bind_tab(&mut registry, "Drive", &drive, |b, drive| {
        vec![
            b.bind_rw("Enabled", drive, |d| d.enabled, |d, v| d.enabled = v)
                .boxed(),
        ]
    });

    registry.enable_all().expect("enable tabs");
    registry.update_all();
    assert_eq!(bus.published("Drive/Enabled"), vec![Value::Boolean(true)]);

    bus.set_remote("Drive/Enabled", Value::Boolean(false));
    registry.update_all();

    assert!(!drive.borrow().enabled);
    assert_eq!(
        bus.published("Drive/Enabled"),
        vec![Value::Boolean(true), Value::Boolean(false)]
    );

    registry.disable_all().expect("disable tabs");
    let err = registry.disable_all().expect_err("already disabled");
    assert_eq!(
        err,
        BindingError::NotEnabled {
            path: "Drive".to_string()
        }
    );
}

#[test]
fn tab_update_reaches_every_leaf() {
    let bus = LocalBus::new();
    let field = Rc::new(RefCell::new(Field {
        poses: (0..3)
            .map(|i| {
                Rc::new(RefCell::new(Pose {
                    x: i as f64,
                    y: -(i as f64),
                }))
            })
            .collect(),
    }));
    let mut registry = TabRegistry::new();

    let bind_poses = |b: &Binder, f: &Rc<RefCell<Field>>| {
        f.borrow()
            .poses
            .iter()
            .enumerate()
            .map(|(i, pose)| {
                b.bind_layout(&format!("Pose{}", i), pose, |b, pose| {
                    vec![
                        b.bind("x", pose, |p| p.x).boxed(),
                        b.bind("y", pose, |p| p.y).boxed(),
                    ]
                })
                .boxed()
            })
            .collect::<Vec<_>>()
    };
    let id =
        binder(&bus, "").bind_tab(&mut registry, "Field", &field, bind_poses);

    let stray_pose = field.borrow().poses[0].clone();
    let mut stray = binder(&bus, "Stray").bind("x", &stray_pose, |p| p.x);

    registry.enable_tab(id).expect("enable tab");
    registry.update_all();
    stray.update();

    let leaf_writes: usize = bus
        .topics()
        .iter()
        .map(|path| bus.published(path).len())
        .sum();
    assert_eq!(leaf_writes, 6);
    assert_eq!(bus.latest("Field/Pose2/y"), Some(Value::Double(-2.0)));
    assert!(bus.published("Stray/x").is_empty());
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gear {
    Low,
    High,
}

impl BindEnum for Gear {
    fn variants() -> &'static [Self] {
        &[Self::Low, Self::High]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::High => "High",
        }
    }
}

struct Shifter {
    gear: Gear,
    shifts: u32,
}

impl Describe for Shifter {
    fn describe(&self, builder: &mut DeviceBuilder<Self>) {
        builder
            .set_type("Shifter")
            .property("Shifts", |s| s.shifts as i64)
            .on_update(|s| {
                if s.gear == Gear::High {
                    s.shifts += 1;
                }
                Ok(())
            });
    }
}

#[test]
fn chooser_and_device_share_a_tab() {
    let bus = LocalBus::new();
    let shifter = Rc::new(RefCell::new(Shifter {
        gear: Gear::Low,
        shifts: 0,
    }));
    let mut registry = TabRegistry::new();

    binder(&bus, "/Dashboard").bind_tab(
        &mut registry,
        "Gearbox",
        &shifter,
        |b, shifter| {
            vec![
                b.bind_enum("Gear", shifter, |s| s.gear, |s, g| s.gear = g)
                    .boxed(),
                b.bind_device("Shifter", shifter).boxed(),
            ]
        },
    );
    registry.enable_all().expect("enable");

    bus.set_remote("/Dashboard/Gearbox/Gear/selected", Value::from("High"));
    registry.update_all();
    registry.update_all();

    assert_eq!(shifter.borrow().gear, Gear::High);
    assert_eq!(shifter.borrow().shifts, 2);
    // properties publish before the tick's callbacks run
    assert_eq!(
        bus.latest("/Dashboard/Gearbox/Shifter/Shifts"),
        Some(Value::Integer(1))
    );
    assert_eq!(
        bus.latest("/Dashboard/Gearbox/Shifter/.type"),
        Some(Value::from("Shifter"))
    );

    registry.close_all();
    assert_eq!(bus.stats().open_handles(), 0);
}

#[test]
#[serial]
fn dashboard_edits_persist_through_store() {
    let path = env::temp_dir()
        .join(format!("dashbind-flow-{}", std::process::id()))
        .join("preferences.json");
    let _ = std::fs::remove_file(&path);

    let store = PreferenceStore::load_if_exists(&path)
        .expect("empty store")
        .shared();
    let gain = DoublePreference::new(&store, "drive/gain", 1.0);
    let pid = PidPreference::new(&store, "arm", PidGains::new(0.1, 0.0, 0.0))
        .shared();

    let bus = LocalBus::new();
    let b = binder(&bus, "Preferences");
    let mut bindings = vec![
        b.bind_preference("Gain", &gain.into()),
        b.bind_preference("Arm", &pid.into()),
    ];
    for binding in &mut bindings {
        binding.enable().expect("enable preference");
    }

    bus.set_remote("Preferences/Gain", Value::Double(1.5));
    bus.set_remote("Preferences/Arm/d", Value::Double(0.05));
    bindings.iter_mut().for_each(|binding| binding.update());

    store.borrow_mut().save().expect("save");

    let reloaded = PreferenceStore::load(&path).expect("reload");
    assert_eq!(reloaded.get_double("drive/gain", 0.0), 1.5);
    assert_eq!(reloaded.get_double("arm/kD", 0.0), 0.05);
    assert_eq!(reloaded.get_double("arm/kP", 0.0), 0.1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn driver_ticks_registered_tabs() {
    let bus = LocalBus::new();
    let drive = drive();
    let mut registry = TabRegistry::new();
    binder(&bus, "").bind_tab(&mut registry, "Drive", &drive, |b, drive| {
        vec![b.bind("Speed", drive, |d| d.speed).boxed()]
    });
    registry.enable_all().expect("enable");

    let start = Instant::now();
    let period = Duration::from_millis(20);
    let mut driver =
        PeriodicDriver::with_clock(TickClock::with_start(period, start));

    driver.tick(&mut registry, start + period);
    driver.tick(&mut registry, start + period * 5);

    assert_eq!(bus.published("Drive/Speed").len(), 2);
    assert_eq!(driver.clock().missed_count(), 3);
}
