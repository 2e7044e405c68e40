//! A small robot-shaped object graph to bind.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use dashbind::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriveMode {
    Arcade,
    Tank,
    Curvature,
}

impl BindEnum for DriveMode {
    fn variants() -> &'static [Self] {
        &[Self::Arcade, Self::Tank, Self::Curvature]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Arcade => "Arcade",
            Self::Tank => "Tank",
            Self::Curvature => "Curvature",
        }
    }
}

#[derive(Debug, Default)]
pub struct Side {
    pub speed: f64,
    pub distance: f64,
}

#[derive(Debug)]
pub struct Drivetrain {
    pub enabled: bool,
    pub mode: DriveMode,
    pub max_speed: f64,
    pub left: Rc<RefCell<Side>>,
    pub right: Rc<RefCell<Side>>,
}

impl Drivetrain {
    pub fn new() -> Self {
        Self {
            enabled: false,
            mode: DriveMode::Arcade,
            max_speed: 3.5,
            left: Rc::default(),
            right: Rc::default(),
        }
    }

    /// Advances the simulated wheels by one tick of `dt` seconds
    pub fn step(&mut self, dt: f64) {
        let throttle = if self.enabled { self.max_speed } else { 0.0 };
        let (left, right) = match self.mode {
            DriveMode::Arcade => (throttle, throttle),
            DriveMode::Tank => (throttle, throttle * 0.5),
            DriveMode::Curvature => (throttle * 0.5, throttle),
        };
        for (side, speed) in [(&self.left, left), (&self.right, right)] {
            let mut side = side.borrow_mut();
            side.speed = speed;
            side.distance += speed * dt;
        }
    }
}

#[derive(Debug, Default)]
pub struct Arm {
    pub angle: f64,
    pub target: f64,
    pub brake: bool,
    pub encoder_open: bool,
}

impl Arm {
    pub fn new() -> Self {
        Self {
            encoder_open: true,
            ..Self::default()
        }
    }

    fn settle(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.encoder_open {
            return Err("encoder is closed".into());
        }
        if !self.brake {
            self.angle += (self.target - self.angle) * 0.2;
        }
        Ok(())
    }
}

impl Describe for Arm {
    fn describe(&self, builder: &mut DeviceBuilder<Self>) {
        builder
            .set_type("Arm")
            .property("Angle", |arm| arm.angle)
            .property_rw("Target", |arm| arm.target, |arm, v| arm.target = v)
            .property_rw("Brake", |arm| arm.brake, |arm, v| arm.brake = v)
            .constant("Encoder Channel", |_| 3_i64)
            .on_update(Arm::settle)
            .on_close(|arm| {
                arm.encoder_open = false;
                debug!("arm encoder released");
                Ok(())
            });
    }
}

pub struct Robot {
    pub drivetrain: Rc<RefCell<Drivetrain>>,
    pub arm: Rc<RefCell<Arm>>,
    pub preferences: Vec<(&'static str, PreferenceValue)>,
}

impl Robot {
    pub fn new(store: &SharedPreferences) -> Self {
        let modes = DriveMode::labels();
        let preferences = vec![
            (
                "Team Name",
                StringPreference::new(store, "team/name", "dashbind").into(),
            ),
            (
                "Field Oriented",
                BoolPreference::new(store, "drive/fieldOriented", true).into(),
            ),
            (
                "Max Speed",
                DoublePreference::new(store, "drive/maxSpeed", 3.5).into(),
            ),
            (
                "Default Mode",
                EnumPreference::new(store, "drive/mode", modes, "Arcade")
                    .into(),
            ),
            (
                "Arm PID",
                PidPreference::new(
                    store,
                    "arm",
                    PidGains::new(0.2, 0.0, 0.01),
                )
                .shared()
                .into(),
            ),
            (
                "Elevator PID",
                ProfiledPidPreference::new(
                    store,
                    "elevator",
                    PidGains::new(1.0, 0.0, 0.0),
                    1.5,
                    3.0,
                )
                .shared()
                .into(),
            ),
        ];

        let mut drivetrain = Drivetrain::new();
        {
            let store = store.borrow();
            drivetrain.max_speed = store.get_double("drive/maxSpeed", 3.5);
            let mode = store.get_string("drive/mode", "Arcade");
            drivetrain.mode =
                DriveMode::from_label(&mode).unwrap_or(DriveMode::Arcade);
        }

        Self {
            drivetrain: Rc::new(RefCell::new(drivetrain)),
            arm: Rc::new(RefCell::new(Arm::new())),
            preferences,
        }
    }

    /// Registers the "Drive", "Arm" and "Preferences" tabs
    pub fn bind(&self, binder: &Binder, registry: &mut TabRegistry) {
        binder.bind_tab(registry, "Drive", &self.drivetrain, |b, drive| {
            let (left, right) = {
                let drive = drive.borrow();
                (drive.left.clone(), drive.right.clone())
            };
            vec![
                b.bind_rw("Enabled", drive, |d| d.enabled, |d, v| {
                    d.enabled = v
                })
                .boxed(),
                b.bind_enum("Mode", drive, |d| d.mode, |d, m| d.mode = m)
                    .boxed(),
                b.bind_constant("Max Speed", drive, |d| d.max_speed).boxed(),
                bind_side(b, "Left", &left).boxed(),
                bind_side(b, "Right", &right).boxed(),
            ]
        });

        binder.bind_tab(registry, "Arm", &self.arm, |b, arm| {
            vec![b.bind_device("Arm", arm).boxed()]
        });

        let prefs = binder.nested("Preferences");
        let bindings = self
            .preferences
            .iter()
            .map(|(name, preference)| prefs.bind_preference(name, preference))
            .collect();
        registry.register(TabBinding::new(
            "Preferences",
            prefs.prefix().clone(),
            Children::new(bindings),
        ));
    }
}

fn bind_side(
    binder: &Binder,
    name: &str,
    side: &Rc<RefCell<Side>>,
) -> LayoutBinding {
    binder.bind_layout(name, side, |b, side| {
        vec![
            b.bind("Speed", side, |s| s.speed).boxed(),
            b.bind("Distance", side, |s| s.distance).boxed(),
        ]
    })
}
