use std::cell::RefCell;
use std::rc::Rc;

use super::SharedPreferences;
use crate::binding::{DeviceBuilder, Describe};

pub const PID_TYPE: &str = "PIDController";
pub const PROFILED_PID_TYPE: &str = "ProfiledPIDController";

pub type SharedPid = Rc<RefCell<PidPreference>>;
pub type SharedProfiledPid = Rc<RefCell<ProfiledPidPreference>>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Gains and setpoint persisted as `<key>/kP`, `<key>/kI`, `<key>/kD` and
/// `<key>/setpoint`
#[derive(Debug)]
pub struct PidPreference {
    key: String,
    store: SharedPreferences,
}

impl PidPreference {
    pub fn new(store: &SharedPreferences, key: &str, gains: PidGains) -> Self {
        let pid = Self {
            key: key.to_string(),
            store: store.clone(),
        };
        {
            let mut store = store.borrow_mut();
            store.init_double(&pid.field("kP"), gains.kp);
            store.init_double(&pid.field("kI"), gains.ki);
            store.init_double(&pid.field("kD"), gains.kd);
            store.init_double(&pid.field("setpoint"), 0.0);
        }
        pid
    }

    pub fn shared(self) -> SharedPid {
        Rc::new(RefCell::new(self))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.get("kP"), self.get("kI"), self.get("kD"))
    }

    pub fn set_gains(&mut self, gains: PidGains) {
        self.set("kP", gains.kp);
        self.set("kI", gains.ki);
        self.set("kD", gains.kd);
    }

    pub fn setpoint(&self) -> f64 {
        self.get("setpoint")
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.set("setpoint", setpoint);
    }

    fn field(&self, name: &str) -> String {
        format!("{}/{}", self.key, name)
    }

    fn get(&self, name: &str) -> f64 {
        self.store.borrow().get_double(&self.field(name), 0.0)
    }

    fn set(&self, name: &str, value: f64) {
        self.store.borrow_mut().set_double(&self.field(name), value);
    }

    fn describe_gains<D: 'static>(
        builder: &mut DeviceBuilder<D>,
        pid: impl Fn(&D) -> &PidPreference + Copy + 'static,
    ) {
        builder
            .property_rw("p", move |d| pid(d).get("kP"), move |d, v| {
                pid(d).set("kP", v)
            })
            .property_rw("i", move |d| pid(d).get("kI"), move |d, v| {
                pid(d).set("kI", v)
            })
            .property_rw("d", move |d| pid(d).get("kD"), move |d, v| {
                pid(d).set("kD", v)
            })
            .property_rw(
                "setpoint",
                move |d| pid(d).get("setpoint"),
                move |d, v| pid(d).set("setpoint", v),
            );
    }
}

impl Describe for PidPreference {
    fn describe(&self, builder: &mut DeviceBuilder<Self>) {
        builder.set_type(PID_TYPE);
        Self::describe_gains(builder, |pid| pid);
    }
}

/// A [`PidPreference`] plus motion constraints persisted as
/// `<key>/maxVelocity` and `<key>/maxAcceleration`
#[derive(Debug)]
pub struct ProfiledPidPreference {
    pid: PidPreference,
}

impl ProfiledPidPreference {
    pub fn new(
        store: &SharedPreferences,
        key: &str,
        gains: PidGains,
        max_velocity: f64,
        max_acceleration: f64,
    ) -> Self {
        let pid = PidPreference::new(store, key, gains);
        {
            let mut store = store.borrow_mut();
            store.init_double(&pid.field("maxVelocity"), max_velocity);
            store.init_double(&pid.field("maxAcceleration"), max_acceleration);
        }
        Self { pid }
    }

    pub fn shared(self) -> SharedProfiledPid {
        Rc::new(RefCell::new(self))
    }

    pub fn key(&self) -> &str {
        self.pid.key()
    }

    pub fn pid(&self) -> &PidPreference {
        &self.pid
    }

    pub fn pid_mut(&mut self) -> &mut PidPreference {
        &mut self.pid
    }

    pub fn max_velocity(&self) -> f64 {
        self.pid.get("maxVelocity")
    }

    pub fn max_acceleration(&self) -> f64 {
        self.pid.get("maxAcceleration")
    }

    pub fn set_constraints(
        &mut self,
        max_velocity: f64,
        max_acceleration: f64,
    ) {
        self.pid.set("maxVelocity", max_velocity);
        self.pid.set("maxAcceleration", max_acceleration);
    }
}

impl Describe for ProfiledPidPreference {
    fn describe(&self, builder: &mut DeviceBuilder<Self>) {
        builder.set_type(PROFILED_PID_TYPE);
        PidPreference::describe_gains(builder, |profiled| &profiled.pid);
        builder
            .property_rw(
                "maxVelocity",
                |p| p.max_velocity(),
                |p, v| p.pid.set("maxVelocity", v),
            )
            .property_rw(
                "maxAcceleration",
                |p| p.max_acceleration(),
                |p, v| p.pid.set("maxAcceleration", v),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;

    #[test]
    fn persists_under_key_prefix() {
        let store = PreferenceStore::new().shared();
        let mut pid =
            PidPreference::new(&store, "arm", PidGains::new(0.1, 0.0, 0.02));

        assert_eq!(store.borrow().get_double("arm/kP", 0.0), 0.1);
        assert_eq!(store.borrow().get_double("arm/kD", 0.0), 0.02);
        assert!(store.borrow().contains("arm/setpoint"));

        pid.set_setpoint(45.0);
        assert_eq!(store.borrow().get_double("arm/setpoint", 0.0), 45.0);
    }

    #[test]
    fn existing_gains_win_over_defaults() {
        let store = PreferenceStore::new().shared();
        store.borrow_mut().set_double("arm/kP", 0.7);

        let pid =
            PidPreference::new(&store, "arm", PidGains::new(0.1, 0.0, 0.0));
        assert_eq!(pid.gains(), PidGains::new(0.7, 0.0, 0.0));
    }

    #[test]
    fn profiled_adds_constraints() {
        let store = PreferenceStore::new().shared();
        let mut profiled = ProfiledPidPreference::new(
            &store,
            "elevator",
            PidGains::default(),
            2.0,
            4.0,
        );
        assert_eq!(profiled.max_velocity(), 2.0);

        profiled.set_constraints(3.0, 6.0);
        assert_eq!(
            store.borrow().get_double("elevator/maxAcceleration", 0.0),
            6.0
        );
        assert_eq!(profiled.pid().key(), "elevator");
    }
}
