use super::{SharedPid, SharedPreferences, SharedProfiledPid};

/// A persisted setting the dashboard can edit, tagged by kind.
///
/// Each variant maps to exactly one binding shape; see
/// [`Binder::bind_preference`](crate::binding::Binder::bind_preference).
pub enum PreferenceValue {
    Text(StringPreference),
    Bool(BoolPreference),
    Double(DoublePreference),
    Enum(EnumPreference),
    Pid(SharedPid),
    ProfiledPid(SharedProfiledPid),
}

impl PreferenceValue {
    pub fn key(&self) -> String {
        match self {
            Self::Text(p) => p.key().to_string(),
            Self::Bool(p) => p.key().to_string(),
            Self::Double(p) => p.key().to_string(),
            Self::Enum(p) => p.key().to_string(),
            Self::Pid(p) => p.borrow().key().to_string(),
            Self::ProfiledPid(p) => p.borrow().key().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StringPreference {
    key: String,
    store: SharedPreferences,
}

impl StringPreference {
    pub fn new(store: &SharedPreferences, key: &str, default: &str) -> Self {
        store.borrow_mut().init_string(key, default);
        Self {
            key: key.to_string(),
            store: store.clone(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> String {
        self.store.borrow().get_string(&self.key, "")
    }

    pub fn set(&self, value: &str) {
        self.store.borrow_mut().set_string(&self.key, value);
    }
}

#[derive(Clone, Debug)]
pub struct BoolPreference {
    key: String,
    store: SharedPreferences,
}

impl BoolPreference {
    pub fn new(store: &SharedPreferences, key: &str, default: bool) -> Self {
        store.borrow_mut().init_bool(key, default);
        Self {
            key: key.to_string(),
            store: store.clone(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> bool {
        self.store.borrow().get_bool(&self.key, false)
    }

    pub fn set(&self, value: bool) {
        self.store.borrow_mut().set_bool(&self.key, value);
    }
}

#[derive(Clone, Debug)]
pub struct DoublePreference {
    key: String,
    store: SharedPreferences,
}

impl DoublePreference {
    pub fn new(store: &SharedPreferences, key: &str, default: f64) -> Self {
        store.borrow_mut().init_double(key, default);
        Self {
            key: key.to_string(),
            store: store.clone(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> f64 {
        self.store.borrow().get_double(&self.key, 0.0)
    }

    pub fn set(&self, value: f64) {
        self.store.borrow_mut().set_double(&self.key, value);
    }
}

/// Stored as the selected label. A stored label that is no longer one of
/// `options` reads back as the default.
#[derive(Clone, Debug)]
pub struct EnumPreference {
    key: String,
    options: Vec<String>,
    default: String,
    store: SharedPreferences,
}

impl EnumPreference {
    pub fn new(
        store: &SharedPreferences,
        key: &str,
        options: Vec<String>,
        default: &str,
    ) -> Self {
        store.borrow_mut().init_string(key, default);
        Self {
            key: key.to_string(),
            options,
            default: default.to_string(),
            store: store.clone(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn get(&self) -> String {
        let label = self.store.borrow().get_string(&self.key, &self.default);
        if self.options.contains(&label) {
            label
        } else {
            self.default.clone()
        }
    }

    /// Returns false when `label` is not an option
    pub fn set(&self, label: &str) -> bool {
        if !self.options.iter().any(|option| option == label) {
            return false;
        }
        self.store.borrow_mut().set_string(&self.key, label);
        true
    }
}

impl From<StringPreference> for PreferenceValue {
    fn from(preference: StringPreference) -> Self {
        Self::Text(preference)
    }
}

impl From<BoolPreference> for PreferenceValue {
    fn from(preference: BoolPreference) -> Self {
        Self::Bool(preference)
    }
}

impl From<DoublePreference> for PreferenceValue {
    fn from(preference: DoublePreference) -> Self {
        Self::Double(preference)
    }
}

impl From<EnumPreference> for PreferenceValue {
    fn from(preference: EnumPreference) -> Self {
        Self::Enum(preference)
    }
}

impl From<SharedPid> for PreferenceValue {
    fn from(preference: SharedPid) -> Self {
        Self::Pid(preference)
    }
}

impl From<SharedProfiledPid> for PreferenceValue {
    fn from(preference: SharedProfiledPid) -> Self {
        Self::ProfiledPid(preference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferenceStore;

    #[test]
    fn handles_initialize_defaults() {
        let store = PreferenceStore::new().shared();
        let name = StringPreference::new(&store, "name", "bot");
        let armed = BoolPreference::new(&store, "armed", true);
        let gain = DoublePreference::new(&store, "gain", 0.5);

        assert_eq!(name.get(), "bot");
        assert!(armed.get());
        assert_eq!(gain.get(), 0.5);
        assert_eq!(store.borrow().keys().count(), 3);

        gain.set(0.75);
        assert_eq!(store.borrow().get_double("gain", 0.0), 0.75);
    }

    #[test]
    fn enum_preference_rejects_unknown_labels() {
        let store = PreferenceStore::new().shared();
        let mode = EnumPreference::new(
            &store,
            "mode",
            vec!["Arcade".to_string(), "Tank".to_string()],
            "Arcade",
        );

        assert!(mode.set("Tank"));
        assert!(!mode.set("Hover"));
        assert_eq!(mode.get(), "Tank");

        store.borrow_mut().set_string("mode", "Stale");
        assert_eq!(mode.get(), "Arcade");
    }

    #[test]
    fn key_reports_each_kind() {
        let store = PreferenceStore::new().shared();
        let value: PreferenceValue =
            BoolPreference::new(&store, "flag", false).into();
        assert_eq!(value.key(), "flag");
    }
}
