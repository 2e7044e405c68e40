use std::cell::RefCell;
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use directories_next::BaseDirs;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::prelude::*;

pub const PREFERENCES_VERSION: &str = "1";

pub type SharedPreferences = Rc<RefCell<PreferenceStore>>;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StoredValue {
    Bool(bool),
    Double(f64),
    String(String),
}

impl StoredValue {
    pub fn as_bool(&self) -> Option<bool> {
        if let StoredValue::Bool(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        if let StoredValue::Double(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let StoredValue::String(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct SerializablePreferences {
    version: String,
    values: IndexMap<String, StoredValue>,
}

/// Persisted key/value settings the dashboard can tune.
///
/// Reads never fail: a missing key or a key holding a different kind yields
/// the caller's default. `init_*` additionally stores that default so it
/// shows up in the saved file.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    values: IndexMap<String, StoredValue>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedPreferences {
        Rc::new(RefCell::new(self))
    }

    /// `<config dir>/Dashbind/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|base| {
            base.config_dir().join("Dashbind").join("preferences.json")
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&StoredValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<StoredValue> {
        let removed = self.values.shift_remove(key);
        self.dirty |= removed.is_some();
        removed
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.typed(key, StoredValue::as_bool).unwrap_or(default)
    }

    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        self.typed(key, StoredValue::as_double).unwrap_or(default)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(StoredValue::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.insert(key, StoredValue::Bool(value));
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.insert(key, StoredValue::Double(value));
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.insert(key, StoredValue::String(value.to_string()));
    }

    pub fn init_bool(&mut self, key: &str, default: bool) -> bool {
        self.init(key, StoredValue::Bool(default));
        self.get_bool(key, default)
    }

    pub fn init_double(&mut self, key: &str, default: f64) -> f64 {
        self.init(key, StoredValue::Double(default));
        self.get_double(key, default)
    }

    pub fn init_string(&mut self, key: &str, default: &str) -> String {
        self.init(key, StoredValue::String(default.to_string()));
        self.get_string(key, default)
    }

    /// Writes to the configured path; a no-op when nothing changed
    pub fn save(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.dirty {
            return Ok(());
        }
        let path = self
            .path
            .clone()
            .ok_or("preference store has no path to save to")?;
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let serializable = SerializablePreferences {
            version: PREFERENCES_VERSION.to_string(),
            values: self.values.clone(),
        };
        let json = serde_json::to_string_pretty(&serializable)?;
        if let Some(parent_dir) = path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::write(path, json)?;
        debug!(
            "saved {} preferences to {}",
            self.values.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let json = fs::read_to_string(path)?;
        let serialized: SerializablePreferences = serde_json::from_str(&json)?;
        if serialized.version != PREFERENCES_VERSION {
            warn!(
                "preferences at {} have version {}; expected {}",
                path.display(),
                serialized.version,
                PREFERENCES_VERSION
            );
        }
        Ok(Self {
            values: serialized.values,
            path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// Like [`Self::load`] but a missing file yields an empty store bound to
    /// `path`
    pub fn load_if_exists(path: &Path) -> Result<Self, Box<dyn Error>> {
        match Self::load(path) {
            Ok(store) => Ok(store),
            Err(err) => {
                if err
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|e| e.kind() == ErrorKind::NotFound)
                {
                    info!(
                        "no preferences at {}; starting empty",
                        path.display()
                    );
                    let mut store = Self::new();
                    store.set_path(path);
                    Ok(store)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn typed<T>(
        &self,
        key: &str,
        extract: impl Fn(&StoredValue) -> Option<T>,
    ) -> Option<T> {
        self.values.get(key).and_then(extract)
    }

    fn insert(&mut self, key: &str, value: StoredValue) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.dirty = true;
        }
    }

    fn init(&mut self, key: &str, default: StoredValue) {
        let matches_kind = self.values.get(key).is_some_and(|existing| {
            std::mem::discriminant(existing) == std::mem::discriminant(&default)
        });
        if !matches_kind {
            self.insert(key, default);
        }
    }
}
