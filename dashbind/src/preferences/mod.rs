//! Persisted settings that can be exposed on the dashboard.
//!
//! A [`PreferenceStore`] owns the values and their JSON file. Handles such
//! as [`DoublePreference`] or [`PidPreference`] hold a key into a shared
//! store and are wrapped in a [`PreferenceValue`] to be bound with
//! [`Binder::bind_preference`](crate::binding::Binder::bind_preference).

pub mod dispatch;
pub mod pid;
pub mod store;
pub mod value;

pub use pid::*;
pub use store::*;
pub use value::*;
