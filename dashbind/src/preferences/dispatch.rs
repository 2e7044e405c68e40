use super::PreferenceValue;
use crate::binding::{Binder, Binding, ChooserBinding};
use crate::core::prelude::*;

impl Binder {
    /// Binds a preference according to its kind. Scalar preferences become
    /// two-way values backed by the store, enum preferences a chooser and
    /// controller preferences a device namespace.
    pub fn bind_preference(
        &self,
        name: &str,
        preference: &PreferenceValue,
    ) -> Box<dyn Binding> {
        trace!(
            "binding preference '{}' at {}",
            preference.key(),
            self.path(name)
        );

        match preference {
            PreferenceValue::Text(p) => {
                let (reader, writer) = (p.clone(), p.clone());
                self.bind_static_rw(
                    name,
                    move || reader.get(),
                    move |value: String| writer.set(&value),
                )
                .boxed()
            }
            PreferenceValue::Bool(p) => {
                let (reader, writer) = (p.clone(), p.clone());
                self.bind_static_rw(
                    name,
                    move || reader.get(),
                    move |value| writer.set(value),
                )
                .boxed()
            }
            PreferenceValue::Double(p) => {
                let (reader, writer) = (p.clone(), p.clone());
                self.bind_static_rw(
                    name,
                    move || reader.get(),
                    move |value| writer.set(value),
                )
                .boxed()
            }
            PreferenceValue::Enum(p) => {
                let (reader, writer) = (p.clone(), p.clone());
                ChooserBinding::new(
                    &self.nested(name),
                    p.options().to_vec(),
                    move || reader.get(),
                    move |label| {
                        writer.set(&label);
                    },
                )
                .boxed()
            }
            PreferenceValue::Pid(pid) => self.bind_device(name, pid).boxed(),
            PreferenceValue::ProfiledPid(pid) => {
                self.bind_device(name, pid).boxed()
            }
        }
    }
}
