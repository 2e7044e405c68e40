//! Bindings pair a local accessor with a dashboard topic.
//!
//! Every binding follows the same lifecycle: transport handles are acquired
//! when the enable count goes from zero to one and released when it drops
//! back to zero. [`Binding::update`] is called once per scheduler tick and is
//! a no-op while disabled. See [`Binder`] for the factory surface.

use std::error::Error;
use std::fmt;

use crate::transport::TransportError;

pub mod bind_value;
pub mod binder;
pub mod chooser;
pub mod constant_binding;
pub mod device_binding;
pub mod layout;
pub mod value_binding;

pub use bind_value::*;
pub use binder::*;
pub use chooser::*;
pub use constant_binding::*;
pub use device_binding::*;
pub use layout::*;
pub use value_binding::*;

pub trait Binding {
    /// Acquires transport resources on the first enable; later calls only
    /// count.
    fn enable(&mut self) -> Result<(), BindingError>;

    /// Releases transport resources on the last disable. Disabling a binding
    /// that is not enabled is a usage error.
    fn disable(&mut self) -> Result<(), BindingError>;

    /// Applies pending dashboard edits, then publishes the local value
    fn update(&mut self);

    /// Releases transport resources without touching the enable count
    fn close(&mut self);

    fn is_enabled(&self) -> bool;

    fn boxed(self) -> Box<dyn Binding>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl Binding for Box<dyn Binding> {
    fn enable(&mut self) -> Result<(), BindingError> {
        (**self).enable()
    }

    fn disable(&mut self) -> Result<(), BindingError> {
        (**self).disable()
    }

    fn update(&mut self) {
        (**self).update()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn boxed(self) -> Box<dyn Binding> {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingError {
    /// `disable` was called more times than `enable`
    NotEnabled { path: String },
    Transport(TransportError),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnabled { path } => write!(
                f,
                "binding '{}' disabled without a matching enable",
                path
            ),
            Self::Transport(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl Error for BindingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::NotEnabled { .. } => None,
        }
    }
}

impl From<TransportError> for BindingError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// The enable reference count shared by leaf bindings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnableCount(usize);

impl EnableCount {
    pub fn get(self) -> usize {
        self.0
    }

    pub fn is_enabled(self) -> bool {
        self.0 > 0
    }

    /// Returns true on the 0 -> 1 transition
    pub fn acquire(&mut self) -> bool {
        self.0 += 1;
        self.0 == 1
    }

    /// Undoes an [`Self::acquire`] whose resource acquisition failed
    pub fn rollback(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    /// Returns true on the 1 -> 0 transition
    pub fn release(&mut self, path: &str) -> Result<bool, BindingError> {
        if self.0 == 0 {
            return Err(BindingError::NotEnabled {
                path: path.to_string(),
            });
        }
        self.0 -= 1;
        Ok(self.0 == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_count_reports_edges_only() {
        let mut count = EnableCount::default();
        assert!(count.acquire());
        assert!(!count.acquire());
        assert_eq!(count.release("a"), Ok(false));
        assert_eq!(count.release("a"), Ok(true));
        assert!(!count.is_enabled());
    }

    #[test]
    fn release_at_zero_is_usage_error() {
        let mut count = EnableCount::default();
        assert_eq!(
            count.release("a/b"),
            Err(BindingError::NotEnabled {
                path: "a/b".to_string()
            })
        );
        assert_eq!(count.get(), 0);
    }
}
