pub mod binding;
pub mod core;
pub mod preferences;
pub mod prelude;
pub mod runtime;
pub mod transport;
