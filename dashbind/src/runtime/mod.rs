pub mod config;
pub mod driver;
pub mod registry;
pub mod tick_clock;

pub use config::DashboardConfig;
pub use driver::PeriodicDriver;
pub use registry::{TabId, TabRegistry};
pub use tick_clock::{DEFAULT_TICK_PERIOD, TickClock, TickResult};
