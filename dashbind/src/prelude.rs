pub use crate::binding::{
    BindEnum, BindValue, Binder, Binding, BindingError, ChooserBinding,
    Children, ConstantBinding, DeviceBinding, DeviceBuilder, Describe,
    LayoutBinding, TabBinding, ValueBinding,
};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::preferences::{
    BoolPreference, DoublePreference, EnumPreference, PidGains, PidPreference,
    PreferenceStore, PreferenceValue, ProfiledPidPreference,
    SharedPreferences, StringPreference,
};
pub use crate::runtime::{
    DashboardConfig, PeriodicDriver, TabId, TabRegistry, TickClock,
};
pub use crate::transport::{
    LocalBus, Topic, TopicPath, Transport, TransportError, Value, ValueKind,
};
