pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::core::util::HashSet;
