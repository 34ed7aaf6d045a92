//! Per-trigger configuration

use serde::{Deserialize, Serialize};

/// First trigger argument that turns on per-column warnings.
pub const WARN_ARGUMENT: &str = "on";

/// Options taken from the arguments attached to the trigger definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierConfig {
    /// Emit a warning for every replaced column.
    pub warn_on_replace: bool,
}

impl NullifierConfig {
    /// Only the first argument is consulted, compared byte-for-byte.
    pub fn from_trigger_args<S: AsRef<str>>(args: &[S]) -> Self {
        let warn_on_replace = args
            .first()
            .is_some_and(|first| first.as_ref() == WARN_ARGUMENT);
        Self { warn_on_replace }
    }
}
