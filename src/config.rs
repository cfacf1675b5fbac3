//! Factory configuration.
//!
//! Configuration is built in code or read from the process environment;
//! there is no configuration-file format.

use std::env;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable read by [`FactoryConfig::from_env`].
pub const FIELD_FAILURE_ENV: &str = "FERROUS_BEANS_FIELD_FAILURE";

/// What to do when a resolved dependency cannot be written into its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldFailurePolicy {
    /// Log a warning, leave the slot empty and finish creating the bean
    #[default]
    LogAndContinue,
    /// Abort the creation with `DiError::FieldAssignmentFailed`
    Propagate,
}

impl FieldFailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "log" | "log_and_continue" | "continue" => Some(Self::LogAndContinue),
            "propagate" | "strict" | "fail" => Some(Self::Propagate),
            _ => None,
        }
    }
}

/// Bean factory configuration.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{FactoryConfig, FieldFailurePolicy};
///
/// assert_eq!(FactoryConfig::default().field_failure, FieldFailurePolicy::LogAndContinue);
/// assert_eq!(FactoryConfig::strict().field_failure, FieldFailurePolicy::Propagate);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactoryConfig {
    /// Slot assignment failure handling
    pub field_failure: FieldFailurePolicy,
}

impl FactoryConfig {
    /// Every failure aborts the creation that hit it.
    pub fn strict() -> Self {
        Self { field_failure: FieldFailurePolicy::Propagate }
    }

    /// Sets the slot assignment failure policy.
    pub fn with_field_failure(mut self, policy: FieldFailurePolicy) -> Self {
        self.field_failure = policy;
        self
    }

    /// Defaults overridden by `FERROUS_BEANS_FIELD_FAILURE`
    /// (`log` or `propagate`). Unrecognized values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = env::var(FIELD_FAILURE_ENV) {
            match FieldFailurePolicy::parse(&value) {
                Some(policy) => config.field_failure = policy,
                None => tracing::warn!(
                    variable = FIELD_FAILURE_ENV,
                    value = %value,
                    "ignoring unrecognized field failure policy"
                ),
            }
        }
        config
    }
}
