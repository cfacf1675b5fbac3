//! Error types for the bean factory.

use std::fmt;

/// Bean factory errors
///
/// `DefinitionNotFound`, `TypeNotFound`, `TypeAmbiguous` and
/// `InstantiationFailed` always abort the enclosing `get_bean` call.
/// `FieldAssignmentFailed` is governed by
/// [`FieldFailurePolicy`](crate::FieldFailurePolicy): logged and skipped by
/// default, fatal under [`FactoryConfig::strict`](crate::FactoryConfig::strict).
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{DefaultBeanFactory, DiError};
///
/// let factory = DefaultBeanFactory::new();
/// match factory.get_bean("missing") {
///     Err(DiError::DefinitionNotFound(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
///
/// let ambiguous = DiError::TypeAmbiguous {
///     type_name: "dyn app::Greeter",
///     candidates: vec!["english".to_string(), "french".to_string()],
/// };
/// assert_eq!(
///     ambiguous.to_string(),
///     "Ambiguous bean for type dyn app::Greeter: english, french"
/// );
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No definition registered under the requested name
    DefinitionNotFound(String),
    /// By-type resolution found no definition providing the type
    TypeNotFound(&'static str),
    /// By-type resolution found more than one definition providing the type
    TypeAmbiguous {
        type_name: &'static str,
        candidates: Vec<String>,
    },
    /// The definition's producer could not create a raw instance
    InstantiationFailed { bean: String, reason: String },
    /// A resolved dependency could not be written into its slot
    FieldAssignmentFailed {
        bean: String,
        slot: &'static str,
        reason: String,
    },
    /// The bean does not expose the requested concrete type or capability
    TypeMismatch { bean: String, expected: &'static str },
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::DefinitionNotFound(name) => write!(f, "No bean named '{}' is defined", name),
            DiError::TypeNotFound(type_name) => write!(f, "No bean found for type {}", type_name),
            DiError::TypeAmbiguous { type_name, candidates } => {
                write!(f, "Ambiguous bean for type {}: {}", type_name, candidates.join(", "))
            }
            DiError::InstantiationFailed { bean, reason } => {
                write!(f, "Failed to instantiate bean '{}': {}", bean, reason)
            }
            DiError::FieldAssignmentFailed { bean, slot, reason } => {
                write!(f, "Failed to assign slot '{}' of bean '{}': {}", slot, bean, reason)
            }
            DiError::TypeMismatch { bean, expected } => {
                write!(f, "Bean '{}' is not exposed as {}", bean, expected)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for bean factory operations
pub type DiResult<T> = Result<T, DiError>;
