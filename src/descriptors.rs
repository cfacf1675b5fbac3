//! Bean descriptors for introspection and diagnostics.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::definition::BeanDefinition;
use crate::internal::BeanState;

/// Snapshot of a registered bean: what it is, what it provides, what it
/// needs, and where it sits in the singleton cache.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanDefinition, BeanState, DefaultBeanFactory};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let factory = DefaultBeanFactory::new();
/// factory.register_bean_definition("clock", BeanDefinition::of::<Clock>());
///
/// let descriptors = factory.bean_descriptors();
/// assert_eq!(descriptors.len(), 1);
/// assert_eq!(descriptors[0].name, "clock");
/// assert_eq!(descriptors[0].state, BeanState::Unknown);
///
/// factory.get_bean("clock").unwrap();
/// assert_eq!(factory.bean_descriptors()[0].state, BeanState::Finished);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BeanDescriptor {
    /// Registered bean name
    pub name: String,
    /// Concrete type name
    pub type_name: &'static str,
    /// Declared capability interfaces
    pub capabilities: Vec<&'static str>,
    /// Capabilities that can be proxied
    pub intercepted: Vec<&'static str>,
    /// Dependency slots in declaration order
    pub dependencies: Vec<SlotDescriptor>,
    /// Current cache state
    pub state: BeanState,
}

/// A dependency slot of a [`BeanDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SlotDescriptor {
    /// Slot name as declared on the definition
    pub slot: &'static str,
    /// Display name of the type or trait the slot requires
    pub required: &'static str,
}

impl BeanDescriptor {
    pub(crate) fn new(name: &str, definition: &BeanDefinition, state: BeanState) -> Self {
        Self {
            name: name.to_owned(),
            type_name: definition.type_name(),
            capabilities: definition.capability_keys().map(|k| k.display_name()).collect(),
            intercepted: definition.intercepted_keys().map(|k| k.display_name()).collect(),
            dependencies: definition
                .slots()
                .iter()
                .map(|slot| SlotDescriptor {
                    slot: slot.name(),
                    required: slot.required().display_name(),
                })
                .collect(),
            state,
        }
    }

    /// Returns true if the bean has no dependency slots.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }
}
