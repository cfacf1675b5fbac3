//! Capability keys for by-type bean resolution.

use std::any::TypeId;

/// Key identifying a capability a bean can be resolved by.
///
/// A bean definition always provides the key of its own concrete type and,
/// additionally, one trait key per capability interface it declares.
/// Dependency slots name the key they require and the factory scans the
/// registered definitions for the single one that provides it.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{key_of_trait, key_of_type, Key};
///
/// trait Greeter: Send + Sync {}
///
/// let concrete = key_of_type::<String>();
/// assert_eq!(concrete.display_name(), "alloc::string::String");
/// assert!(!concrete.is_trait());
///
/// let capability = key_of_trait::<dyn Greeter>();
/// assert!(capability.is_trait());
/// assert!(capability.display_name().contains("Greeter"));
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Capability interface (`dyn Trait`) key
    ///
    /// Only stores the trait object's type name since the trait itself has no
    /// TypeId separate from its object type.
    Trait(&'static str),
}

impl Key {
    /// Get the type or trait name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }

    /// Returns true for capability interface keys.
    pub fn is_trait(&self) -> bool {
        matches!(self, Key::Trait(_))
    }
}

// TypeId-only comparison for concrete types
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

/// Key for a concrete type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a capability interface, e.g. `key_of_trait::<dyn UserRepository>()`.
#[inline(always)]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}

/// Last path segment of a type name, without generic arguments.
///
/// `my_app::repo::UserRepository<my_app::Pg>` becomes `UserRepository`.
pub(crate) fn simple_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Default bean name for a type: its simple name with the first character
/// lower-cased (`UserService` becomes `userService`).
pub(crate) fn default_bean_name(type_name: &str) -> String {
    let simple = simple_type_name(type_name);
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    trait Marker {}

    #[test]
    fn simple_name_strips_path_and_generics() {
        assert_eq!(simple_type_name("a::b::UserService"), "UserService");
        assert_eq!(simple_type_name("a::Repo<b::Pg>"), "Repo");
        assert_eq!(simple_type_name("Plain"), "Plain");
    }

    #[test]
    fn default_name_lowers_first_char() {
        assert_eq!(default_bean_name("app::UserRepository"), "userRepository");
        assert_eq!(default_bean_name("A"), "a");
        assert_eq!(default_bean_name(""), "");
    }

    #[test]
    fn keys_hash_by_identity() {
        let mut set = HashSet::new();
        set.insert(key_of_type::<u32>());
        set.insert(key_of_type::<u32>());
        set.insert(key_of_trait::<dyn Marker>());
        set.insert(key_of_trait::<dyn Marker>());
        assert_eq!(set.len(), 2);
        assert_ne!(key_of_type::<u32>(), key_of_type::<u64>());
    }
}
