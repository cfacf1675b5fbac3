//! Write-once dependency slots.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

/// A dependency slot filled by the factory after the owning bean is
/// instantiated.
///
/// Beans are shared behind `Arc` from the moment they are created (a cycle
/// may hand out an early reference before population finishes), so slots
/// use interior mutability. A slot can be written once; a second write is
/// reported as an error and leaves the first value in place.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::Autowired;
/// use std::sync::Arc;
///
/// let slot: Autowired<String> = Autowired::new();
/// assert!(slot.get().is_none());
///
/// slot.set(Arc::new("db".to_string())).unwrap();
/// assert_eq!(slot.get().unwrap().as_str(), "db");
/// assert_eq!(slot.get_ref().map(|value| value.len()), Some(2));
/// assert!(slot.set(Arc::new("other".to_string())).is_err());
/// ```
pub struct Autowired<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Autowired<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Returns the injected value, if any.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    /// Borrows the injected value without touching the reference count.
    pub fn get_ref(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    /// Returns true once a value has been injected.
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Injects `value`. Fails if the slot already holds a value.
    pub fn set(&self, value: Arc<T>) -> Result<(), String> {
        self.cell
            .set(value)
            .map_err(|_| format!("slot of type {} is already set", std::any::type_name::<T>()))
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &std::any::type_name::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}
