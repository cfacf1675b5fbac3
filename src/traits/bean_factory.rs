//! Bean lookup traits.

use std::sync::Arc;

use crate::bean::Bean;
use crate::error::{DiError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};

/// Object-safe bean lookup.
///
/// Most callers use [`BeanFactory`] instead, which adds typed helpers on
/// top of this trait.
pub trait BeanFactoryCore: Send + Sync {
    /// Returns the singleton registered as `name`.
    fn get_bean(&self, name: &str) -> DiResult<Bean>;

    /// Returns the single bean whose definition provides `key`.
    fn get_bean_by_key(&self, key: &Key) -> DiResult<Bean>;

    /// Returns true if a definition is registered as `name`.
    fn contains_bean(&self, name: &str) -> bool;
}

/// Typed bean lookup.
///
/// # Examples
///
/// ```
/// use ferrous_beans::{BeanDefinition, BeanFactory, DefaultBeanFactory, DiError};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// #[derive(Default)]
/// struct FixedClock;
///
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 {
///         1_700_000_000
///     }
/// }
///
/// let factory = DefaultBeanFactory::new();
/// factory.register_bean_definition(
///     "clock",
///     BeanDefinition::builder::<FixedClock, _>(FixedClock::default)
///         .provides::<dyn Clock, _>(|c| c as Arc<dyn Clock>)
///         .build(),
/// );
///
/// let by_name = factory.get_bean_trait::<dyn Clock>("clock").unwrap();
/// let by_type = factory.get_bean_of_trait::<dyn Clock>().unwrap();
/// assert!(Arc::ptr_eq(&by_name, &by_type));
/// assert_eq!(by_type.now(), 1_700_000_000);
///
/// assert!(matches!(
///     factory.get_bean_as::<String>("clock"),
///     Err(DiError::TypeMismatch { .. })
/// ));
/// ```
pub trait BeanFactory: BeanFactoryCore {
    /// Returns the concrete object registered as `name`.
    ///
    /// Fails with [`DiError::TypeMismatch`] when the bean is of another type
    /// or is proxied.
    fn get_bean_as<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let bean = self.get_bean(name)?;
        bean.downcast::<T>().ok_or_else(|| mismatch::<T>(&bean))
    }

    /// Returns the capability view `T` of the bean registered as `name`.
    fn get_bean_trait<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let bean = self.get_bean(name)?;
        bean.capability::<T>().ok_or_else(|| mismatch::<T>(&bean))
    }

    /// Returns the single bean of concrete type `T`.
    fn get_bean_of_type<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let bean = self.get_bean_by_key(&key_of_type::<T>())?;
        bean.downcast::<T>().ok_or_else(|| mismatch::<T>(&bean))
    }

    /// Returns the single bean providing capability `T`.
    fn get_bean_of_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let bean = self.get_bean_by_key(&key_of_trait::<T>())?;
        bean.capability::<T>().ok_or_else(|| mismatch::<T>(&bean))
    }
}

impl<F: BeanFactoryCore + ?Sized> BeanFactory for F {}

fn mismatch<T: ?Sized>(bean: &Bean) -> DiError {
    DiError::TypeMismatch {
        bean: bean.name().to_owned(),
        expected: std::any::type_name::<T>(),
    }
}
