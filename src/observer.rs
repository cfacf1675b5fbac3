//! Lifecycle observers.
//!
//! Observers are notified synchronously as the factory creates beans. Keep
//! implementations cheap; they run inside the creation of every bean.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;

/// Observer of bean creation events.
///
/// All methods default to doing nothing.
///
/// # Examples
///
/// ```
/// use ferrous_beans::{BeanObserver, DefaultBeanFactory};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver(AtomicUsize);
///
/// impl BeanObserver for CountingObserver {
///     fn created(&self, _name: &str, _proxied: bool, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let observer = Arc::new(CountingObserver::default());
/// let factory = DefaultBeanFactory::builder().observer(observer.clone()).build();
/// assert_eq!(observer.0.load(Ordering::SeqCst), 0);
/// # drop(factory);
/// ```
pub trait BeanObserver: Send + Sync {
    /// A creation for `name` is starting.
    fn creating(&self, name: &str, type_name: &'static str) {
        let _ = (name, type_name);
    }

    /// A dependent creation pulled the early reference of `name`.
    fn early_exposed(&self, name: &str, proxied: bool) {
        let _ = (name, proxied);
    }

    /// `name` is finished and visible to every caller.
    fn created(&self, name: &str, proxied: bool, duration: Duration) {
        let _ = (name, proxied, duration);
    }

    /// The creation of `name` failed.
    fn creation_failed(&self, name: &str, error: &DiError) {
        let _ = (name, error);
    }
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn BeanObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn BeanObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn creating(&self, name: &str, type_name: &'static str) {
        for observer in &self.observers {
            observer.creating(name, type_name);
        }
    }

    #[inline]
    pub(crate) fn early_exposed(&self, name: &str, proxied: bool) {
        for observer in &self.observers {
            observer.early_exposed(name, proxied);
        }
    }

    #[inline]
    pub(crate) fn created(&self, name: &str, proxied: bool, duration: Duration) {
        for observer in &self.observers {
            observer.created(name, proxied, duration);
        }
    }

    #[inline]
    pub(crate) fn creation_failed(&self, name: &str, error: &DiError) {
        for observer in &self.observers {
            observer.creation_failed(name, error);
        }
    }
}

/// Observer that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Creates the observer; events go to whatever subscriber is installed.
    pub fn new() -> Self {
        Self
    }
}

impl BeanObserver for LoggingObserver {
    fn creating(&self, name: &str, type_name: &'static str) {
        tracing::info!(bean = name, type_name, "creating bean");
    }

    fn early_exposed(&self, name: &str, proxied: bool) {
        tracing::info!(bean = name, proxied, "early reference exposed to break a cycle");
    }

    fn created(&self, name: &str, proxied: bool, duration: Duration) {
        tracing::info!(
            bean = name,
            proxied,
            elapsed_ms = duration.as_secs_f64() * 1000.0,
            "bean created"
        );
    }

    fn creation_failed(&self, name: &str, error: &DiError) {
        tracing::error!(bean = name, error = %error, "bean creation failed");
    }
}
