//! Interception of bean capabilities.
//!
//! A [`BeanPostProcessor`] gets two chances to replace a bean: once when the
//! factory exposes an early reference to break a cycle, and once after the
//! bean's slots are populated. [`AutoProxyCreator`] uses both to substitute
//! a call-intercepting wrapper for beans whose type matches its predicate,
//! making sure a bean is wrapped at most once.
//!
//! Wrappers are ordinary types implementing the capability trait. They hold
//! the wrapped `Arc<dyn Trait>` plus an [`Interceptor`] and forward every
//! method through [`Interceptor::invoke`]:
//!
//! ```rust
//! use ferrous_beans::Interceptor;
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self, who: &str) -> String;
//! }
//!
//! struct GreeterProxy {
//!     inner: Arc<dyn Greeter>,
//!     interceptor: Interceptor,
//! }
//!
//! impl Greeter for GreeterProxy {
//!     fn greet(&self, who: &str) -> String {
//!         self.interceptor.invoke("greet", || self.inner.greet(who))
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::bean::Bean;
use crate::definition::BeanDefinition;
use crate::error::DiResult;
use crate::key::simple_type_name;

/// The intercepted call an [`Advice`] is running around.
#[derive(Debug, Clone, Copy)]
pub struct JoinPoint<'a> {
    /// Name of the bean whose capability is being called
    pub bean: &'a str,
    /// Capability method name
    pub method: &'static str,
}

/// Before/after actions run around every intercepted method call.
pub trait Advice: Send + Sync {
    /// Runs before the real method.
    fn before(&self, join_point: &JoinPoint<'_>) {
        let _ = join_point;
    }

    /// Runs after the real method returned.
    fn after(&self, join_point: &JoinPoint<'_>) {
        let _ = join_point;
    }
}

/// Advice that emits a `tracing` event before and after each call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAdvice;

impl Advice for LoggingAdvice {
    fn before(&self, join_point: &JoinPoint<'_>) {
        tracing::info!(bean = join_point.bean, method = join_point.method, "[AOP before]");
    }

    fn after(&self, join_point: &JoinPoint<'_>) {
        tracing::info!(bean = join_point.bean, method = join_point.method, "[AOP after]");
    }
}

/// Runs a bean's advice chain around a delegated call.
///
/// Each `before` runs in registration order, the delegate runs exactly once,
/// then each `after` runs in reverse order. The delegate's result is
/// returned unchanged.
#[derive(Clone)]
pub struct Interceptor {
    bean: Arc<str>,
    advice: Arc<[Arc<dyn Advice>]>,
}

impl Interceptor {
    /// Creates an interceptor for `bean` running `advice`.
    pub fn new(bean: &str, advice: Vec<Arc<dyn Advice>>) -> Self {
        Self {
            bean: Arc::from(bean),
            advice: advice.into(),
        }
    }

    /// Name of the intercepted bean.
    pub fn bean_name(&self) -> &str {
        &self.bean
    }

    /// Calls `call` between the before and after actions of every advice.
    pub fn invoke<R>(&self, method: &'static str, call: impl FnOnce() -> R) -> R {
        let join_point = JoinPoint { bean: &*self.bean, method };
        for advice in self.advice.iter() {
            advice.before(&join_point);
        }
        let result = call();
        for advice in self.advice.iter().rev() {
            advice.after(&join_point);
        }
        result
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("bean", &self.bean)
            .field("advice", &self.advice.len())
            .finish()
    }
}

/// Hook into the bean lifecycle.
///
/// Both methods default to returning the bean unchanged.
pub trait BeanPostProcessor: Send + Sync {
    /// Called when another creation in progress pulls the early reference
    /// of a bean that is not yet populated.
    fn early_bean_reference(&self, bean: Bean, definition: &BeanDefinition) -> DiResult<Bean> {
        let _ = definition;
        Ok(bean)
    }

    /// Called once the bean's slots are populated, unless an early
    /// reference was already exposed for it.
    fn post_process_after_initialization(
        &self,
        bean: Bean,
        definition: &BeanDefinition,
    ) -> DiResult<Bean> {
        let _ = definition;
        Ok(bean)
    }
}

pub(crate) fn apply_early_reference(
    processors: &[Arc<dyn BeanPostProcessor>],
    bean: Bean,
    definition: &BeanDefinition,
) -> DiResult<Bean> {
    processors
        .iter()
        .try_fold(bean, |bean, processor| processor.early_bean_reference(bean, definition))
}

pub(crate) fn apply_after_initialization(
    processors: &[Arc<dyn BeanPostProcessor>],
    bean: Bean,
    definition: &BeanDefinition,
) -> DiResult<Bean> {
    processors.iter().try_fold(bean, |bean, processor| {
        processor.post_process_after_initialization(bean, definition)
    })
}

type WrapPredicate = Arc<dyn Fn(&BeanDefinition) -> bool + Send + Sync>;

/// Post-processor that wraps matching beans in capability proxies.
///
/// A bean is wrapped when its definition matches the predicate (by default:
/// the simple type name ends with `Service`) and declares at least one
/// capability registered with a proxy constructor. Beans without such a
/// capability are never wrapped. Already wrapped beans pass through
/// unchanged, so the early-reference and finalize decisions cannot stack.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{AutoProxyCreator, BeanDefinition};
///
/// #[derive(Default)]
/// struct ReportService;
///
/// let creator = AutoProxyCreator::new();
/// // Matches the naming convention but declares no interceptable capability.
/// assert!(!creator.should_wrap(&BeanDefinition::of::<ReportService>()));
/// ```
#[derive(Clone)]
pub struct AutoProxyCreator {
    predicate: WrapPredicate,
    advice: Vec<Arc<dyn Advice>>,
}

impl AutoProxyCreator {
    /// Wraps types named `*Service` with [`LoggingAdvice`].
    pub fn new() -> Self {
        Self::with_suffix("Service")
    }

    /// Wraps types whose simple name ends with `suffix`, with [`LoggingAdvice`].
    pub fn with_suffix(suffix: &'static str) -> Self {
        Self {
            predicate: Arc::new(move |definition: &BeanDefinition| {
                simple_type_name(definition.type_name()).ends_with(suffix)
            }),
            advice: vec![Arc::new(LoggingAdvice)],
        }
    }

    /// Replaces the naming predicate.
    pub fn matching<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&BeanDefinition) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Replaces the advice chain.
    pub fn with_advice(mut self, advice: Vec<Arc<dyn Advice>>) -> Self {
        self.advice = advice;
        self
    }

    /// Appends an advice to the chain.
    pub fn add_advice(mut self, advice: Arc<dyn Advice>) -> Self {
        self.advice.push(advice);
        self
    }

    /// Returns true if beans of this definition get wrapped.
    pub fn should_wrap(&self, definition: &BeanDefinition) -> bool {
        definition.is_interceptable() && (self.predicate)(definition)
    }

    /// Wraps `bean` if its definition qualifies and it is not a proxy yet.
    pub fn wrap(&self, bean: Bean, definition: &BeanDefinition) -> Bean {
        if bean.is_proxy() || !self.should_wrap(definition) {
            return bean;
        }
        let interceptor = Interceptor::new(bean.name(), self.advice.clone());
        match definition.create_proxy(&bean, &interceptor) {
            Some(proxy) => {
                tracing::debug!(bean = bean.name(), type_name = bean.type_name(), "wrapped bean in proxy");
                proxy
            }
            None => bean,
        }
    }
}

impl Default for AutoProxyCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AutoProxyCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoProxyCreator")
            .field("advice", &self.advice.len())
            .finish()
    }
}

impl BeanPostProcessor for AutoProxyCreator {
    fn early_bean_reference(&self, bean: Bean, definition: &BeanDefinition) -> DiResult<Bean> {
        Ok(self.wrap(bean, definition))
    }

    fn post_process_after_initialization(
        &self,
        bean: Bean,
        definition: &BeanDefinition,
    ) -> DiResult<Bean> {
        Ok(self.wrap(bean, definition))
    }
}
