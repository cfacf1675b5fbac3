//! The bean factory: singleton lifecycle orchestration.
//!
//! Creating a bean runs instantiate → register early factory → populate
//! slots → finalize → promote. Population resolves each slot by type and may
//! recurse into other creations; a recursive request for a bean that is
//! still being populated is answered from its early factory, which is what
//! breaks dependency cycles.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{ReentrantMutex, RwLock};
use tracing::{debug, trace, warn};

use crate::bean::Bean;
use crate::config::{FactoryConfig, FieldFailurePolicy};
use crate::definition::BeanDefinition;
use crate::descriptors::BeanDescriptor;
use crate::error::{DiError, DiResult};
use crate::interception::{apply_after_initialization, apply_early_reference, BeanPostProcessor};
use crate::internal::{BeanState, EarlyFactory, TieredCache};
use crate::key::Key;
use crate::observer::Observers;
use crate::registration::Registry;
use crate::traits::BeanFactoryCore;

mod builder;
mod resolver;

pub use builder::BeanFactoryBuilder;

/// Singleton bean factory with cycle-breaking field injection.
///
/// Definitions are registered by name; [`get_bean`](Self::get_bean) returns
/// the single, fully initialized (and possibly proxied) instance for a name,
/// creating it and its dependencies on first request.
///
/// # Thread Safety
///
/// The factory is `Send + Sync` and cheap to clone. Published singletons are
/// read without taking the creation lock. Creations are serialized by one
/// reentrant lock, so each name is produced exactly once. Recursive creation
/// on the same thread re-enters the lock. Beans completed during a creation
/// are published together when the outermost creation returns, so other
/// threads never reach an early reference of a bean that is still being
/// populated, not even through a finished cycle partner.
///
/// # Failures
///
/// A failed creation leaves no trace of the failed bean. When the failed
/// bean had already handed out its early reference, the beans completed in
/// the same creation that received it are dropped before publication and
/// will be created afresh on their next request. A published singleton is
/// never removed, so every handle returned by `get_bean` stays the singleton
/// for its name.
///
/// # Examples
///
/// ```
/// use ferrous_beans::{Autowired, BeanDefinition, BeanFactory, DefaultBeanFactory};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct A { b: Autowired<B> }
/// #[derive(Default)]
/// struct B { a: Autowired<A> }
///
/// let factory = DefaultBeanFactory::new();
/// factory.register_bean_definition(
///     "a",
///     BeanDefinition::builder::<A, _>(A::default)
///         .autowire::<B, _>("b", |a, b| a.b.set(b))
///         .build(),
/// );
/// factory.register_bean_definition(
///     "b",
///     BeanDefinition::builder::<B, _>(B::default)
///         .autowire::<A, _>("a", |b, a| b.a.set(a))
///         .build(),
/// );
///
/// let a = factory.get_bean_as::<A>("a").unwrap();
/// let b = factory.get_bean_as::<B>("b").unwrap();
/// assert!(Arc::ptr_eq(&a.b.get().unwrap(), &b));
/// assert!(Arc::ptr_eq(&b.a.get().unwrap(), &a));
/// ```
#[derive(Clone)]
pub struct DefaultBeanFactory {
    inner: Arc<FactoryInner>,
}

pub(crate) struct FactoryInner {
    registry: RwLock<Registry>,
    cache: TieredCache,
    // nesting depth of creations on the thread holding the lock
    creation_lock: ReentrantMutex<Cell<usize>>,
    processors: Arc<[Arc<dyn BeanPostProcessor>]>,
    observers: Arc<Observers>,
    config: FactoryConfig,
}

impl DefaultBeanFactory {
    /// Factory with default configuration and no post-processors.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a factory.
    pub fn builder() -> BeanFactoryBuilder {
        BeanFactoryBuilder::new()
    }

    pub(crate) fn from_parts(
        config: FactoryConfig,
        processors: Vec<Arc<dyn BeanPostProcessor>>,
        observers: Observers,
    ) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                registry: RwLock::new(Registry::new()),
                cache: TieredCache::new(),
                creation_lock: ReentrantMutex::new(Cell::new(0)),
                processors: processors.into(),
                observers: Arc::new(observers),
                config,
            }),
        }
    }

    /// Registers `definition` under `name`, replacing any previous one.
    pub fn register_bean_definition(&self, name: impl Into<String>, definition: BeanDefinition) {
        let name = name.into();
        let type_name = definition.type_name();
        if let Some(previous) = self.inner.registry.write().insert(name.clone(), definition) {
            warn!(
                bean = %name,
                previous = previous.type_name(),
                type_name,
                "overriding bean definition"
            );
        } else {
            debug!(bean = %name, type_name, "registered bean definition");
        }
    }

    /// Registers `definition` under its default name and returns that name.
    pub fn register(&self, definition: BeanDefinition) -> String {
        let name = definition.default_name();
        self.register_bean_definition(name.clone(), definition);
        name
    }

    /// Returns the singleton registered as `name`, creating it on first use.
    pub fn get_bean(&self, name: &str) -> DiResult<Bean> {
        self.obtain(name)
    }

    /// Returns the single bean that provides `key`.
    pub fn get_bean_by_key(&self, key: &Key) -> DiResult<Bean> {
        self.resolve_by_type(key)
    }

    /// Returns true if a definition is registered under `name`.
    pub fn contains_bean_definition(&self, name: &str) -> bool {
        self.inner.registry.read().contains(name)
    }

    /// Registered bean names in registration order.
    pub fn bean_definition_names(&self) -> Vec<String> {
        self.inner.registry.read().names()
    }

    /// Number of registered definitions.
    pub fn bean_definition_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Returns true once `name` is a published singleton.
    pub fn contains_singleton(&self, name: &str) -> bool {
        self.inner.cache.get_finished(name).is_some()
    }

    /// Number of published singletons.
    pub fn singleton_count(&self) -> usize {
        self.inner.cache.finished_len()
    }

    /// Names of published singletons, in no particular order.
    pub fn singleton_names(&self) -> Vec<String> {
        self.inner.cache.finished_names()
    }

    /// Returns true if an early reference of `name` was handed out while it
    /// was being populated, i.e. it took part in a dependency cycle.
    pub fn was_early_exposed(&self, name: &str) -> bool {
        self.inner.cache.was_early_exposed(name)
    }

    /// Where `name` currently sits in the singleton cache.
    pub fn bean_state(&self, name: &str) -> BeanState {
        self.inner.cache.state(name)
    }

    /// Descriptors of every registered bean, in registration order.
    pub fn bean_descriptors(&self) -> Vec<BeanDescriptor> {
        let registry = self.inner.registry.read();
        registry
            .iter()
            .map(|(name, definition)| BeanDescriptor::new(name, definition, self.inner.cache.state(name)))
            .collect()
    }

    /// The active configuration.
    pub fn config(&self) -> &FactoryConfig {
        &self.inner.config
    }

    fn definition(&self, name: &str) -> DiResult<Arc<BeanDefinition>> {
        self.inner
            .registry
            .read()
            .get(name)
            .ok_or_else(|| DiError::DefinitionNotFound(name.to_owned()))
    }

    /// Cache lookup, then creation on a miss.
    pub(crate) fn obtain(&self, name: &str) -> DiResult<Bean> {
        if let Some(bean) = self.inner.cache.get_finished(name) {
            trace!(bean = name, "singleton cache hit");
            return Ok(bean);
        }

        let depth = self.inner.creation_lock.lock();
        if let Some(bean) = self.inner.cache.get(name)? {
            trace!(bean = name, proxied = bean.is_proxy(), "resolved from cache");
            return Ok(bean);
        }

        let result = {
            let _nested = CreationDepth::enter(&depth);
            self.create_bean(name)
        };
        if depth.get() == 0 {
            let published = self.inner.cache.publish();
            trace!(bean = name, published, "published completed singletons");
        }
        result
    }

    fn create_bean(&self, name: &str) -> DiResult<Bean> {
        let definition = self.definition(name)?;
        let observed = self.inner.observers.has_observers();
        let started = Instant::now();
        if observed {
            self.inner.observers.creating(name, definition.type_name());
        }

        match self.do_create_bean(name, &definition) {
            Ok(bean) => {
                if observed {
                    self.inner.observers.created(name, bean.is_proxy(), started.elapsed());
                }
                Ok(bean)
            }
            Err(err) => {
                let evicted = self.inner.cache.discard(name);
                debug!(bean = name, error = %err, "discarded partially created bean");
                if !evicted.is_empty() {
                    warn!(
                        bean = name,
                        evicted = ?evicted,
                        "dropped beans holding an early reference of a failed bean"
                    );
                }
                if observed {
                    self.inner.observers.creation_failed(name, &err);
                }
                Err(err)
            }
        }
    }

    fn do_create_bean(&self, name: &str, definition: &Arc<BeanDefinition>) -> DiResult<Bean> {
        let raw = definition.instantiate(name).map_err(|reason| DiError::InstantiationFailed {
            bean: name.to_owned(),
            reason,
        })?;
        debug!(bean = name, type_name = definition.type_name(), "instantiated raw bean");

        self.inner
            .cache
            .add_factory(name, self.early_reference_factory(raw.clone(), definition));

        self.populate_bean(name, definition, &raw)?;

        let exposed = match self.inner.cache.early_exposed_reference(name) {
            Some(early) => {
                debug!(bean = name, proxied = early.is_proxy(), "using early reference as singleton");
                early
            }
            None => self.initialize_bean(raw, definition)?,
        };

        let visible = self.inner.cache.promote(name, exposed);
        debug!(bean = name, proxied = visible.is_proxy(), "promoted to singleton");
        Ok(visible)
    }

    fn early_reference_factory(&self, raw: Bean, definition: &Arc<BeanDefinition>) -> EarlyFactory {
        let processors = Arc::clone(&self.inner.processors);
        let observers = Arc::clone(&self.inner.observers);
        let definition = Arc::clone(definition);
        Box::new(move || {
            let early = apply_early_reference(&processors, raw, &definition)?;
            observers.early_exposed(early.name(), early.is_proxy());
            Ok(early)
        })
    }

    /// Fills every slot of `raw` in declaration order.
    ///
    /// Resolution errors abort the creation. Assignment errors follow the
    /// configured [`FieldFailurePolicy`].
    fn populate_bean(&self, name: &str, definition: &BeanDefinition, raw: &Bean) -> DiResult<()> {
        for slot in definition.slots() {
            let dependency = self.resolve_by_type(&slot.required())?;
            if let Err(reason) = slot.assign(raw, &dependency) {
                let err = DiError::FieldAssignmentFailed {
                    bean: name.to_owned(),
                    slot: slot.name(),
                    reason,
                };
                match self.inner.config.field_failure {
                    FieldFailurePolicy::LogAndContinue => {
                        warn!(bean = name, slot = slot.name(), error = %err, "dependency slot left unset");
                    }
                    FieldFailurePolicy::Propagate => return Err(err),
                }
            } else {
                self.inner.cache.register_dependent(dependency.name(), name);
                trace!(bean = name, slot = slot.name(), dependency = dependency.name(), "slot populated");
            }
        }
        Ok(())
    }

    fn initialize_bean(&self, raw: Bean, definition: &BeanDefinition) -> DiResult<Bean> {
        apply_after_initialization(&self.inner.processors, raw, definition)
    }
}

/// Counts nested creations; the outermost one publishes when the count
/// drops back to zero. Unwinding out of a producer still restores the count.
struct CreationDepth<'a>(&'a Cell<usize>);

impl<'a> CreationDepth<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for CreationDepth<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Default for DefaultBeanFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanFactoryCore for DefaultBeanFactory {
    fn get_bean(&self, name: &str) -> DiResult<Bean> {
        self.obtain(name)
    }

    fn get_bean_by_key(&self, key: &Key) -> DiResult<Bean> {
        self.resolve_by_type(key)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.contains_bean_definition(name)
    }
}
