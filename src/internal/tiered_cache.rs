//! Three-tier singleton cache used to break dependency cycles.
//!
//! Per bean name the cache moves through
//! `Unknown -> FactoryPending -> EarlyExposed -> Finished`, or straight from
//! `FactoryPending` to `Finished` when nothing asked for the bean while it
//! was being populated. `Finished` is terminal: once published, an entry is
//! never overwritten or removed.
//!
//! Beans completed inside a creation that is still running are staged, not
//! published. A cycle member finishes while the bean it holds is still being
//! populated, so staged beans only become visible to lock-free readers when
//! the outermost creation returns ([`TieredCache::publish`]). A failed
//! creation moves its own name back to `Unknown` and drops the staged beans
//! that (transitively) received its early reference
//! ([`TieredCache::discard`]).

use parking_lot::{Mutex, RwLock};

use crate::bean::Bean;
use crate::error::DiResult;
use crate::internal::{Map, Set};

/// Producer of a bean's early reference, registered right after the raw
/// instance exists and consumed at most once.
pub(crate) type EarlyFactory = Box<dyn FnOnce() -> DiResult<Bean> + Send>;

/// Where a bean name currently sits in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BeanState {
    /// Never created, or its creation failed
    Unknown,
    /// Raw instance exists; its early-reference factory has not been called
    FactoryPending,
    /// A dependent creation pulled the early reference; population ongoing
    EarlyExposed,
    /// Fully initialized singleton
    Finished,
}

#[derive(Default)]
pub(crate) struct TieredCache {
    finished: RwLock<Map<String, Bean>>,
    // completed during the running creation, not yet published
    staged: Mutex<Map<String, Bean>>,
    early: Mutex<Map<String, Bean>>,
    factories: Mutex<Map<String, EarlyFactory>>,
    early_exposed: Mutex<Set<String>>,
    // dependency name -> names of beans it was injected into
    dependents: Mutex<Map<String, Set<String>>>,
}

impl TieredCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Published singletons only.
    #[inline]
    pub(crate) fn get_finished(&self, name: &str) -> Option<Bean> {
        self.finished.read().get(name).cloned()
    }

    /// Reads through every tier, staged beans included.
    ///
    /// A pending factory is consumed here: its result moves into the early
    /// tier and the name is recorded as early-exposed. `Ok(None)` means the
    /// bean has not been created yet.
    pub(crate) fn get(&self, name: &str) -> DiResult<Option<Bean>> {
        if let Some(bean) = self.finished.read().get(name) {
            return Ok(Some(bean.clone()));
        }
        if let Some(bean) = self.staged.lock().get(name) {
            return Ok(Some(bean.clone()));
        }
        if let Some(bean) = self.early.lock().get(name) {
            return Ok(Some(bean.clone()));
        }

        // Lock released before the factory runs; it may call into processors.
        let factory = self.factories.lock().remove(name);
        match factory {
            Some(factory) => {
                let early = factory()?;
                self.early.lock().insert(name.to_owned(), early.clone());
                self.early_exposed.lock().insert(name.to_owned());
                tracing::debug!(bean = name, proxied = early.is_proxy(), "exposed early reference");
                Ok(Some(early))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn add_factory(&self, name: &str, factory: EarlyFactory) {
        self.factories.lock().insert(name.to_owned(), factory);
    }

    /// The early reference handed out for `name`, if one was exposed.
    pub(crate) fn early_exposed_reference(&self, name: &str) -> Option<Bean> {
        if !self.early_exposed.lock().contains(name) {
            return None;
        }
        self.early.lock().get(name).cloned()
    }

    pub(crate) fn was_early_exposed(&self, name: &str) -> bool {
        self.early_exposed.lock().contains(name)
    }

    /// Stages `bean` as completed and drops its early entries.
    ///
    /// An existing finished or staged entry is never replaced; if one exists
    /// it is returned instead of `bean`.
    pub(crate) fn promote(&self, name: &str, bean: Bean) -> Bean {
        let published = self.finished.read().get(name).cloned();
        let visible = match published {
            Some(existing) => existing,
            None => self
                .staged
                .lock()
                .entry(name.to_owned())
                .or_insert(bean)
                .clone(),
        };
        self.early.lock().remove(name);
        self.factories.lock().remove(name);
        visible
    }

    /// Makes every staged bean visible in the finished tier.
    ///
    /// Called once the outermost creation has returned; returns how many
    /// beans were published.
    pub(crate) fn publish(&self) -> usize {
        let staged = std::mem::take(&mut *self.staged.lock());
        self.dependents.lock().clear();
        let published = staged.len();
        let mut finished = self.finished.write();
        for (name, bean) in staged {
            finished.entry(name).or_insert(bean);
        }
        published
    }

    /// Records that `dependency` was injected into `dependent`.
    pub(crate) fn register_dependent(&self, dependency: &str, dependent: &str) {
        self.dependents
            .lock()
            .entry(dependency.to_owned())
            .or_default()
            .insert(dependent.to_owned());
    }

    /// Removes every unpublished trace of `name` after a failed creation.
    ///
    /// If an early reference of `name` was handed out, staged beans that
    /// (transitively) had it injected are dropped as well; their names are
    /// returned. Published singletons are never touched.
    pub(crate) fn discard(&self, name: &str) -> Vec<String> {
        self.factories.lock().remove(name);
        self.early.lock().remove(name);
        let exposed = self.early_exposed.lock().remove(name);

        let mut evicted = Vec::new();
        if !exposed {
            self.dependents.lock().remove(name);
            return evicted;
        }
        let mut pending = vec![name.to_owned()];
        while let Some(current) = pending.pop() {
            let dependents = self.dependents.lock().remove(&current).unwrap_or_default();
            for dependent in dependents {
                if self.staged.lock().remove(&dependent).is_some() {
                    self.early_exposed.lock().remove(&dependent);
                    evicted.push(dependent.clone());
                    pending.push(dependent);
                }
            }
        }
        evicted
    }

    /// Where `name` sits. A staged bean still reports the in-flight state it
    /// had before completing, since other threads cannot see it yet.
    pub(crate) fn state(&self, name: &str) -> BeanState {
        if self.finished.read().contains_key(name) {
            BeanState::Finished
        } else if self.staged.lock().contains_key(name) {
            if self.was_early_exposed(name) {
                BeanState::EarlyExposed
            } else {
                BeanState::FactoryPending
            }
        } else if self.early.lock().contains_key(name) {
            BeanState::EarlyExposed
        } else if self.factories.lock().contains_key(name) {
            BeanState::FactoryPending
        } else {
            BeanState::Unknown
        }
    }

    pub(crate) fn finished_len(&self) -> usize {
        self.finished.read().len()
    }

    pub(crate) fn finished_names(&self) -> Vec<String> {
        self.finished.read().keys().cloned().collect()
    }
}
