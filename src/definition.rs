//! Bean definitions: how to produce, view and wire a managed type.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::bean::{AnyArc, Bean};
use crate::interception::Interceptor;
use crate::internal::Map;
use crate::key::{default_bean_name, key_of_trait, key_of_type, Key};

type Producer = Arc<dyn Fn() -> Result<AnyArc, String> + Send + Sync>;
type Caster = Arc<dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync>;
type ProxyCtor = Arc<dyn Fn(&AnyArc, Interceptor) -> Option<AnyArc> + Send + Sync>;
type Assigner = Arc<dyn Fn(&AnyArc, AnyArc) -> Result<(), String> + Send + Sync>;

/// A capability interface declared by a definition.
#[derive(Clone)]
struct Capability {
    key: Key,
    cast: Caster,
    proxy: Option<ProxyCtor>,
}

/// A dependency slot declared by a definition, filled by type after the
/// bean is instantiated.
#[derive(Clone)]
pub struct DependencySlot {
    name: &'static str,
    required: Key,
    assign: Assigner,
}

impl DependencySlot {
    /// Slot identifier, usually the field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key the slot is resolved by.
    pub fn required(&self) -> Key {
        self.required
    }

    /// Writes the `dependency` bean's view for this slot into `owner`.
    pub(crate) fn assign(&self, owner: &Bean, dependency: &Bean) -> Result<(), String> {
        let target = owner
            .target()
            .ok_or_else(|| format!("bean '{}' is a proxy and cannot be populated", owner.name()))?;
        let value = dependency.view(&self.required).ok_or_else(|| {
            format!(
                "bean '{}' does not expose {}{}",
                dependency.name(),
                self.required.display_name(),
                if dependency.is_proxy() { " (proxied)" } else { "" }
            )
        })?;
        (self.assign)(target, value)
    }
}

impl fmt::Debug for DependencySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencySlot")
            .field("name", &self.name)
            .field("required", &self.required.display_name())
            .finish()
    }
}

/// Type descriptor of a managed bean.
///
/// A definition knows how to produce a raw instance with no arguments, which
/// capability interfaces the instance can be viewed as (and which of those
/// can be proxied), and the ordered dependency slots to fill by type.
/// Definitions are immutable once built.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{Autowired, BeanDefinition, key_of_trait};
/// use std::sync::Arc;
///
/// trait UserRepository: Send + Sync {
///     fn find(&self, id: u32) -> String;
/// }
///
/// #[derive(Default)]
/// struct PgUserRepository;
///
/// impl UserRepository for PgUserRepository {
///     fn find(&self, id: u32) -> String {
///         format!("user-{}", id)
///     }
/// }
///
/// #[derive(Default)]
/// struct UserController {
///     repository: Autowired<dyn UserRepository>,
/// }
///
/// let repository = BeanDefinition::builder::<PgUserRepository, _>(PgUserRepository::default)
///     .provides::<dyn UserRepository, _>(|r| r as Arc<dyn UserRepository>)
///     .build();
/// assert!(repository.provides(&key_of_trait::<dyn UserRepository>()));
/// assert_eq!(repository.default_name(), "pgUserRepository");
///
/// let controller = BeanDefinition::builder::<UserController, _>(UserController::default)
///     .autowire_trait::<dyn UserRepository, _>("repository", |c, repo| c.repository.set(repo))
///     .build();
/// assert_eq!(controller.slots().len(), 1);
/// assert_eq!(controller.slots()[0].name(), "repository");
/// ```
#[derive(Clone)]
pub struct BeanDefinition {
    type_id: TypeId,
    type_name: &'static str,
    producer: Producer,
    capabilities: Vec<Capability>,
    slots: Vec<DependencySlot>,
}

impl BeanDefinition {
    /// Starts a definition for `T` produced by `produce`.
    pub fn builder<T, F>(produce: F) -> BeanDefinitionBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::try_builder::<T, _>(move || Ok(produce()))
    }

    /// Starts a definition for `T` whose producer may fail.
    pub fn try_builder<T, F>(produce: F) -> BeanDefinitionBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        BeanDefinitionBuilder {
            definition: BeanDefinition {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                producer: Arc::new(move || produce().map(|value| Arc::new(value) as AnyArc)),
                capabilities: Vec::new(),
                slots: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Definition for a `Default` type with no capabilities and no slots.
    pub fn of<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::builder::<T, _>(T::default).build()
    }

    /// Concrete type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Concrete type id.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Key of the concrete type.
    pub fn type_key(&self) -> Key {
        Key::Type(self.type_id, self.type_name)
    }

    /// Bean name derived from the type: `UserService` becomes `userService`.
    pub fn default_name(&self) -> String {
        default_bean_name(self.type_name)
    }

    /// Returns true if beans of this definition satisfy `key`.
    pub fn provides(&self, key: &Key) -> bool {
        *key == self.type_key() || self.capabilities.iter().any(|c| c.key == *key)
    }

    /// Declared capability interfaces, in declaration order.
    pub fn capability_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.capabilities.iter().map(|c| c.key)
    }

    /// Capabilities that carry a proxy constructor.
    pub fn intercepted_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.capabilities.iter().filter(|c| c.proxy.is_some()).map(|c| c.key)
    }

    /// Returns true if at least one capability can be proxied.
    pub fn is_interceptable(&self) -> bool {
        self.capabilities.iter().any(|c| c.proxy.is_some())
    }

    /// Dependency slots, in declaration order.
    pub fn slots(&self) -> &[DependencySlot] {
        &self.slots
    }

    /// Produces a raw, unpopulated bean named `name`.
    pub(crate) fn instantiate(&self, name: &str) -> Result<Bean, String> {
        let target = (self.producer)()?;
        let mut views: Map<Key, AnyArc> = Map::default();
        for capability in &self.capabilities {
            let view = (capability.cast)(&target).ok_or_else(|| {
                format!("{} cannot be viewed as {}", self.type_name, capability.key.display_name())
            })?;
            views.insert(capability.key, view);
        }
        Ok(Bean::new(name, self.type_name, self.type_key(), target, views))
    }

    /// Builds a proxy identity for `bean`: interceptable capabilities are
    /// wrapped with `interceptor`, the others are forwarded as they are.
    ///
    /// Returns `None` when the bean is already a proxy, when no capability
    /// is interceptable, or when the bean lacks one of the declared views.
    pub fn create_proxy(&self, bean: &Bean, interceptor: &Interceptor) -> Option<Bean> {
        if bean.is_proxy() || !self.is_interceptable() {
            return None;
        }
        let mut views: Map<Key, AnyArc> = Map::default();
        for capability in &self.capabilities {
            let view = bean.view(&capability.key)?;
            let view = match &capability.proxy {
                Some(proxy) => proxy(&view, interceptor.clone())?,
                None => view,
            };
            views.insert(capability.key, view);
        }
        Some(bean.proxied_with(views))
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("type", &self.type_name)
            .field(
                "capabilities",
                &self.capabilities.iter().map(|c| c.key.display_name()).collect::<Vec<_>>(),
            )
            .field("slots", &self.slots)
            .finish()
    }
}

/// Typed builder for a [`BeanDefinition`].
pub struct BeanDefinitionBuilder<T> {
    definition: BeanDefinition,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> BeanDefinitionBuilder<T> {
    /// Declares capability `C`, viewed through `cast`. Never proxied.
    pub fn provides<C, F>(mut self, cast: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.definition.capabilities.push(Capability {
            key: key_of_trait::<C>(),
            cast: caster::<T, C, F>(cast),
            proxy: None,
        });
        self
    }

    /// Declares capability `C` and how to wrap it in an intercepting proxy.
    pub fn provides_intercepted<C, F, P>(mut self, cast: F, proxy: P) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
        P: Fn(Arc<C>, Interceptor) -> Arc<C> + Send + Sync + 'static,
    {
        let proxy: ProxyCtor = Arc::new(move |view: &AnyArc, interceptor: Interceptor| {
            let inner = view.clone().downcast::<Arc<C>>().ok()?;
            Some(Arc::new(proxy((*inner).clone(), interceptor)) as AnyArc)
        });
        self.definition.capabilities.push(Capability {
            key: key_of_trait::<C>(),
            cast: caster::<T, C, F>(cast),
            proxy: Some(proxy),
        });
        self
    }

    /// Declares a slot filled with the single bean of concrete type `D`.
    pub fn autowire<D, F>(self, slot: &'static str, set: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&T, Arc<D>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.slot(slot, key_of_type::<D>(), move |owner: &T, value: AnyArc| {
            let value = value
                .downcast::<D>()
                .map_err(|_| format!("resolved value is not a {}", std::any::type_name::<D>()))?;
            set(owner, value)
        })
    }

    /// Declares a slot filled with the single bean providing capability `D`.
    pub fn autowire_trait<D, F>(self, slot: &'static str, set: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&T, Arc<D>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.slot(slot, key_of_trait::<D>(), move |owner: &T, value: AnyArc| {
            let value = value
                .downcast::<Arc<D>>()
                .map_err(|_| format!("resolved value is not a {}", std::any::type_name::<D>()))?;
            set(owner, (*value).clone())
        })
    }

    fn slot<F>(mut self, name: &'static str, required: Key, set: F) -> Self
    where
        F: Fn(&T, AnyArc) -> Result<(), String> + Send + Sync + 'static,
    {
        let assign: Assigner = Arc::new(move |target: &AnyArc, value: AnyArc| {
            let owner = target
                .downcast_ref::<T>()
                .ok_or_else(|| format!("slot owner is not a {}", std::any::type_name::<T>()))?;
            set(owner, value)
        });
        self.definition.slots.push(DependencySlot { name, required, assign });
        self
    }

    /// Finishes the definition.
    pub fn build(self) -> BeanDefinition {
        self.definition
    }
}

fn caster<T, C, F>(cast: F) -> Caster
where
    T: Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
    F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
{
    Arc::new(move |target: &AnyArc| {
        let typed = target.clone().downcast::<T>().ok()?;
        Some(Arc::new(cast(typed)) as AnyArc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autowired::Autowired;

    trait Store: Send + Sync {
        fn id(&self) -> u32;
    }

    #[derive(Default)]
    struct MemoryStore;

    impl Store for MemoryStore {
        fn id(&self) -> u32 {
            7
        }
    }

    #[derive(Default)]
    struct Consumer {
        store: Autowired<dyn Store>,
        concrete: Autowired<MemoryStore>,
    }

    fn store_definition() -> BeanDefinition {
        BeanDefinition::builder::<MemoryStore, _>(MemoryStore::default)
            .provides::<dyn Store, _>(|s| s as Arc<dyn Store>)
            .build()
    }

    #[test]
    fn provides_own_type_and_capabilities() {
        let definition = store_definition();
        assert!(definition.provides(&key_of_type::<MemoryStore>()));
        assert!(definition.provides(&key_of_trait::<dyn Store>()));
        assert!(!definition.provides(&key_of_type::<Consumer>()));
        assert!(!definition.is_interceptable());
    }

    #[test]
    fn instantiate_builds_views_for_each_capability() {
        let bean = store_definition().instantiate("memoryStore").unwrap();
        assert_eq!(bean.name(), "memoryStore");
        assert_eq!(bean.capability::<dyn Store>().unwrap().id(), 7);
        assert!(bean.downcast::<MemoryStore>().is_some());
    }

    #[test]
    fn failing_producer_reports_reason() {
        let definition =
            BeanDefinition::try_builder::<MemoryStore, _>(|| Err("disk offline".to_string())).build();
        assert_eq!(definition.instantiate("x").unwrap_err(), "disk offline");
    }

    #[test]
    fn slots_assign_views_by_key() {
        let consumer = BeanDefinition::builder::<Consumer, _>(Consumer::default)
            .autowire_trait::<dyn Store, _>("store", |c, s| c.store.set(s))
            .autowire::<MemoryStore, _>("concrete", |c, s| c.concrete.set(s))
            .build();
        let owner = consumer.instantiate("consumer").unwrap();
        let dependency = store_definition().instantiate("memoryStore").unwrap();

        for slot in consumer.slots() {
            slot.assign(&owner, &dependency).unwrap();
        }

        let typed = owner.downcast::<Consumer>().unwrap();
        assert!(Arc::ptr_eq(
            &typed.store.get().unwrap(),
            &dependency.capability::<dyn Store>().unwrap()
        ));
        assert!(Arc::ptr_eq(
            &typed.concrete.get().unwrap(),
            &dependency.downcast::<MemoryStore>().unwrap()
        ));

        // Second write into a filled slot is rejected.
        assert!(consumer.slots()[0].assign(&owner, &dependency).is_err());
    }
}
