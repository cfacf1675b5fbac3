//! Type-erased handles to managed instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::internal::Map;
use crate::key::{key_of_trait, Key};

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// A managed instance.
///
/// `Bean` is a cheap, clonable handle. Two handles refer to the same managed
/// object when [`Bean::ptr_eq`] holds, and every view handed out by a bean
/// (its concrete `Arc<T>` or a capability `Arc<dyn Trait>`) is created once,
/// so holders comparing views with `Arc::ptr_eq` agree with `Bean::ptr_eq`.
///
/// A proxied bean exposes only its capability views. Its concrete type is
/// hidden behind the interception wrapper, so [`Bean::downcast`] returns
/// `None` for it.
#[derive(Clone)]
pub struct Bean {
    inner: Arc<BeanInner>,
}

struct BeanInner {
    name: String,
    type_name: &'static str,
    type_key: Key,
    target: Option<AnyArc>,
    // Capability views, each stored as Arc<Arc<dyn Trait>>
    views: Map<Key, AnyArc>,
    proxied: bool,
}

impl Bean {
    pub(crate) fn new(
        name: &str,
        type_name: &'static str,
        type_key: Key,
        target: AnyArc,
        views: Map<Key, AnyArc>,
    ) -> Self {
        Self {
            inner: Arc::new(BeanInner {
                name: name.to_owned(),
                type_name,
                type_key,
                target: Some(target),
                views,
                proxied: false,
            }),
        }
    }

    /// A new identity for the same bean, exposing `views` in place of the
    /// raw capability views and hiding the concrete target.
    pub(crate) fn proxied_with(&self, views: Map<Key, AnyArc>) -> Self {
        Self {
            inner: Arc::new(BeanInner {
                name: self.inner.name.clone(),
                type_name: self.inner.type_name,
                type_key: self.inner.type_key,
                target: None,
                views,
                proxied: true,
            }),
        }
    }

    /// Bean name this instance was created under.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Concrete type name of the underlying object.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    /// Returns true if this handle is an interception wrapper.
    pub fn is_proxy(&self) -> bool {
        self.inner.proxied
    }

    /// Returns true if both handles denote the same managed identity.
    pub fn ptr_eq(a: &Bean, b: &Bean) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Returns the concrete object, unless the type differs or the bean is
    /// proxied.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.target.clone()?.downcast::<T>().ok()
    }

    /// Returns the capability view for `dyn Trait`, proxied or not.
    pub fn capability<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let view = self.inner.views.get(&key_of_trait::<T>())?;
        view.clone().downcast::<Arc<T>>().ok().map(|arc| (*arc).clone())
    }

    /// Returns true if a view for `key` is reachable through this handle.
    pub fn exposes(&self, key: &Key) -> bool {
        self.view(key).is_some()
    }

    /// Erased view for a key: the concrete target for the bean's own type
    /// key, the capability view otherwise.
    pub(crate) fn view(&self, key: &Key) -> Option<AnyArc> {
        if *key == self.inner.type_key {
            return self.inner.target.clone();
        }
        self.inner.views.get(key).cloned()
    }

    pub(crate) fn target(&self) -> Option<&AnyArc> {
        self.inner.target.as_ref()
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("name", &self.inner.name)
            .field("type", &self.inner.type_name)
            .field("proxied", &self.inner.proxied)
            .finish()
    }
}
