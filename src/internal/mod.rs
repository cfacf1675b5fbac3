//! Internal implementation details.

pub(crate) mod tiered_cache;

pub use tiered_cache::BeanState;
pub(crate) use tiered_cache::{EarlyFactory, TieredCache};

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "ahash")]
pub(crate) type Set<K> = std::collections::HashSet<K, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Set<K> = std::collections::HashSet<K>;
