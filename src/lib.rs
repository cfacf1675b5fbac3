//! # ferrous-beans
//!
//! A small singleton bean container with by-type field injection that
//! resolves circular dependencies, including cycles through intercepted
//! (proxied) beans.
//!
//! ## Features
//!
//! - **Named definitions**: register a type descriptor under a bean name, get
//!   back one shared instance per name
//! - **Field injection by type**: dependency slots are filled after
//!   construction with the single bean providing the slot's type or trait
//! - **Cycle breaking**: a three-tier singleton cache hands out early
//!   references while beans are still being populated
//! - **Consistent proxies**: interception wrappers are applied either when
//!   an early reference is exposed or after population, never both, so every
//!   holder sees the same identity
//! - **Thread-safe**: creation is serialized, and beans completed during a
//!   creation are published together once it returns, after which they are
//!   read lock-free of the creation path
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_beans::{
//!     AutoProxyCreator, Autowired, BeanDefinition, BeanFactory, DefaultBeanFactory, Interceptor,
//! };
//! use std::sync::Arc;
//!
//! trait Orders: Send + Sync {
//!     fn place(&self, id: u32) -> String;
//! }
//!
//! trait Payments: Send + Sync {
//!     fn charge(&self, id: u32) -> String;
//! }
//!
//! #[derive(Default)]
//! struct OrderService {
//!     payments: Autowired<dyn Payments>,
//! }
//!
//! impl Orders for OrderService {
//!     fn place(&self, id: u32) -> String {
//!         format!("order {} ({})", id, self.payments.get().unwrap().charge(id))
//!     }
//! }
//!
//! #[derive(Default)]
//! struct PaymentService {
//!     orders: Autowired<dyn Orders>,
//! }
//!
//! impl Payments for PaymentService {
//!     fn charge(&self, id: u32) -> String {
//!         format!("charged {}", id)
//!     }
//! }
//!
//! struct OrdersProxy {
//!     inner: Arc<dyn Orders>,
//!     interceptor: Interceptor,
//! }
//!
//! impl Orders for OrdersProxy {
//!     fn place(&self, id: u32) -> String {
//!         self.interceptor.invoke("place", || self.inner.place(id))
//!     }
//! }
//!
//! let factory = DefaultBeanFactory::builder()
//!     .post_processor(AutoProxyCreator::new())
//!     .build();
//!
//! factory.register(
//!     BeanDefinition::builder::<OrderService, _>(OrderService::default)
//!         .provides_intercepted::<dyn Orders, _, _>(
//!             |s| s as Arc<dyn Orders>,
//!             |inner, interceptor| Arc::new(OrdersProxy { inner, interceptor }) as Arc<dyn Orders>,
//!         )
//!         .autowire_trait::<dyn Payments, _>("payments", |s, p| s.payments.set(p))
//!         .build(),
//! );
//! factory.register(
//!     BeanDefinition::builder::<PaymentService, _>(PaymentService::default)
//!         .provides::<dyn Payments, _>(|s| s as Arc<dyn Payments>)
//!         .autowire_trait::<dyn Orders, _>("orders", |s, o| s.orders.set(o))
//!         .build(),
//! );
//!
//! let orders = factory.get_bean("orderService").unwrap();
//! assert!(orders.is_proxy());
//! assert!(factory.was_early_exposed("orderService"));
//!
//! // The payment service holds the very proxy that the factory returns.
//! let payments = factory.get_bean_as::<PaymentService>("paymentService").unwrap();
//! let held = payments.orders.get().unwrap();
//! assert!(Arc::ptr_eq(&held, &orders.capability::<dyn Orders>().unwrap()));
//! assert_eq!(held.place(7), "order 7 (charged 7)");
//! ```
//!
//! ## Lifecycle
//!
//! Each bean goes through instantiate → register early factory → populate
//! slots → finalize → promote. See [`DefaultBeanFactory`] for the threading
//! model, [`FactoryConfig`] for failure policies and
//! [`BeanObserver`] for lifecycle hooks.
//!
//! Beans that reference each other through `Arc` form reference cycles and
//! live as long as the process; the container never releases them.

pub mod autowired;
pub mod bean;
pub mod config;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod factory;
pub mod interception;
pub mod key;
pub mod observer;
pub mod prewarm;
pub mod traits;

mod internal;
mod registration;

pub use autowired::Autowired;
pub use bean::Bean;
pub use config::{FactoryConfig, FieldFailurePolicy, FIELD_FAILURE_ENV};
pub use definition::{BeanDefinition, BeanDefinitionBuilder, DependencySlot};
pub use descriptors::{BeanDescriptor, SlotDescriptor};
pub use error::{DiError, DiResult};
pub use factory::{BeanFactoryBuilder, DefaultBeanFactory};
pub use interception::{
    Advice, AutoProxyCreator, BeanPostProcessor, Interceptor, JoinPoint, LoggingAdvice,
};
pub use internal::BeanState;
pub use key::{key_of_trait, key_of_type, Key};
pub use observer::{BeanObserver, LoggingObserver};
pub use prewarm::{PrewarmReport, PrewarmResult};
pub use traits::{BeanFactory, BeanFactoryCore};
