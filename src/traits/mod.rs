//! Core traits for bean lookup.

mod bean_factory;

pub use bean_factory::{BeanFactory, BeanFactoryCore};
