//! Factory construction.

use std::sync::Arc;

use super::DefaultBeanFactory;
use crate::config::FactoryConfig;
use crate::interception::BeanPostProcessor;
use crate::observer::{BeanObserver, Observers};

/// Builder for [`DefaultBeanFactory`].
///
/// # Examples
///
/// ```
/// use ferrous_beans::{AutoProxyCreator, DefaultBeanFactory, FactoryConfig, LoggingObserver};
/// use std::sync::Arc;
///
/// let factory = DefaultBeanFactory::builder()
///     .config(FactoryConfig::strict())
///     .post_processor(AutoProxyCreator::new())
///     .observer(Arc::new(LoggingObserver::new()))
///     .build();
/// assert_eq!(factory.bean_definition_count(), 0);
/// ```
#[derive(Default)]
pub struct BeanFactoryBuilder {
    config: FactoryConfig,
    processors: Vec<Arc<dyn BeanPostProcessor>>,
    observers: Observers,
}

impl BeanFactoryBuilder {
    /// Builder with default configuration, no processors and no observers.
    pub fn new() -> Self {
        Self {
            config: FactoryConfig::default(),
            processors: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Replaces the configuration.
    pub fn config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a post-processor. Processors run in the order added.
    pub fn post_processor<P>(mut self, processor: P) -> Self
    where
        P: BeanPostProcessor + 'static,
    {
        self.processors.push(Arc::new(processor));
        self
    }

    /// Appends an already shared post-processor.
    pub fn shared_post_processor(mut self, processor: Arc<dyn BeanPostProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Adds a lifecycle observer.
    pub fn observer(mut self, observer: Arc<dyn BeanObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Creates the factory. Processors and observers are fixed from here on.
    pub fn build(self) -> DefaultBeanFactory {
        DefaultBeanFactory::from_parts(self.config, self.processors, self.observers)
    }
}
