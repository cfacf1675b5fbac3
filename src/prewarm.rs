//! Eager singleton creation at startup.
//!
//! Beans are created lazily on first request by default. Calling
//! [`DefaultBeanFactory::pre_instantiate_singletons`] once after all
//! definitions are registered moves the creation cost (and any wiring
//! errors) to startup.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::DiError;
use crate::factory::DefaultBeanFactory;

/// Outcome of pre-instantiating one bean.
#[derive(Debug)]
pub struct PrewarmResult {
    /// Bean name
    pub name: String,
    /// Whether the bean is now a finished singleton
    pub success: bool,
    /// The creation error, if any
    pub error: Option<DiError>,
    /// Time spent obtaining the bean
    pub duration: Duration,
}

/// Results of [`DefaultBeanFactory::pre_instantiate_singletons`].
#[derive(Debug)]
pub struct PrewarmReport {
    /// One entry per registered definition, in registration order
    pub results: Vec<PrewarmResult>,
    /// Wall time for the whole pass
    pub total_duration: Duration,
}

impl PrewarmReport {
    /// Returns true if every bean was created.
    pub fn all_ready(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// Number of beans that were created.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Results of the beans that could not be created.
    pub fn failed(&self) -> Vec<&PrewarmResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }
}

impl DefaultBeanFactory {
    /// Creates every registered singleton, in registration order.
    ///
    /// A failure does not stop the pass; each bean gets its own result.
    /// Beans already created as a dependency of an earlier one are served
    /// from the cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_beans::{BeanDefinition, DefaultBeanFactory};
    ///
    /// #[derive(Default)]
    /// struct Clock;
    ///
    /// let factory = DefaultBeanFactory::new();
    /// factory.register_bean_definition("clock", BeanDefinition::of::<Clock>());
    /// factory.register_bean_definition(
    ///     "broken",
    ///     BeanDefinition::try_builder::<Clock, _>(|| Err("no time source".into())).build(),
    /// );
    ///
    /// let report = factory.pre_instantiate_singletons();
    /// assert!(!report.all_ready());
    /// assert_eq!(report.success_count(), 1);
    /// assert_eq!(report.failed()[0].name, "broken");
    /// assert!(factory.contains_singleton("clock"));
    /// ```
    pub fn pre_instantiate_singletons(&self) -> PrewarmReport {
        let started = Instant::now();
        let results: Vec<PrewarmResult> = self
            .bean_definition_names()
            .into_iter()
            .map(|name| {
                let begin = Instant::now();
                let outcome = self.get_bean(&name);
                let duration = begin.elapsed();
                match outcome {
                    Ok(_) => PrewarmResult { name, success: true, error: None, duration },
                    Err(err) => {
                        warn!(bean = %name, error = %err, "pre-instantiation failed");
                        PrewarmResult { name, success: false, error: Some(err), duration }
                    }
                }
            })
            .collect();

        let report = PrewarmReport {
            results,
            total_duration: started.elapsed(),
        };
        info!(
            ready = report.success_count(),
            total = report.results.len(),
            elapsed_ms = report.total_duration.as_secs_f64() * 1000.0,
            "pre-instantiated singletons"
        );
        report
    }
}
