//! By-type dependency resolution.

use tracing::trace;

use super::DefaultBeanFactory;
use crate::bean::Bean;
use crate::error::{DiError, DiResult};
use crate::key::Key;

impl DefaultBeanFactory {
    /// Finds the single registered definition that provides `key` and
    /// obtains its bean.
    ///
    /// Candidates are counted before anything is created, so an ambiguous
    /// request leaves every candidate untouched. The scan is linear in the
    /// number of definitions.
    pub(crate) fn resolve_by_type(&self, key: &Key) -> DiResult<Bean> {
        let mut candidates: Vec<String> = self
            .inner
            .registry
            .read()
            .iter()
            .filter(|(_, definition)| definition.provides(key))
            .map(|(name, _)| name.to_owned())
            .collect();

        if candidates.len() > 1 {
            return Err(DiError::TypeAmbiguous {
                type_name: key.display_name(),
                candidates,
            });
        }
        match candidates.pop() {
            Some(name) => {
                trace!(type_name = key.display_name(), bean = %name, "resolved by type");
                self.obtain(&name)
            }
            None => Err(DiError::TypeNotFound(key.display_name())),
        }
    }
}
