//! Bean definition registry.

use std::sync::Arc;

use crate::definition::BeanDefinition;
use crate::internal::Map;

/// Name to definition storage.
///
/// Registration order is kept so that by-type scans are deterministic.
/// Registering an existing name replaces the definition in place.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<(String, Arc<BeanDefinition>)>,
    index: Map<String, usize>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `definition` under `name`, returning the replaced one.
    pub(crate) fn insert(
        &mut self,
        name: String,
        definition: BeanDefinition,
    ) -> Option<Arc<BeanDefinition>> {
        let definition = Arc::new(definition);
        match self.index.get(&name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, definition)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, definition));
                None
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.index.get(name).map(|&pos| Arc::clone(&self.entries[pos].1))
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All `(name, definition)` pairs in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Arc<BeanDefinition>)> {
        self.entries.iter().map(|(name, definition)| (name.as_str(), definition))
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct First;
    #[derive(Default)]
    struct Second;

    #[test]
    fn last_write_wins_in_place() {
        let mut registry = Registry::new();
        assert!(registry.insert("a".into(), BeanDefinition::of::<First>()).is_none());
        registry.insert("b".into(), BeanDefinition::of::<First>());

        let replaced = registry.insert("a".into(), BeanDefinition::of::<Second>());
        assert!(replaced.unwrap().type_name().ends_with("First"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert!(registry.get("a").unwrap().type_name().ends_with("Second"));
    }

    #[test]
    fn lookup_of_unknown_name() {
        let registry = Registry::new();
        assert!(registry.get("missing").is_none());
        assert!(!registry.contains("missing"));
        assert_eq!(registry.iter().count(), 0);
    }
}
