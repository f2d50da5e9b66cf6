use std::collections::{HashMap, HashSet};

use crate::patch::Patch;

/// Every loaded patch, indexed by name, with a lexicographic application order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    patches: HashMap<String, Patch>,
    sorted_names: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `patch` unless its name is already present.
    ///
    /// Returns `false` when the name was taken; the earlier patch is kept.
    pub fn insert(&mut self, patch: Patch) -> bool {
        if self.patches.contains_key(&patch.name) {
            return false;
        }
        let pos = self
            .sorted_names
            .binary_search(&patch.name)
            .unwrap_or_else(|pos| pos);
        self.sorted_names.insert(pos, patch.name.clone());
        self.patches.insert(patch.name.clone(), patch);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Patch> {
        self.patches.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patches.contains_key(name)
    }

    /// Patch names in application order.
    pub fn sorted_names(&self) -> &[String] {
        &self.sorted_names
    }

    /// Patches in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.sorted_names
            .iter()
            .filter_map(|name| self.patches.get(name))
    }

    pub fn len(&self) -> usize {
        self.sorted_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_names.is_empty()
    }

    /// Puts `names` back into application order.
    ///
    /// Returns the known patches in catalog order together with the names the
    /// catalog does not hold (in their input order, deduplicated).
    pub fn in_order<'a>(&'a self, names: &[String]) -> (Vec<&'a Patch>, Vec<String>) {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let known = self
            .iter()
            .filter(|patch| wanted.contains(patch.name.as_str()))
            .collect();

        let mut seen = HashSet::new();
        let unknown = names
            .iter()
            .filter(|name| !self.contains(name) && seen.insert(name.as_str()))
            .cloned()
            .collect();

        (known, unknown)
    }
}
