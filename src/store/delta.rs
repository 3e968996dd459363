//! Applying variable maps to a style target.
//!
//! A recomputed group is compared against what was last applied and only
//! the difference is written: changed or new names are set, names that
//! disappeared are removed, and identical values are left untouched.

use std::collections::BTreeMap;

use super::groups::VarMap;

/// Where live custom properties are written, typically a document root.
pub trait StyleTarget {
    fn set_property(&mut self, name: &str, value: &str);
    fn remove_property(&mut self, name: &str);
    fn property(&self, name: &str) -> Option<&str>;
}

/// One recorded write against a [`MemoryStyleTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleWrite {
    Set { name: String, value: String },
    Remove { name: String },
}

/// In-memory [`StyleTarget`] that keeps a log of every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStyleTarget {
    properties: BTreeMap<String, String>,
    writes: Vec<StyleWrite>,
}

impl MemoryStyleTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn writes(&self) -> &[StyleWrite] {
        &self.writes
    }

    /// Drains the write log, leaving the properties in place.
    pub fn take_writes(&mut self) -> Vec<StyleWrite> {
        std::mem::take(&mut self.writes)
    }
}

impl StyleTarget for MemoryStyleTarget {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
        self.writes.push(StyleWrite::Set {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_property(&mut self, name: &str) {
        self.properties.remove(name);
        self.writes.push(StyleWrite::Remove {
            name: name.to_string(),
        });
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// The minimal set of writes turning one map into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarDelta {
    pub set: Vec<(String, String)>,
    pub removed: Vec<String>,
    /// Names present in both maps with the same value.
    pub unchanged: usize,
}

impl VarDelta {
    pub fn between(previous: &VarMap, next: &VarMap) -> Self {
        let mut delta = VarDelta::default();
        for (name, value) in next {
            match previous.get(name) {
                Some(old) if old == value => delta.unchanged += 1,
                _ => delta.set.push((name.clone(), value.clone())),
            }
        }
        delta.removed = previous
            .keys()
            .filter(|name| !next.contains_key(*name))
            .cloned()
            .collect();
        delta
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.removed.is_empty()
    }

    /// Number of writes [`apply_to`](Self::apply_to) performs.
    pub fn write_count(&self) -> usize {
        self.set.len() + self.removed.len()
    }

    pub fn apply_to(&self, target: &mut dyn StyleTarget) {
        for name in &self.removed {
            target.remove_property(name);
        }
        for (name, value) in &self.set {
            target.set_property(name, value);
        }
    }
}
