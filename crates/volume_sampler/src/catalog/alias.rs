//! Channel alias index.
//!
//! Every entry is reachable under four names: `partition.name[partition_index]`,
//! `partition.name`, `name[global_index]` and `name`. The two unindexed forms are shared by every
//! entry with the same layer name, so lookups return all of them in catalog order.
use std::collections::HashMap;

use crate::catalog::entry::FieldEntry;

#[derive(Clone, Debug, Default)]
pub struct AliasIndex {
    map: HashMap<String, Vec<usize>>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four aliases of `entry`, most specific first.
    pub fn aliases_of(entry: &FieldEntry) -> [String; 4] {
        [
            format!(
                "{}.{}[{}]",
                entry.partition(),
                entry.name(),
                entry.partition_index()
            ),
            format!("{}.{}", entry.partition(), entry.name()),
            format!("{}[{}]", entry.name(), entry.global_index()),
            entry.name().to_string(),
        ]
    }

    pub fn insert(&mut self, entry: &FieldEntry, index: usize) {
        for alias in Self::aliases_of(entry) {
            let slot = self.map.entry(alias).or_default();
            if !slot.contains(&index) {
                slot.push(index);
            }
        }
    }

    /// Catalog positions registered under `alias`; empty when unknown.
    pub fn lookup(&self, alias: &str) -> &[usize] {
        self.map.get(alias).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.map.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All registered aliases, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Strips the partition prefix and index suffix from a channel alias.
///
/// `"smoke.density[2]"`, `"smoke.density"` and `"density[0]"` all yield `"density"`.
pub fn base_name(channel: &str) -> &str {
    let unindexed = match channel.rfind('[') {
        Some(open) if channel.ends_with(']') => &channel[..open],
        _ => channel,
    };
    match unindexed.rsplit_once('.') {
        Some((_, name)) if !name.is_empty() => name,
        _ => unindexed,
    }
}
