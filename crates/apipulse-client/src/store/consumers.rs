//! Consumer registry.

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use apipulse_core::keys::Consumer;
use apipulse_core::payload::ConsumerRow;

#[derive(Debug, Clone)]
struct ConsumerEntry {
    name: Option<String>,
    group: Option<String>,
}

/// Registry of identified consumers:
/// - `identifier -> {name, group}`, refreshed on every request and kept for
///   the process lifetime
/// - the set of identifiers whose metadata changed since the last drain
#[derive(Default)]
pub(crate) struct ConsumerRegistry {
    consumers: DashMap<String, ConsumerEntry>,
    updated: DashSet<String>,
}

impl ConsumerRegistry {
    /// Register or refresh a consumer. Only consumers carrying a name or
    /// group are registered; bare identifiers stay a key dimension only.
    pub fn add_or_update(&self, consumer: Consumer) {
        if consumer.name.is_none() && consumer.group.is_none() {
            return;
        }
        match self.consumers.entry(consumer.identifier.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(ConsumerEntry {
                    name: consumer.name,
                    group: consumer.group,
                });
                self.updated.insert(consumer.identifier);
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let mut changed = false;
                if consumer.name.is_some() && consumer.name != entry.name {
                    entry.name = consumer.name;
                    changed = true;
                }
                if consumer.group.is_some() && consumer.group != entry.group {
                    entry.group = consumer.group;
                    changed = true;
                }
                if changed {
                    self.updated.insert(consumer.identifier);
                }
            }
        }
    }

    /// Current state of consumers updated since the last drain. The registry
    /// itself is never reset; only the updated-set clears.
    pub fn drain_updated(&self) -> Vec<ConsumerRow> {
        let identifiers: Vec<String> = self.updated.iter().map(|id| id.key().clone()).collect();
        let mut rows = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            self.updated.remove(&identifier);
            if let Some(entry) = self.consumers.get(&identifier) {
                rows.push(ConsumerRow {
                    identifier: identifier.clone(),
                    name: entry.name.clone(),
                    group: entry.group.clone(),
                });
            }
        }
        rows
    }
}
