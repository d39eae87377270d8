// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Shared graph registry
//!
//! Wraps a [`GraphList`] so one request-serving process can share it:
//! mutations (registration, file discovery, rescans) take the write lock
//! one at a time, while searches and lookups share the read lock.

use crate::error::Result;
use crate::graph::GraphConfig;
use crate::ident::Identifier;
use crate::list::GraphList;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use std::time::SystemTime;
use tracing::info;

/// Outcome of feeding a batch of discovered files into the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Files offered
    pub files: usize,
    /// Files that matched at least one graph
    pub matched: usize,
    /// Instances across all graphs after the scan
    pub instances: usize,
}

pub struct GraphRegistry {
    list: RwLock<GraphList>,
    last_scan: RwLock<Option<SystemTime>>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::from_list(GraphList::new())
    }

    pub fn from_list(list: GraphList) -> Self {
        Self {
            list: RwLock::new(list),
            last_scan: RwLock::new(None),
        }
    }

    /// Register every graph in `graphs`
    pub fn register_all<I>(&self, graphs: I) -> Result<usize>
    where
        I: IntoIterator<Item = GraphConfig>,
    {
        let mut list = self.list.write();
        let mut count = 0;
        for graph in graphs {
            list.register(graph)?;
            count += 1;
        }
        info!(registered = count, total = list.len(), "Registered graphs");
        Ok(count)
    }

    pub fn register(&self, graph: GraphConfig) -> Result<()> {
        self.list.write().register(graph)
    }

    /// Add one discovered file; returns how many graphs took it
    pub fn add_file(&self, file: &Identifier) -> Result<usize> {
        self.list.write().add_file(file)
    }

    /// Replace all instances with ones built from `files`.
    ///
    /// The new instance sets are built in full before any graph is
    /// updated, all under a single write lock, so readers never observe a
    /// half-built set and an error keeps the previous scan in place.
    pub fn rescan<I>(&self, files: I) -> Result<ScanStats>
    where
        I: IntoIterator<Item = Identifier>,
    {
        let files: Vec<Identifier> = files.into_iter().collect();

        let mut list = self.list.write();
        let matched = list.rebuild(&files)?;
        let stats = ScanStats {
            files: files.len(),
            matched,
            instances: list.instance_count(),
        };

        *self.last_scan.write() = Some(SystemTime::now());
        info!(
            files = stats.files,
            matched = stats.matched,
            instances = stats.instances,
            "Rebuilt graph instances"
        );
        Ok(stats)
    }

    /// Shared access for lookups and searches
    pub fn read(&self) -> RwLockReadGuard<'_, GraphList> {
        self.list.read()
    }

    pub fn last_scan(&self) -> Option<SystemTime> {
        *self.last_scan.read()
    }
}

impl Default for GraphRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn cpu(host: &str, instance: &str) -> Identifier {
        Identifier::new(host, "cpu", instance, "cpu", "idle")
    }

    #[test]
    fn test_rescan_replaces_instances() {
        let registry = GraphRegistry::new();
        registry
            .register(GraphConfig::new(Identifier::new("/any/", "cpu", "/any/", "cpu", "idle")))
            .unwrap();
        assert!(registry.last_scan().is_none());

        let stats = registry
            .rescan(vec![cpu("web01", "0"), cpu("web01", "1"), cpu("web01", "1")])
            .unwrap();
        assert_eq!(
            stats,
            ScanStats {
                files: 3,
                matched: 3,
                instances: 2
            }
        );

        let stats = registry
            .rescan(vec![
                cpu("web01", "0"),
                Identifier::new("web01", "swap", "", "swap", "used"),
            ])
            .unwrap();
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.instances, 1);
        assert!(registry.last_scan().is_some());
    }

    #[test]
    fn test_rescan_after_incremental_adds() {
        let registry = GraphRegistry::new();
        registry
            .register_all(vec![
                GraphConfig::new(Identifier::new("/any/", "cpu", "/any/", "cpu", "idle")),
                GraphConfig::new(Identifier::new("/all/", "cpu", "/all/", "cpu", "idle")),
            ])
            .unwrap();
        registry.add_file(&cpu("web01", "0")).unwrap();
        registry.add_file(&cpu("web01", "1")).unwrap();
        assert_eq!(registry.read().instance_count(), 3);

        let stats = registry.rescan(vec![cpu("db01", "7")]).unwrap();
        assert_eq!(stats.instances, 2);

        let list = registry.read();
        assert!(list.instance_exact(&cpu("web01", "0")).is_none());
        assert!(list.instance_exact(&cpu("db01", "7")).is_some());
        let (_, aggregate) = list.instance_exact(&cpu("/all/", "/all/")).unwrap();
        assert_eq!(aggregate.files().len(), 1);
    }

    #[test]
    fn test_concurrent_readers() {
        let registry = Arc::new(GraphRegistry::new());
        registry
            .register_all(vec![GraphConfig::new(Identifier::new(
                "/any/", "cpu", "/all/", "cpu", "idle",
            ))])
            .unwrap();
        registry.add_file(&cpu("web01", "0")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let list = registry.read();
                    list.instance_exact(&cpu("web01", "/all/")).is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
