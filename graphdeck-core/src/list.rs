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

//! Ordered list of graph templates
//!
//! Graphs are kept sorted by selector so lookups and listings are
//! deterministic. Discovered data files are fanned out to every graph whose
//! selector matches.

use crate::error::Result;
use crate::graph::GraphConfig;
use crate::ident::{IdentField, Identifier};
use crate::instance::GraphInstance;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Default)]
pub struct GraphList {
    graphs: Vec<GraphConfig>,
}

impl GraphList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a graph after any graphs with an equal or smaller selector
    pub fn register(&mut self, graph: GraphConfig) -> Result<()> {
        let pos = self
            .graphs
            .partition_point(|g| g.compare(graph.selector()) != Ordering::Greater);
        self.graphs.try_reserve(1)?;
        self.graphs.insert(pos, graph);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn graphs(&self) -> &[GraphConfig] {
        &self.graphs
    }

    /// Add `file` to every matching graph; returns how many graphs took it.
    ///
    /// Room is reserved in every matching graph before any of them is
    /// touched, so an error leaves all instance sets as they were.
    pub fn add_file(&mut self, file: &Identifier) -> Result<usize> {
        let mut pending = Vec::new();
        pending.try_reserve(self.graphs.len())?;

        for (index, graph) in self.graphs.iter_mut().enumerate() {
            if graph.matches_ident(file) {
                pending.push((index, graph.place_file(file)?));
            }
        }

        let matched = pending.len();
        for (index, placement) in pending {
            self.graphs[index].commit_file(placement, file.clone());
        }
        Ok(matched)
    }

    /// Replace every graph's instances with ones partitioned from `files`;
    /// returns how many files matched at least one graph.
    ///
    /// All new instance sets are built before the first one is swapped in.
    pub fn rebuild(&mut self, files: &[Identifier]) -> Result<usize> {
        let mut fresh = Vec::new();
        fresh.try_reserve(self.graphs.len())?;
        for graph in &self.graphs {
            fresh.push(graph.partition(files)?);
        }

        for (graph, instances) in self.graphs.iter_mut().zip(fresh) {
            graph.replace_instances(instances);
        }

        let mut matched = 0;
        for file in files {
            if self.graphs.iter().any(|g| g.matches_ident(file)) {
                matched += 1;
            } else {
                debug!(file = %file, "No graph matches data file");
            }
        }
        Ok(matched)
    }

    pub fn clear_instances(&mut self) {
        for graph in &mut self.graphs {
            graph.clear_instances();
        }
    }

    pub fn instance_count(&self) -> usize {
        self.graphs.iter().map(|g| g.instances().len()).sum()
    }

    /// Graph whose selector equals `selector`
    pub fn graph_exact(&self, selector: &Identifier) -> Option<&GraphConfig> {
        self.graphs
            .binary_search_by(|g| g.compare(selector))
            .ok()
            .map(|i| &self.graphs[i])
    }

    /// First graph holding an instance whose canonical identifier equals
    /// `ident`
    pub fn instance_exact(&self, ident: &Identifier) -> Option<(&GraphConfig, &GraphInstance)> {
        self.graphs
            .iter()
            .find_map(|g| g.find_exact(ident).map(|inst| (g, inst)))
    }

    pub fn for_each_graph<E, F>(&self, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&GraphConfig) -> std::result::Result<(), E>,
    {
        for graph in &self.graphs {
            f(graph)?;
        }
        Ok(())
    }

    /// Free-text search across all graphs
    pub fn search<E, F>(&self, term: &str, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&GraphConfig, &GraphInstance) -> std::result::Result<(), E>,
    {
        for graph in &self.graphs {
            graph.search(term, &mut f)?;
        }
        Ok(())
    }

    /// Field-scoped search across all graphs
    pub fn search_field<E, F>(
        &self,
        field: IdentField,
        value: &str,
        mut f: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&GraphConfig, &GraphInstance) -> std::result::Result<(), E>,
    {
        for graph in &self.graphs {
            graph.search_field(field, value, &mut f)?;
        }
        Ok(())
    }
}
