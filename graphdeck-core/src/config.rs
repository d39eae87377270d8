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

//! Graph configuration files
//!
//! Graphs are declared in TOML as an array of `[[Graph]]` tables:
//!
//! ```toml
//! [[Graph]]
//! Host = "/any/"
//! Plugin = "cpu"
//! PluginInstance = "/all/"
//! Type = "cpu"
//! Title = "CPU usage"
//! VerticalLabel = "Jiffies"
//! ShowZero = true
//!
//! [[Graph.DEF]]
//! DSName = "value"
//! Legend = "Busy"
//! ```
//!
//! Keys are matched ignoring case, so `pluginInstance` or `dsname` work
//! too. Unknown keys are logged and ignored.

use crate::def::GraphDef;
use crate::error::Result;
use crate::graph::GraphConfig;
use crate::ident::Identifier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const FILE_KEYS: &[&str] = &["Graph"];
const GRAPH_KEYS: &[&str] = &[
    "Host",
    "Plugin",
    "PluginInstance",
    "Type",
    "TypeInstance",
    "Title",
    "VerticalLabel",
    "ShowZero",
    "DEF",
];
const DEF_KEYS: &[&str] = &["DSName", "Legend", "Color", "Format", "Stack", "Area"];

/// A parsed configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfigFile {
    #[serde(default, rename = "Graph")]
    pub graphs: Vec<GraphBlock>,
}

/// One `[[Graph]]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphBlock {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub plugin: Option<String>,
    #[serde(default)]
    pub plugin_instance: Option<String>,
    #[serde(default, rename = "Type")]
    pub type_: Option<String>,
    #[serde(default)]
    pub type_instance: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vertical_label: Option<String>,
    #[serde(default)]
    pub show_zero: bool,

    #[serde(default, rename = "DEF")]
    pub defs: Vec<GraphDef>,
}

impl GraphBlock {
    /// Selector built from the block; missing keys become empty fields
    pub fn selector(&self) -> Identifier {
        Identifier::new(
            self.host.as_deref().unwrap_or_default(),
            self.plugin.as_deref().unwrap_or_default(),
            self.plugin_instance.as_deref().unwrap_or_default(),
            self.type_.as_deref().unwrap_or_default(),
            self.type_instance.as_deref().unwrap_or_default(),
        )
    }

    pub fn build(&self) -> Result<GraphConfig> {
        let mut graph = GraphConfig::new(self.selector()).with_show_zero(self.show_zero);

        if let Some(title) = &self.title {
            graph = graph.with_title(title.clone());
        }
        if let Some(label) = &self.vertical_label {
            graph = graph.with_vertical_label(label.clone());
        }

        for def in &self.defs {
            graph.add_def(def.clone())?;
        }

        Ok(graph)
    }
}

impl GraphConfigFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        info!(path = %path.display(), graphs = config.graphs.len(), "Loaded graph configuration");
        Ok(config)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let root: toml::Table = toml::from_str(content)?;
        let mut root = canonical_keys(root, FILE_KEYS, "file");

        if let Some(toml::Value::Array(blocks)) = root.get_mut("Graph") {
            for block in blocks.iter_mut() {
                let toml::Value::Table(block) = block else {
                    continue;
                };
                *block = canonical_keys(std::mem::take(block), GRAPH_KEYS, "Graph");

                if let Some(toml::Value::Array(defs)) = block.get_mut("DEF") {
                    for def in defs.iter_mut() {
                        if let toml::Value::Table(def) = def {
                            *def = canonical_keys(std::mem::take(def), DEF_KEYS, "DEF");
                        }
                    }
                }
            }
        }

        Ok(Self::deserialize(toml::Value::Table(root))?)
    }

    /// Build every graph. Blocks that fail to build are logged and skipped.
    pub fn build(&self) -> Vec<GraphConfig> {
        self.graphs
            .iter()
            .enumerate()
            .filter_map(|(index, block)| match block.build() {
                Ok(graph) => Some(graph),
                Err(e) => {
                    warn!(index, selector = %block.selector(), "Skipping graph block: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Rename the keys of `table` to their canonical spelling, ignoring case.
/// Keys outside `known` are dropped with a warning.
fn canonical_keys(table: toml::Table, known: &[&str], section: &str) -> toml::Table {
    let mut out = toml::Table::new();
    for (key, value) in table {
        match known.iter().find(|k| k.eq_ignore_ascii_case(&key)) {
            Some(canonical) => {
                if out.insert((*canonical).to_string(), value).is_some() {
                    warn!(section, key = %key, "Duplicate configuration key");
                }
            }
            None => warn!(section, key = %key, "Ignoring unknown configuration key"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Field;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[[Graph]]
Host = "/any/"
Plugin = "cpu"
PluginInstance = "/ALL/"
Type = "cpu"
Title = "CPU usage"
ShowZero = true
Colour = "ignored"

[[Graph.DEF]]
DSName = "value"
Legend = "Busy"

[[Graph]]
Plugin = "load"
Type = "load"
VerticalLabel = "Load"
"#;

    #[test]
    fn test_parse_sample() {
        let config = GraphConfigFile::from_str(SAMPLE).unwrap();
        assert_eq!(config.graphs.len(), 2);

        let cpu = &config.graphs[0];
        let selector = cpu.selector();
        assert_eq!(selector.field(crate::IdentField::Host), &Field::Any);
        assert_eq!(selector.field(crate::IdentField::PluginInstance), &Field::All);
        assert_eq!(cpu.defs.len(), 1);

        let graphs = config.build();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].title(), "CPU usage");
        assert!(graphs[0].show_zero());
        assert_eq!(graphs[1].vertical_label(), Some("Load"));
        assert_eq!(graphs[1].title(), "load/load");
    }

    #[test]
    fn test_invalid_def_skips_block() {
        let config = GraphConfigFile::from_str(
            r#"
[[Graph]]
Plugin = "cpu"
[[Graph.DEF]]
DSName = ""

[[Graph]]
Plugin = "memory"
"#,
        )
        .unwrap();

        let graphs = config.build();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].selector().plugin(), "memory");
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = GraphConfigFile::from_path(file.path()).unwrap();
        assert_eq!(config.graphs.len(), 2);
    }

    #[test]
    fn test_keys_ignore_case() {
        let config = GraphConfigFile::from_str(
            r#"
[[graph]]
host = "/any/"
PLUGIN = "df"
pluginInstance = "/all/"
type = "df_complex"
verticallabel = "Bytes"
showzero = true
Colour = "ignored"

[[graph.def]]
dsname = "value"
COLOR = "00ff00"
"#,
        )
        .unwrap();
        assert_eq!(config.graphs.len(), 1);

        let block = &config.graphs[0];
        let selector = block.selector();
        assert_eq!(selector.field(crate::IdentField::Host), &Field::Any);
        assert_eq!(selector.plugin(), "df");
        assert_eq!(selector.field(crate::IdentField::PluginInstance), &Field::All);
        assert_eq!(selector.type_(), "df_complex");
        assert_eq!(block.vertical_label.as_deref(), Some("Bytes"));
        assert!(block.show_zero);
        assert_eq!(block.defs.len(), 1);
        assert_eq!(block.defs[0].ds_name, "value");

        let graphs = config.build();
        assert_eq!(graphs.len(), 1);
    }

    #[test]
    fn test_bad_toml() {
        assert!(GraphConfigFile::from_str("[[Graph]\nPlugin = ").is_err());
    }
}
