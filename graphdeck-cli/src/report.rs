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

//! Output formatting for query results

use anyhow::Result;
use clap::ValueEnum;
use graphdeck_core::{GraphConfig, GraphInstance, Identifier};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// One matched graph instance
#[derive(Debug, Serialize)]
pub struct InstanceReport {
    pub graph: String,
    pub instance: String,
    pub selector: Identifier,
    pub files: Vec<String>,
    pub params: String,
    pub render_args: Vec<String>,
    /// Seconds since the epoch of the newest underlying file
    pub mtime: Option<u64>,
}

impl InstanceReport {
    pub fn new(graph: &GraphConfig, inst: &GraphInstance) -> Self {
        Self {
            graph: graph.title().to_string(),
            instance: inst.selector().to_string(),
            selector: inst.selector().clone(),
            files: inst.files().iter().map(|f| f.to_file_path()).collect(),
            params: inst.params(),
            render_args: graph.render_args(inst),
            mtime: inst
                .newest_mtime()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
        }
    }
}

/// Summary of one graph template
#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub title: String,
    pub selector: Identifier,
    pub defs: usize,
    pub instances: Vec<String>,
}

impl GraphReport {
    pub fn new(graph: &GraphConfig) -> Self {
        Self {
            title: graph.title().to_string(),
            selector: graph.selector().clone(),
            defs: graph.defs().len(),
            instances: graph
                .instances()
                .iter()
                .map(|i| i.selector().to_string())
                .collect(),
        }
    }
}

pub fn print_graphs(reports: &[GraphReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => {
            for report in reports {
                println!(
                    "{} [{}] ({} instances, {} defs)",
                    report.title,
                    report.selector,
                    report.instances.len(),
                    report.defs
                );
                for instance in &report.instances {
                    println!("  {}", instance);
                }
            }
        }
    }
    Ok(())
}

pub fn print_instances(reports: &[InstanceReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => {
            if reports.is_empty() {
                println!("No matching graphs");
            }
            for report in reports {
                println!("{}: {}", report.graph, report.instance);
                println!("  params: {}", report.params);
                if !report.render_args.is_empty() {
                    println!("  args:   {}", report.render_args.join(" "));
                }
                for file in &report.files {
                    println!("  file:   {}", file);
                }
            }
        }
    }
    Ok(())
}
