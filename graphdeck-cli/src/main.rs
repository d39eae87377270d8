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

//! Graphdeck CLI
//!
//! Loads graph templates, partitions the data files found under a data
//! directory into graph instances, and answers queries against them.

mod discover;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graphdeck_core::{GraphConfigFile, GraphError, GraphRegistry, IdentField, Identifier};
use report::{GraphReport, InstanceReport, OutputFormat};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "graphdeck")]
#[command(about = "Graphdeck - metric graph templates and instances", long_about = None)]
struct Cli {
    /// Graph configuration file (TOML)
    #[arg(short, long, default_value = "graphs.toml")]
    config: PathBuf,

    /// Directory holding host/plugin/type data files
    #[arg(short, long, default_value = "./rrd")]
    data_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List graphs and their instances
    List,

    /// Free-text search over graph titles and instances
    Search {
        /// Search term (case-insensitive)
        term: String,
    },

    /// Find instances covering a value in one identifier field
    Field {
        /// host, plugin, plugin_instance, type or type_instance
        field: String,

        /// Value to look for
        value: String,
    },

    /// Show one instance by its canonical identifier
    Show {
        #[arg(long, default_value = "")]
        host: String,

        #[arg(long, default_value = "")]
        plugin: String,

        #[arg(long, default_value = "")]
        plugin_instance: String,

        #[arg(long = "type", default_value = "")]
        type_: String,

        #[arg(long, default_value = "")]
        type_instance: String,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphdeck=info,graphdeck_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = GraphConfigFile::from_path(&cli.config)
        .with_context(|| format!("Failed to load graph configuration {:?}", cli.config))?;

    let registry = GraphRegistry::new();
    registry
        .register_all(config.build())
        .context("Failed to register graphs")?;

    let files = discover::discover_files(&cli.data_dir);
    let stats = registry.rescan(files).context("Failed to partition data files")?;
    info!(?stats, data_dir = ?cli.data_dir, "Data files partitioned");

    let list = registry.read();

    match cli.command {
        Commands::List => {
            let reports: Vec<GraphReport> = list.graphs().iter().map(GraphReport::new).collect();
            report::print_graphs(&reports, cli.format)?;
        }

        Commands::Search { term } => {
            let mut reports = Vec::new();
            list.search(&term, |graph, inst| {
                reports.push(InstanceReport::new(graph, inst));
                Ok::<(), GraphError>(())
            })?;
            report::print_instances(&reports, cli.format)?;
        }

        Commands::Field { field, value } => {
            let field: IdentField = field.parse()?;
            let mut reports = Vec::new();
            list.search_field(field, &value, |graph, inst| {
                reports.push(InstanceReport::new(graph, inst));
                Ok::<(), GraphError>(())
            })?;
            report::print_instances(&reports, cli.format)?;
        }

        Commands::Show {
            host,
            plugin,
            plugin_instance,
            type_,
            type_instance,
        } => {
            let ident = Identifier::new(&host, &plugin, &plugin_instance, &type_, &type_instance);
            let (graph, inst) = list
                .instance_exact(&ident)
                .ok_or_else(|| GraphError::NotFound(format!("no graph instance {}", ident)))?;
            report::print_instances(&[InstanceReport::new(graph, inst)], cli.format)?;
        }
    }

    Ok(())
}
