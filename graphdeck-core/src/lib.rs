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

//! Graphdeck Core
//!
//! Graph template matching and instance partitioning for metric dashboards.
//! Graph templates select metric identifiers with literal fields and
//! wildcards; discovered data files are grouped into renderable graph
//! instances according to those wildcards.

pub mod config;
pub mod def;
pub mod error;
pub mod graph;
pub mod ident;
pub mod instance;
pub mod list;
pub mod registry;

pub use config::{GraphBlock, GraphConfigFile};
pub use def::GraphDef;
pub use error::{GraphError, Result};
pub use graph::GraphConfig;
pub use ident::{
    Field, IdentField, Identifier, SelectorFlags, ALL_TOKEN, ANY_TOKEN, FILE_EXTENSION,
};
pub use instance::{GraphInstance, INSTANCE_FLAGS};
pub use list::GraphList;
pub use registry::{GraphRegistry, ScanStats};
