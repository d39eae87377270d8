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

//! Render directives attached to a graph
//!
//! The engine stores these and hands them to the renderer untouched; it
//! never interprets them.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// One `DEF` block of a graph configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphDef {
    /// Data source name inside the data file
    #[serde(rename = "DSName")]
    pub ds_name: String,
    #[serde(default)]
    pub legend: Option<String>,
    /// `RRGGBB` hex color
    #[serde(default)]
    pub color: Option<String>,
    /// Printf-style format for the legend value
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub stack: bool,
    #[serde(default)]
    pub area: bool,
}

impl GraphDef {
    pub fn new(ds_name: impl Into<String>) -> Self {
        Self {
            ds_name: ds_name.into(),
            legend: None,
            color: None,
            format: None,
            stack: false,
            area: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ds_name.is_empty() {
            return Err(GraphError::InvalidArgument(
                "DEF requires a non-empty DSName".into(),
            ));
        }

        if let Some(color) = &self.color {
            if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(GraphError::InvalidArgument(format!(
                    "DEF color must be RRGGBB hex, got {:?}",
                    color
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(GraphDef::new("value").validate().is_ok());
        assert!(GraphDef::new("").validate().is_err());

        let mut def = GraphDef::new("value");
        def.color = Some("00ff7f".into());
        assert!(def.validate().is_ok());
        def.color = Some("green".into());
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_deserialize_pascal_case() {
        let def: GraphDef = toml::from_str(
            r#"
            DSName = "rx"
            Legend = "Received"
            Area = true
            "#,
        )
        .unwrap();
        assert_eq!(def.ds_name, "rx");
        assert_eq!(def.legend.as_deref(), Some("Received"));
        assert!(def.area);
        assert!(!def.stack);
    }
}
