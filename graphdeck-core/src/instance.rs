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

//! Graph instances
//!
//! A [`GraphInstance`] is one renderable graph produced by a graph template:
//! a canonical identifier plus every data file that feeds it.

use crate::error::Result;
use crate::ident::{uri_params, Field, IdentField, Identifier, SelectorFlags};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::SystemTime;

/// Flags used to derive an instance's canonical identifier from a file:
/// `/any/` fields take the file's value, `/all/` fields stay aggregated.
pub const INSTANCE_FLAGS: SelectorFlags = SelectorFlags::REPLACE_ANY;

#[derive(Debug, Clone, Serialize)]
pub struct GraphInstance {
    select: Identifier,
    files: Vec<Identifier>,
}

impl GraphInstance {
    /// Create an empty instance for `file` under the template `selector`
    pub fn new(selector: &Identifier, file: &Identifier) -> Self {
        Self::with_canonical(Identifier::with_selector(selector, file, INSTANCE_FLAGS))
    }

    pub(crate) fn with_canonical(select: Identifier) -> Self {
        Self {
            select,
            files: Vec::new(),
        }
    }

    /// Canonical identifier of this instance
    pub fn selector(&self) -> &Identifier {
        &self.select
    }

    pub fn files(&self) -> &[Identifier] {
        &self.files
    }

    /// Duplicate files are kept; dedup is the caller's business.
    pub fn add_file(&mut self, file: Identifier) {
        self.files.push(file);
    }

    /// Make room for one more file so the next `add_file` cannot allocate
    pub(crate) fn reserve_file(&mut self) -> Result<()> {
        self.files.try_reserve(1)?;
        Ok(())
    }

    /// Most recent modification time over all underlying files
    pub fn newest_mtime(&self) -> Option<SystemTime> {
        self.files.iter().filter_map(|f| f.mtime()).max()
    }

    /// URI parameter string naming this instance
    pub fn params(&self) -> String {
        uri_params(&self.select)
    }

    pub fn compare_ident(&self, ident: &Identifier) -> Ordering {
        self.select.compare(ident)
    }

    /// Wildcard-aware test using the canonical identifier as selector
    pub fn matches_ident(&self, ident: &Identifier) -> bool {
        self.select.matches(ident)
    }

    /// True if this instance covers `value` in `field`.
    ///
    /// A literal canonical field must equal `value` ignoring case. An
    /// aggregated (`/all/`) field covers `value` only if one of the
    /// underlying files carries it.
    pub fn matches_field(&self, field: IdentField, value: &str) -> bool {
        match self.select.field(field) {
            Field::Literal(s) => s.eq_ignore_ascii_case(value),
            Field::Any | Field::All => self
                .files
                .iter()
                .any(|f| f.field(field).as_str().eq_ignore_ascii_case(value)),
        }
    }

    /// Case-insensitive substring search over the canonical fields and the
    /// fields of every underlying file.
    pub fn matches_string(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let contains = |ident: &Identifier| {
            IdentField::ALL
                .iter()
                .any(|field| ident.field(*field).as_str().to_lowercase().contains(&term))
        };

        contains(&self.select) || self.files.iter().any(contains)
    }
}
