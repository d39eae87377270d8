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

//! Graph templates
//!
//! A [`GraphConfig`] pairs a selector identifier with display settings and
//! render directives. Data files that match the selector are partitioned
//! into [`GraphInstance`]s according to the selector's wildcards.
//!
//! **Concurrency:** mutating calls (`add_file`, `add_def`,
//! `clear_instances`) take `&mut self`; share a template between threads
//! through [`crate::registry::GraphRegistry`].

use crate::def::GraphDef;
use crate::error::Result;
use crate::ident::{uri_params, IdentField, Identifier};
use crate::instance::{GraphInstance, INSTANCE_FLAGS};
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug)]
pub struct GraphConfig {
    select: Identifier,
    title: Option<String>,
    /// Lazily derived from the selector when no title is configured
    default_title: OnceCell<String>,
    vertical_label: Option<String>,
    show_zero: bool,
    defs: Vec<GraphDef>,
    instances: Vec<GraphInstance>,
}

impl GraphConfig {
    pub fn new(selector: Identifier) -> Self {
        Self {
            select: selector,
            title: None,
            default_title: OnceCell::new(),
            vertical_label: None,
            show_zero: false,
            defs: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_vertical_label(mut self, label: impl Into<String>) -> Self {
        self.vertical_label = Some(label.into());
        self
    }

    pub fn with_show_zero(mut self, show_zero: bool) -> Self {
        self.show_zero = show_zero;
        self
    }

    pub fn selector(&self) -> &Identifier {
        &self.select
    }

    pub fn vertical_label(&self) -> Option<&str> {
        self.vertical_label.as_deref()
    }

    pub fn show_zero(&self) -> bool {
        self.show_zero
    }

    pub fn defs(&self) -> &[GraphDef] {
        &self.defs
    }

    pub fn instances(&self) -> &[GraphInstance] {
        &self.instances
    }

    /// Append a render directive. Rejects directives that fail validation.
    pub fn add_def(&mut self, def: GraphDef) -> Result<()> {
        def.validate()?;
        self.defs.try_reserve(1)?;
        self.defs.push(def);
        Ok(())
    }

    /// Configured title, or the selector's display form if none was set
    pub fn title(&self) -> &str {
        match &self.title {
            Some(title) => title,
            None => self.default_title.get_or_init(|| self.select.to_string()),
        }
    }

    /// URI parameter string naming the selector
    pub fn params(&self) -> String {
        uri_params(&self.select)
    }

    pub fn matches_ident(&self, ident: &Identifier) -> bool {
        self.select.matches(ident)
    }

    /// Single-field selector test: wildcards match anything, literals match
    /// ignoring case.
    pub fn matches_field(&self, field: IdentField, value: &str) -> bool {
        self.select.field(field).matches(value)
    }

    /// Orders templates by selector
    pub fn compare(&self, ident: &Identifier) -> Ordering {
        self.select.compare(ident)
    }

    /// Fold a discovered data file into the instance it belongs to,
    /// creating that instance if this is the first file for it.
    ///
    /// Instances are looked up by exact comparison of canonical
    /// identifiers, in insertion order. On error the instance set is left
    /// unchanged.
    pub fn add_file(&mut self, file: Identifier) -> Result<()> {
        let placement = self.place_file(&file)?;
        self.commit_file(placement, file);
        Ok(())
    }

    /// First half of [`add_file`](Self::add_file): find or build the
    /// target instance and reserve room for `file`. Only capacity changes.
    pub(crate) fn place_file(&mut self, file: &Identifier) -> Result<Placement> {
        place_in(&self.select, &mut self.instances, file)
    }

    /// Second half of [`add_file`](Self::add_file). Cannot fail.
    pub(crate) fn commit_file(&mut self, placement: Placement, file: Identifier) {
        if let Some(index) = commit_in(&mut self.instances, placement, file) {
            debug!(
                graph = %self.title(),
                instance = %self.instances[index].selector(),
                "Creating graph instance"
            );
        }
    }

    /// Partition `files` into a fresh instance set without touching this
    /// template. Files the selector rejects are skipped.
    pub fn partition(&self, files: &[Identifier]) -> Result<Vec<GraphInstance>> {
        let mut instances = Vec::new();
        for file in files.iter().filter(|f| self.matches_ident(f)) {
            let placement = place_in(&self.select, &mut instances, file)?;
            commit_in(&mut instances, placement, file.clone());
        }
        Ok(instances)
    }

    /// Swap in an instance set built by [`partition`](Self::partition)
    pub fn replace_instances(&mut self, instances: Vec<GraphInstance>) {
        debug!(
            graph = %self.title(),
            old = self.instances.len(),
            new = instances.len(),
            "Replacing graph instances"
        );
        self.instances = instances;
    }

    /// Drop all instances so they can be rebuilt from a fresh file scan
    pub fn clear_instances(&mut self) {
        debug!(graph = %self.title(), count = self.instances.len(), "Clearing graph instances");
        self.instances.clear();
    }

    /// Arguments for the external renderer, in fixed order:
    /// `-t title`, `-v label`, `-l 0`, each only when configured.
    pub fn render_args(&self, _inst: &GraphInstance) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(title) = &self.title {
            args.push("-t".to_string());
            args.push(title.clone());
        }

        if let Some(label) = &self.vertical_label {
            args.push("-v".to_string());
            args.push(label.clone());
        }

        if self.show_zero {
            args.push("-l".to_string());
            args.push("0".to_string());
        }

        args
    }

    /// Visit every instance; the first error stops the walk and is returned.
    pub fn for_each_instance<E, F>(&self, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&GraphInstance) -> std::result::Result<(), E>,
    {
        for inst in &self.instances {
            f(inst)?;
        }
        Ok(())
    }

    /// First instance whose canonical identifier equals `ident`
    pub fn find_exact(&self, ident: &Identifier) -> Option<&GraphInstance> {
        self.instances
            .iter()
            .find(|inst| inst.compare_ident(ident).is_eq())
    }

    /// First instance whose canonical identifier matches `ident`, treating
    /// aggregated fields as wildcards
    pub fn find_matching(&self, ident: &Identifier) -> Option<&GraphInstance> {
        self.instances.iter().find(|inst| inst.matches_ident(ident))
    }

    /// Visit the instances covering `value` in `field`.
    ///
    /// Nothing is visited when the selector rules the value out. A literal
    /// selector field already pins every instance to that value, so the
    /// per-instance test only runs for wildcard fields.
    pub fn search_field<E, F>(
        &self,
        field: IdentField,
        value: &str,
        mut f: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&GraphConfig, &GraphInstance) -> std::result::Result<(), E>,
    {
        if !self.matches_field(field, value) {
            return Ok(());
        }

        let check_instances = self.select.field(field).is_wildcard();

        for inst in &self.instances {
            if check_instances && !inst.matches_field(field, value) {
                continue;
            }
            f(self, inst)?;
        }

        Ok(())
    }

    /// Free-text search. If `term` occurs in the title every instance is
    /// visited, otherwise only instances whose own fields contain it.
    pub fn search<E, F>(&self, term: &str, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&GraphConfig, &GraphInstance) -> std::result::Result<(), E>,
    {
        let term = term.to_lowercase();
        let title_matches = self.title().to_lowercase().contains(&term);

        for inst in &self.instances {
            if title_matches || inst.matches_string(&term) {
                f(self, inst)?;
            }
        }

        Ok(())
    }
}

/// Where a file lands among a template's instances. Every allocation the
/// insertion needs has already been made.
#[derive(Debug)]
pub(crate) enum Placement {
    Existing(usize),
    New(GraphInstance),
}

fn place_in(
    selector: &Identifier,
    instances: &mut Vec<GraphInstance>,
    file: &Identifier,
) -> Result<Placement> {
    let canonical = Identifier::with_selector(selector, file, INSTANCE_FLAGS);

    let existing = instances
        .iter()
        .position(|inst| inst.compare_ident(&canonical).is_eq());

    match existing {
        Some(index) => {
            instances[index].reserve_file()?;
            Ok(Placement::Existing(index))
        }
        None => {
            instances.try_reserve(1)?;
            let mut inst = GraphInstance::with_canonical(canonical);
            inst.reserve_file()?;
            Ok(Placement::New(inst))
        }
    }
}

/// Returns the index of a newly created instance
fn commit_in(
    instances: &mut Vec<GraphInstance>,
    placement: Placement,
    file: Identifier,
) -> Option<usize> {
    match placement {
        Placement::Existing(index) => {
            instances[index].add_file(file);
            None
        }
        Placement::New(mut inst) => {
            inst.add_file(file);
            instances.push(inst);
            Some(instances.len() - 1)
        }
    }
}
