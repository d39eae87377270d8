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

//! Data file discovery
//!
//! Walks a data directory laid out as `host/plugin-inst/type-inst.rrd` and
//! turns every data file into an [`Identifier`] carrying its mtime.

use graphdeck_core::{Identifier, FILE_EXTENSION};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub fn discover_files(data_dir: &Path) -> Vec<Identifier> {
    let mut files = Vec::new();

    for entry in WalkDir::new(data_dir)
        .min_depth(3)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(data_dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };

        // Rebuild with '/' so the identifier decoding is platform independent
        let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
        let Some(parts) = parts else {
            warn!("Skipping non-UTF-8 data file {:?}", entry.path());
            continue;
        };
        let path = parts.join("/");

        if !path.ends_with(FILE_EXTENSION) {
            continue;
        }

        match Identifier::from_file_path(&path) {
            Ok(mut ident) => {
                ident.set_mtime(entry.metadata().ok().and_then(|m| m.modified().ok()));
                files.push(ident);
            }
            Err(e) => warn!("Skipping data file {:?}: {}", entry.path(), e),
        }
    }

    debug!(count = files.len(), dir = %data_dir.display(), "Discovered data files");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_discover_layout() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "web01/cpu-0/cpu-idle.rrd");
        touch(dir.path(), "web01/cpu-1/cpu-idle.rrd");
        touch(dir.path(), "web01/disk-dm-0/disk_octets.rrd");
        touch(dir.path(), "web01/load/load.rrd");
        touch(dir.path(), "web01/load/README.txt");
        touch(dir.path(), "web01/stray.rrd");
        touch(dir.path(), "web01/disk-sda/bad%ZZ.rrd");

        let files = discover_files(dir.path());
        let names: Vec<String> = files.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "web01/cpu-0/cpu-idle",
                "web01/cpu-1/cpu-idle",
                "web01/disk-dm-0/disk_octets",
                "web01/load/load",
            ]
        );
        assert_eq!(files[2].plugin_instance(), "dm-0");
        assert!(files.iter().all(|f| f.mtime().is_some()));
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(discover_files(&dir.path().join("absent")).is_empty());
    }
}
