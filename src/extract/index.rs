//! Offset index loader
//!
//! The index file maps compressed-stream byte offsets to the article titles
//! stored in that block, one `offset:pageId:title` entry per line. The page
//! id is tolerated but unused. Titles are grouped by offset so that a block
//! holding several requested articles is decompressed exactly once.

use super::record::ExtractError;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Immutable offset to requested-titles mapping, built once at startup and
/// shared read-only with every worker.
#[derive(Debug, Default)]
pub struct OffsetIndex {
    groups: BTreeMap<u64, HashSet<String>>,
    titles_requested: usize,
}

impl OffsetIndex {
    /// Load and group an index file.
    ///
    /// Titles may legally contain colons, so each line splits into at most
    /// three fields and everything after the second colon is the title.
    /// Lines that do not yield exactly three fields, or whose offset is not
    /// a valid integer, are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ExtractError::Config(format!(
                "cannot open index file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut groups: BTreeMap<u64, HashSet<String>> = BTreeMap::new();
        let mut titles_requested = 0;

        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.splitn(3, ':').collect();
            if parts.len() != 3 {
                debug!("skipping malformed index line: {}", line);
                continue;
            }

            let offset = match parts[0].parse::<u64>() {
                Ok(offset) => offset,
                Err(_) => {
                    debug!("skipping index line with bad offset: {}", line);
                    continue;
                }
            };

            if groups
                .entry(offset)
                .or_default()
                .insert(parts[2].to_string())
            {
                titles_requested += 1;
            }
        }

        Ok(Self {
            groups,
            titles_requested,
        })
    }

    /// Distinct block offsets, in ascending order
    pub fn offsets(&self) -> Vec<u64> {
        self.groups.keys().copied().collect()
    }

    /// Titles wanted from the block at `offset`
    pub fn titles_for(&self, offset: u64) -> Option<&HashSet<String>> {
        self.groups.get(&offset)
    }

    /// Number of distinct blocks to decompress
    pub fn block_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of titles requested across all blocks
    pub fn titles_requested(&self) -> usize {
        self.titles_requested
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
