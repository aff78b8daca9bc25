//! Extraction configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the extraction run. CLI flags override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Offset index file (`offset:pageId:title` per line)
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,
    /// Multistream dump archive (`.xml.bz2`)
    #[serde(default = "default_archive_file")]
    pub archive_file: PathBuf,
    /// Worker pool size (0 = all available cores)
    #[serde(default)]
    pub workers: usize,
    /// Compressed bytes read per chunk while inflating a block
    #[serde(default = "default_read_chunk_bytes")]
    pub read_chunk_bytes: usize,
}

fn default_index_file() -> PathBuf {
    PathBuf::from("dump.index")
}

fn default_archive_file() -> PathBuf {
    PathBuf::from("pages-articles-multistream.xml.bz2")
}

fn default_read_chunk_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            archive_file: default_archive_file(),
            workers: 0,
            read_chunk_bytes: default_read_chunk_bytes(),
        }
    }
}
