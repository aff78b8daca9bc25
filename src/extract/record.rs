//! Core types and errors for block extraction

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cleaned article pulled out of the dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Page id from the dump, when the page carried one
    pub id: Option<String>,
    /// Article title, exactly as requested in the index
    pub title: String,
    /// Plain text with wiki markup flattened
    pub text: String,
}

/// Outcome of one block task, keyed by the offset it was scheduled for.
///
/// A failed block carries its error instead of silently collapsing to an
/// empty list, so the aggregator can count and log the loss.
#[derive(Debug)]
pub struct BlockOutcome {
    /// Compressed-stream byte offset of the block
    pub offset: u64,
    /// Records found in the block, or why the block was unusable
    pub result: Result<Vec<ArticleRecord>, ExtractError>,
}

/// Aggregate counters for one extraction run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Blocks scheduled (one per distinct offset)
    pub blocks_total: usize,
    /// Blocks that decompressed and parsed
    pub blocks_completed: usize,
    /// Blocks skipped as unreadable or malformed
    pub blocks_failed: usize,
    /// Articles written to the sink
    pub articles_extracted: usize,
    /// Titles the index asked for
    pub titles_requested: usize,
    /// Wall-clock time for the run
    pub elapsed_seconds: f64,
    /// Blocks finished per second
    pub blocks_per_second: f64,
}

impl ExtractStats {
    /// Recompute the throughput rate from the counters
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.blocks_per_second =
                (self.blocks_completed + self.blocks_failed) as f64 / self.elapsed_seconds;
        }
    }
}

/// Errors that can occur during extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Index or archive missing/unreadable, or invalid settings. Fatal:
    /// surfaced to the operator before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One block failed to decompress or parse. Recovered locally: the run
    /// continues and the block contributes zero records.
    #[error("bad block at offset {offset}: {reason}")]
    BlockParse { offset: u64, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
