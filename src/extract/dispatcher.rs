//! Parallel block dispatch
//!
//! One task per distinct offset: a block holding several requested titles is
//! decompressed once. Tasks are claimed in ascending offset order by a fixed
//! pool of worker threads and collected in completion order, so output order
//! never follows the index file. Workers share only the immutable offset
//! index and the read-only archive; the sink stays on the calling thread.

use super::block;
use super::index::OffsetIndex;
use super::page::PageFilter;
use super::progress::ExtractProgress;
use super::record::{BlockOutcome, ExtractError, ExtractStats};
use super::sink::OutputSink;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{info, warn};

/// Schedules block tasks across a worker pool and aggregates their records
pub struct Dispatcher {
    archive: PathBuf,
    workers: usize,
    chunk_bytes: usize,
}

impl Dispatcher {
    pub fn new(archive: impl AsRef<Path>) -> Self {
        Self {
            archive: archive.as_ref().to_path_buf(),
            workers: 0,
            chunk_bytes: block::DEFAULT_CHUNK_BYTES,
        }
    }

    /// Worker pool size; 0 means all available cores
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Compressed bytes read per chunk while inflating a block
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    fn effective_workers(&self, blocks: usize) -> usize {
        let pool = if self.workers == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            self.workers
        };
        pool.min(blocks).max(1)
    }

    /// Run the extraction: decompress every indexed block across the pool
    /// and stream accepted records into the sink as blocks complete.
    ///
    /// A block that fails to decompress or parse is counted and logged, and
    /// the run continues; only a sink write failure aborts.
    pub fn run(
        &self,
        index: &OffsetIndex,
        sink: &mut OutputSink,
        progress: &ExtractProgress,
    ) -> Result<ExtractStats, ExtractError> {
        if !self.archive.is_file() {
            return Err(ExtractError::Config(format!(
                "archive file not found: {}",
                self.archive.display()
            )));
        }

        let offsets = index.offsets();
        if offsets.is_empty() {
            info!("index is empty, nothing to extract");
            return Ok(progress.stats());
        }

        let workers = self.effective_workers(offsets.len());
        info!(
            blocks = offsets.len(),
            workers, "starting extraction from {}", self.archive.display()
        );

        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<BlockOutcome>();

        thread::scope(|scope| -> Result<(), ExtractError> {
            for _ in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                let offsets = &offsets;
                let archive = self.archive.as_path();
                let chunk_bytes = self.chunk_bytes;
                scope.spawn(move || {
                    let filter = PageFilter::new();
                    loop {
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(&offset) = offsets.get(i) else {
                            break;
                        };
                        let Some(titles) = index.titles_for(offset) else {
                            continue;
                        };
                        let result = block::read_block(archive, offset, chunk_bytes)
                            .and_then(|raw| filter.filter_block(&raw, titles, offset));
                        if tx.send(BlockOutcome { offset, result }).is_err() {
                            // Receiver is gone: the run was aborted
                            break;
                        }
                    }
                });
            }
            drop(tx);

            for outcome in rx {
                match outcome.result {
                    Ok(records) => {
                        for record in &records {
                            sink.write(record)?;
                        }
                        progress.block_completed(records.len());
                    }
                    Err(e) => {
                        warn!(offset = outcome.offset, "block skipped: {}", e);
                        progress.block_failed();
                    }
                }
            }
            Ok(())
        })?;

        progress.finish();
        Ok(progress.stats())
    }
}
