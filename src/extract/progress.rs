//! Progress tracking for extraction runs
//!
//! The dispatcher drives these counters on every task completion; the
//! aggregation logic never touches the progress bar directly.

use super::record::ExtractStats;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Observer for block completions, with an optional terminal progress bar
pub struct ExtractProgress {
    /// Progress bar (None in quiet mode)
    bar: Option<ProgressBar>,
    start_time: Instant,
    blocks_total: usize,
    titles_requested: usize,
    blocks_completed: AtomicUsize,
    blocks_failed: AtomicUsize,
    articles_extracted: AtomicUsize,
}

impl ExtractProgress {
    pub fn new(blocks_total: usize, titles_requested: usize, quiet: bool) -> Self {
        let bar = if !quiet {
            let pb = ProgressBar::new(blocks_total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        Self {
            bar,
            start_time: Instant::now(),
            blocks_total,
            titles_requested,
            blocks_completed: AtomicUsize::new(0),
            blocks_failed: AtomicUsize::new(0),
            articles_extracted: AtomicUsize::new(0),
        }
    }

    /// Record a block that decompressed and parsed, with however many of its
    /// pages survived filtering.
    pub fn block_completed(&self, articles: usize) {
        self.blocks_completed.fetch_add(1, Ordering::Relaxed);
        let total_articles = self.articles_extracted.fetch_add(articles, Ordering::Relaxed) + articles;
        self.tick(total_articles);
    }

    /// Record a block skipped as unreadable or malformed
    pub fn block_failed(&self) {
        self.blocks_failed.fetch_add(1, Ordering::Relaxed);
        let total_articles = self.articles_extracted.load(Ordering::Relaxed);
        self.tick(total_articles);
    }

    fn tick(&self, total_articles: usize) {
        if let Some(ref pb) = self.bar {
            let done = self.blocks_completed.load(Ordering::Relaxed)
                + self.blocks_failed.load(Ordering::Relaxed);
            pb.set_position(done as u64);
            pb.set_message(format!("| {} articles", total_articles));
        }
    }

    /// Current counters as a stats snapshot
    pub fn stats(&self) -> ExtractStats {
        let mut stats = ExtractStats {
            blocks_total: self.blocks_total,
            blocks_completed: self.blocks_completed.load(Ordering::Relaxed),
            blocks_failed: self.blocks_failed.load(Ordering::Relaxed),
            articles_extracted: self.articles_extracted.load(Ordering::Relaxed),
            titles_requested: self.titles_requested,
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
            blocks_per_second: 0.0,
        };
        stats.update_rate();
        stats
    }

    /// Close out the progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.bar {
            let stats = self.stats();
            pb.finish_with_message(format!(
                "| {} articles from {} blocks, {} bad blocks",
                stats.articles_extracted, stats.blocks_completed, stats.blocks_failed
            ));
        }
    }

    /// Print the run summary. Extracted can fall short of requested; the gap
    /// plus the bad-block count is the observable loss.
    pub fn print_summary(&self) {
        let stats = self.stats();

        println!("\nExtraction Summary");
        println!("==================");
        println!(
            "Articles extracted: {} / {} requested",
            stats.articles_extracted, stats.titles_requested
        );
        println!(
            "Blocks processed:   {} / {}",
            stats.blocks_completed + stats.blocks_failed,
            stats.blocks_total
        );
        println!("Bad blocks:         {}", stats.blocks_failed);
        println!("Elapsed time:       {:.1}s", stats.elapsed_seconds);
        println!("Throughput:         {:.1} blocks/s", stats.blocks_per_second);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let progress = ExtractProgress::new(4, 10, true);

        progress.block_completed(3);
        progress.block_completed(0);
        progress.block_failed();

        let stats = progress.stats();
        assert_eq!(stats.blocks_total, 4);
        assert_eq!(stats.blocks_completed, 2);
        assert_eq!(stats.blocks_failed, 1);
        assert_eq!(stats.articles_extracted, 3);
        assert_eq!(stats.titles_requested, 10);
    }

    #[test]
    fn extracted_never_exceeds_requested_in_normal_runs() {
        let progress = ExtractProgress::new(1, 2, true);
        progress.block_completed(2);

        let stats = progress.stats();
        assert!(stats.articles_extracted <= stats.titles_requested);
    }
}
