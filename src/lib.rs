//! WikiSlice: offset-indexed article extraction from multistream dumps
//!
//! Extracts a selected subset of articles from a compressed Wikipedia XML
//! dump by seeking directly to the bzip2 members that hold them:
//! - Offset index grouping titles by block
//! - Parallel single-member decompression across a worker pool
//! - Fault-isolated page filtering (main namespace, no redirects)
//! - Wikitext flattening to plain text
//! - JSON-lines or per-article file output

pub mod config;
pub mod extract;

pub use config::Config;
