//! Offset-indexed block extraction
//!
//! Pulls a selected subset of articles out of a multistream dump without
//! reading the whole archive: the index maps compressed byte offsets to the
//! titles stored in each bzip2 member, so only the blocks that hold
//! requested articles are decompressed.
//!
//! ```text
//! index file ──► OffsetIndex ──► Dispatcher ──► worker pool
//!                                    │        (seek + inflate one member,
//!                                    │         filter pages, clean wikitext)
//!                                    ▼
//!                               OutputSink (JSON lines or per-article files)
//! ```
//!
//! Failure is isolated per block: a corrupt or truncated member costs its
//! own articles and nothing else, and the loss is counted in the run stats.

pub mod block;
pub mod dispatcher;
pub mod index;
pub mod page;
pub mod progress;
pub mod record;
pub mod sink;
pub mod wikitext;

pub use dispatcher::Dispatcher;
pub use index::OffsetIndex;
pub use page::PageFilter;
pub use progress::ExtractProgress;
pub use record::{ArticleRecord, BlockOutcome, ExtractError, ExtractStats};
pub use sink::{sanitize_title, OutputSink};
pub use wikitext::WikiTextCleaner;
