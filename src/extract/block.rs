//! Single-member block decompression
//!
//! A multistream dump is a concatenation of independently compressed bzip2
//! members; the index points at member boundaries. Each task opens its own
//! handle, seeks to its offset, and inflates exactly one member. The
//! decoder's end-of-stream signal is the member boundary, not file EOF.

use super::record::ExtractError;
use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Compressed bytes pulled from the archive per read. Members inflate to a
/// few MiB in practice, so one chunk usually covers the whole member.
pub const DEFAULT_CHUNK_BYTES: usize = 16 * 1024 * 1024;

/// Decompress the single bzip2 member starting at `offset`.
///
/// Opens an independent read handle (handles are never shared between
/// workers). A decode failure after some output was produced returns the
/// partial buffer and lets the XML parser decide whether it is usable; a
/// failure with nothing produced is reported against the block.
pub fn read_block(
    archive: &Path,
    offset: u64,
    chunk_bytes: usize,
) -> Result<Vec<u8>, ExtractError> {
    let mut file = File::open(archive)?;
    file.seek(SeekFrom::Start(offset))?;

    let mut decoder = BzDecoder::new(BufReader::with_capacity(chunk_bytes, file));
    let mut data = Vec::new();
    match decoder.read_to_end(&mut data) {
        Ok(_) => Ok(data),
        Err(e) if !data.is_empty() => {
            debug!(
                offset,
                bytes = data.len(),
                "keeping partial member after decode error: {}",
                e
            );
            Ok(data)
        }
        Err(e) => Err(ExtractError::BlockParse {
            offset,
            reason: format!("bzip2 decode failed: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;
    use std::io::Write;

    fn member(payload: &[u8]) -> Vec<u8> {
        let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    fn archive_of(members: &[&[u8]]) -> (tempfile::NamedTempFile, Vec<u64>) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut offsets = Vec::new();
        let mut written = 0u64;
        for payload in members {
            let compressed = member(payload);
            offsets.push(written);
            written += compressed.len() as u64;
            file.write_all(&compressed).unwrap();
        }
        file.flush().unwrap();
        (file, offsets)
    }

    #[test]
    fn reads_exactly_one_member() {
        let (file, offsets) = archive_of(&[b"<page>first</page>", b"<page>second</page>"]);

        let first = read_block(file.path(), offsets[0], DEFAULT_CHUNK_BYTES).unwrap();
        assert_eq!(first, b"<page>first</page>");

        let second = read_block(file.path(), offsets[1], DEFAULT_CHUNK_BYTES).unwrap();
        assert_eq!(second, b"<page>second</page>");
    }

    #[test]
    fn misaligned_offset_is_a_block_error() {
        let (file, _) = archive_of(&[b"<page>first</page>"]);

        let err = read_block(file.path(), 3, DEFAULT_CHUNK_BYTES).unwrap_err();
        assert!(matches!(err, ExtractError::BlockParse { offset: 3, .. }));
    }

    #[test]
    fn offset_at_end_of_archive_yields_no_data() {
        let (file, _) = archive_of(&[b"<page>first</page>"]);
        let len = file.as_file().metadata().unwrap().len();

        // Nothing to read at EOF: either empty output or a block error, never
        // a panic or data from another member.
        match read_block(file.path(), len, DEFAULT_CHUNK_BYTES) {
            Ok(data) => assert!(data.is_empty()),
            Err(err) => assert!(matches!(err, ExtractError::BlockParse { .. })),
        }
    }

    #[test]
    fn small_chunk_size_still_covers_whole_member() {
        let payload = "x".repeat(64 * 1024);
        let (file, offsets) = archive_of(&[payload.as_bytes()]);

        let data = read_block(file.path(), offsets[0], 512).unwrap();
        assert_eq!(data.len(), payload.len());
    }
}
