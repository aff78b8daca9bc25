//! Output sinks
//!
//! Accepted records are persisted either as one line-delimited JSON file or
//! as one text file per article. The sink is owned by the coordinating
//! thread; workers never write output. Neither mode resumes a previous run:
//! JSON-lines truncates on open and per-file overwrites by filename.

use super::record::{ArticleRecord, ExtractError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for accepted articles
pub struct OutputSink {
    kind: SinkKind,
}

enum SinkKind {
    JsonLines { writer: BufWriter<File> },
    PerFile { dir: PathBuf },
}

impl OutputSink {
    /// Line-delimited JSON mode: one `{"id":..,"title":..,"text":..}` object
    /// per line. Truncates any previous run's file.
    pub fn json_lines(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            ExtractError::Config(format!(
                "cannot create output file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            kind: SinkKind::JsonLines {
                writer: BufWriter::new(file),
            },
        })
    }

    /// Per-file mode: one `<sanitized title>.txt` per article, with a
    /// human-readable `Title:` header. Creates the directory if absent.
    /// Titles that sanitize identically are last-write-wins.
    pub fn per_file(dir: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            ExtractError::Config(format!(
                "cannot create output directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            kind: SinkKind::PerFile {
                dir: dir.to_path_buf(),
            },
        })
    }

    /// Persist one record.
    ///
    /// JSON-lines flushes per record so the file stays one-complete-value-
    /// per-line even if the run is killed mid-flight.
    pub fn write(&mut self, record: &ArticleRecord) -> Result<(), ExtractError> {
        match &mut self.kind {
            SinkKind::JsonLines { writer } => {
                serde_json::to_writer(&mut *writer, record)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            SinkKind::PerFile { dir } => {
                let path = dir.join(format!("{}.txt", sanitize_title(&record.title)));
                fs::write(path, format!("Title: {}\n\n{}", record.title, record.text))?;
            }
        }
        Ok(())
    }

    /// Flush and close the sink
    pub fn finish(self) -> Result<(), ExtractError> {
        if let SinkKind::JsonLines { mut writer } = self.kind {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Make a title safe as a filename: spaces become underscores, and anything
/// outside word characters, hyphen, underscore, and dot is dropped.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, text: &str) -> ArticleRecord {
        ArticleRecord {
            id: Some("7".to_string()),
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn sanitize_replaces_spaces_and_drops_punctuation() {
        assert_eq!(sanitize_title("Albert Einstein"), "Albert_Einstein");
        assert_eq!(sanitize_title("Dune: Part Two"), "Dune_Part_Two");
        assert_eq!(sanitize_title("C++ (language)"), "C_language");
        assert_eq!(sanitize_title("v1.2-beta_3"), "v1.2-beta_3");
    }

    #[test]
    fn json_lines_writes_one_parseable_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.jsonl");

        let mut sink = OutputSink::json_lines(&path).unwrap();
        sink.write(&record("First", "Body one.")).unwrap();
        sink.write(&record("Second", "Body two.")).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("title").is_some());
            assert!(value.get("text").is_some());
            assert!(value.get("id").is_some());
        }
    }

    #[test]
    fn json_lines_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.jsonl");
        fs::write(&path, "stale line\n").unwrap();

        let mut sink = OutputSink::json_lines(&path).unwrap();
        sink.write(&record("Fresh", "New body.")).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn per_file_writes_title_header_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("articles");

        let mut sink = OutputSink::per_file(&out_dir).unwrap();
        sink.write(&record("Albert Einstein", "Was a physicist."))
            .unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(out_dir.join("Albert_Einstein.txt")).unwrap();
        assert_eq!(content, "Title: Albert Einstein\n\nWas a physicist.");
    }

    #[test]
    fn per_file_collisions_are_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("articles");

        let mut sink = OutputSink::per_file(&out_dir).unwrap();
        sink.write(&record("A B", "first")).unwrap();
        sink.write(&record("A_B", "second")).unwrap();
        sink.finish().unwrap();

        let entries: Vec<_> = fs::read_dir(&out_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let content = fs::read_to_string(out_dir.join("A_B.txt")).unwrap();
        assert!(content.ends_with("second"));
    }
}
