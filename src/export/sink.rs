use std::{
    io::{Cursor, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::foundation::error::{SmtxError, SmtxResult};

/// Destination for finished export blobs.
///
/// `save` is called once per export run; `archive` is called first when an export produced more
/// than one blob, and its result is what gets saved.
#[allow(async_fn_in_trait)]
pub trait PackagingSink {
    /// Persist one finished blob under `filename`.
    async fn save(&mut self, blob: Vec<u8>, filename: &str) -> SmtxResult<()>;

    /// Bundle named blobs into one archive. Defaults to a deflate zip.
    async fn archive(&mut self, entries: Vec<(String, Vec<u8>)>) -> SmtxResult<Vec<u8>> {
        zip_entries(&entries)
    }
}

/// Build a zip archive in memory, entries in the given order.
///
/// Timestamps are fixed so identical entries give identical archives.
pub fn zip_entries(entries: &[(String, Vec<u8>)]) -> SmtxResult<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("failed to start zip entry '{name}'"))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write zip entry '{name}'"))?;
    }
    let cursor = zip.finish().context("failed to finish zip archive")?;
    Ok(cursor.into_inner())
}

/// Writes saved blobs as files under a directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Sink writing into `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in save order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PackagingSink for DirectorySink {
    async fn save(&mut self, blob: Vec<u8>, filename: &str) -> SmtxResult<()> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(SmtxError::validation(format!(
                "invalid output filename '{filename}'"
            )));
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        let path = self.dir.join(filename);
        std::fs::write(&path, &blob)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = blob.len(), "export saved");
        self.written.push(path);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    saved: Vec<(String, Vec<u8>)>,
    archived: Vec<Vec<String>>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved blobs with their filenames, in save order.
    pub fn saved(&self) -> &[(String, Vec<u8>)] {
        &self.saved
    }

    /// Entry names of every archive request, in call order.
    pub fn archived(&self) -> &[Vec<String>] {
        &self.archived
    }
}

impl PackagingSink for InMemorySink {
    async fn save(&mut self, blob: Vec<u8>, filename: &str) -> SmtxResult<()> {
        self.saved.push((filename.to_string(), blob));
        Ok(())
    }

    async fn archive(&mut self, entries: Vec<(String, Vec<u8>)>) -> SmtxResult<Vec<u8>> {
        self.archived
            .push(entries.iter().map(|(name, _)| name.clone()).collect());
        zip_entries(&entries)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
