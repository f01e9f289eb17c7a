//! Publish sinks. The exporter hands every artifact to a `Publisher`; where
//! the bytes end up (bucket, directory, memory) is the sink's business.

use crate::error::PublishError;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use parking_lot::Mutex;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub trait Publisher: Send + Sync {
    /// Store `content` under `destination` (a `/`-separated relative path).
    fn publish(&self, content: &[u8], destination: &str, public: bool) -> Result<(), PublishError>;
}

/// Writes artifacts below a root directory.
/// Each file is written to a `.inprogress` sibling first, then promoted.
#[derive(Clone, Debug)]
pub struct DirPublisher {
    root: PathBuf,
    write_buffer_bytes: usize,
}

impl DirPublisher {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf(), write_buffer_bytes: 256 * 1024 }
    }

    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        destination
            .split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .fold(self.root.clone(), |p, part| p.join(part))
    }

    fn write(&self, content: &[u8], dest: &Path) -> std::io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_name = dest.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".inprogress");
        let tmp = dest.with_file_name(tmp_name);

        let f = create_with_backoff(&tmp, 16, 50)?;
        let mut w = BufWriter::with_capacity(self.write_buffer_bytes, f);
        w.write_all(content)?;
        w.flush()?;
        drop(w);
        replace_file_atomic_backoff(&tmp, dest)
    }
}

impl Publisher for DirPublisher {
    fn publish(&self, content: &[u8], destination: &str, public: bool) -> Result<(), PublishError> {
        let dest = self.path_for(destination);
        self.write(content, &dest)
            .map_err(|source| PublishError::Io { destination: destination.to_string(), source })?;
        tracing::debug!(path = %dest.display(), bytes = content.len(), public, "wrote artifact");
        Ok(())
    }
}

/// One artifact captured by a `MemoryPublisher`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub destination: String,
    pub content: Vec<u8>,
    pub public: bool,
}

/// Keeps published artifacts in memory, in publish order. Useful for dry runs.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    artifacts: Mutex<Vec<PublishedArtifact>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<PublishedArtifact> {
        self.artifacts.lock().clone()
    }

    /// Content of the most recent artifact published to `destination`.
    pub fn get(&self, destination: &str) -> Option<Vec<u8>> {
        self.artifacts
            .lock()
            .iter()
            .rev()
            .find(|a| a.destination == destination)
            .map(|a| a.content.clone())
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.lock().is_empty()
    }
}

impl Publisher for MemoryPublisher {
    fn publish(&self, content: &[u8], destination: &str, public: bool) -> Result<(), PublishError> {
        self.artifacts.lock().push(PublishedArtifact {
            destination: destination.to_string(),
            content: content.to_vec(),
            public,
        });
        Ok(())
    }
}
