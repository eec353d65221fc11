use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::error::{GraphError, Result};

/// Where raw CSV text comes from: a file, an upload, a network fetch.
pub trait RawInputSource: Send + 'static {
    fn name(&self) -> String;

    fn read(&self) -> Result<String>;
}

#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawInputSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|error| GraphError::read_failure(self.name(), error))
    }
}

#[derive(Clone, Debug)]
pub struct TextSource {
    name: String,
    text: String,
}

impl TextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl RawInputSource for TextSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Reads `source` on a worker thread; the result arrives on the returned channel.
pub fn spawn_read<S: RawInputSource>(source: S) -> Receiver<Result<String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        tracing::debug!(source = %source.name(), "reading raw input");
        let _ = tx.send(source.read());
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_failure() {
        let source = FileSource::new("/nonexistent/graph-visualisation/input.csv");
        let error = source.read().unwrap_err();
        assert!(matches!(error, GraphError::ReadFailure { .. }));
        assert!(error.to_string().contains("/nonexistent/graph-visualisation/input.csv"));
    }

    #[test]
    fn spawned_read_delivers_text() {
        let rx = spawn_read(TextSource::new("upload.csv", "a,b\n"));
        assert_eq!(rx.recv().unwrap().unwrap(), "a,b\n");
    }
}
