// src/producer.rs

//! Sources of raw `git log` bytes
//!
//! The analyzer pulls chunks through [`LogProducer`]. Chunk boundaries carry no
//! meaning; lines and commits may be split anywhere.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crossbeam_channel::{bounded, Receiver};
use git2::Repository;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Arguments that make `git log` print the format the parser expects
///
/// `core.quotepath=off` keeps non-ASCII paths verbatim instead of octal-escaped.
pub const GIT_LOG_ARGS: [&str; 10] = [
    "-c",
    "core.quotepath=off",
    "log",
    "--reverse",
    "--numstat",
    "--summary",
    "--date=rfc2822",
    "--no-color",
    "--no-decorate",
    "--encoding=UTF-8",
];

pub trait LogProducer {
    /// Blocks until the next chunk is available; `Ok(None)` on a clean end
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Stops producing; called when the consumer quits early
    fn cancel(&mut self);
}

/// Reads log text from any reader, e.g. a saved log file
pub struct ReaderProducer<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReaderProducer<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self { reader, chunk_size: chunk_size.max(1), done: false }
    }
}

impl<R: Read> LogProducer for ReaderProducer<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.done {
            return Ok(None);
        }
        let mut buf = vec![0; self.chunk_size];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return Ok(None);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            }
        }
    }

    fn cancel(&mut self) {
        self.done = true;
    }
}

/// Runs `git log` in a repository and streams its stdout
///
/// A reader thread pushes stdout chunks into a bounded channel, so git blocks
/// once `channel_capacity` chunks are waiting. Cancelling (or dropping) the
/// producer kills and reaps the child.
pub struct GitLogProducer {
    child: Child,
    chunks: Option<Receiver<std::io::Result<Vec<u8>>>>,
    reader: Option<JoinHandle<()>>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

impl GitLogProducer {
    pub fn spawn(repo_path: &Path, config: &AnalysisConfig) -> Result<Self> {
        let repo = Repository::discover(repo_path)?;
        let workdir = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!("Running git log in {:?}", workdir);

        let mut child = Command::new("git")
            .args(GIT_LOG_ARGS)
            .current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AnalysisError::Spawn { program: "git".to_string(), source })?;

        let mut stdout = child.stdout.take().ok_or_else(|| AnalysisError::Spawn {
            program: "git".to_string(),
            source: std::io::Error::new(ErrorKind::BrokenPipe, "stdout not captured"),
        })?;
        let mut stderr_pipe = child.stderr.take();

        let (tx, rx) = bounded(config.channel_capacity);
        let chunk_size = config.chunk_size.max(1);
        let reader = thread::spawn(move || loop {
            let mut buf = vec![0; chunk_size];
            match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    buf.truncate(n);
                    if tx.send(Ok(buf)).is_err() {
                        break; // Consumer closed
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        });
        let stderr = thread::spawn(move || {
            let mut text = String::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                let _ = pipe.read_to_string(&mut text);
            }
            text
        });

        Ok(Self {
            child,
            chunks: Some(rx),
            reader: Some(reader),
            stderr: Some(stderr),
            finished: false,
        })
    }

    fn join_threads(&mut self) -> String {
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        self.stderr.take().and_then(|handle| handle.join().ok()).unwrap_or_default()
    }

    /// Reaps the child after stdout closed and checks its exit status
    fn wait(&mut self) -> Result<()> {
        self.finished = true;
        self.chunks = None;
        let stderr = self.join_threads();
        let status = self.child.wait()?;
        if !status.success() {
            return Err(AnalysisError::Producer {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        debug!("git log finished");
        Ok(())
    }
}

impl LogProducer for GitLogProducer {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(chunks) = self.chunks.as_ref().filter(|_| !self.finished) else {
            return Ok(None);
        };
        match chunks.recv() {
            Ok(Ok(chunk)) => Ok(Some(chunk)),
            Ok(Err(e)) => {
                self.cancel();
                Err(e.into())
            }
            Err(_) => self.wait().map(|()| None),
        }
    }

    fn cancel(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        // Dropping the receiver unblocks a reader stuck on a full channel
        self.chunks = None;
        if let Err(e) = self.child.kill() {
            warn!("Failed to stop git log: {}", e);
        }
        let _ = self.join_threads();
        let _ = self.child.wait();
        debug!("git log cancelled");
    }
}

impl Drop for GitLogProducer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_producer_chunks_input() {
        let mut producer = ReaderProducer::new(Cursor::new(b"abcdefg".to_vec()), 3);
        assert_eq!(producer.next_chunk().unwrap(), Some(b"abc".to_vec()));
        assert_eq!(producer.next_chunk().unwrap(), Some(b"def".to_vec()));
        assert_eq!(producer.next_chunk().unwrap(), Some(b"g".to_vec()));
        assert_eq!(producer.next_chunk().unwrap(), None);
        assert_eq!(producer.next_chunk().unwrap(), None);
    }

    #[test]
    fn cancelled_reader_stops() {
        let mut producer = ReaderProducer::new(Cursor::new(b"abcdefg".to_vec()), 3);
        producer.cancel();
        assert_eq!(producer.next_chunk().unwrap(), None);
    }

    #[test]
    fn spawn_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitLogProducer::spawn(dir.path(), &AnalysisConfig::default()).err().unwrap();
        assert!(matches!(err, AnalysisError::Repository(_)));
    }
}
