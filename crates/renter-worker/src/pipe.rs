//! # Bounded In-Memory Pipe
//!
//! Connects the upload job's file reader to its slab uploader. The writer
//! batches bytes into chunks and hands them over a bounded channel, so at
//! most `depth` chunks (plus one in each half's hands) are buffered at any
//! time and a slow uploader throttles the file reader.
//!
//! Either side can fail the other:
//!
//! - the writer calls [`PipeWriter::abort`] (or is dropped without
//!   [`PipeWriter::finish`]); the reader's next read past the buffered data
//!   returns an error and [`PipeReader::is_broken`] reports it.
//! - the reader is dropped; the writer's next chunk hand-off fails with
//!   [`io::ErrorKind::BrokenPipe`] carrying a [`PipeClosed`] marker.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

type Chunk = Result<Vec<u8>, String>;

/// Create a pipe holding up to `depth` chunks of `chunk_size` bytes.
pub fn pipe(depth: usize, chunk_size: usize) -> (PipeWriter, PipeReader) {
    let (tx, rx) = sync_channel(depth);
    let chunk_size = chunk_size.max(1);
    let writer = PipeWriter {
        tx,
        buf: Vec::with_capacity(chunk_size),
        chunk_size,
        done: false,
    };
    let reader = PipeReader {
        rx,
        chunk: Vec::new(),
        pos: 0,
        broken: false,
    };
    (writer, reader)
}

/// Marker error inside the `BrokenPipe` returned once the reader is gone.
#[derive(Debug)]
pub struct PipeClosed;

impl fmt::Display for PipeClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("pipe reader closed")
    }
}

impl std::error::Error for PipeClosed {}

/// Whether `err` came from writing into a pipe whose reader is gone.
pub fn is_pipe_closed(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
        && err.get_ref().is_some_and(|inner| inner.is::<PipeClosed>())
}

/// Sending half of a [`pipe`].
pub struct PipeWriter {
    tx: SyncSender<Chunk>,
    buf: Vec<u8>,
    chunk_size: usize,
    done: bool,
}

impl PipeWriter {
    fn send(&mut self, chunk: Chunk) -> io::Result<()> {
        self.tx
            .send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, PipeClosed))
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::replace(&mut self.buf, Vec::with_capacity(self.chunk_size));
        self.send(Ok(chunk))
    }

    /// Hand off any buffered bytes and close the pipe cleanly.
    ///
    /// The reader sees end-of-stream after the last byte.
    pub fn finish(mut self) -> io::Result<()> {
        self.done = true;
        self.send_buffered()
    }

    /// Close the pipe with an error. The reader receives every chunk sent so
    /// far, then fails with `reason`.
    pub fn abort(mut self, reason: impl Into<String>) {
        self.done = true;
        self.buf.clear();
        let _ = self.send(Err(reason.into()));
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let room = self.chunk_size - self.buf.len();
        let n = room.min(data.len());
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() == self.chunk_size {
            self.send_buffered()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.send(Err("pipe writer dropped before finishing".into()));
        }
    }
}

impl fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeWriter")
            .field("buffered", &self.buf.len())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

/// Receiving half of a [`pipe`].
#[derive(Debug)]
pub struct PipeReader {
    rx: Receiver<Chunk>,
    chunk: Vec<u8>,
    pos: usize,
    broken: bool,
}

impl PipeReader {
    /// Whether the writer aborted (or vanished) instead of finishing.
    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.chunk.len() {
            if self.broken {
                return Err(io::Error::other("pipe writer failed"));
            }
            match self.rx.recv() {
                Ok(Ok(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Ok(Err(reason)) => {
                    self.broken = true;
                    return Err(io::Error::other(reason));
                }
                // Writer gone after finish(): end of stream.
                Err(_) => return Ok(0),
            }
        }
        let n = (self.chunk.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Writes every byte to two sinks.
#[derive(Debug)]
pub struct FanOut<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> FanOut<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }

    pub fn into_parts(self) -> (A, B) {
        (self.primary, self.secondary)
    }
}

impl<A: Write, B: Write> Write for FanOut<A, B> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.primary.write_all(data)?;
        self.secondary.write_all(data)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}
