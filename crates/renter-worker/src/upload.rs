//! # Upload
//!
//! Packs every input file into a single byte stream and stores it as a
//! sequence of slabs, then registers one object per file.
//!
//! ```text
//!   producer thread                          caller thread
//!   ───────────────                          ─────────────
//!   file 1 ─┐                                 ┌─ window 0 ─▶ upload_slab ─▶ Slab 0
//!   file 2 ─┼─▶ FanOut ─▶ PipeWriter ══pipe══▶│─ window 1 ─▶ upload_slab ─▶ Slab 1
//!   file k ─┘      └─▶ StreamHasher (per file)└─ ...
//! ```
//!
//! Windows are `min(remaining, m × sector_size)` bytes, so every slab but the
//! last is full and a slab may span a file boundary. Afterwards
//! [`split_slabs`] hands each file the slab windows covering its bytes.
//!
//! Everything that can be checked locally (redundancy, digest name, input
//! files) is checked before the first network call.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use renter_core::{
    split_slabs, Checksum, ChecksumAlgorithm, ContractHandle, Object, Redundancy, Slab,
    StreamHasher,
};
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;
use crate::pipe::{is_pipe_closed, pipe, FanOut, PipeReader, PipeWriter};
use crate::worker::Worker;

/// Outcome of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedObject {
    /// Object key (the file's base name).
    pub key: String,
    /// Bytes uploaded.
    pub length: u64,
    /// Checksum of the file's bytes as read.
    pub checksum: Checksum,
}

/// Outcome of an upload job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    /// One entry per input file, in argument order.
    pub objects: Vec<UploadedObject>,
    /// Slabs stored for the whole job.
    pub slabs: usize,
}

impl UploadReport {
    /// Total bytes uploaded.
    pub fn total_length(&self) -> u64 {
        self.objects.iter().map(|o| o.length).sum()
    }
}

/// An input file as it was when the job started.
#[derive(Debug, Clone)]
struct Input {
    path: PathBuf,
    key: String,
    length: u64,
}

impl Worker {
    /// Upload `paths` with `min_shards`-of-`total_shards` redundancy and
    /// register one object per file, keyed by base name.
    ///
    /// `digest` names the checksum algorithm (`sha256`, `sha1` or `md5`).
    ///
    /// Fails without touching the network if the redundancy or digest is
    /// invalid or an input cannot be inspected. Once slabs are stored, a
    /// failure to register a later object leaves earlier objects in place.
    pub fn upload(
        &self,
        paths: &[PathBuf],
        min_shards: u8,
        total_shards: u8,
        digest: &str,
    ) -> Result<UploadReport, WorkerError> {
        let redundancy = Redundancy::new(min_shards, total_shards)?;
        let slab_size = redundancy.slab_size(self.config.sector_size)?;
        let algorithm: ChecksumAlgorithm = digest.parse()?;
        let inputs = paths
            .iter()
            .map(|p| stat_input(p))
            .collect::<Result<Vec<_>, _>>()?;
        for key in repeated_keys(&inputs) {
            tracing::warn!(key, "several inputs share this key; the last one registered wins");
        }

        let contracts = self.select_usable(usize::from(total_shards))?;
        let height = self.services.chain.height()?;
        let total: u64 = inputs.iter().map(|i| i.length).sum();
        tracing::info!(
            files = inputs.len(),
            bytes = total,
            min_shards,
            total_shards,
            contracts = contracts.len(),
            height,
            "starting upload"
        );

        let (slabs, checksums) = self.run_pipeline(&inputs, redundancy, slab_size, algorithm, height, &contracts)?;

        let lengths: Vec<u64> = inputs.iter().map(|i| i.length).collect();
        let per_file = split_slabs(&slabs, &lengths)?;

        let mut objects = Vec::with_capacity(inputs.len());
        for ((input, slices), checksum) in inputs.into_iter().zip(per_file).zip(checksums) {
            let object = Object::new(input.key.clone(), slices);
            self.services.objects.add_object(&input.key, &object)?;
            tracing::debug!(key = %input.key, slices = object.slabs.len(), "registered object");
            objects.push(UploadedObject {
                key: input.key,
                length: input.length,
                checksum,
            });
        }

        tracing::info!(objects = objects.len(), slabs = slabs.len(), bytes = total, "upload complete");
        Ok(UploadReport {
            objects,
            slabs: slabs.len(),
        })
    }

    /// Stream `inputs` through the pipe into the slab transport.
    ///
    /// The first failure on either side ends the job. A consumer-side root
    /// cause wins over everything; otherwise the producer's error wins over
    /// the broken-pipe symptom it caused downstream. When both sides report
    /// a pipe breakdown the consumer stopped first, so its error is kept.
    fn run_pipeline(
        &self,
        inputs: &[Input],
        redundancy: Redundancy,
        slab_size: u64,
        algorithm: ChecksumAlgorithm,
        height: u64,
        contracts: &[ContractHandle],
    ) -> Result<(Vec<Slab>, Vec<Checksum>), WorkerError> {
        let total: u64 = inputs.iter().map(|i| i.length).sum();
        let (writer, reader) = pipe(self.config.pipe_depth, self.config.pipe_chunk_size);

        std::thread::scope(|scope| {
            let producer = scope.spawn(move || read_inputs(inputs, algorithm, writer));
            // `reader` is dropped when this returns, which unblocks the
            // producer if the consumer stopped early.
            let consumed = self.upload_slabs(reader, total, redundancy, slab_size, height, contracts);
            let produced = producer
                .join()
                .unwrap_or_else(|_| Err(WorkerError::Pipeline("file reader thread panicked".into())));

            match (consumed, produced) {
                (Err(e), _) if !e.is_pipeline() => Err(e),
                (Err(e), Err(p)) if p.is_pipeline() => Err(e),
                (_, Err(e)) => Err(e),
                (Err(e), Ok(_)) => Err(e),
                (Ok(slabs), Ok(checksums)) => Ok((slabs, checksums)),
            }
        })
    }

    /// Cut `total` bytes from `reader` into slab windows and upload each.
    fn upload_slabs(
        &self,
        mut reader: PipeReader,
        total: u64,
        redundancy: Redundancy,
        slab_size: u64,
        height: u64,
        contracts: &[ContractHandle],
    ) -> Result<Vec<Slab>, WorkerError> {
        let mut slabs = Vec::new();
        let mut remaining = total;

        while remaining > 0 {
            let window = remaining.min(slab_size);
            let mut data = (&mut reader).take(window);
            let result = self.services.transport.upload_slab(
                &mut data,
                redundancy.min_shards(),
                redundancy.total_shards(),
                height,
                contracts,
            );
            let slab = match result {
                Ok(slab) => slab,
                Err(_) if reader.is_broken() => {
                    return Err(WorkerError::Pipeline(format!(
                        "file reader failed during slab {}",
                        slabs.len()
                    )))
                }
                Err(e) => return Err(e.into()),
            };
            if slab.length != window || reader.is_broken() {
                return Err(WorkerError::Pipeline(format!(
                    "slab {} encoded {} bytes, expected {window}",
                    slabs.len(),
                    slab.length
                )));
            }

            tracing::debug!(
                slab = slabs.len(),
                bytes = window,
                shards = slab.shards.len(),
                "uploaded slab"
            );
            remaining -= window;
            slabs.push(slab);
        }
        Ok(slabs)
    }
}

fn stat_input(path: &Path) -> Result<Input, WorkerError> {
    let meta = fs::metadata(path).map_err(|e| WorkerError::local_io(path, e))?;
    if !meta.is_file() {
        return Err(WorkerError::local_io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }
    let key = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            WorkerError::local_io(path, io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))
        })?;
    Ok(Input {
        path: path.to_path_buf(),
        key,
        length: meta.len(),
    })
}

/// Keys that more than one input maps to, each reported once.
fn repeated_keys(inputs: &[Input]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for input in inputs {
        if !seen.insert(input.key.as_str()) && !repeated.contains(&input.key.as_str()) {
            repeated.push(input.key.as_str());
        }
    }
    repeated
}

/// Producer half: write every input into the pipe, hashing each file.
fn read_inputs(
    inputs: &[Input],
    algorithm: ChecksumAlgorithm,
    mut writer: PipeWriter,
) -> Result<Vec<Checksum>, WorkerError> {
    let mut checksums = Vec::with_capacity(inputs.len());
    for input in inputs {
        match copy_input(input, algorithm, &mut writer) {
            Ok(checksum) => checksums.push(checksum),
            Err(e) => {
                writer.abort(e.to_string());
                return Err(e);
            }
        }
    }
    writer.finish().map_err(pipe_write_error)?;
    Ok(checksums)
}

/// Copy exactly the stat'd length of one file into the pipe.
fn copy_input(
    input: &Input,
    algorithm: ChecksumAlgorithm,
    writer: &mut PipeWriter,
) -> Result<Checksum, WorkerError> {
    let file = File::open(&input.path).map_err(|e| WorkerError::local_io(&input.path, e))?;
    let mut hasher = StreamHasher::new(algorithm);
    let mut limited = file.take(input.length);

    let copied = {
        let mut sink = FanOut::new(&mut *writer, &mut hasher);
        io::copy(&mut limited, &mut sink).map_err(|e| {
            if is_pipe_closed(&e) {
                pipe_write_error(e)
            } else {
                WorkerError::local_io(&input.path, e)
            }
        })?
    };

    let mut file = limited.into_inner();
    let grew = file
        .read(&mut [0u8; 1])
        .map_err(|e| WorkerError::local_io(&input.path, e))?
        > 0;
    if copied != input.length || grew {
        return Err(WorkerError::local_io(
            &input.path,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file changed size during upload (expected {} bytes)", input.length),
            ),
        ));
    }
    Ok(hasher.finalize())
}

fn pipe_write_error(e: io::Error) -> WorkerError {
    if is_pipe_closed(&e) {
        WorkerError::Pipeline("slab uploader stopped reading".into())
    } else {
        WorkerError::Pipeline(format!("pipe write failed: {e}"))
    }
}
