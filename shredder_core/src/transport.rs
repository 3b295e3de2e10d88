//! File-system side of the tool: policy checks, reading sources and writing results.
//!
//! The byte transforms in [`crate::mutator`] and [`crate::generator`] never fail and never
//! touch storage. Everything that can go wrong with a request is caught here, before
//! those transforms are invoked.

use crate::buffer::ByteBuffer;
use crate::format::{FormatTag, media_type_for_path};
use crate::generator::{GenerateError, generate_format};
use crate::mutator::corrupt_observed;
use crate::observer::WriteCountObserver;
use crate::size::{BYTES_PER_MB, format_size};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest source file accepted for corruption: 100 MiB.
pub const MAX_INPUT_SIZE_BYTES: u64 = 100 * 1024 * 1024;
/// Base name for generated files when the caller gives none.
pub const DEFAULT_FILE_NAME: &str = "generated_file";

#[derive(Error, Debug)]
pub enum TransportError {
    /// The source exceeds the configured ceiling; it was not read.
    #[error("Input is {size} bytes, larger than the {limit} byte limit")]
    OversizedInput { size: u64, limit: u64 },

    /// The requested generation size was zero, negative or not a number.
    #[error("Requested size must be greater than 0 MB, got {0}")]
    InvalidSize(f64),

    #[error("{0:?} is not a regular file")]
    NotAFile(PathBuf),

    #[error("Refusing to overwrite source file {0:?}")]
    WouldOverwriteSource(PathBuf),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl TransportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        TransportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Limits and defaults applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPolicy {
    pub max_input_size_bytes: u64,
    pub default_file_name: String,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            max_input_size_bytes: MAX_INPUT_SIZE_BYTES,
            default_file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl TransportPolicy {
    pub fn check_input_size(&self, size: u64) -> Result<(), TransportError> {
        if size > self.max_input_size_bytes {
            return Err(TransportError::OversizedInput {
                size,
                limit: self.max_input_size_bytes,
            });
        }
        Ok(())
    }

    /// `{name}.{ext}`, where a missing or blank name falls back to the default.
    pub fn output_file_name(&self, name: Option<&str>, format: FormatTag) -> String {
        let base = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.default_file_name.as_str());
        format!("{base}.{}", format.extension())
    }
}

/// Converts a size in megabytes to bytes, truncating any fractional byte.
///
/// Only strictly positive, finite sizes are accepted.
pub fn requested_size_bytes(size_mb: f64) -> Result<u64, TransportError> {
    if !size_mb.is_finite() || size_mb <= 0.0 {
        return Err(TransportError::InvalidSize(size_mb));
    }
    // `as` saturates for values beyond u64::MAX.
    Ok((size_mb * BYTES_PER_MB as f64).trunc() as u64)
}

/// A finished artifact, ready to be handed to a [`Sink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub file_name: String,
    pub media_type: &'static str,
    pub buffer: ByteBuffer,
}

/// Reads `source`, corrupts it and returns it under the source's own file name.
///
/// The size check runs on file metadata before any bytes are read, and again on the
/// bytes actually read in case the file grew in between.
pub fn corrupt_file<R: Rng + ?Sized>(
    source: &Path,
    policy: &TransportPolicy,
    rng: &mut R,
) -> Result<Delivery, TransportError> {
    let metadata = fs::metadata(source).map_err(|e| TransportError::io(source, e))?;
    if !metadata.is_file() {
        return Err(TransportError::NotAFile(source.to_path_buf()));
    }
    policy.check_input_size(metadata.len())?;

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransportError::NotAFile(source.to_path_buf()))?;

    let bytes = fs::read(source).map_err(|e| TransportError::io(source, e))?;
    policy.check_input_size(bytes.len() as u64)?;
    tracing::debug!(
        source = %source.display(),
        size = %format_size(bytes.len() as u64),
        "read source file"
    );

    let mut writes = WriteCountObserver::new();
    let buffer = corrupt_observed(ByteBuffer::from(bytes), rng, &mut writes);
    tracing::debug!(
        writes = writes.writes,
        changed = writes.changed,
        distinct = writes.distinct_indices(),
        "corrupted source file"
    );
    Ok(Delivery {
        file_name,
        media_type: media_type_for_path(source),
        buffer,
    })
}

/// Generates `size_mb` megabytes of random bytes named `{name}.{format}`.
pub fn generate_file<R: Rng + ?Sized>(
    size_mb: f64,
    format: FormatTag,
    name: Option<&str>,
    policy: &TransportPolicy,
    rng: &mut R,
) -> Result<Delivery, TransportError> {
    let size_bytes = requested_size_bytes(size_mb)?;
    let generated = generate_format(size_bytes, format, rng)?;
    Ok(Delivery {
        file_name: policy.output_file_name(name, format),
        media_type: generated.media_type,
        buffer: generated.buffer,
    })
}

/// Consumes deliveries, e.g. by writing them to storage.
pub trait Sink {
    /// Stores `delivery` and returns where it ended up.
    fn deliver(&mut self, delivery: &Delivery) -> Result<PathBuf, TransportError>;
}

/// Writes each delivery as `directory/file_name`, creating the directory if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
    protected: Option<PathBuf>,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            protected: None,
        }
    }

    /// Refuse any delivery that would replace `path`.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected = Some(path.into());
        self
    }

    fn overwrites_protected(&self, target: &Path) -> bool {
        let Some(protected) = &self.protected else {
            return false;
        };
        match (fs::canonicalize(target), fs::canonicalize(protected)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Sink for DirectorySink {
    fn deliver(&mut self, delivery: &Delivery) -> Result<PathBuf, TransportError> {
        let target = self.directory.join(&delivery.file_name);
        if self.overwrites_protected(&target) {
            return Err(TransportError::WouldOverwriteSource(target));
        }

        fs::create_dir_all(&self.directory)
            .map_err(|e| TransportError::io(&self.directory, e))?;
        fs::write(&target, delivery.buffer.as_bytes())
            .map_err(|e| TransportError::io(&target, e))?;

        tracing::info!(
            path = %target.display(),
            media_type = delivery.media_type,
            size = %format_size(delivery.buffer.len() as u64),
            "wrote file"
        );
        Ok(target)
    }
}
