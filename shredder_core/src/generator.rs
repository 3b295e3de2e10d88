use crate::buffer::ByteBuffer;
use crate::format::{FormatTag, media_type_for_tag};
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// The requested size cannot be addressed on this platform.
    #[error("Requested size of {0} bytes does not fit in memory on this platform")]
    SizeOverflow(u64),
    /// The allocator refused a buffer of the requested size.
    #[error("Could not allocate {0} bytes for the generated file")]
    AllocationFailed(u64),
}

/// Freshly generated random bytes and the media type they are labelled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub buffer: ByteBuffer,
    pub media_type: &'static str,
}

/// Generates `size_bytes` uniformly random bytes labelled with the media type of
/// `format_tag`.
///
/// Unknown tags are labelled `application/octet-stream`. A size of zero yields an empty
/// buffer. No upper bound is applied here; callers enforce their own ceiling.
pub fn generate<R: Rng + ?Sized>(
    size_bytes: u64,
    format_tag: &str,
    rng: &mut R,
) -> Result<GeneratedFile, GenerateError> {
    let buffer = random_buffer(size_bytes, rng)?;
    let media_type = media_type_for_tag(format_tag);
    tracing::debug!(size_bytes, format_tag, media_type, "generated buffer");
    Ok(GeneratedFile { buffer, media_type })
}

/// Same as [`generate`] for an already parsed [`FormatTag`].
pub fn generate_format<R: Rng + ?Sized>(
    size_bytes: u64,
    format: FormatTag,
    rng: &mut R,
) -> Result<GeneratedFile, GenerateError> {
    generate(size_bytes, format.extension(), rng)
}

fn random_buffer<R: Rng + ?Sized>(
    size_bytes: u64,
    rng: &mut R,
) -> Result<ByteBuffer, GenerateError> {
    let len =
        usize::try_from(size_bytes).map_err(|_| GenerateError::SizeOverflow(size_bytes))?;
    let mut buffer =
        ByteBuffer::try_zeroed(len).map_err(|_| GenerateError::AllocationFailed(size_bytes))?;
    rng.fill_bytes(buffer.as_bytes_mut());
    Ok(buffer)
}
