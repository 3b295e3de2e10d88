use crate::buffer::ByteBuffer;
use crate::observer::MutationObserver;
use rand::Rng;

/// Fraction of a buffer's length that is overwritten by [`RatioCorruptor`].
pub const CORRUPTION_RATIO: f64 = 0.05;

/// A `Mutator` rewrites a [`ByteBuffer`] using an injected random source.
///
/// The buffer is taken by value; callers must treat the input as consumed and use the
/// returned buffer instead.
///
/// # Type Parameters
/// * `R`: The random number generator used for mutation decisions.
pub trait Mutator<R: Rng + ?Sized> {
    /// Applies the mutation strategy to `buffer`.
    ///
    /// # Arguments
    /// * `buffer`: The bytes to mutate. Ownership moves into the mutator.
    /// * `rng`: Source of every random decision the mutator makes.
    /// * `observers`: Notified of each individual write, in order.
    fn mutate(
        &mut self,
        buffer: ByteBuffer,
        rng: &mut R,
        observers: &mut [&mut dyn MutationObserver],
    ) -> ByteBuffer;
}

/// Number of overwrite steps applied to a buffer of `len` bytes: `floor(len * 0.05)`.
pub fn corruption_count(len: usize) -> usize {
    (len as f64 * CORRUPTION_RATIO).floor() as usize
}

/// Overwrites `floor(len * CORRUPTION_RATIO)` random positions with random bytes.
///
/// Each step draws an index uniformly from `0..len` and a value uniformly from
/// `0..=255`. Indices are drawn with replacement, so a position can be hit more than
/// once and a step may write back the byte already there. The length never changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RatioCorruptor;

impl<R> Mutator<R> for RatioCorruptor
where
    R: Rng + ?Sized,
{
    fn mutate(
        &mut self,
        mut buffer: ByteBuffer,
        rng: &mut R,
        observers: &mut [&mut dyn MutationObserver],
    ) -> ByteBuffer {
        let len = buffer.len();
        let steps = corruption_count(len);

        for _ in 0..steps {
            // `steps > 0` implies `len > 0`, so the range is never empty.
            let index = rng.random_range(0..len);
            let value: u8 = rng.random();
            let previous = buffer[index];
            buffer[index] = value;
            for observer in observers.iter_mut() {
                observer.on_write(index, previous, value);
            }
        }

        tracing::debug!(len, steps, "corrupted buffer");
        buffer
    }
}

/// Corrupts `buffer` with [`RatioCorruptor`] and returns it.
pub fn corrupt<R: Rng + ?Sized>(buffer: ByteBuffer, rng: &mut R) -> ByteBuffer {
    RatioCorruptor.mutate(buffer, rng, &mut [])
}

/// Like [`corrupt`], reporting every write to `observer`.
pub fn corrupt_observed<R: Rng + ?Sized>(
    buffer: ByteBuffer,
    rng: &mut R,
    observer: &mut dyn MutationObserver,
) -> ByteBuffer {
    RatioCorruptor.mutate(buffer, rng, &mut [observer])
}
