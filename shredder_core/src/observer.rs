use std::collections::BTreeSet;

/// A `MutationObserver` watches a mutator while it rewrites a buffer.
///
/// Mutators call `on_write` once per index-write step, in the order the steps happen,
/// including steps that write back the value already stored at that index. This makes
/// the number of mutation steps observable without instrumenting the random source.
pub trait MutationObserver {
    /// Called once for every overwrite the mutator performs.
    ///
    /// # Arguments
    /// * `index`: Position in the buffer that was written.
    /// * `previous`: The byte stored at `index` before the write.
    /// * `value`: The byte written at `index`.
    fn on_write(&mut self, index: usize, previous: u8, value: u8);
}

/// Counts index-write steps and remembers which positions were touched.
///
/// `writes` counts every step, so repeated indices are counted each time. `changed`
/// only counts steps whose new value differs from the byte it replaced.
#[derive(Default, Debug, Clone)]
pub struct WriteCountObserver {
    pub writes: usize,
    pub changed: usize,
    pub touched: BTreeSet<usize>,
}

impl WriteCountObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct indices written at least once.
    pub fn distinct_indices(&self) -> usize {
        self.touched.len()
    }
}

impl MutationObserver for WriteCountObserver {
    fn on_write(&mut self, index: usize, previous: u8, value: u8) {
        self.writes += 1;
        if previous != value {
            self.changed += 1;
        }
        self.touched.insert(index);
    }
}
