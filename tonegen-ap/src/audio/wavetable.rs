//! One-cycle sine lookup table

/// Number of entries in the reference table
pub const TABLE_SIZE: usize = 200;

/// One period of a sine wave, sampled at `len()` equally spaced points
///
/// Immutable after construction. Shared with the render callback as
/// `Arc<Wavetable>`; nothing mutates it, so readers need no synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Box<[f32]>,
}

impl Wavetable {
    /// Build a table where `sample[i] = sin(2π·i/N)`
    ///
    /// Computed in f64 and narrowed to f32, so repeated generation is bit-identical.
    pub fn generate(table_size: usize) -> Self {
        let samples = (0..table_size)
            .map(|i| ((i as f64 / table_size as f64) * std::f64::consts::TAU).sin() as f32)
            .collect();

        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`; panics when `index >= len()`
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.samples[index]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

impl Default for Wavetable {
    fn default() -> Self {
        Self::generate(TABLE_SIZE)
    }
}
