use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// A source of uniformly distributed integers.
///
/// This is the only capability the samplers need from a random number
/// generator, so any generator can drive them by implementing this trait.
pub trait RandomSource {
    /// Draw an integer uniformly from the half-open range `[low, high)`.
    ///
    /// PRECONDITION: `low < high`.
    fn uniform_int(&mut self, low: usize, high: usize) -> usize;
}

impl RandomSource for StdRng {
    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        self.random_range(low..high)
    }
}

/// Seedable pseudo-random generator with a replayable seed.
///
/// The generator can be constructed from a seed, re-seeded at any point, and
/// asked for a seed that continues its current stream. Two generators built
/// from the same seed produce the same sequence.
///
/// Example:
///
/// ```rust
/// use tessera_ransac::{PseudoRandom, RandomSource};
///
/// let mut a = PseudoRandom::from_seed(42);
/// let mut b = PseudoRandom::from_seed(42);
/// assert_eq!(a.uniform_int(0, 100), b.uniform_int(0, 100));
/// ```
#[derive(Debug, Clone)]
pub struct PseudoRandom {
    rng: StdRng,
}

impl Default for PseudoRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl PseudoRandom {
    /// Create a generator seeded from the thread-local entropy source.
    ///
    /// Runs using this generator are not reproducible.
    pub fn new() -> Self {
        let mut tr = rand::rng();
        Self {
            rng: StdRng::from_rng(&mut tr),
        }
    }

    /// Create a generator with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restart the sequence from `seed`.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Draw a seed from the stream and re-seed the generator with it.
    ///
    /// `PseudoRandom::from_seed(s)` then continues exactly where this
    /// instance continues. This advances the sequence, so consecutive calls
    /// return different seeds.
    pub fn next_seed(&mut self) -> u64 {
        let seed = self.rng.next_u64();
        self.set_seed(seed);
        seed
    }

    /// Draw a float uniformly from `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.random_range(low..high)
    }
}

impl RandomSource for PseudoRandom {
    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        self.rng.random_range(low..high)
    }
}
