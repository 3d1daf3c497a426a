use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;
const DEFAULT_SEED: u64 = 3819201;

/// Source of randomness for move sampling during expansion and rollouts.
///
/// The search draws every random decision from a single generator, so swapping
/// in a seeded implementation makes a whole search reproducible.
pub trait RandomGenerator: Default {
    fn next(&mut self) -> i32;

    /// Returns a value in `from..to`. `to` must be greater than `from`.
    fn next_range(&mut self, from: i32, to: i32) -> i32;

    /// Picks one element uniformly, or `None` for an empty slice.
    fn pick<'a, K>(&mut self, items: &'a [K]) -> Option<&'a K> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_range(0, items.len() as i32) as usize)
    }
}

/// Thread-local generator from `rand`. Not reproducible.
#[derive(Debug, Default)]
pub struct StandardRandomGenerator;

impl RandomGenerator for StandardRandomGenerator {
    fn next(&mut self) -> i32 {
        rand::random()
    }

    fn next_range(&mut self, from: i32, to: i32) -> i32 {
        rand::rng().random_range(from..to)
    }
}

/// `StdRng` seeded from a `u64`.
#[derive(Debug)]
pub struct SeededRandomGenerator {
    rng: StdRng,
}

impl SeededRandomGenerator {
    /// Seeds the underlying `StdRng` from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededRandomGenerator {
    fn default() -> Self {
        SeededRandomGenerator::new(DEFAULT_SEED)
    }
}

impl RandomGenerator for SeededRandomGenerator {
    fn next(&mut self) -> i32 {
        self.rng.random()
    }

    fn next_range(&mut self, from: i32, to: i32) -> i32 {
        self.rng.random_range(from..to)
    }
}

/// 64-bit linear congruential generator (Knuth's MMIX constants). Its sequence
/// depends on nothing but the seed, so it stays stable across platforms and
/// `rand` releases. Any `u64` is a valid seed.
#[derive(Debug)]
pub struct LcgRandomGenerator {
    state: u64,
}

impl Default for LcgRandomGenerator {
    fn default() -> Self {
        LcgRandomGenerator::new(DEFAULT_SEED)
    }
}

impl RandomGenerator for LcgRandomGenerator {
    fn next(&mut self) -> i32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        // the high 31 bits; the low bits of an LCG cycle with short periods
        (self.state >> 33) as i32
    }

    fn next_range(&mut self, from: i32, to: i32) -> i32 {
        self.next();
        let span = ((to as i64) - (from as i64)) as u64;
        (from as i64 + ((self.state >> 32) % span) as i64) as i32
    }
}

impl LcgRandomGenerator {
    /// Starts the sequence from `seed`.
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}
