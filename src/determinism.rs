//! One seed, many independent random streams
//!
//! Every component that needs randomness asks the context for its own
//! stream. A stream is a fresh `StdRng` seeded from the run seed and a fixed
//! per-purpose salt, so requesting the same stream twice yields identical
//! sequences and no component can perturb another's draws.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Purpose of a random stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Train/validation permutation
    Split,
    /// Model parameter initialization
    Init,
    /// Dropout masks during training
    Dropout,
    /// Attribution sampling in the explanation engine
    Sampling,
    /// Synthetic training data generation
    Synthetic,
    /// Per-epoch batch order
    Epoch(usize),
}

impl Stream {
    fn salt(self) -> u64 {
        match self {
            Stream::Split => 0x5EED_0001,
            Stream::Init => 0x5EED_0002,
            Stream::Dropout => 0x5EED_0003,
            Stream::Sampling => 0x5EED_0004,
            Stream::Synthetic => 0x5EED_0005,
            Stream::Epoch(epoch) => 0x5EED_1000u64.wrapping_add(epoch as u64),
        }
    }
}

/// Seeds every random stream of a training run or explanation from one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicContext {
    seed: u64,
}

impl DeterministicContext {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fresh generator for `stream`
    pub fn rng(&self, stream: Stream) -> StdRng {
        StdRng::seed_from_u64(mix(self.seed, stream.salt()))
    }
}

impl Default for DeterministicContext {
    fn default() -> Self {
        Self::new(42)
    }
}

/// SplitMix64 finalizer over seed and salt
fn mix(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
