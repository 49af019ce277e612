//! Deterministic random number streams
//!
//! Every consumer of randomness (initialisation, selection, model fitting,
//! model sampling, constraint handling) owns its own [`RngStream`]. Streams
//! never share mutable state: a child obtained through [`RngStream::split`]
//! is seeded from the parent once and evolves independently afterwards, so
//! results do not depend on how many worker threads evaluate fitness.
//!
//! ```rust
//! use edaf::rng::RngManager;
//!
//! let mut rngs = RngManager::new(42);
//! let x = rngs.stream("model-sample").next_double();
//! assert!((0.0..1.0).contains(&x));
//! ```

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::StandardNormal;

/// A seeded, splittable random stream.
///
/// Implements [`RngCore`], so it can be passed anywhere a `rand::Rng` is
/// expected.
#[derive(Clone, Debug)]
pub struct RngStream {
    inner: StdRng,
}

impl RngStream {
    /// Create a stream from a 64-bit seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a stream seeded from system entropy
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Uniform double in `[0, 1)`
    pub fn next_double(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Standard normal deviate
    pub fn next_gaussian(&mut self) -> f64 {
        self.inner.sample(StandardNormal)
    }

    /// Uniform integer in `[0, bound)`; returns 0 when `bound` is 0
    pub fn next_int(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.inner.gen_range(0..bound)
    }

    /// Fork an independent child stream.
    ///
    /// Advances the parent by one draw; the child shares no state with it.
    pub fn split(&mut self) -> RngStream {
        let seed = splitmix64(self.inner.next_u64());
        RngStream::from_seed(seed)
    }

    /// Fork `count` independent children, one per concurrent consumer
    pub fn split_n(&mut self, count: usize) -> Vec<RngStream> {
        (0..count).map(|_| self.split()).collect()
    }
}

impl RngCore for RngStream {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Owner of the named per-component streams of one run.
///
/// Each stream is derived from the master seed and the component name, so
/// adding a new consumer never perturbs the sequences of existing ones.
#[derive(Clone, Debug)]
pub struct RngManager {
    master_seed: u64,
    streams: BTreeMap<String, RngStream>,
}

impl RngManager {
    /// Create a manager for the given master seed
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            streams: BTreeMap::new(),
        }
    }

    /// The master seed
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Get (or lazily create) the stream for `component`
    pub fn stream(&mut self, component: &str) -> &mut RngStream {
        let seed = derive_seed(self.master_seed, component);
        self.streams
            .entry(component.to_string())
            .or_insert_with(|| RngStream::from_seed(seed))
    }

    /// Names of the streams created so far
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }
}

/// Stable seed derivation: FNV-1a of the component name mixed into the
/// master seed with a SplitMix64 finaliser.
pub fn derive_seed(master_seed: u64, component: &str) -> u64 {
    splitmix64(master_seed ^ fnv1a64(component))
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn fnv1a64(value: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in value.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
