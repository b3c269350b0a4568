#![no_std]
#![forbid(unsafe_code)]

mod fill;

pub use fill::random_packet;

use log::trace;
use pktgen_core::{Batch, Status, BATCH_CAPACITY};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

/// Seed for the default filler RNG. Contents carry no meaning, so a fixed seed is fine.
pub const DEFAULT_SEED: u64 = 0x1a92_fab2_f5f3_0cdb;

/// Counter step applied after every fetch.
pub const STRIDE: usize = 13;

/// Initial counter used by the legacy constructor.
pub const LEGACY_INITIAL: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub initial: u8,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            initial: LEGACY_INITIAL,
            seed: DEFAULT_SEED,
        }
    }
}

/// Generator state behind a context handle.
///
/// `counter` is the size of the next batch. It is only range-checked at fetch
/// time: a constructor accepts any byte.
pub struct Generator<R: RngCore = ChaCha8Rng> {
    counter: u8,
    rng: R,
}

impl Generator<ChaCha8Rng> {
    pub fn new(initial: u8) -> Self {
        Self::from_config(GeneratorConfig {
            initial,
            ..GeneratorConfig::default()
        })
    }

    pub fn from_config(config: GeneratorConfig) -> Self {
        Self::with_rng(config.initial, ChaCha8Rng::seed_from_u64(config.seed))
    }
}

impl Default for Generator<ChaCha8Rng> {
    fn default() -> Self {
        Self::new(LEGACY_INITIAL)
    }
}

impl<R: RngCore> Generator<R> {
    pub fn with_rng(initial: u8, rng: R) -> Self {
        Self { counter: initial, rng }
    }

    /// Number of packets the next fetch will produce.
    pub fn pending(&self) -> u8 {
        self.counter
    }

    /// Fills the first `pending()` slots of `batch` and advances the counter.
    ///
    /// # Panics
    /// If the counter exceeds `BATCH_CAPACITY`. That only happens when the
    /// context was built with an out-of-range initial value, which is a caller bug.
    pub fn fetch_batch(&mut self, batch: &mut Batch) -> Status {
        let n = self.counter as usize;
        assert!(
            n <= BATCH_CAPACITY,
            "batch size {} exceeds capacity {}",
            n,
            BATCH_CAPACITY
        );

        for pkt in &mut batch.packets[..n] {
            random_packet(pkt, &mut self.rng);
        }
        batch.count = n as u8;

        self.counter = ((n + STRIDE) % BATCH_CAPACITY) as u8;
        trace!("fetched {} packets, next batch {}", n, self.counter);

        Status::Success
    }
}
