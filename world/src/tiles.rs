use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilefall_core::{Category, TileSource, MAX_STAGE};

/// Deterministic piece generator backed by a seeded ChaCha stream.
#[derive(Clone, Debug)]
pub struct RandomTiles {
    rng: ChaCha8Rng,
}

impl RandomTiles {
    /// Creates a generator that yields the same pieces for the same seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl TileSource for RandomTiles {
    fn next_category(&mut self) -> Category {
        let index = self.rng.gen_range(0..Category::ALL.len());
        Category::ALL[index]
    }

    fn next_stage(&mut self) -> u8 {
        self.rng.gen_range(0..=MAX_STAGE)
    }
}
