use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

/// Supplies the per-request PRNG used by popularity jitter and diversity shuffling
///
/// Each request gets its own generator, so the source itself is shared freely
/// across concurrent requests without locking.
pub trait RandomSource: Send + Sync {
    fn request_rng(&self) -> StdRng;
}

/// Fresh OS-seeded generator per request
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropySource;

impl RandomSource for EntropySource {
    fn request_rng(&self) -> StdRng {
        StdRng::from_entropy()
    }
}

/// Every request replays the same sequence
#[derive(Debug, Clone, Copy)]
pub struct SeededSource(pub u64);

impl RandomSource for SeededSource {
    fn request_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}

/// Production source unless a seed is configured
pub fn from_seed(seed: Option<u64>) -> Arc<dyn RandomSource> {
    match seed {
        Some(seed) => Arc::new(SeededSource(seed)),
        None => Arc::new(EntropySource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_source_repeats() {
        let source = SeededSource(7);
        let mut first = source.request_rng();
        let mut second = source.request_rng();
        let a: Vec<u32> = (0..5).map(|_| first.gen()).collect();
        let b: Vec<u32> = (0..5).map(|_| second.gen()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededSource(1).request_rng();
        let mut b = SeededSource(2).request_rng();
        let xs: Vec<u64> = (0..4).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.gen()).collect();
        assert_ne!(xs, ys);
    }
}
