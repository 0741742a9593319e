//! Play resolution for the staking rounds engine.
//!
//! Every play is resolved from the consensus seed alone, so any party
//! holding the seed and the operation log can recompute every outcome.

#[cfg(test)]
mod integration_tests;

use commonware_codec::Encode;
use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use roundpot_types::{
    engine::{LIMITED_EDITION_PERCENTAGE, WIN_PERCENTAGE},
    Seed,
};

/// Domain separator for the limited edition draw. Play numbers are
/// small, so the high bit keeps the two draws on disjoint inputs.
const LIMITED_EDITION_DOMAIN: u32 = 0x8000_0000;

/// Deterministic random number generator seeded from consensus.
///
/// Uses SHA256 hash chains to generate random numbers deterministically
/// from the network's consensus seed.
#[derive(Clone)]
pub struct PlayRng {
    state: [u8; 32],
    index: usize,
}

impl PlayRng {
    /// Create a new RNG from a seed, session ID, and play number.
    pub fn new(seed: &Seed, session_id: u64, play_number: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.encode().as_ref());
        hasher.update(&session_id.to_be_bytes());
        hasher.update(&play_number.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    /// Get the next random byte.
    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    /// Get a random u8 value.
    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        // Simple rejection sampling for unbiased distribution
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_u8();
            if value < limit {
                return value % max;
            }
        }
    }
}

/// Result of resolving one play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayOutcome {
    /// The uniform draw in [0, 100).
    pub draw: u8,
    pub won: bool,
    /// Whether the win also awarded a limited edition collectible.
    pub limited_edition: bool,
}

/// Resolve a play from the consensus seed. The outcome is a pure
/// function of (seed, session_id, play_number), so replaying the same
/// log always reproduces it.
pub fn resolve_play(seed: &Seed, session_id: u64, play_number: u32) -> PlayOutcome {
    let mut rng = PlayRng::new(seed, session_id, play_number);
    let draw = rng.next_bounded(100);
    let won = draw < WIN_PERCENTAGE;

    // The limited edition draw rides on wins only, from its own domain
    // so it stays independent of the win draw.
    let limited_edition = if won {
        let mut rng = PlayRng::new(seed, session_id, play_number | LIMITED_EDITION_DOMAIN);
        rng.next_bounded(100) < LIMITED_EDITION_PERCENTAGE
    } else {
        false
    };

    PlayOutcome {
        draw,
        won,
        limited_edition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_network_keypair, create_seed};

    fn test_seed(view: u64) -> Seed {
        let (network_secret, _) = create_network_keypair();
        create_seed(&network_secret, view)
    }

    #[test]
    fn test_rng_deterministic() {
        let seed = test_seed(1);
        let mut a = PlayRng::new(&seed, 42, 0);
        let mut b = PlayRng::new(&seed, 42, 0);
        for _ in 0..100 {
            assert_eq!(a.next_u8(), b.next_u8());
        }
    }

    #[test]
    fn test_rng_domains_diverge() {
        let seed = test_seed(1);
        let mut base = PlayRng::new(&seed, 42, 0);
        let mut other_session = PlayRng::new(&seed, 43, 0);
        let mut other_play = PlayRng::new(&seed, 42, 1);
        let mut other_view = PlayRng::new(&test_seed(2), 42, 0);

        let sample = |rng: &mut PlayRng| (0..16).map(|_| rng.next_u8()).collect::<Vec<_>>();
        let baseline = sample(&mut base);
        assert_ne!(baseline, sample(&mut other_session));
        assert_ne!(baseline, sample(&mut other_play));
        assert_ne!(baseline, sample(&mut other_view));
    }

    #[test]
    fn test_rng_chains_past_one_block() {
        let seed = test_seed(1);
        let mut rng = PlayRng::new(&seed, 1, 0);
        // More than 32 bytes forces a rehash
        let bytes: Vec<u8> = (0..64).map(|_| rng.next_u8()).collect();
        let mut again = PlayRng::new(&seed, 1, 0);
        let bytes_again: Vec<u8> = (0..64).map(|_| again.next_u8()).collect();
        assert_eq!(bytes, bytes_again);
    }

    #[test]
    fn test_bounded_in_range() {
        let seed = test_seed(1);
        let mut rng = PlayRng::new(&seed, 1, 0);
        for _ in 0..1000 {
            assert!(rng.next_bounded(100) < 100);
        }
        assert_eq!(rng.next_bounded(0), 0);
        for _ in 0..100 {
            assert_eq!(rng.next_bounded(1), 0);
        }
    }

    #[test]
    fn test_resolve_play_consistent_with_draw() {
        let seed = test_seed(1);
        for session_id in 0..50u64 {
            for play_number in 0..3u32 {
                let outcome = resolve_play(&seed, session_id, play_number);
                assert!(outcome.draw < 100);
                assert_eq!(outcome.won, outcome.draw < WIN_PERCENTAGE);
                if !outcome.won {
                    assert!(!outcome.limited_edition);
                }
                // Replay reproduces the outcome exactly
                assert_eq!(outcome, resolve_play(&seed, session_id, play_number));
            }
        }
    }

    #[test]
    fn test_empirical_win_rate() {
        let seed = test_seed(7);
        let total = 10_000u64;
        let wins = (0..total)
            .filter(|session_id| resolve_play(&seed, *session_id, 0).won)
            .count() as f64;

        // 10% target; 10k draws keep the sample fraction well inside
        // [0.08, 0.12] for a fixed seed.
        let rate = wins / total as f64;
        assert!(rate > 0.08 && rate < 0.12, "win rate {} out of bounds", rate);
    }
}
