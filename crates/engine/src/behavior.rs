//! Byzantine sender behavior generator.
//!
//! Given a malicious sender and the honest reference value for the phase,
//! decides what (if anything) that sender transmits. The draw is a pure
//! function of the policy, the bucket calibration, and the injected RNG, so
//! seeded runs reproduce identical malice.

use crate::config::BehaviorBuckets;
use byzsim_types::{ByzantineBehavior, ProtocolVariant, Value};
use rand::Rng;

/// Byzantine sender policy, selected by the protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorPolicy {
    /// Always send the flipped reference value, every phase, no randomness.
    DeterministicFlip,
    /// Redraw flip / random / silent each phase from the bucket boundaries.
    ThreeWay,
}

impl BehaviorPolicy {
    pub fn for_variant(variant: ProtocolVariant) -> Self {
        match variant {
            ProtocolVariant::Pbft => BehaviorPolicy::DeterministicFlip,
            ProtocolVariant::Simple => BehaviorPolicy::ThreeWay,
        }
    }
}

/// Draw one phase's behavior for a Byzantine sender.
///
/// Returns the chosen behavior and the value to transmit; `None` means the
/// sender abstains entirely (no message, no inbox entry anywhere).
pub fn draw<R: Rng + ?Sized>(
    policy: BehaviorPolicy,
    buckets: BehaviorBuckets,
    reference: Value,
    rng: &mut R,
) -> (ByzantineBehavior, Option<Value>) {
    match policy {
        BehaviorPolicy::DeterministicFlip => (ByzantineBehavior::Flip, Some(reference.flipped())),
        BehaviorPolicy::ThreeWay => {
            let roll: f64 = rng.gen();
            if roll < buckets.flip {
                (ByzantineBehavior::Flip, Some(reference.flipped()))
            } else if roll < buckets.flip + buckets.random {
                (ByzantineBehavior::Random, Some(Value::random(rng)))
            } else {
                (ByzantineBehavior::Silent, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn deterministic_policy_always_flips() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..16 {
            let (behavior, value) = draw(
                BehaviorPolicy::DeterministicFlip,
                BehaviorBuckets::default(),
                Value::Zero,
                &mut rng,
            );
            assert_eq!(behavior, ByzantineBehavior::Flip);
            assert_eq!(value, Some(Value::One));
        }
    }

    #[test]
    fn three_way_draw_covers_all_outcomes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let buckets = BehaviorBuckets::default();
        let mut seen_flip = false;
        let mut seen_random = false;
        let mut seen_silent = false;
        for _ in 0..256 {
            let (behavior, value) = draw(BehaviorPolicy::ThreeWay, buckets, Value::Zero, &mut rng);
            match behavior {
                ByzantineBehavior::Flip => {
                    assert_eq!(value, Some(Value::One));
                    seen_flip = true;
                }
                ByzantineBehavior::Random => {
                    assert!(value.is_some());
                    seen_random = true;
                }
                ByzantineBehavior::Silent => {
                    assert_eq!(value, None);
                    seen_silent = true;
                }
            }
        }
        assert!(seen_flip && seen_random && seen_silent);
    }

    #[test]
    fn degenerate_buckets_force_one_outcome() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let all_flip = BehaviorBuckets {
            flip: 1.0,
            random: 0.0,
        };
        let all_silent = BehaviorBuckets {
            flip: 0.0,
            random: 0.0,
        };
        for _ in 0..32 {
            let (behavior, _) = draw(BehaviorPolicy::ThreeWay, all_flip, Value::One, &mut rng);
            assert_eq!(behavior, ByzantineBehavior::Flip);
            let (behavior, value) =
                draw(BehaviorPolicy::ThreeWay, all_silent, Value::One, &mut rng);
            assert_eq!(behavior, ByzantineBehavior::Silent);
            assert_eq!(value, None);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_malice() {
        let buckets = BehaviorBuckets::default();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..64 {
            assert_eq!(
                draw(BehaviorPolicy::ThreeWay, buckets, Value::Zero, &mut a),
                draw(BehaviorPolicy::ThreeWay, buckets, Value::Zero, &mut b),
            );
        }
    }
}
