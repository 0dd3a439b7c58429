//! Damage rolls shared by both combatants.
//!
//! `floor(power * 0.7) + uniform(0..=agility)`, computed in integers.

use rand::Rng;

/// Guaranteed part of a hit: `floor(power * 0.7)`.
pub fn base_damage(power: u32) -> u32 {
    ((power as u64 * 7) / 10) as u32
}

/// Upper bound of [`roll_damage`] for the same inputs.
pub fn max_damage(power: u32, agility: u32) -> u32 {
    base_damage(power).saturating_add(agility)
}

pub fn roll_damage<R: Rng + ?Sized>(rng: &mut R, power: u32, agility: u32) -> u32 {
    let spread = rng.gen_range(0..=agility);
    base_damage(power).saturating_add(spread)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    proptest! {
        #[test]
        fn prop_roll_within_bounds(
            seed in any::<u64>(),
            power in 0u32..10_000,
            agility in 0u32..1_000,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let d = roll_damage(&mut rng, power, agility);
            prop_assert!(d >= base_damage(power));
            prop_assert!(d <= max_damage(power, agility), "{} > {}", d, max_damage(power, agility));
        }

        #[test]
        fn prop_base_never_exceeds_power(power in any::<u32>()) {
            prop_assert!(base_damage(power) <= power);
        }
    }
}
