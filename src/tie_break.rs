//! Direction sources for separating particles that sit exactly on top of each other.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplies one unit vector per tick, used as the pair direction when two
/// particles are at distance zero.
pub trait TieBreak: Send + Sync {
    fn direction(&mut self) -> Vec2;
}

/// Always the same direction. Used when no source is supplied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedDirection(pub Vec2);

impl Default for FixedDirection {
    fn default() -> Self {
        Self(Vec2::Y)
    }
}

impl TieBreak for FixedDirection {
    fn direction(&mut self) -> Vec2 {
        self.0.normalize_or(Vec2::Y)
    }
}

/// Uniformly random unit vectors from a seedable generator.
#[derive(Clone, Debug)]
pub struct RandomDirection {
    rng: ChaCha8Rng,
}

impl RandomDirection {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl TieBreak for RandomDirection {
    fn direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.rng.gen_range(0.0..TAU))
    }
}

impl<F> TieBreak for F
where
    F: FnMut() -> Vec2 + Send + Sync,
{
    fn direction(&mut self) -> Vec2 {
        self().normalize_or(Vec2::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_directions_are_unit_and_reproducible() {
        let mut a = RandomDirection::seeded(7);
        let mut b = RandomDirection::seeded(7);
        for _ in 0..64 {
            let da = a.direction();
            assert!((da.length() - 1.0).abs() < 1e-5);
            assert_eq!(da, b.direction());
        }
    }

    #[test]
    fn fixed_direction_is_normalized() {
        let mut d = FixedDirection(Vec2::new(3.0, 4.0));
        assert!(d.direction().abs_diff_eq(Vec2::new(0.6, 0.8), 1e-6));
        let mut zero = FixedDirection(Vec2::ZERO);
        assert_eq!(zero.direction(), Vec2::Y);
    }

    #[test]
    fn closures_are_sources() {
        let mut f = || Vec2::new(-2.0, 0.0);
        assert_eq!(TieBreak::direction(&mut f), Vec2::NEG_X);
    }
}
