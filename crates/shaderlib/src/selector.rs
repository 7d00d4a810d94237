use std::f64::consts::TAU;

use serde::Serialize;

use crate::library::{ShaderLibrary, ShaderVariant};

/// Stable identifiers of a card, e.g. overall episode number and season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CardIdentity {
    pub overall: i64,
    pub group: i64,
}

impl CardIdentity {
    pub const fn new(overall: i64, group: i64) -> Self {
        Self { overall, group }
    }

    fn seed(self) -> f64 {
        self.overall as f64 * 7.919 + self.group as f64 * 13.37
    }
}

/// Per-card shader inputs that stay fixed for the lifetime of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariantParams {
    pub random_seed: f32,
    pub speed_multiplier: f32,
    pub color_shift: f32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub index: usize,
    pub variant: &'a ShaderVariant,
    pub params: VariantParams,
}

/// Maps a card identity to a variant and its derived parameters.
///
/// Pure: the same identity against the same library always yields the same
/// index and bit-identical parameters.
pub fn select(library: &ShaderLibrary, identity: CardIdentity) -> Selection<'_> {
    let seed = identity.seed();
    let count = library.count() as f64;

    // `%` truncates toward zero, so the raw value keeps the sign of the sum.
    let raw = ((seed.sin() * 10_000.0 + (seed * 1.5).cos() * 5_000.0) % count).floor();
    let index = raw.abs() as usize;

    let f1 = fract(seed.sin() * 10_000.0);
    let f2 = fract((seed * 2.5).cos() * 10_000.0);
    let f3 = fract((seed * 3.7).sin() * 10_000.0);

    let params = VariantParams {
        random_seed: f1 as f32,
        speed_multiplier: (0.5 + f2 * 2.0) as f32,
        color_shift: (f3 * TAU) as f32,
        intensity: (0.3 + f1 * 0.7) as f32,
    };

    Selection {
        index,
        variant: library.by_index(index),
        params,
    }
}

fn fract(value: f64) -> f64 {
    value - value.floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f32, expected: f64) {
        assert!(
            (actual as f64 - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn known_identity_maps_to_psychedelic_waves() {
        let library = ShaderLibrary::builtin();
        let selection = select(&library, CardIdentity::new(3, 1));
        assert_eq!(selection.index, 3);
        assert_eq!(selection.variant.name(), "psychedelicWaves");
        approx(selection.params.random_seed, 0.911_931_88);
        approx(selection.params.speed_multiplier, 1.595_190_24);
        approx(selection.params.color_shift, 2.646_819_09);
        approx(selection.params.intensity, 0.938_352_32);
    }

    #[test]
    fn zero_identity_uses_floor_values() {
        let library = ShaderLibrary::builtin();
        let selection = select(&library, CardIdentity::new(0, 0));
        assert_eq!(selection.index, 2);
        assert_eq!(selection.variant.name(), "cosmicNebula");
        assert_eq!(
            selection.params,
            VariantParams {
                random_seed: 0.0,
                speed_multiplier: 0.5,
                color_shift: 0.0,
                intensity: 0.3,
            }
        );
    }

    #[test]
    fn negative_raw_indices_are_folded() {
        let library = ShaderLibrary::builtin();
        let cases = [
            ((1, 1), 8),
            ((12, 2), 14),
            ((37, 2), 5),
            ((100, 5), 11),
            ((-4, 1), 9),
        ];
        for ((overall, group), expected) in cases {
            let selection = select(&library, CardIdentity::new(overall, group));
            assert_eq!(selection.index, expected, "identity ({overall}, {group})");
        }
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let library = ShaderLibrary::builtin();
        let identity = CardIdentity::new(3, 1);
        let first = select(&library, identity);
        let second = select(&library, identity);
        assert_eq!(first.index, second.index);
        assert_eq!(
            first.params.random_seed.to_bits(),
            second.params.random_seed.to_bits()
        );
        assert_eq!(
            first.params.speed_multiplier.to_bits(),
            second.params.speed_multiplier.to_bits()
        );
        assert_eq!(
            first.params.color_shift.to_bits(),
            second.params.color_shift.to_bits()
        );
        assert_eq!(
            first.params.intensity.to_bits(),
            second.params.intensity.to_bits()
        );
    }

    #[test]
    fn parameters_stay_in_range() {
        let library = ShaderLibrary::builtin();
        for overall in -50..300 {
            for group in 0..8 {
                let selection = select(&library, CardIdentity::new(overall, group));
                let params = selection.params;
                assert!(selection.index < library.count());
                assert!((0.0..=1.0).contains(&params.random_seed));
                assert!((0.5..=2.5).contains(&params.speed_multiplier));
                assert!((0.0..=TAU as f32).contains(&params.color_shift));
                assert!((0.3..=1.0).contains(&params.intensity));
            }
        }
    }
}
