//! Seeded smooth noise used for drift forces and surface morphing.

use ::noise::{NoiseFn, Simplex};

/// Deterministic simplex noise field.
///
/// Two fields built from the same seed return identical samples; output is
/// clamped to \[-1, 1\].
#[derive(Clone, Debug)]
pub struct NoiseField {
    seed: u32,
    simplex: Simplex,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        let v: f64 = NoiseFn::<f64, 3>::get(&self.simplex, [x as f64, y as f64, z as f64]);
        (v as f32).clamp(-1.0, 1.0)
    }

    #[inline]
    pub fn sample2(&self, x: f32, y: f32) -> f32 {
        let v: f64 = NoiseFn::<f64, 2>::get(&self.simplex, [x as f64, y as f64]);
        (v as f32).clamp(-1.0, 1.0)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_unit_range() {
        let field = NoiseField::new(7);
        for i in 0..500 {
            let t = i as f32 * 0.173;
            let a = field.sample3(t, t * 0.5 - 3.0, 11.0 - t);
            let b = field.sample2(t * 1.7, -t);
            assert!((-1.0..=1.0).contains(&a));
            assert!((-1.0..=1.0).contains(&b));
        }
    }

    #[test]
    fn same_seed_same_values() {
        let a = NoiseField::new(99);
        let b = NoiseField::new(99);
        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.sample3(1.25, -4.5, 0.75), b.sample3(1.25, -4.5, 0.75));
        assert_eq!(a.sample2(3.5, 2.0), b.sample2(3.5, 2.0));
    }

    #[test]
    fn small_steps_give_small_changes() {
        let field = NoiseField::new(3);
        let mut prev = field.sample3(0.0, 0.2, 0.4);
        for i in 1..1000 {
            let x = i as f32 * 0.001;
            let v = field.sample3(x, 0.2, 0.4);
            assert!((v - prev).abs() < 0.05, "jump at x={x}");
            prev = v;
        }
    }
}
