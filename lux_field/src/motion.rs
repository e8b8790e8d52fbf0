//! Frame-rate-independent exponential approach.

use glam::Vec3;

/// Fraction of the remaining gap closed this frame: `min(1, delta · rate)`.
///
/// Negative or non-finite products close nothing.
pub fn damp_factor(rate: f32, delta: f32) -> f32 {
    let k = delta * rate;
    if !k.is_finite() || k <= 0.0 {
        return 0.0;
    }
    k.min(1.0)
}

/// Values that can be moved toward a target by [`damp`].
pub trait Damp: Copy {
    fn lerp_to(self, target: Self, t: f32) -> Self;
    fn is_finite_value(self) -> bool;
}

impl Damp for f32 {
    fn lerp_to(self, target: f32, t: f32) -> f32 { self + (target - self) * t }
    fn is_finite_value(self) -> bool { self.is_finite() }
}

impl Damp for Vec3 {
    fn lerp_to(self, target: Vec3, t: f32) -> Vec3 { self + (target - self) * t }
    fn is_finite_value(self) -> bool { self.is_finite() }
}

/// Move `current` toward `target` at `rate` per second over `delta` seconds.
///
/// A non-finite target or result leaves `current` untouched.
pub fn damp<T: Damp>(current: T, target: T, rate: f32, delta: f32) -> T {
    if !target.is_finite_value() {
        return current;
    }
    let next = current.lerp_to(target, damp_factor(rate, delta));
    if next.is_finite_value() { next } else { current }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rate: f32, total: f32, steps: usize) -> f32 {
        let dt = total / steps as f32;
        let mut x = 10.0_f32;
        for _ in 0..steps {
            x = damp(x, 0.0, rate, dt);
        }
        x
    }

    #[test]
    fn factor_saturates_at_one() {
        assert_eq!(damp_factor(4.0, 1.0), 1.0);
        assert!((damp_factor(4.0, 0.1) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn factor_rejects_bad_delta() {
        assert_eq!(damp_factor(4.0, -0.1), 0.0);
        assert_eq!(damp_factor(4.0, f32::NAN), 0.0);
        assert_eq!(damp_factor(4.0, f32::INFINITY), 0.0);
    }

    #[test]
    fn converges_exponentially() {
        // Remaining error ≈ e^(−rT) for small steps.
        for &(rate, total) in &[(2.0_f32, 1.0_f32), (2.0, 2.0), (4.0, 1.0), (4.0, 2.0)] {
            let remaining = run(rate, total, 2000) / 10.0;
            let expected  = (-rate * total).exp();
            let rel = (remaining - expected).abs() / expected;
            assert!(rel < 0.02, "rate {} T {}: {} vs {}", rate, total, remaining, expected);
        }
    }

    #[test]
    fn step_count_barely_matters() {
        // 30 Hz versus 240 Hz over one second, rate 2.
        let coarse = run(2.0, 1.0, 30);
        let fine   = run(2.0, 1.0, 240);
        assert!((coarse - fine).abs() < 0.15, "{} vs {}", coarse, fine);
    }

    #[test]
    fn faster_rate_converges_faster() {
        assert!(run(4.0, 1.0, 60) < run(2.0, 1.0, 60));
    }

    #[test]
    fn at_rest_stays_put() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(damp(v, v, 4.0, 1.0 / 60.0), v);
    }

    #[test]
    fn non_finite_target_is_ignored() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(damp(v, Vec3::new(f32::NAN, 0.0, 0.0), 4.0, 0.016), v);
        assert_eq!(damp(1.0_f32, f32::INFINITY, 4.0, 0.016), 1.0);
    }
}
