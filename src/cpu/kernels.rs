// 2D smoothing kernels with support [0, radius)

use std::f32::consts::PI;

/// Spiky-style kernel `(radius - dist)^2 / volume`, normalised so it integrates
/// to one over the disc of the given radius.
#[inline]
pub fn smoothing_kernel(dist: f32, radius: f32) -> f32 {
    if dist >= radius {
        return 0.0;
    }
    let volume = PI * radius.powi(4) / 6.0;
    (radius - dist) * (radius - dist) / volume
}

/// Radial derivative of [`smoothing_kernel`]; never positive inside the support.
#[inline]
pub fn smoothing_kernel_derivative(dist: f32, radius: f32) -> f32 {
    if dist >= radius {
        return 0.0;
    }
    let scale = 12.0 / (PI * radius.powi(4));
    (dist - radius) * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_outside_support() {
        for r in [0.05_f32, 0.5, 1.0, 3.0] {
            for d in [r, r * 1.0001, r * 2.0, 100.0] {
                assert_eq!(smoothing_kernel(d, r), 0.0);
                assert_eq!(smoothing_kernel_derivative(d, r), 0.0);
            }
        }
    }

    #[test]
    fn finite_and_signed_inside_support() {
        let r = 0.8;
        for step in 0..100 {
            let d = r * step as f32 / 100.0;
            let w = smoothing_kernel(d, r);
            let dw = smoothing_kernel_derivative(d, r);
            assert!(w.is_finite() && w >= 0.0, "w({d}) = {w}");
            assert!(dw.is_finite() && dw <= 0.0, "dw({d}) = {dw}");
        }
    }

    #[test]
    fn monotonically_decreasing() {
        let r = 1.5;
        let mut prev = smoothing_kernel(0.0, r);
        for step in 1..=150 {
            let w = smoothing_kernel(r * step as f32 / 150.0, r);
            assert!(w <= prev);
            prev = w;
        }
    }

    #[test]
    fn integrates_to_one_over_disc() {
        // midpoint rule over rings: sum W(r) * 2 pi r dr
        let h = 1.0_f32;
        let n = 10_000;
        let dr = h / n as f32;
        let total: f32 = (0..n)
            .map(|i| {
                let r = (i as f32 + 0.5) * dr;
                smoothing_kernel(r, h) * 2.0 * PI * r * dr
            })
            .sum();
        assert!((total - 1.0).abs() < 1e-3, "kernel integral = {total}");
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let r = 1.0;
        let eps = 1e-3;
        for d in [0.1_f32, 0.4, 0.7] {
            let fd = (smoothing_kernel(d + eps, r) - smoothing_kernel(d - eps, r)) / (2.0 * eps);
            let dw = smoothing_kernel_derivative(d, r);
            assert!((fd - dw).abs() < 1e-2, "fd={fd} dw={dw}");
        }
    }

    #[test]
    fn small_radius_stays_finite() {
        let r = 1e-3;
        assert!(smoothing_kernel(0.0, r).is_finite());
        assert!(smoothing_kernel_derivative(0.0, r).is_finite());
    }
}
