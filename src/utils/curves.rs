// src/utils/curves.rs
use std::f32::consts::{FRAC_PI_2, PI};

pub fn get_curved_value(position: f32, curve: f32) -> f32 {
    if curve.abs() < 0.001 {
        return position;
    }

    let alpha = (curve.abs()).exp();

    if curve > 0.0 {
        // Exponential curve
        ((position * (1.0 + alpha).ln()).exp() - 1.0) / alpha
    } else {
        // Logarithmic curve
        (1.0 + position * alpha).ln() / (1.0 + alpha).ln()
    }
}

/// Equal-power crossfade weights `(outgoing, incoming)` for a ramp position.
/// The endpoints are exact so a finished fade leaves only the new signal.
#[inline]
pub fn equal_power(progress: f32) -> (f32, f32) {
    if progress <= 0.0 {
        (1.0, 0.0)
    } else if progress >= 1.0 {
        (0.0, 1.0)
    } else {
        let angle = progress * FRAC_PI_2;
        (angle.cos(), angle.sin())
    }
}

/// Raised-cosine gain curve, 0 at `progress == 0` and 1 at `progress == 1`.
#[inline]
pub fn raised_cosine(progress: f32) -> f32 {
    if progress <= 0.0 {
        0.0
    } else if progress >= 1.0 {
        1.0
    } else {
        0.5 - 0.5 * (PI * progress).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_linear_curve() {
        assert!((get_curved_value(0.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((get_curved_value(0.5, 0.0) - 0.5).abs() < EPSILON);
        assert!((get_curved_value(1.0, 0.0) - 1.0).abs() < EPSILON);
        assert!((get_curved_value(0.5, 0.0001) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_exponential_curve() {
        let result_mid = get_curved_value(0.5, 1.0);
        assert!(get_curved_value(0.0, 1.0).abs() < EPSILON);
        assert!((get_curved_value(1.0, 1.0) - 1.0).abs() < 0.01);
        assert!(result_mid < 0.5);
    }

    #[test]
    fn test_logarithmic_curve() {
        let result_mid = get_curved_value(0.5, -1.0);
        assert!(get_curved_value(0.0, -1.0).abs() < EPSILON);
        assert!((get_curved_value(1.0, -1.0) - 1.0).abs() < 0.01);
        assert!(result_mid > 0.5);
    }

    #[test]
    fn equal_power_endpoints_are_exact() {
        assert_eq!(equal_power(0.0), (1.0, 0.0));
        assert_eq!(equal_power(1.0), (0.0, 1.0));
        assert_eq!(equal_power(1.5), (0.0, 1.0));
        assert_eq!(equal_power(-0.5), (1.0, 0.0));
    }

    #[test]
    fn equal_power_keeps_constant_power() {
        for i in 0..=100 {
            let (old, new) = equal_power(i as f32 / 100.0);
            assert!((old * old + new * new - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn raised_cosine_is_monotonic() {
        let mut last = raised_cosine(0.0);
        assert_eq!(last, 0.0);
        for i in 1..=64 {
            let g = raised_cosine(i as f32 / 64.0);
            assert!(g >= last, "gain curve must never fall while rising");
            last = g;
        }
        assert_eq!(last, 1.0);
        assert!((raised_cosine(0.5) - 0.5).abs() < EPSILON);
    }
}
