// src/utils/math.rs
use std::f32::consts::TAU;

/// Divides, substituting the smallest positive normal for a zero divisor.
#[inline]
pub fn safe_div(numerator: f32, denominator: f32) -> f32 {
    if denominator.abs() < f32::MIN_POSITIVE {
        numerator / f32::MIN_POSITIVE.copysign(denominator)
    } else {
        numerator / denominator
    }
}

/// Replaces NaN and infinities with silence.
#[inline]
pub fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Wraps a phase into [0, 1), for positive and negative inputs alike.
#[inline]
pub fn wrap_unit(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid of a tiny negative number rounds up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// One-pole smoothing coefficient reaching ~63% of a step after `time_sec`.
#[inline]
pub fn time_to_alpha(sample_rate: f32, time_sec: f32) -> f32 {
    if time_sec <= 0.0 {
        1.0
    } else {
        let tau_samples = (time_sec * sample_rate).max(1.0);
        1.0 - (-1.0 / tau_samples).exp()
    }
}

/// One-pole lowpass coefficient for a cutoff in Hz.
#[inline]
pub fn cutoff_to_alpha(sample_rate: f32, cutoff_hz: f32) -> f32 {
    let cutoff = cutoff_hz.clamp(0.0, sample_rate * 0.49);
    1.0 - (-TAU * safe_div(cutoff, sample_rate)).exp()
}

#[inline]
pub fn midi_to_hz(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_never_produces_infinity() {
        assert!(safe_div(1.0, 0.0).is_finite());
        assert!(safe_div(-1.0, -0.0).is_finite());
        assert_eq!(safe_div(6.0, 3.0), 2.0);
    }

    #[test]
    fn sanitize_zeroes_non_finite_values() {
        assert_eq!(sanitize(f32::NAN), 0.0);
        assert_eq!(sanitize(f32::INFINITY), 0.0);
        assert_eq!(sanitize(0.25), 0.25);
    }

    #[test]
    fn wrap_unit_stays_in_range() {
        assert_eq!(wrap_unit(1.25), 0.25);
        assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
        assert_eq!(wrap_unit(-1e-20), 0.0);
        assert_eq!(wrap_unit(3.0), 0.0);
    }

    #[test]
    fn zero_time_is_passthrough() {
        assert_eq!(time_to_alpha(48_000.0, 0.0), 1.0);
        let alpha = time_to_alpha(48_000.0, 0.1);
        assert!(alpha > 0.0 && alpha < 0.001);
    }

    #[test]
    fn a4_is_440() {
        assert!((midi_to_hz(69.0) - 440.0).abs() < 1e-3);
        assert!((midi_to_hz(81.0) - 880.0).abs() < 1e-2);
    }
}
