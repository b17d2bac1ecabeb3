/// `output += input * gains`, sample by sample.
pub fn multiply_accumulate(input: &[f32], gains: &[f32], output: &mut [f32]) {
    debug_assert!(input.len() >= output.len());
    debug_assert!(gains.len() >= output.len());

    for ((out, x), g) in output.iter_mut().zip(input).zip(gains) {
        *out += x * g;
    }
}

/// Blends `outgoing` into `incoming` in place using per-sample weights.
pub fn crossfade_buffers(
    incoming: &mut [f32],
    outgoing: &[f32],
    fade_in: &[f32],
    fade_out: &[f32],
) {
    debug_assert!(outgoing.len() >= incoming.len());

    for (((x, y), gi), go) in incoming.iter_mut().zip(outgoing).zip(fade_in).zip(fade_out) {
        *x = *x * gi + y * go;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_accumulate() {
        let mut output = vec![1.0; 3];
        multiply_accumulate(&[1.0, 2.0, 3.0], &[0.0, 0.5, 1.0], &mut output);
        assert_eq!(output, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_crossfade_buffers() {
        let mut incoming = vec![1.0, 1.0, 1.0];
        crossfade_buffers(&mut incoming, &[-1.0; 3], &[0.0, 0.5, 1.0], &[1.0, 0.5, 0.0]);
        assert_eq!(incoming, vec![-1.0, 0.0, 1.0]);
    }
}
