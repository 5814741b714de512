use crate::error::KernelError;

use super::check_lengths;

/// Output scale: a probability of 1.0 maps to 128 before saturation.
const OUTPUT_SCALE: f32 = 128.0;

/// Softmax over quantized `i8` values in base 2.
///
/// Each input is read as `x / 2^dec_bits`. The output is the share of
/// `2^(x_i / 2^dec_bits)` in the total, scaled by 128, truncated toward zero
/// and saturated into `[0, 127]`.
///
/// The row maximum is subtracted before exponentiation. That leaves every
/// ratio unchanged and keeps large inputs from overflowing.
///
/// Fails with [`KernelError::InvalidArgument`] when `input` is empty,
/// `dec_bits` is negative or the lengths differ, and with
/// [`KernelError::AllocationFailure`] when the scratch buffer cannot be
/// reserved. `output` is left untouched on failure.
///
/// ```
/// # fn main() -> anyhow::Result<()> {
/// let mut out = [0i8; 4];
/// nodeops::ops::softmax(&[3, 3, 3, 3], 1, &mut out)?;
/// assert_eq!(out, [32, 32, 32, 32]);
/// # Ok(())
/// # }
/// ```
pub fn softmax(input: &[i8], dec_bits: i32, output: &mut [i8]) -> Result<(), KernelError> {
    check_lengths("softmax", input, output)?;
    if dec_bits < 0 {
        crate::trace!("softmax: negative dec_bits {}", dec_bits);
        return Err(KernelError::InvalidArgument(format!(
            "softmax: dec_bits must be >= 0, got {}",
            dec_bits
        )));
    }

    let len = input.len();
    let mut scratch: Vec<f32> = Vec::new();
    scratch
        .try_reserve_exact(len)
        .map_err(|_| KernelError::AllocationFailure { len })?;

    let denom = (dec_bits as f32).exp2();
    let max = input.iter().copied().fold(i8::MIN, i8::max) as f32;
    let mut sum = 0.0f32;
    for &x in input {
        let magnitude = ((x as f32 - max) / denom).exp2();
        sum += magnitude;
        scratch.push(magnitude);
    }

    // sum >= 1: the maximum contributes exactly 2^0.
    for (out, magnitude) in output.iter_mut().zip(&scratch) {
        *out = (magnitude * OUTPUT_SCALE / sum).clamp(0.0, i8::MAX as f32) as i8;
    }
    Ok(())
}
