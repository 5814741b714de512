use crate::error::KernelError;

use super::check_lengths;

/// Fixed-point exponent of the values written by [`softmax_q7`].
pub const Q7_OUTPUT_DEC_BITS: i32 = 7;

/// Inputs more than this far below the maximum contribute nothing.
const WINDOW: i32 = 8;

fn usat(value: i32, bits: u32) -> i32 {
    value.clamp(0, (1 << bits) - 1)
}

fn ssat(value: i32, bits: u32) -> i32 {
    let limit = 1 << (bits - 1);
    value.clamp(-limit, limit - 1)
}

/// Integer-only base-2 softmax on q7 values (`dec_bits` of the input is 0).
///
/// Only values in `(max - 8, max]` take part; the rest come out as 0. The
/// result is in q0.7, so a probability of 1.0 saturates at 127.
pub fn softmax_q7(input: &[i8], output: &mut [i8]) -> Result<(), KernelError> {
    check_lengths("softmax_q7", input, output)?;

    let max = input.iter().copied().fold(i8::MIN, i8::max) as i32;
    let base = max - WINDOW;

    // The maximum always lands inside the window, so sum > 0.
    let mut sum: i64 = 0;
    for &x in input {
        let x = x as i32;
        if x > base {
            sum += 1i64 << usat(x - base, 5);
        }
    }

    let output_base = ((1i64 << 20) / sum) as i32;
    for (out, &x) in output.iter_mut().zip(input) {
        let x = x as i32;
        *out = if x > base {
            let shift = usat(13 + base - x, 5);
            ssat(output_base >> shift, 8) as i8
        } else {
            0
        };
    }
    Ok(())
}
