use crate::error::KernelError;

/// Natural-base softmax along one axis of a row-major `f32` buffer.
///
/// The buffer is viewed as `[outer, dim, inner]`; every one of the
/// `outer * inner` lanes of length `dim` is normalised independently.
pub fn softmax_f32_axis(
    input: &[f32],
    output: &mut [f32],
    outer: usize,
    dim: usize,
    inner: usize,
) -> Result<(), KernelError> {
    let len = outer * dim * inner;
    if len == 0 {
        return Err(KernelError::InvalidArgument(
            "softmax_f32_axis: empty input".to_string(),
        ));
    }
    if input.len() != len || output.len() != len {
        return Err(KernelError::InvalidArgument(format!(
            "softmax_f32_axis: expected {} elements, got input {} and output {}",
            len,
            input.len(),
            output.len()
        )));
    }

    for o in 0..outer {
        let base = o * dim * inner;
        for i in 0..inner {
            let at = |d: usize| base + d * inner + i;
            let mut max = f32::NEG_INFINITY;
            for d in 0..dim {
                max = max.max(input[at(d)]);
            }
            let mut sum = 0.0f32;
            for d in 0..dim {
                let e = (input[at(d)] - max).exp();
                output[at(d)] = e;
                sum += e;
            }
            for d in 0..dim {
                output[at(d)] /= sum;
            }
        }
    }
    Ok(())
}
