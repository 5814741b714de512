mod float;
mod q7;

pub use float::softmax;
pub use q7::{softmax_q7, Q7_OUTPUT_DEC_BITS};

use crate::error::KernelError;

pub(super) fn check_lengths(kernel: &str, input: &[i8], output: &[i8]) -> Result<(), KernelError> {
    if input.is_empty() {
        crate::trace!("{}: empty input", kernel);
        return Err(KernelError::InvalidArgument(format!("{}: input is empty", kernel)));
    }
    if output.len() != input.len() {
        crate::trace!("{}: output length {} != input length {}", kernel, output.len(), input.len());
        return Err(KernelError::InvalidArgument(format!(
            "{}: output length {} does not match input length {}",
            kernel,
            output.len(),
            input.len()
        )));
    }
    Ok(())
}
