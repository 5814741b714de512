use anyhow::{anyhow, Result};

pub fn numel(shape: &[usize]) -> usize {
    shape.iter().copied().product::<usize>()
}

/// Resolve a possibly negative axis against a tensor rank.
pub fn normalize_axis(axis: i64, rank: usize) -> Result<usize> {
    let rank_i = rank as i64;
    let resolved = if axis < 0 { axis + rank_i } else { axis };
    if resolved < 0 || resolved >= rank_i {
        return Err(anyhow!("axis {} out of range for rank {}", axis, rank));
    }
    Ok(resolved as usize)
}

/// Split a shape around `axis` into `(outer, axis_dim, inner)` element counts.
pub fn split_at_axis(shape: &[usize], axis: usize) -> (usize, usize, usize) {
    let outer = numel(&shape[..axis]);
    let dim = shape[axis];
    let inner = numel(&shape[axis + 1..]);
    (outer, dim, inner)
}
