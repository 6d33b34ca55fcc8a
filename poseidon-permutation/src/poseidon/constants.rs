use crate::error::PartitionError;

/// Split a flat table of constants, as commonly published alongside a Poseidon
/// instance, into consecutive rows of width `t`.
///
/// # Examples
///
/// ```
/// # use poseidon_permutation::prelude::*;
/// let rows = split_constants(&scalars![1, 2, 3, 4, 5, 6], 3).unwrap();
/// assert_eq!(vec![scalars![1, 2, 3], scalars![4, 5, 6]], rows);
/// ```
pub fn split_constants<T: Clone>(flat: &[T], t: i64) -> Result<Vec<Vec<T>>, PartitionError> {
    let width = usize::try_from(t)
        .ok()
        .filter(|&width| width > 0)
        .ok_or(PartitionError::InvalidPartitionParameter(t))?;

    if flat.len() % width != 0 {
        let len = flat.len();
        return Err(PartitionError::InvalidWidth { len, width });
    }

    Ok(flat.chunks_exact(width).map(<[T]>::to_vec).collect())
}
