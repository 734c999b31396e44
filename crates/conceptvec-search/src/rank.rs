//! Cosine similarity ranking.
//!
//! Computes the full `[n, m]` similarity matrix between candidate `D`
//! vectors and the store, then extracts exactly-ordered top-k indices per
//! row. Row norms on both sides are computed once via [`row_norms`], not
//! per row.

/// L2 norms of each row of a flat row-major `[rows, dim]` matrix.
pub fn row_norms(matrix: &[f32], dim: usize) -> Vec<f32> {
    matrix
        .chunks_exact(dim)
        .map(|row| row.iter().map(|x| x * x).sum::<f32>().sqrt())
        .collect()
}

/// Cosine similarity of every `D` row against every store row.
///
/// Returns a flat row-major `[n, m]` matrix where `n` is the number of `D`
/// rows and `m` the store size. Norms for both sides are computed once by
/// the caller via [`row_norms`] and passed in. A zero-norm vector on
/// either side yields similarity 0.0 rather than a division by zero; a
/// zero-norm difference vector carries no direction, so "closest to
/// nothing" is the honest answer.
pub fn similarity_matrix(
    d_matrix: &[f32],
    d_norms: &[f32],
    store_matrix: &[f32],
    store_norms: &[f32],
    dim: usize,
) -> Vec<f32> {
    let m = store_norms.len();
    let n = d_norms.len();
    let mut sims = vec![0.0f32; n * m];

    for (i, d_row) in d_matrix.chunks_exact(dim).enumerate() {
        if d_norms[i] == 0.0 {
            continue;
        }
        let out_row = &mut sims[i * m..(i + 1) * m];
        for (j, store_row) in store_matrix.chunks_exact(dim).enumerate() {
            if store_norms[j] == 0.0 {
                continue;
            }
            let dot: f32 = d_row.iter().zip(store_row).map(|(a, b)| a * b).sum();
            out_row[j] = dot / (d_norms[i] * store_norms[j]);
        }
    }

    sims
}

/// Indices of the `k` largest similarities in a row, exactly ordered.
///
/// The returned indices are sorted by similarity descending; ties are
/// broken by ascending index, which keeps the ordering stable across runs
/// and thread counts. Downstream filtering relies on the order, not just
/// the membership, of this set.
pub fn top_k_indices(row: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..row.len()).collect();
    let by_rank =
        |&i: &usize, &j: &usize| row[j].total_cmp(&row[i]).then_with(|| i.cmp(&j));

    if k < indices.len() {
        indices.select_nth_unstable_by(k, by_rank);
        indices.truncate(k);
    }
    indices.sort_unstable_by(by_rank);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_norms() {
        let matrix = [3.0, 4.0, 0.0, 0.0, 1.0, 0.0];
        let norms = row_norms(&matrix, 2);
        assert_eq!(norms, vec![5.0, 0.0, 1.0]);
    }

    #[test]
    fn test_similarity_identical_vectors() {
        let d = [1.0, 0.0];
        let store = [1.0, 0.0, 0.0, 1.0];
        let sims = similarity_matrix(&d, &row_norms(&d, 2), &store, &row_norms(&store, 2), 2);
        assert!((sims[0] - 1.0).abs() < 1e-6);
        assert!(sims[1].abs() < 1e-6);
    }

    #[test]
    fn test_similarity_opposite_vectors() {
        let d = [1.0, 0.0];
        let store = [-1.0, 0.0];
        let sims = similarity_matrix(&d, &row_norms(&d, 2), &store, &row_norms(&store, 2), 2);
        assert!((sims[0] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_d_row_is_all_zero() {
        let d = [0.0, 0.0];
        let store = [1.0, 0.0, 0.0, 1.0, 0.5, 0.5];
        let sims = similarity_matrix(&d, &row_norms(&d, 2), &store, &row_norms(&store, 2), 2);
        assert_eq!(sims, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_norm_store_row_is_zero_column() {
        let d = [1.0, 1.0];
        let store = [0.0, 0.0, 1.0, 1.0];
        let sims = similarity_matrix(&d, &row_norms(&d, 2), &store, &row_norms(&store, 2), 2);
        assert_eq!(sims[0], 0.0);
        assert!((sims[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_matrix_shape() {
        let d = [1.0, 0.0, 0.0, 1.0]; // 2 rows
        let store = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0]; // 3 rows
        let sims = similarity_matrix(&d, &row_norms(&d, 2), &store, &row_norms(&store, 2), 2);
        assert_eq!(sims.len(), 6);
    }

    #[test]
    fn test_caller_supplied_norms_are_used() {
        // The norms passed in are authoritative; a zero entry silences the
        // row even though the underlying vector is non-zero.
        let d = [3.0, 4.0];
        let store = [1.0, 0.0];
        let store_norms = row_norms(&store, 2);
        let sims = similarity_matrix(&d, &[0.0], &store, &store_norms, 2);
        assert_eq!(sims, vec![0.0]);

        let sims = similarity_matrix(&d, &row_norms(&d, 2), &store, &store_norms, 2);
        assert!((sims[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_exact_order() {
        let row = [0.1, 0.9, 0.5, 0.7];
        assert_eq!(top_k_indices(&row, 3), vec![1, 3, 2]);
    }

    #[test]
    fn test_top_k_ties_break_by_index() {
        let row = [0.5, 0.9, 0.5, 0.9];
        assert_eq!(top_k_indices(&row, 4), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_top_k_larger_than_row() {
        let row = [0.2, 0.8];
        assert_eq!(top_k_indices(&row, 5), vec![1, 0]);
    }

    #[test]
    fn test_top_k_of_uniform_row() {
        // All-equal similarities fall back to pure index order.
        let row = [0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(top_k_indices(&row, 4), vec![0, 1, 2, 3]);
    }
}
