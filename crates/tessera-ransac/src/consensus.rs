use faer::{Entity, Mat, RowRef};

/// Copy the elements of `candidates` accepted by `evaluator` into `out`.
///
/// Accepted elements are written to the front of `out` in their original
/// order. The evaluator is called exactly once per candidate.
///
/// # Arguments
///
/// * `candidates` - The pool to filter.
/// * `out` - Output storage, sized for the worst case.
/// * `evaluator` - Returns `true` for the elements to keep.
///
/// # Returns
///
/// The number of accepted elements, i.e. the length of the valid prefix of `out`.
///
/// PRECONDITION: `out` is at least as long as the number of accepted elements.
///
/// Example:
///
/// ```rust
/// use tessera_ransac::consensus::get_consensus_set;
///
/// let candidates = [1, -2, 3, -4, 5];
/// let mut out = [0; 5];
/// let count = get_consensus_set(&candidates, &mut out, |x| *x > 0);
/// assert_eq!(&out[..count], &[1, 3, 5]);
/// ```
pub fn get_consensus_set<T, F>(candidates: &[T], out: &mut [T], mut evaluator: F) -> usize
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    let mut count = 0;
    for candidate in candidates {
        if evaluator(candidate) {
            out[count] = candidate.clone();
            count += 1;
        }
    }
    count
}

/// Like [`get_consensus_set`], but acceptance is decided by `criterion`
/// applied to the evaluator's output.
///
/// This is the usual residual-and-threshold split: `evaluator` computes an
/// error for a candidate and `criterion` decides whether that error is small
/// enough.
///
/// Example:
///
/// ```rust
/// use tessera_ransac::consensus::get_consensus_set_by_comparison;
///
/// let points = [[0.0, 0.1], [1.0, 5.0], [2.0, 1.9]];
/// let mut out = [[0.0; 2]; 3];
/// let count = get_consensus_set_by_comparison(
///     &points,
///     &mut out,
///     |p: &[f64; 2]| (p[1] - p[0]).abs(),
///     |residual| residual < 0.5,
/// );
/// assert_eq!(count, 2);
/// ```
pub fn get_consensus_set_by_comparison<T, R, F, C>(
    candidates: &[T],
    out: &mut [T],
    mut evaluator: F,
    mut criterion: C,
) -> usize
where
    T: Clone,
    F: FnMut(&T) -> R,
    C: FnMut(R) -> bool,
{
    get_consensus_set(candidates, out, |candidate| criterion(evaluator(candidate)))
}

/// Return the positions of the candidates accepted by `evaluator`.
///
/// Useful for drivers that keep inlier sets as indices into the pool.
pub fn consensus_indices<T, F>(candidates: &[T], mut evaluator: F) -> Vec<usize>
where
    F: FnMut(&T) -> bool,
{
    candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, candidate)| evaluator(candidate).then_some(idx))
        .collect()
}

/// Return the rows of `candidates` accepted by `evaluator`.
///
/// The output grid has exactly as many rows as were accepted, in their
/// original order, and the same number of columns as the input. A first pass
/// evaluates every row and counts, the second pass copies.
///
/// Example:
///
/// ```rust
/// use tessera_ransac::consensus::get_consensus_set_rows;
///
/// let grid = faer::Mat::<f64>::from_fn(4, 2, |i, j| (i + j) as f64);
/// let inliers = get_consensus_set_rows(&grid, |row| row.read(0) >= 2.0);
/// assert_eq!(inliers.nrows(), 2);
/// assert_eq!(inliers.ncols(), 2);
/// ```
pub fn get_consensus_set_rows<E, F>(candidates: &Mat<E>, mut evaluator: F) -> Mat<E>
where
    E: Entity,
    F: FnMut(RowRef<'_, E>) -> bool,
{
    let indicators = (0..candidates.nrows())
        .map(|i| evaluator(candidates.as_ref().row(i)))
        .collect::<Vec<bool>>();

    copy_accepted_rows(candidates, &indicators)
}

/// Like [`get_consensus_set_rows`], but acceptance is decided by `criterion`
/// applied to the evaluator's output.
pub fn get_consensus_set_rows_by_comparison<E, R, F, C>(
    candidates: &Mat<E>,
    mut evaluator: F,
    mut criterion: C,
) -> Mat<E>
where
    E: Entity,
    F: FnMut(RowRef<'_, E>) -> R,
    C: FnMut(R) -> bool,
{
    get_consensus_set_rows(candidates, |row| criterion(evaluator(row)))
}

/// Return the indices of the rows of `candidates` accepted by `evaluator`.
pub fn consensus_row_indices<E, F>(candidates: &Mat<E>, mut evaluator: F) -> Vec<usize>
where
    E: Entity,
    F: FnMut(RowRef<'_, E>) -> bool,
{
    (0..candidates.nrows())
        .filter(|&i| evaluator(candidates.as_ref().row(i)))
        .collect()
}

fn copy_accepted_rows<E: Entity>(candidates: &Mat<E>, indicators: &[bool]) -> Mat<E> {
    let source_rows = indicators
        .iter()
        .enumerate()
        .filter_map(|(i, &accepted)| accepted.then_some(i))
        .collect::<Vec<_>>();
    let count = source_rows.len();

    log::debug!(
        "consensus set: {count} of {} rows accepted",
        candidates.nrows()
    );

    Mat::from_fn(count, candidates.ncols(), |i, j| {
        candidates.read(source_rows[i], j)
    })
}
