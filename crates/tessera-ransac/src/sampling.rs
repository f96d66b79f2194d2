use faer::{Entity, Mat};

use crate::random::{PseudoRandom, RandomSource};

/// Per-call bookkeeping for sampling without replacement.
///
/// For every pool position `j` that has not been consumed yet, the value
/// currently standing at `j` is `shuffle[j]` when `staged[j]` is set, and
/// `j` itself otherwise.
struct SelectionState {
    staged: Vec<bool>,
    shuffle: Vec<usize>,
}

impl SelectionState {
    fn new(pool_size: usize) -> Self {
        Self {
            staged: vec![false; pool_size],
            shuffle: vec![0; pool_size],
        }
    }

    #[inline]
    fn resolve(&self, position: usize) -> usize {
        if self.staged[position] {
            self.shuffle[position]
        } else {
            position
        }
    }

    #[inline]
    fn stage(&mut self, position: usize, value: usize) {
        self.shuffle[position] = value;
        self.staged[position] = true;
    }
}

/// Draw `num_samples` distinct indices from `0..pool_size`.
///
/// The returned indices are in the order they were drawn. The random source
/// is queried exactly once per output index, with a range that shrinks by
/// one at every draw: slot `i` draws from `[i, pool_size)`. A drawn position
/// that lies ahead of the slot is backfilled with the value standing at the
/// slot, so later draws landing on it still see an unused index.
///
/// # Arguments
///
/// * `pool_size` - The number of candidates in the pool.
/// * `num_samples` - The number of indices to draw.
/// * `rng` - The random source. Its state is advanced in place.
///
/// PRECONDITION: `num_samples <= pool_size`.
///
/// Example:
///
/// ```rust
/// use tessera_ransac::{sampling::sample_indices, PseudoRandom};
///
/// let mut rng = PseudoRandom::from_seed(3);
/// let indices = sample_indices(10, 4, &mut rng);
/// assert_eq!(indices.len(), 4);
/// assert!(indices.iter().all(|&i| i < 10));
/// ```
pub fn sample_indices<R: RandomSource + ?Sized>(
    pool_size: usize,
    num_samples: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(
        num_samples <= pool_size,
        "cannot draw {num_samples} samples from a pool of {pool_size}"
    );

    let mut state = SelectionState::new(pool_size);
    let mut result = Vec::with_capacity(num_samples);

    for slot in 0..num_samples {
        let selected = rng.uniform_int(slot, pool_size);
        result.push(state.resolve(selected));

        // position `slot` is never drawn again, move its value into the
        // hole left at `selected`
        if selected != slot {
            let displaced = state.resolve(slot);
            state.stage(selected, displaced);
        }

        log::trace!("sample slot {slot}: drew position {selected}");
    }

    result
}

/// Randomly select `num_samples` elements of `pool` without replacement.
///
/// An entropy-seeded generator is created for the call, so the result is not
/// reproducible. Use [`select_elements_with_rng`] or
/// [`select_elements_with_seed`] to control the sequence.
///
/// PRECONDITION: `num_samples <= pool.len()`.
pub fn select_elements<T: Clone>(pool: &[T], num_samples: usize) -> Vec<T> {
    let mut rng = PseudoRandom::new();
    select_elements_with_rng(pool, num_samples, &mut rng)
}

/// Randomly select `num_samples` elements of `pool` using a caller-owned source.
///
/// The elements are returned in selection order. The source is left advanced
/// so successive calls continue the same sequence.
///
/// PRECONDITION: `num_samples <= pool.len()`.
pub fn select_elements_with_rng<T: Clone, R: RandomSource + ?Sized>(
    pool: &[T],
    num_samples: usize,
    rng: &mut R,
) -> Vec<T> {
    sample_indices(pool.len(), num_samples, rng)
        .into_iter()
        .map(|idx| pool[idx].clone())
        .collect()
}

/// Randomly select `num_samples` elements of `pool` starting from `seed`.
///
/// On return `seed` holds a value that continues the sequence, so passing the
/// same variable to a series of calls behaves like sharing one generator.
///
/// PRECONDITION: `num_samples <= pool.len()`.
pub fn select_elements_with_seed<T: Clone>(
    pool: &[T],
    num_samples: usize,
    seed: &mut u64,
) -> Vec<T> {
    let mut rng = PseudoRandom::from_seed(*seed);
    let result = select_elements_with_rng(pool, num_samples, &mut rng);
    *seed = rng.next_seed();
    result
}

/// Randomly select `num_samples` rows of `grid` without replacement.
///
/// Each row of the grid is one observation. The returned grid has
/// `num_samples` rows, in selection order, and the same number of columns.
///
/// PRECONDITION: `num_samples <= grid.nrows()`.
pub fn select_rows<E: Entity>(grid: &Mat<E>, num_samples: usize) -> Mat<E> {
    let mut rng = PseudoRandom::new();
    select_rows_with_rng(grid, num_samples, &mut rng)
}

/// Randomly select `num_samples` rows of `grid` using a caller-owned source.
///
/// PRECONDITION: `num_samples <= grid.nrows()`.
pub fn select_rows_with_rng<E: Entity, R: RandomSource + ?Sized>(
    grid: &Mat<E>,
    num_samples: usize,
    rng: &mut R,
) -> Mat<E> {
    let rows = sample_indices(grid.nrows(), num_samples, rng);
    Mat::from_fn(rows.len(), grid.ncols(), |i, j| grid.read(rows[i], j))
}

/// Randomly select `num_samples` rows of `grid` starting from `seed`.
///
/// `seed` is updated to continue the sequence, as in
/// [`select_elements_with_seed`].
///
/// PRECONDITION: `num_samples <= grid.nrows()`.
pub fn select_rows_with_seed<E: Entity>(
    grid: &Mat<E>,
    num_samples: usize,
    seed: &mut u64,
) -> Mat<E> {
    let mut rng = PseudoRandom::from_seed(*seed);
    let result = select_rows_with_rng(grid, num_samples, &mut rng);
    *seed = rng.next_seed();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Replays a fixed list of draws.
    struct ScriptedSource {
        draws: Vec<usize>,
        calls: Vec<(usize, usize)>,
    }

    impl RandomSource for ScriptedSource {
        fn uniform_int(&mut self, low: usize, high: usize) -> usize {
            self.calls.push((low, high));
            self.draws[self.calls.len() - 1]
        }
    }

    fn is_distinct(indices: &[usize]) -> bool {
        indices.iter().collect::<HashSet<_>>().len() == indices.len()
    }

    #[test]
    fn test_sample_indices_distinct() {
        let mut rng = PseudoRandom::from_seed(11);
        for n in 1..40 {
            for k in 0..=n {
                let indices = sample_indices(n, k, &mut rng);
                assert_eq!(indices.len(), k);
                assert!(indices.iter().all(|&i| i < n));
                assert!(is_distinct(&indices), "n={n} k={k} {indices:?}");
            }
        }
    }

    #[test]
    fn test_sample_indices_one_draw_per_slot() {
        let mut rng = ScriptedSource {
            draws: vec![3, 1, 4],
            calls: Vec::new(),
        };
        sample_indices(5, 3, &mut rng);
        assert_eq!(rng.calls, vec![(0, 5), (1, 5), (2, 5)]);
    }

    #[test]
    fn test_sample_indices_backfills_drawn_positions() {
        // slot 0 takes 1, slot 1 lands on position 2, slot 2 lands on
        // position 2 again and must receive the value moved there from slot 1
        let mut rng = ScriptedSource {
            draws: vec![1, 2, 2],
            calls: Vec::new(),
        };
        let indices = sample_indices(3, 3, &mut rng);
        assert_eq!(indices, vec![1, 2, 0]);
    }

    #[test]
    fn test_sample_indices_chained_backfill() {
        // position 1 is staged with 0, then position 1 is consumed as a slot
        // while another position is drawn; its staged value must move on
        let mut rng = ScriptedSource {
            draws: vec![1, 3, 3, 3],
            calls: Vec::new(),
        };
        let indices = sample_indices(4, 4, &mut rng);
        assert_eq!(indices, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_sample_indices_identity_draws() {
        let mut rng = ScriptedSource {
            draws: vec![0, 1, 2, 3],
            calls: Vec::new(),
        };
        assert_eq!(sample_indices(4, 4, &mut rng), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_select_elements_zero_samples() {
        let pool = vec!["a", "b", "c"];
        let mut rng = PseudoRandom::from_seed(0);
        assert!(select_elements_with_rng(&pool, 0, &mut rng).is_empty());

        let empty: Vec<u8> = Vec::new();
        assert!(select_elements(&empty, 0).is_empty());
    }

    #[test]
    fn test_select_elements_full_permutation() {
        let pool = (0..25).map(|i| i * 10).collect::<Vec<i32>>();
        let mut rng = PseudoRandom::from_seed(8);
        let mut drawn = select_elements_with_rng(&pool, pool.len(), &mut rng);
        drawn.sort();
        assert_eq!(drawn, pool);
    }

    #[test]
    fn test_select_elements_seed_reproducible() {
        let pool = (0..100).collect::<Vec<u32>>();
        let mut seed_a = 1234;
        let mut seed_b = 1234;
        let a = select_elements_with_seed(&pool, 10, &mut seed_a);
        let b = select_elements_with_seed(&pool, 10, &mut seed_b);
        assert_eq!(a, b);
        assert_eq!(seed_a, seed_b);
        assert_ne!(seed_a, 1234);

        let mut other_seed = 4321;
        let c = select_elements_with_seed(&pool, 10, &mut other_seed);
        assert_ne!(a, c);
    }

    #[test]
    fn test_select_elements_seed_write_back_continues_stream() {
        let pool = (0..50).collect::<Vec<u32>>();

        let mut seed = 77;
        let first = select_elements_with_seed(&pool, 5, &mut seed);
        let second = select_elements_with_seed(&pool, 5, &mut seed);

        let mut rng = PseudoRandom::from_seed(77);
        let first_ref = select_elements_with_rng(&pool, 5, &mut rng);
        rng.next_seed();
        let second_ref = select_elements_with_rng(&pool, 5, &mut rng);

        assert_eq!(first, first_ref);
        assert_eq!(second, second_ref);
    }

    #[test]
    fn test_select_rows_matches_indices() {
        let grid = Mat::<f64>::from_fn(12, 3, |i, j| (i * 10 + j) as f64);

        let mut rng_rows = PseudoRandom::from_seed(21);
        let mut rng_idx = PseudoRandom::from_seed(21);
        let rows = select_rows_with_rng(&grid, 5, &mut rng_rows);
        let indices = sample_indices(grid.nrows(), 5, &mut rng_idx);

        assert_eq!(rows.nrows(), 5);
        assert_eq!(rows.ncols(), 3);
        for (i, &src) in indices.iter().enumerate() {
            for j in 0..3 {
                assert_eq!(rows.read(i, j), grid.read(src, j));
            }
        }
    }

    #[test]
    fn test_select_rows_seed_reproducible() {
        let grid = Mat::<f32>::from_fn(30, 2, |i, j| (i + j) as f32);
        let mut seed_a = 5;
        let mut seed_b = 5;
        let a = select_rows_with_seed(&grid, 7, &mut seed_a);
        let b = select_rows_with_seed(&grid, 7, &mut seed_b);
        for i in 0..7 {
            assert_eq!(a.read(i, 0), b.read(i, 0));
            assert_eq!(a.read(i, 1), b.read(i, 1));
        }
        assert_eq!(seed_a, seed_b);
    }

    #[test]
    fn test_select_rows_full_and_empty() {
        let grid = Mat::<f64>::from_fn(6, 2, |i, _| i as f64);

        let all = select_rows(&grid, 6);
        let mut firsts = (0..6).map(|i| all.read(i, 0) as usize).collect::<Vec<_>>();
        firsts.sort();
        assert_eq!(firsts, vec![0, 1, 2, 3, 4, 5]);

        let none = select_rows(&grid, 0);
        assert_eq!(none.nrows(), 0);
        assert_eq!(none.ncols(), 2);
    }
}
