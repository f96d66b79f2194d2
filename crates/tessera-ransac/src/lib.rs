#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The primitives here are the building blocks of a RANSAC loop: draw a
//! minimal sample without replacement, fit a model (caller side), then
//! extract the consensus set of the pool under that model.
//!
//! ```rust
//! use tessera_ransac::{consensus, sampling, PseudoRandom};
//!
//! let pool: Vec<[f64; 2]> = (0..20).map(|i| [i as f64, 2.0 * i as f64]).collect();
//!
//! let mut rng = PseudoRandom::from_seed(7);
//! let sample = sampling::select_elements_with_rng(&pool, 2, &mut rng);
//! assert_eq!(sample.len(), 2);
//!
//! let inliers = consensus::consensus_indices(&pool, |p| (p[1] - 2.0 * p[0]).abs() < 1e-9);
//! assert_eq!(inliers.len(), pool.len());
//! ```

/// Consensus-set extraction over slices and row grids.
pub mod consensus;

/// Pseudo-random sources used by the samplers.
pub mod random;

/// Random sampling without replacement.
pub mod sampling;

pub use random::{PseudoRandom, RandomSource};
