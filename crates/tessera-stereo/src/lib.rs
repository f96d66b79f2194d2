#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics.
pub mod camera;

/// Error types for the stereo module.
pub mod error;

/// Stereo rectification of posed pinhole camera pairs.
pub mod rectify;

/// Reprojection of rectified pixels and disparities to 3D.
pub mod reprojection;

/// Rigid pose helpers.
pub mod transforms;

pub use crate::camera::PinholeIntrinsics;
pub use crate::error::StereoError;
pub use crate::rectify::{
    stereo_rectify, stereo_rectify_with_focal_length, RectifiedCamera, RectifiedStereoPair,
};
pub use crate::reprojection::{
    reproject_disparity, reprojection_matrix, reprojection_matrix_from_extrinsics,
};
