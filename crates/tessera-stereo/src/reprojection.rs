use glam::{DAffine3, DMat4, DVec3, DVec4};

use crate::camera::PinholeIntrinsics;
use crate::error::StereoError;
use crate::transforms::camera_center;

/// Build the matrix that maps a rectified pixel and its disparity to 3D.
///
/// For a pixel `(u, v)` of rectified camera0 with disparity `d = u0 - u1`,
/// `Q * [u, v, d, 1]` is the homogeneous position of the observed point in
/// rectified camera0 coordinates.
///
/// # Arguments
///
/// * `intrinsics0` - Rectified intrinsics of camera0.
/// * `intrinsics1` - Rectified intrinsics of camera1. Only its principal point column is used.
/// * `baseline` - Offset of camera1 along the rectified X axis.
///
/// # Returns
///
/// The 4x4 reprojection matrix `Q`.
///
/// Example:
///
/// ```rust
/// use glam::DVec4;
/// use tessera_stereo::{reprojection_matrix, PinholeIntrinsics};
///
/// let intrinsics = PinholeIntrinsics::new(640, 480, 500.0, 1.0, 1.0, 320.0, 240.0).unwrap();
/// let q = reprojection_matrix(&intrinsics, &intrinsics, 0.1).unwrap();
///
/// // a point on the optical axis, 2 units away, has a disparity of 500 * 0.1 / 2
/// let h = q * DVec4::new(320.0, 240.0, 25.0, 1.0);
/// assert!((h.z / h.w - 2.0).abs() < 1e-12);
/// ```
pub fn reprojection_matrix(
    intrinsics0: &PinholeIntrinsics,
    intrinsics1: &PinholeIntrinsics,
    baseline: f64,
) -> Result<DMat4, StereoError> {
    if baseline == 0.0 || !baseline.is_finite() {
        return Err(StereoError::DegenerateBaseline);
    }

    let (kx, ky) = (intrinsics0.k_x(), intrinsics0.k_y());
    let (u0, v0) = (intrinsics0.center_u, intrinsics0.center_v);
    let u1 = intrinsics1.center_u;
    let kb = kx * baseline;

    let rows = [
        [1.0 / kx, 0.0, 0.0, -u0 / kx],
        [0.0, 1.0 / ky, 0.0, -v0 / ky],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0 / kb, -(u0 - u1) / kb],
    ];

    // glam reads the nested array column by column
    Ok(DMat4::from_cols_array_2d(&rows).transpose())
}

/// Build the reprojection matrix from the poses of an already rectified pair.
///
/// The two poses must share their rotation and camera1 must sit on the X
/// axis of camera0, both within `epsilon`. The baseline is the X offset of
/// camera1 as seen from camera0.
pub fn reprojection_matrix_from_extrinsics(
    intrinsics0: &PinholeIntrinsics,
    intrinsics1: &PinholeIntrinsics,
    camera0_from_world: &DAffine3,
    camera1_from_world: &DAffine3,
    epsilon: f64,
) -> Result<DMat4, StereoError> {
    if !camera0_from_world
        .matrix3
        .abs_diff_eq(camera1_from_world.matrix3, epsilon)
    {
        return Err(StereoError::MisalignedPoses(
            "the two cameras are not identically oriented".to_string(),
        ));
    }

    let offset = camera0_from_world.transform_point3(camera_center(camera1_from_world));
    if offset.y.abs() > epsilon || offset.z.abs() > epsilon {
        return Err(StereoError::MisalignedPoses(format!(
            "camera1 is offset by {offset} from camera0, expected an offset along X only"
        )));
    }

    log::debug!("baseline from extrinsics: {:.6}", offset.x);

    reprojection_matrix(intrinsics0, intrinsics1, offset.x)
}

/// Reproject a rectified pixel with known disparity to a 3D point.
///
/// Returns `None` when the homogeneous scale vanishes, i.e. the point is at
/// infinity.
pub fn reproject_disparity(q: &DMat4, u: f64, v: f64, disparity: f64) -> Option<DVec3> {
    let h = *q * DVec4::new(u, v, disparity, 1.0);
    if h.w.abs() < f64::EPSILON {
        return None;
    }
    Some(h.truncate() / h.w)
}
