use glam::{DAffine3, DMat3, DMat4, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::camera::PinholeIntrinsics;
use crate::error::StereoError;
use crate::reprojection::reprojection_matrix;
use crate::transforms::{camera_center, is_rigid, optical_axis};

const DEGENERACY_TOLERANCE: f64 = 1e-12;

/// One camera of a rectified stereo pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectifiedCamera {
    /// Intrinsics of the virtual rectified camera.
    pub intrinsics: PinholeIntrinsics,
    /// Rectified pose, mapping world points to rectified camera coordinates.
    pub camera_from_world: DAffine3,
    /// Homography taking original image pixels to rectified image pixels.
    pub rectified_from_image: DMat3,
}

impl RectifiedCamera {
    /// Homography taking rectified pixels back to the original image.
    ///
    /// This is the map needed to warp a rectified image out of the original one.
    pub fn image_from_rectified(&self) -> DMat3 {
        self.rectified_from_image.inverse()
    }

    /// Project a world point into the rectified image.
    pub fn project(&self, world_point: DVec3) -> DVec2 {
        self.intrinsics
            .project(self.camera_from_world.transform_point3(world_point))
    }

    /// Map a pixel of the original image into the rectified image.
    pub fn rectify_pixel(&self, pixel: DVec2) -> DVec2 {
        let h = self.rectified_from_image * pixel.extend(1.0);
        DVec2::new(h.x / h.z, h.y / h.z)
    }
}

/// The result of rectifying a stereo pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectifiedStereoPair {
    /// The rectified reference camera.
    pub camera0: RectifiedCamera,
    /// The rectified second camera, displaced along the X axis of `camera0`.
    pub camera1: RectifiedCamera,
    /// Distance between the two optical centers, along the rectified X axis.
    pub baseline: f64,
}

impl RectifiedStereoPair {
    /// The disparity-to-depth matrix of the rectified pair.
    ///
    /// See [`reprojection_matrix`].
    pub fn reprojection_matrix(&self) -> Result<DMat4, StereoError> {
        reprojection_matrix(
            &self.camera0.intrinsics,
            &self.camera1.intrinsics,
            self.baseline,
        )
    }
}

/// Rectify a calibrated stereo pair, using the mean of the two focal lengths.
///
/// Both cameras are rotated about their optical centers so that they share
/// an orientation whose X axis runs along the baseline, from camera0 to
/// camera1. Corresponding points then lie on the same image row.
///
/// # Arguments
///
/// * `intrinsics0` - Intrinsics of the reference camera.
/// * `intrinsics1` - Intrinsics of the second camera.
/// * `camera0_from_world` - Rigid pose of the reference camera.
/// * `camera1_from_world` - Rigid pose of the second camera.
///
/// # Returns
///
/// The rectified cameras and the baseline length.
///
/// PRECONDITION: the rotation blocks of both poses are orthonormal.
///
/// Example:
///
/// ```rust
/// use glam::{DAffine3, DVec3};
/// use tessera_stereo::{stereo_rectify, PinholeIntrinsics};
///
/// let intrinsics = PinholeIntrinsics::new(640, 480, 500.0, 1.0, 1.0, 320.0, 240.0).unwrap();
/// let camera0_from_world = DAffine3::IDENTITY;
/// let camera1_from_world = DAffine3::from_translation(DVec3::new(-0.1, 0.0, 0.0));
///
/// let pair = stereo_rectify(&intrinsics, &intrinsics, &camera0_from_world, &camera1_from_world)
///     .unwrap();
/// assert!((pair.baseline - 0.1).abs() < 1e-12);
/// ```
pub fn stereo_rectify(
    intrinsics0: &PinholeIntrinsics,
    intrinsics1: &PinholeIntrinsics,
    camera0_from_world: &DAffine3,
    camera1_from_world: &DAffine3,
) -> Result<RectifiedStereoPair, StereoError> {
    let focal_length = 0.5 * (intrinsics0.focal_length + intrinsics1.focal_length);
    rectify_with(
        intrinsics0,
        intrinsics1,
        camera0_from_world,
        camera1_from_world,
        focal_length,
    )
}

/// Rectify a calibrated stereo pair with an explicit physical focal length.
///
/// Same as [`stereo_rectify`], except that both rectified cameras use
/// `focal_length`, in the same physical units as the input intrinsics.
pub fn stereo_rectify_with_focal_length(
    intrinsics0: &PinholeIntrinsics,
    intrinsics1: &PinholeIntrinsics,
    camera0_from_world: &DAffine3,
    camera1_from_world: &DAffine3,
    focal_length: f64,
) -> Result<RectifiedStereoPair, StereoError> {
    rectify_with(
        intrinsics0,
        intrinsics1,
        camera0_from_world,
        camera1_from_world,
        focal_length,
    )
}

fn rectify_with(
    intrinsics0: &PinholeIntrinsics,
    intrinsics1: &PinholeIntrinsics,
    camera0_from_world: &DAffine3,
    camera1_from_world: &DAffine3,
    focal_length: f64,
) -> Result<RectifiedStereoPair, StereoError> {
    debug_assert!(
        is_rigid(camera0_from_world, 1e-6),
        "camera0 pose is not a rigid transform"
    );
    debug_assert!(
        is_rigid(camera1_from_world, 1e-6),
        "camera1 pose is not a rigid transform"
    );

    let center0 = camera_center(camera0_from_world);
    let center1 = camera_center(camera1_from_world);

    let offset = center1 - center0;
    let baseline = offset.length();
    if baseline <= DEGENERACY_TOLERANCE {
        return Err(StereoError::DegenerateBaseline);
    }
    let x_axis = offset / baseline;

    let y_axis = optical_axis(camera0_from_world).cross(x_axis);
    let y_norm = y_axis.length();
    if y_norm <= DEGENERACY_TOLERANCE {
        return Err(StereoError::DegenerateOrientation);
    }
    let y_axis = y_axis / y_norm;
    let z_axis = x_axis.cross(y_axis);

    // rows of the rectified rotation are the new axes in world coordinates
    let rotation = DMat3::from_cols(x_axis, y_axis, z_axis).transpose();

    let center_v = 0.5 * (intrinsics0.center_v + intrinsics1.center_v);
    // camera0's pixel grid for both, only the principal point column differs
    let rectified_intrinsics = |center_u: f64| {
        PinholeIntrinsics {
            center_u,
            center_v,
            ..*intrinsics0
        }
        .with_focal_length(focal_length)
    };

    let camera0 = rectify_camera(
        intrinsics0,
        camera0_from_world,
        rectified_intrinsics(intrinsics0.center_u)?,
        rotation,
        center0,
    );
    let camera1 = rectify_camera(
        intrinsics1,
        camera1_from_world,
        rectified_intrinsics(intrinsics1.center_u)?,
        rotation,
        center1,
    );

    log::debug!(
        "rectified stereo pair: baseline {baseline:.6}, focal length {focal_length:.6}, \
         k_x {:.3}",
        camera0.intrinsics.k_x()
    );

    Ok(RectifiedStereoPair {
        camera0,
        camera1,
        baseline,
    })
}

fn rectify_camera(
    intrinsics: &PinholeIntrinsics,
    camera_from_world: &DAffine3,
    rectified: PinholeIntrinsics,
    rotation: DMat3,
    center: DVec3,
) -> RectifiedCamera {
    let rectified_from_world = DAffine3::from_mat3_translation(rotation, -(rotation * center));

    // un-project, rotate from the original frame into the rectified one, project
    let rectified_from_camera = rectified_from_world * camera_from_world.inverse();
    let rectified_from_image =
        rectified.matrix() * rectified_from_camera.matrix3 * intrinsics.inverse_matrix();

    RectifiedCamera {
        intrinsics: rectified,
        camera_from_world: rectified_from_world,
        rectified_from_image,
    }
}
