use glam::{DMat3, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::StereoError;

/// Intrinsic parameters of a pinhole camera.
///
/// The focal length is kept in physical units, together with the physical
/// size of a pixel, so that the focal length in pixels is
/// `focal_length / pixel_size`. Setting both pixel sizes to 1.0 makes the
/// focal length a pixel count.
///
/// A camera-frame point `(x, y, z)` projects to
/// `u = k_x * x / z + center_u`, `v = k_y * y / z + center_v`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeIntrinsics {
    /// Image width in pixels.
    pub num_pixels_x: usize,
    /// Image height in pixels.
    pub num_pixels_y: usize,
    /// Focal length in physical units.
    pub focal_length: f64,
    /// Physical width of one pixel.
    pub pixel_size_x: f64,
    /// Physical height of one pixel.
    pub pixel_size_y: f64,
    /// Principal point column, in pixels.
    pub center_u: f64,
    /// Principal point row, in pixels.
    pub center_v: f64,
}

impl PinholeIntrinsics {
    /// Create pinhole intrinsics, checking that focal length and pixel sizes are positive.
    pub fn new(
        num_pixels_x: usize,
        num_pixels_y: usize,
        focal_length: f64,
        pixel_size_x: f64,
        pixel_size_y: f64,
        center_u: f64,
        center_v: f64,
    ) -> Result<Self, StereoError> {
        let intrinsics = Self {
            num_pixels_x,
            num_pixels_y,
            focal_length,
            pixel_size_x,
            pixel_size_y,
            center_u,
            center_v,
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Create intrinsics from a 3x3 camera matrix `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
    ///
    /// The focal length becomes `fx` with a unit horizontal pixel, and the
    /// vertical pixel size absorbs the `fx / fy` aspect ratio.
    pub fn from_matrix(
        k: &DMat3,
        num_pixels_x: usize,
        num_pixels_y: usize,
    ) -> Result<Self, StereoError> {
        // glam is column major: k.col(c)[r] is the element at row r, column c
        let (fx, fy) = (k.col(0).x, k.col(1).y);
        if k.col(1).x != 0.0 || k.col(0).y != 0.0 || k.col(0).z != 0.0 || k.col(1).z != 0.0 {
            return Err(StereoError::InvalidIntrinsics(
                "camera matrix must have form [[fx, 0, cx], [0, fy, cy], [0, 0, 1]]".to_string(),
            ));
        }
        if k.col(2).z != 1.0 {
            return Err(StereoError::InvalidIntrinsics(
                "camera matrix must be normalized so that k[2][2] == 1".to_string(),
            ));
        }
        Self::new(
            num_pixels_x,
            num_pixels_y,
            fx,
            1.0,
            fx / fy,
            k.col(2).x,
            k.col(2).y,
        )
    }

    fn validate(&self) -> Result<(), StereoError> {
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            return Err(StereoError::InvalidIntrinsics(format!(
                "focal length must be positive, got {}",
                self.focal_length
            )));
        }
        if !(self.pixel_size_x.is_finite() && self.pixel_size_x > 0.0)
            || !(self.pixel_size_y.is_finite() && self.pixel_size_y > 0.0)
        {
            return Err(StereoError::InvalidIntrinsics(format!(
                "pixel sizes must be positive, got ({}, {})",
                self.pixel_size_x, self.pixel_size_y
            )));
        }
        Ok(())
    }

    /// Horizontal focal length in pixels.
    #[inline]
    pub fn k_x(&self) -> f64 {
        self.focal_length / self.pixel_size_x
    }

    /// Vertical focal length in pixels.
    #[inline]
    pub fn k_y(&self) -> f64 {
        self.focal_length / self.pixel_size_y
    }

    /// Return a copy with a different physical focal length.
    ///
    /// The new focal length is validated like in [`PinholeIntrinsics::new`].
    pub fn with_focal_length(&self, focal_length: f64) -> Result<Self, StereoError> {
        let intrinsics = Self {
            focal_length,
            ..*self
        };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// The 3x3 camera matrix mapping camera-frame rays to homogeneous pixels.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.k_x(), 0.0, 0.0),
            DVec3::new(0.0, self.k_y(), 0.0),
            DVec3::new(self.center_u, self.center_v, 1.0),
        )
    }

    /// The inverse of [`PinholeIntrinsics::matrix`], computed in closed form.
    pub fn inverse_matrix(&self) -> DMat3 {
        let (kx, ky) = (self.k_x(), self.k_y());
        DMat3::from_cols(
            DVec3::new(1.0 / kx, 0.0, 0.0),
            DVec3::new(0.0, 1.0 / ky, 0.0),
            DVec3::new(-self.center_u / kx, -self.center_v / ky, 1.0),
        )
    }

    /// Project a point in camera coordinates to pixel coordinates.
    ///
    /// PRECONDITION: `point.z != 0`.
    pub fn project(&self, point: DVec3) -> DVec2 {
        DVec2::new(
            self.k_x() * point.x / point.z + self.center_u,
            self.k_y() * point.y / point.z + self.center_v,
        )
    }

    /// Return the ray through a pixel, as the camera-frame point at `z = 1`.
    pub fn reverse_project(&self, pixel: DVec2) -> DVec3 {
        DVec3::new(
            (pixel.x - self.center_u) / self.k_x(),
            (pixel.y - self.center_v) / self.k_y(),
            1.0,
        )
    }
}
