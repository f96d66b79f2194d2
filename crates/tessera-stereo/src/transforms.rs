use glam::{DAffine3, DMat3, DVec3, EulerRot};

/// Build a rotation from roll, pitch and yaw angles, in radians.
///
/// The rotation is `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn roll_pitch_yaw_to_rotation(roll: f64, pitch: f64, yaw: f64) -> DMat3 {
    DMat3::from_euler(EulerRot::ZYX, yaw, pitch, roll)
}

/// Return the position of the camera center in world coordinates.
///
/// For `camera_from_world = [R | t]` this is `-Rᵀ t`.
pub fn camera_center(camera_from_world: &DAffine3) -> DVec3 {
    -(camera_from_world.matrix3.transpose() * camera_from_world.translation)
}

/// Return the camera's optical (Z) axis expressed in world coordinates.
pub fn optical_axis(camera_from_world: &DAffine3) -> DVec3 {
    // third row of the rotation block
    camera_from_world.matrix3.row(2)
}

/// Check that the linear part of a pose is a proper rotation.
///
/// The rotation block must be orthonormal with determinant +1, within
/// `tolerance`. The homogeneous last row is implicit in [`DAffine3`].
pub fn is_rigid(camera_from_world: &DAffine3, tolerance: f64) -> bool {
    let rotation = camera_from_world.matrix3;
    (rotation.transpose() * rotation).abs_diff_eq(DMat3::IDENTITY, tolerance)
        && (rotation.determinant() - 1.0).abs() <= tolerance
}
