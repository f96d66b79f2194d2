/// An error type for the stereo module.
#[derive(thiserror::Error, Debug)]
pub enum StereoError {
    /// Error when the camera intrinsics are not physically meaningful.
    #[error("Invalid camera intrinsics: {0}")]
    InvalidIntrinsics(String),

    /// Error when the two camera centers coincide.
    #[error("Camera centers coincide, the stereo baseline is degenerate")]
    DegenerateBaseline,

    /// Error when the optical axis of the first camera is parallel to the baseline.
    #[error("Optical axis of camera0 is parallel to the baseline")]
    DegenerateOrientation,

    /// Error when rectified poses are not related by a pure X offset.
    #[error("Rectified poses are not row aligned: {0}")]
    MisalignedPoses(String),
}
