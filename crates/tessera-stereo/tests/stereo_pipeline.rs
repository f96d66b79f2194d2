use approx::assert_relative_eq;
use glam::{DAffine3, DMat3, DVec3};
use tessera_stereo::transforms::{camera_center, roll_pitch_yaw_to_rotation};
use tessera_stereo::{
    reproject_disparity, reprojection_matrix_from_extrinsics, stereo_rectify, PinholeIntrinsics,
    StereoError,
};

fn pose_at(rotation: DMat3, center: DVec3) -> DAffine3 {
    DAffine3::from_mat3_translation(rotation, -(rotation * center))
}

fn scene() -> Vec<DVec3> {
    let mut points = Vec::new();
    for i in -2..=2 {
        for j in -2..=2 {
            let depth = 3.0 + 0.5 * (i + j + 4) as f64;
            points.push(DVec3::new(0.3 * i as f64, 0.2 * j as f64, depth));
        }
    }
    points
}

#[test]
fn identity_pair_keeps_orientation() -> Result<(), StereoError> {
    let intrinsics = PinholeIntrinsics::new(752, 480, 0.0036, 6e-6, 6e-6, 376.0, 240.0)?;
    let baseline = 0.11;
    let pose0 = DAffine3::IDENTITY;
    let pose1 = pose_at(DMat3::IDENTITY, DVec3::new(baseline, 0.0, 0.0));

    let pair = stereo_rectify(&intrinsics, &intrinsics, &pose0, &pose1)?;
    assert_relative_eq!(pair.baseline, baseline, epsilon = 1e-12);
    assert!(pair
        .camera0
        .camera_from_world
        .matrix3
        .abs_diff_eq(DMat3::IDENTITY, 1e-12));
    assert!(pair
        .camera1
        .camera_from_world
        .matrix3
        .abs_diff_eq(DMat3::IDENTITY, 1e-12));

    let q = pair.reprojection_matrix()?;
    for point in scene() {
        let pixel0 = pair.camera0.project(point);
        let pixel1 = pair.camera1.project(point);
        let recovered = reproject_disparity(&q, pixel0.x, pixel0.y, pixel0.x - pixel1.x)
            .ok_or(StereoError::DegenerateBaseline)?;
        assert!(recovered.abs_diff_eq(point, 1e-9));
    }
    Ok(())
}

#[test]
fn posed_pair_rectifies_and_reprojects() -> Result<(), Box<dyn std::error::Error>> {
    let intrinsics0 = PinholeIntrinsics::new(1024, 768, 0.008, 7e-6, 7.2e-6, 515.0, 380.0)?;
    let intrinsics1 = PinholeIntrinsics::new(1024, 768, 0.0081, 7e-6, 7.2e-6, 509.0, 391.0)?;

    let rig_from_world = pose_at(
        roll_pitch_yaw_to_rotation(0.1, 0.4, -0.2),
        DVec3::new(5.0, -1.0, 2.0),
    );
    let pose0 = pose_at(roll_pitch_yaw_to_rotation(0.01, 0.02, 0.0), DVec3::ZERO) * rig_from_world;
    let pose1 = pose_at(
        roll_pitch_yaw_to_rotation(-0.02, -0.015, 0.01),
        DVec3::new(0.3, 0.01, 0.02),
    ) * rig_from_world;

    let pair = stereo_rectify(&intrinsics0, &intrinsics1, &pose0, &pose1)?;

    let offset = pair
        .camera0
        .camera_from_world
        .transform_point3(camera_center(&pair.camera1.camera_from_world));
    assert!(offset.abs_diff_eq(DVec3::new(pair.baseline, 0.0, 0.0), 1e-9));

    let q = pair.reprojection_matrix()?;
    let q_from_poses = reprojection_matrix_from_extrinsics(
        &pair.camera0.intrinsics,
        &pair.camera1.intrinsics,
        &pair.camera0.camera_from_world,
        &pair.camera1.camera_from_world,
        1e-9,
    )?;
    assert!(q.abs_diff_eq(q_from_poses, 1e-6));

    let world_from_rig = rig_from_world.inverse();
    for local in scene() {
        let point = world_from_rig.transform_point3(local);

        // observe in the original images, then rectify the pixels
        let original0 = intrinsics0.project(pose0.transform_point3(point));
        let original1 = intrinsics1.project(pose1.transform_point3(point));
        let pixel0 = pair.camera0.rectify_pixel(original0);
        let pixel1 = pair.camera1.rectify_pixel(original1);
        assert_relative_eq!(pixel0.y, pixel1.y, epsilon = 1e-6);

        let recovered = reproject_disparity(&q, pixel0.x, pixel0.y, pixel0.x - pixel1.x)
            .ok_or("point at infinity")?;
        let expected = pair.camera0.camera_from_world.transform_point3(point);
        assert!(
            recovered.abs_diff_eq(expected, 1e-6),
            "{recovered} != {expected}"
        );
    }
    Ok(())
}

#[test]
fn rig_roundtrips_through_json() -> Result<(), Box<dyn std::error::Error>> {
    let intrinsics = PinholeIntrinsics::new(640, 480, 2.0, 0.0078125, 0.0078125, 320.0, 240.0)?;
    let pose1 = pose_at(DMat3::IDENTITY, DVec3::new(0.5, 0.0, 0.0));

    let json = serde_json::to_string(&(intrinsics, pose1))?;
    let (intrinsics_back, pose_back): (PinholeIntrinsics, DAffine3) = serde_json::from_str(&json)?;
    assert_eq!(intrinsics_back, intrinsics);
    assert_eq!(pose_back, pose1);

    let pair = stereo_rectify(&intrinsics, &intrinsics_back, &DAffine3::IDENTITY, &pose_back)?;
    assert_relative_eq!(pair.baseline, 0.5);
    Ok(())
}
