use argh::FromArgs;
use glam::{DAffine3, DVec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tessera::stereo::{self, transforms, PinholeIntrinsics};

#[derive(FromArgs)]
/// Rectify a calibrated stereo rig and print the rectified cameras
struct Args {
    /// path to a JSON rig file; a built-in rig is used when omitted
    #[argh(option)]
    rig: Option<PathBuf>,

    /// baseline of the built-in rig, in meters
    #[argh(option, default = "0.12")]
    baseline: f64,

    /// physical focal length of the rectified cameras
    #[argh(option)]
    focal_length: Option<f64>,

    /// print the rig as JSON and exit
    #[argh(switch)]
    print_rig: bool,
}

/// Intrinsics and poses of a calibrated stereo rig.
#[derive(Debug, Serialize, Deserialize)]
struct Rig {
    intrinsics0: PinholeIntrinsics,
    intrinsics1: PinholeIntrinsics,
    camera0_from_world: DAffine3,
    camera1_from_world: DAffine3,
}

fn default_rig(baseline: f64) -> Result<Rig, stereo::StereoError> {
    let intrinsics0 = PinholeIntrinsics::new(1280, 720, 0.0035, 3e-6, 3e-6, 642.3, 358.1)?;
    let intrinsics1 = PinholeIntrinsics::new(1280, 720, 0.00352, 3e-6, 3e-6, 635.8, 362.4)?;

    let rotation1 = transforms::roll_pitch_yaw_to_rotation(0.004, -0.012, 0.002);
    let center1 = DVec3::new(baseline, 0.001, -0.002);

    Ok(Rig {
        intrinsics0,
        intrinsics1,
        camera0_from_world: DAffine3::IDENTITY,
        camera1_from_world: DAffine3::from_mat3_translation(rotation1, -(rotation1 * center1)),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let rig = match &args.rig {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(std::io::BufReader::new(file))?
        }
        None => default_rig(args.baseline)?,
    };

    if args.print_rig {
        println!("{}", serde_json::to_string_pretty(&rig)?);
        return Ok(());
    }

    log::info!(
        "rectifying rig with camera centers {} and {}",
        transforms::camera_center(&rig.camera0_from_world),
        transforms::camera_center(&rig.camera1_from_world)
    );

    let pair = match args.focal_length {
        Some(focal_length) => stereo::stereo_rectify_with_focal_length(
            &rig.intrinsics0,
            &rig.intrinsics1,
            &rig.camera0_from_world,
            &rig.camera1_from_world,
            focal_length,
        )?,
        None => stereo::stereo_rectify(
            &rig.intrinsics0,
            &rig.intrinsics1,
            &rig.camera0_from_world,
            &rig.camera1_from_world,
        )?,
    };

    println!("{}", serde_json::to_string_pretty(&pair)?);

    let q = pair.reprojection_matrix()?;
    println!("Reprojection matrix (row major):");
    for r in 0..4 {
        println!("  {:?}", q.row(r).to_array());
    }

    // a point 2 m ahead of camera0, observed by both rectified cameras
    let point = rig
        .camera0_from_world
        .inverse()
        .transform_point3(DVec3::new(0.1, -0.05, 2.0));
    let pixel0 = pair.camera0.project(point);
    let pixel1 = pair.camera1.project(point);
    let disparity = pixel0.x - pixel1.x;
    if let Some(recovered) = stereo::reproject_disparity(&q, pixel0.x, pixel0.y, disparity) {
        println!("Disparity {disparity:.3} px reprojects to {recovered:.4}");
    }

    Ok(())
}
