use argh::FromArgs;
use faer::Mat;

use tessera::ransac::{consensus, sampling, PseudoRandom};

#[derive(FromArgs)]
/// Fit a 2D line to noisy points with RANSAC
struct Args {
    /// number of points to generate
    #[argh(option, default = "200")]
    num_points: usize,

    /// fraction of the points that are outliers
    #[argh(option, default = "0.3")]
    outlier_ratio: f64,

    /// maximum distance from the line for a point to be an inlier
    #[argh(option, default = "0.05")]
    threshold: f64,

    /// number of RANSAC iterations
    #[argh(option, default = "100")]
    iterations: usize,

    /// seed for the random number generator
    #[argh(option, default = "42")]
    seed: u64,
}

/// A line `a * x + b * y + c = 0` with `a² + b² = 1`.
#[derive(Debug, Clone, Copy)]
struct Line {
    a: f64,
    b: f64,
    c: f64,
}

impl Line {
    fn through(p: [f64; 2], q: [f64; 2]) -> Option<Self> {
        let (dx, dy) = (q[0] - p[0], q[1] - p[1]);
        let norm = dx.hypot(dy);
        if norm < 1e-12 {
            return None;
        }
        let (a, b) = (-dy / norm, dx / norm);
        Some(Self {
            a,
            b,
            c: -(a * p[0] + b * p[1]),
        })
    }

    fn distance(&self, x: f64, y: f64) -> f64 {
        (self.a * x + self.b * y + self.c).abs()
    }

    /// Total least squares fit through the rows of an `n x 2` grid.
    fn fit(points: &Mat<f64>) -> Option<Self> {
        if points.nrows() < 2 {
            return None;
        }
        let n = points.nrows() as f64;
        let (mut mx, mut my) = (0.0, 0.0);
        for i in 0..points.nrows() {
            mx += points.read(i, 0);
            my += points.read(i, 1);
        }
        mx /= n;
        my /= n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for i in 0..points.nrows() {
            let (dx, dy) = (points.read(i, 0) - mx, points.read(i, 1) - my);
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        // direction of largest spread
        let angle = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        Self::through([mx, my], [mx + angle.cos(), my + angle.sin()])
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();
    if args.num_points < 2 {
        return Err("at least two points are needed to fit a line".into());
    }

    // ground truth: y = 0.5 * x - 1
    let mut rng = PseudoRandom::from_seed(args.seed);
    let mut points = Mat::<f64>::zeros(args.num_points, 2);
    for i in 0..args.num_points {
        let x = rng.uniform(-5.0, 5.0);
        let y = if rng.uniform(0.0, 1.0) < args.outlier_ratio {
            rng.uniform(-6.0, 6.0)
        } else {
            0.5 * x - 1.0 + rng.uniform(-0.5, 0.5) * args.threshold
        };
        points.write(i, 0, x);
        points.write(i, 1, y);
    }
    println!("Generated #{} points", points.nrows());

    let mut best: Option<(Line, usize)> = None;
    for iteration in 0..args.iterations {
        let sample = sampling::select_rows_with_rng(&points, 2, &mut rng);
        let Some(line) = Line::through(
            [sample.read(0, 0), sample.read(0, 1)],
            [sample.read(1, 0), sample.read(1, 1)],
        ) else {
            continue;
        };

        let num_inliers = consensus::consensus_row_indices(&points, |row| {
            line.distance(row.read(0), row.read(1)) < args.threshold
        })
        .len();

        if best.map_or(true, |(_, n)| num_inliers > n) {
            log::debug!("iteration {iteration}: {num_inliers} inliers");
            best = Some((line, num_inliers));
        }
    }

    let (line, _) = best.ok_or("no model could be fitted")?;
    let inliers = consensus::get_consensus_set_rows_by_comparison(
        &points,
        |row| line.distance(row.read(0), row.read(1)),
        |distance| distance < args.threshold,
    );
    println!("Consensus set: #{} inliers", inliers.nrows());

    let refined = Line::fit(&inliers).ok_or("degenerate consensus set")?;
    if refined.b.abs() > 1e-12 {
        println!(
            "Refined line: y = {:.4} * x + {:.4}",
            -refined.a / refined.b,
            -refined.c / refined.b
        );
    } else {
        println!("Refined line: x = {:.4}", -refined.c / refined.a);
    }

    // continuation seed for a reproducible follow-up run
    println!("Next seed: {}", rng.next_seed());

    Ok(())
}
