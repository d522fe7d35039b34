use proxsplit::prelude::*;
use proxsplit::{ProbSparseInvCov, matrix};
use totsu::MatBuild;

use utils;

use rand::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;
use plotters::prelude::*;
use anyhow::Result;

type L = FloatGeneric<f64>;
type AMatBuild = MatBuild<L>;
type AProbSparseInvCov = ProbSparseInvCov<L>;
type ASolver = Solver<L>;

const EPS_ZERO: f64 = 1e-12;

/// solves once more with eps_abs relaxed if the iteration limit is hit
fn solve_alpha(prob: &AProbSparseInvCov, alpha: f64, v_init: Option<&Vec<Vec<f64>>>) -> Result<SolverResult<f64>>
{
    let solver = || {
        let s = ASolver::new();
        match v_init {
            Some(v) => s.init(v.clone()),
            None => s,
        }
    };

    let s = solver().par(|p| {
        p.max_iter = Some(20_000);
        p.eps_zero = EPS_ZERO;
        utils::set_par_by_env(p);
    });
    let par = s.par.clone();

    let mut split = prob.problem(alpha)?;
    match s.solve(split.problem()) {
        Err(e) if e.is_recoverable() => {
            log::warn!("alpha {:.3e}: {}, retrying", alpha, e);

            let s = solver().par(|p| {
                *p = par;
                p.eps_abs = p.eps_abs * 10.;
            });
            Ok(s.solve(split.problem())?)
        },
        rslt => Ok(rslt?),
    }
}

/// main
fn main() -> Result<()> {
    env_logger::init();

    //----- make sample covariance

    let q = utils::num_by_env("SIZE_Q").unwrap_or(20);
    let mut rng = Xoshiro256StarStar::seed_from_u64(10000);
    let prob = AProbSparseInvCov::generate(&mut rng, q, 0.1, 10 * q, EPS_ZERO);

    let alpha_max = prob.alpha_max();
    println!("alpha_max: {:.4e}", alpha_max);

    //----- solve along the weights

    let ratios = [1., 0.1, 0.01];
    let mut ests: Vec<AMatBuild> = Vec::new();
    let mut x_prev = None;

    for ratio in ratios {
        let alpha = ratio * alpha_max;
        // warm start from the previous weight
        let rslt = solve_alpha(&prob, alpha, x_prev.as_ref())?;
        let est = prob.estimate(&rslt)?;

        println!("alpha {:.4e}: {} nonzeros, {} iterations, {:?}",
            alpha, matrix::count_nonzeros(&est), rslt.num_iters, rslt.solve_time);

        ests.push(est);
        x_prev = Some(rslt.x_vals);
    }

    //----- graph plot

    let root = SVGBackend::new("sparse_inv_cov.svg", (960, 360)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut mats: Vec<(String, &AMatBuild)> = Vec::new();
    if let Some(s_true) = prob.true_precision() {
        mats.push(("true".to_string(), s_true));
    }
    for (ratio, est) in ratios.iter().zip(&ests) {
        mats.push((format!("{} alpha_max", ratio), est));
    }

    let areas = root.split_evenly((1, mats.len()));
    for (area, (caption, mat)) in areas.iter().zip(mats) {
        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .caption(caption, ("sans-serif", 16))
            .build_cartesian_2d(0..q, 0..q)?;

        chart.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .disable_y_axis()
            .draw()?;

        chart.draw_series(utils::spy_series(mat, BLACK.filled()))?;
    }

    Ok(())
}
