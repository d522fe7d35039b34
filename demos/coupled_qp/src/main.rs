use proxsplit::prelude::*;
use proxsplit::{ProbCoupledQP, QpClarabel, QpTotsu};

use utils;

use rand::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;
use plotters::prelude::*;
use anyhow::Result;

type L = FloatGeneric<f64>;
type AProbCoupledQP = ProbCoupledQP<L>;
type ASolver = Solver<L>;

/// main
fn main() -> Result<()> {
    env_logger::init();

    //----- make coupled QP

    let n_blocks = utils::num_by_env("NUM_BLOCKS").unwrap_or(4);
    let (s, q, p) = (10, 30, 50);
    let mut rng = Xoshiro256StarStar::seed_from_u64(10000);
    let prob = AProbCoupledQP::generate(&mut rng, n_blocks, s, q, p);

    //----- solve

    let solver = ASolver::new().par(|p| {
        p.max_iter = Some(10_000);
        p.eps_abs = 1e-5;
        p.eps_rel = 0.;
        utils::set_par_by_env(p);
    });

    let mut split = match utils::qp_backend_by_env() {
        utils::QpBackendKind::Clarabel => prob.problem(QpClarabel::new)?,
        utils::QpBackendKind::Totsu => prob.problem(QpTotsu::new)?,
    };
    let rslt = solver.solve(split.problem())?;

    println!("objective: {:.6e}", prob.objective(&rslt.x_vals));
    println!("violation: {:.3e} (inequality {:.3e}, equality {:.3e})",
        prob.violation(&rslt.x_vals), prob.ineq_violation(&rslt.x_vals), prob.eq_residual(&rslt.x_vals));
    println!("{} iterations, {:?}", rslt.num_iters, rslt.solve_time);

    //----- graph plot

    let positive = rslt.primal.iter().chain(&rslt.dual).filter(|r| **r > 0.);
    let r_min = positive.clone().fold(f64::INFINITY, |a, r| a.min(*r));
    let r_max = positive.fold(0., |a: f64, r| a.max(*r));

    let root = SVGBackend::new("coupled_qp.svg", (480, 360)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(
            0..rslt.num_iters,
            (r_min * 0.5..r_max * 2.).log_scale(),
        )?;

    chart.configure_mesh()
        .disable_mesh()
        .x_desc("iteration")
        .y_desc("residual")
        .draw()?;

    chart.draw_series(LineSeries::new(
        rslt.primal.iter().enumerate().filter(|(_, r)| **r > 0.).map(|(i, r)| (i, *r)),
        &RED
    ))?
    .label("primal")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart.draw_series(LineSeries::new(
        rslt.dual.iter().enumerate().filter(|(_, r)| **r > 0.).map(|(i, r)| (i, *r)),
        &BLUE
    ))?
    .label("dual")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart.configure_series_labels()
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
