use float_eq::assert_float_eq;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;
use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT, ZeroConeT, NonnegativeConeT};
use proxsplit::prelude::*;
use proxsplit::*;
use totsu::MatBuild;

type L = FloatGeneric<f64>;
type AProbCoupledQP = ProbCoupledQP<L>;
type ASolver = Solver<L>;

// whole problem at once, for reference
fn solve_monolithic(prob: &AProbCoupledQP) -> (f64, Vec<f64>)
{
    let n_blocks = prob.num_blocks();
    let s = prob.vec_h().len();
    let dims: Vec<(usize, usize)> = (0.. n_blocks).map(|l| prob.block(l).mat_f.size()).collect();
    let n: usize = dims.iter().map(|(_, q)| q).sum();
    let m_ineq: usize = dims.iter().map(|(p, _)| p).sum();

    let mut dense_p = vec![vec![0.; n]; n];
    let mut dense_a = vec![vec![0.; n]; s + m_ineq];
    let mut vec_q = Vec::with_capacity(n);
    let mut vec_b = prob.vec_h().to_vec();

    let mut col = 0;
    let mut row = s;
    for (l, &(p, q)) in dims.iter().enumerate() {
        let blk = prob.block(l);
        for c in 0.. q {
            for r in 0.. q {
                dense_p[col + r][col + c] = 2. * blk.sym_q[(r, c)];
            }
            for r in 0.. s {
                dense_a[r][col + c] = blk.mat_g[(r, c)];
            }
            for r in 0.. p {
                dense_a[row + r][col + c] = blk.mat_f[(r, c)];
            }
        }
        vec_q.extend_from_slice(&blk.vec_c);
        vec_b.extend_from_slice(&blk.vec_d);
        col += q;
        row += p;
    }

    let to_csc = |dense: &[Vec<f64>], triu: bool| {
        let nr = dense.len();
        let mut colptr = vec![0];
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        for c in 0.. n {
            for r in 0.. nr {
                if (!triu || r <= c) && dense[r][c] != 0. {
                    rowval.push(r);
                    nzval.push(dense[r][c]);
                }
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(nr, n, colptr, rowval, nzval)
    };

    let cones: Vec<SupportedConeT<f64>> = vec![ZeroConeT(s), NonnegativeConeT(m_ineq)];
    let settings = DefaultSettingsBuilder::default().verbose(false).build().unwrap();

    let mut solver = DefaultSolver::new(&to_csc(&dense_p, true), &vec_q, &to_csc(&dense_a, false), &vec_b, &cones, settings).unwrap();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);

    (solver.solution.obj_val, solver.solution.x.clone())
}

#[test]
fn test_coupled_qp_small()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = Xoshiro256StarStar::seed_from_u64(10);
    let prob = AProbCoupledQP::generate(&mut rng, 2, 3, 5, 8);
    let eps_abs = 1e-5;

    let s = ASolver::new().par(|p| {
        p.max_iter = Some(5000);
        p.eps_abs = eps_abs;
        p.eps_rel = 0.;
    });
    let mut split = prob.problem(|| QpClarabel::new()).unwrap();
    assert_eq!(split.num_blocks(), 2);

    let rslt = s.solve(split.problem()).unwrap();
    println!("{} iterations", rslt.num_iters);

    assert_eq!(rslt.x_vals.len(), 2);
    assert_eq!(rslt.primal.len(), rslt.num_iters);
    assert_eq!(rslt.dual.len(), rslt.num_iters);

    let eq = prob.eq_residual(&rslt.x_vals);
    let ineq = prob.ineq_violation(&rslt.x_vals);
    assert!(eq <= eps_abs + 1e-12);
    assert!(ineq <= 1e-6);
    assert_float_eq!(prob.violation(&rslt.x_vals), (eq * eq + ineq * ineq).sqrt(), abs <= 1e-15);
    assert!(prob.violation(&rslt.x_vals) <= eps_abs + 1e-8);

    let mut obj = 0.;
    for (l, x) in rslt.x_vals.iter().enumerate() {
        let blk = prob.block(l);
        for r in 0.. x.len() {
            for c in 0.. x.len() {
                obj += x[r] * blk.sym_q[(r, c)] * x[c];
            }
            obj += blk.vec_c[r] * x[r];
        }
    }
    assert_float_eq!(prob.objective(&rslt.x_vals), obj, abs <= 1e-9);

    let (obj_ref, _) = solve_monolithic(&prob);
    println!("objective {} reference {}", obj, obj_ref);
    assert_float_eq!(obj, obj_ref, abs <= 1e-3 * (1. + obj_ref.abs()));
}

#[test]
fn test_coupled_qp_anderson()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = Xoshiro256StarStar::seed_from_u64(11);
    let prob = AProbCoupledQP::generate(&mut rng, 4, 4, 10, 15);

    let s = ASolver::new().par(|p| {
        p.max_iter = Some(5000);
        p.eps_abs = 1e-5;
        p.eps_rel = 0.;
        p.anderson = true;
    });
    let mut split = prob.problem(QpClarabel::new).unwrap();
    let rslt = s.solve(split.problem()).unwrap();
    println!("{} iterations", rslt.num_iters);

    assert!(prob.eq_residual(&rslt.x_vals) <= 1e-5 + 1e-12);
    assert!(prob.ineq_violation(&rslt.x_vals) <= 1e-6);

    let (obj_ref, _) = solve_monolithic(&prob);
    assert_float_eq!(prob.objective(&rslt.x_vals), obj_ref, abs <= 1e-3 * (1. + obj_ref.abs()));
}

#[test]
fn test_coupled_qp_infeasible_block()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = Xoshiro256StarStar::seed_from_u64(12);
    let prob = AProbCoupledQP::generate(&mut rng, 1, 1, 2, 2);

    // x_0 <= -1 and -x_0 <= -1
    let bad = ProxQP::<L, _>::new(
        MatBuild::new(MatType::SymPack(2)).by_fn(|r, c| if r == c {1.} else {0.}),
        &[0., 0.],
        MatBuild::new(MatType::General(2, 2)).iter_colmaj(&[1., -1., 0., 0.]),
        &[-1., -1.],
        QpClarabel::new()
    ).unwrap();
    let mat_g1 = MatBuild::<L>::new(MatType::General(1, 2)).by_fn(|_, _| 1.);

    let proxes: Vec<Box<dyn Prox<L> + '_>> = vec![
        Box::new(prob.block_prox(0, QpClarabel::new())),
        Box::new(bad),
    ];
    let couplings: Vec<Box<dyn Operator<L> + '_>> = vec![
        Box::new(prob.block(0).mat_g.as_op()),
        Box::new(mat_g1.as_op()),
    ];
    let mut split = SplitProblem::new(proxes, couplings, prob.vec_h().to_vec()).unwrap();

    let e = ASolver::new().solve(split.problem()).unwrap_err();
    assert_eq!(e, SolverError::Infeasible { block: 1 });
    assert!(!e.is_recoverable());
}
