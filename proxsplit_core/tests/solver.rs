use float_eq::assert_float_eq;
use proxsplit_core::solver::{Prox, ProxError, Solver, SolverError, Operator};
use proxsplit_core::OpEye;
use totsu_core::FloatGeneric;

type L = FloatGeneric<f64>;

// f(x) = 1/2 ||x - a||^2
struct ProxSq
{
    a: Vec<f64>,
}

impl Prox<L> for ProxSq
{
    fn dim(&self) -> usize
    {
        self.a.len()
    }

    fn prox(&mut self, t: f64, v: &[f64], x: &mut [f64]) -> Result<(), ProxError>
    {
        for ((x_i, v_i), a_i) in x.iter_mut().zip(v).zip(&self.a) {
            *x_i = (v_i + t * a_i) / (1. + t);
        }
        Ok(())
    }
}

struct ProxFail;

impl Prox<L> for ProxFail
{
    fn dim(&self) -> usize
    {
        2
    }

    fn prox(&mut self, _t: f64, _v: &[f64], _x: &mut [f64]) -> Result<(), ProxError>
    {
        Err(ProxError::Infeasible)
    }
}

fn consensus(a: &[f64], b: &[f64]) -> (Vec<Box<dyn Prox<L>>>, Vec<Box<dyn Operator<L>>>, Vec<f64>)
{
    let n = a.len();
    let proxes: Vec<Box<dyn Prox<L>>> = vec![
        Box::new(ProxSq { a: a.to_vec() }),
        Box::new(ProxSq { a: b.to_vec() }),
    ];
    let couplings: Vec<Box<dyn Operator<L>>> = vec![
        Box::new(OpEye::new(n, 1.)),
        Box::new(OpEye::new(n, -1.)),
    ];
    (proxes, couplings, vec![0.; n])
}

#[test]
fn test_solver_consensus()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let a = [1., -2., 3.];
    let b = [3., 0., -1.];
    let (mut proxes, couplings, vec_h) = consensus(&a, &b);

    let rslt = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &vec_h[..])).unwrap();
    println!("{} iterations", rslt.num_iters);

    assert_eq!(rslt.x_vals.len(), 2);
    assert_eq!(rslt.primal.len(), rslt.num_iters);
    assert_eq!(rslt.dual.len(), rslt.num_iters);
    assert_float_eq!(rslt.x_vals[0].as_slice(), [2., -1., 1.].as_ref(), abs_all <= 1e-4);
    assert_float_eq!(rslt.x_vals[1].as_slice(), [2., -1., 1.].as_ref(), abs_all <= 1e-4);
}

#[test]
fn test_solver_anderson()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // z_0 + z_1 = h: z_0 = a + (h - a - b) / 2, z_1 = b + (h - a - b) / 2
    let a = [1., -2., 3., 0.5];
    let b = [3., 0., -1., 2.];
    let vec_h = vec![2., 2., 0., -1.5];

    let mut proxes: Vec<Box<dyn Prox<L>>> = vec![
        Box::new(ProxSq { a: a.to_vec() }),
        Box::new(ProxSq { a: b.to_vec() }),
    ];
    let couplings: Vec<Box<dyn Operator<L>>> = vec![
        Box::new(OpEye::new(4, 1.)),
        Box::new(OpEye::new(4, 1.)),
    ];

    let rslt = Solver::<L>::new().par(|p| {
        p.anderson = true;
        p.m_accel = 3;
    }).solve((&mut proxes[..], &couplings[..], &vec_h[..])).unwrap();
    println!("{} iterations", rslt.num_iters);

    let lambda: Vec<f64> = (0.. 4).map(|i| (vec_h[i] - a[i] - b[i]) / 2.).collect();
    let z0: Vec<f64> = (0.. 4).map(|i| a[i] + lambda[i]).collect();
    let z1: Vec<f64> = (0.. 4).map(|i| b[i] + lambda[i]).collect();

    assert_float_eq!(rslt.x_vals[0].as_slice(), z0.as_slice(), abs_all <= 1e-4);
    assert_float_eq!(rslt.x_vals[1].as_slice(), z1.as_slice(), abs_all <= 1e-4);
}

#[test]
fn test_solver_prox_point()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let a = [1., -2.];
    let b = [0.5, 4., -3.];
    let mut proxes: Vec<Box<dyn Prox<L>>> = vec![
        Box::new(ProxSq { a: a.to_vec() }),
        Box::new(ProxSq { a: b.to_vec() }),
    ];
    let couplings: Vec<Box<dyn Operator<L>>> = Vec::new();

    let rslt = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &[])).unwrap();

    assert_float_eq!(rslt.x_vals[0].as_slice(), a.as_ref(), abs_all <= 1e-5);
    assert_float_eq!(rslt.x_vals[1].as_slice(), b.as_ref(), abs_all <= 1e-5);
    assert!(rslt.primal.iter().all(|r| *r == 0.));
}

#[test]
fn test_solver_excess_iter()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut proxes, couplings, vec_h) = consensus(&[1., 2.], &[-1., 0.]);

    let err = Solver::<L>::new().par(|p| {
        p.max_iter = Some(2);
    }).solve((&mut proxes[..], &couplings[..], &vec_h[..])).unwrap_err();

    assert_eq!(err, SolverError::ExcessIter);
    assert!(err.is_recoverable());
}

#[test]
fn test_solver_invalid_param()
{
    let (mut proxes, couplings, vec_h) = consensus(&[1., 2.], &[-1., 0.]);

    let err = Solver::<L>::new().par(|p| {
        p.rho = 0.;
    }).solve((&mut proxes[..], &couplings[..], &vec_h[..])).unwrap_err();
    assert!(matches!(err, SolverError::InvalidParam(_)));
    assert!(!err.is_recoverable());

    let err = Solver::<L>::new().par(|p| {
        p.m_accel = 0;
    }).solve((&mut proxes[..], &couplings[..], &vec_h[..])).unwrap_err();
    assert!(matches!(err, SolverError::InvalidParam(_)));
}

#[test]
fn test_solver_size_mismatch()
{
    let a = [1., 2., 3.];

    let mut proxes: Vec<Box<dyn Prox<L>>> = vec![
        Box::new(ProxSq { a: a.to_vec() }),
        Box::new(ProxSq { a: a.to_vec() }),
    ];

    let couplings: Vec<Box<dyn Operator<L>>> = vec![
        Box::new(OpEye::new(3, 1.)),
    ];
    let err = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &[0.; 3])).unwrap_err();
    assert_eq!(err, SolverError::BlockCount { proxes: 2, couplings: 1 });

    let couplings: Vec<Box<dyn Operator<L>>> = vec![
        Box::new(OpEye::new(3, 1.)),
        Box::new(OpEye::new(4, 1.)),
    ];
    let err = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &[0.; 3])).unwrap_err();
    assert_eq!(err, SolverError::ColMismatch { block: 1, cols: 4, dim: 3 });

    let couplings: Vec<Box<dyn Operator<L>>> = vec![
        Box::new(OpEye::new(3, 1.)),
        Box::new(OpEye::new(3, 1.)),
    ];
    let err = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &[0.; 2])).unwrap_err();
    assert_eq!(err, SolverError::RowMismatch { block: 0, rows: 3, len_h: 2 });
    println!("{}", err);

    // h without couplings
    let couplings: Vec<Box<dyn Operator<L>>> = Vec::new();
    let err = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &[0.; 3])).unwrap_err();
    assert_eq!(err, SolverError::BlockCount { proxes: 2, couplings: 0 });
}

#[test]
fn test_solver_prox_failure()
{
    let mut proxes: Vec<Box<dyn Prox<L>>> = vec![
        Box::new(ProxSq { a: vec![1., 2.] }),
        Box::new(ProxFail),
    ];
    let couplings: Vec<Box<dyn Operator<L>>> = Vec::new();

    let err = Solver::<L>::new().solve((&mut proxes[..], &couplings[..], &[])).unwrap_err();
    assert_eq!(err, SolverError::Infeasible { block: 1 });
    assert!(!err.is_recoverable());
}

#[test]
fn test_solver_init()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let a = [1., -2.];
    let b = [0.5, 4., -3.];
    let mut proxes: Vec<Box<dyn Prox<L>>> = vec![
        Box::new(ProxSq { a: a.to_vec() }),
        Box::new(ProxSq { a: b.to_vec() }),
    ];
    let couplings: Vec<Box<dyn Operator<L>>> = Vec::new();

    // starting at the fixed point
    let rslt = Solver::<L>::new()
        .init(vec![a.to_vec(), b.to_vec()])
        .solve((&mut proxes[..], &couplings[..], &[])).unwrap();
    assert_eq!(rslt.num_iters, 1);
    assert_float_eq!(rslt.x_vals[0].as_slice(), a.as_ref(), abs_all <= 1e-12);
    assert_float_eq!(rslt.x_vals[1].as_slice(), b.as_ref(), abs_all <= 1e-12);

    // consensus restarted from its own solution still converges to it
    let (mut proxes_c, couplings_c, vec_h) = consensus(&[1., -2., 3.], &[3., 0., -1.]);
    let cold = Solver::<L>::new().solve((&mut proxes_c[..], &couplings_c[..], &vec_h[..])).unwrap();
    let warm = Solver::<L>::new()
        .init(cold.x_vals.clone())
        .solve((&mut proxes_c[..], &couplings_c[..], &vec_h[..])).unwrap();
    assert_float_eq!(warm.x_vals[0].as_slice(), [2., -1., 1.].as_ref(), abs_all <= 1e-4);

    let err = Solver::<L>::new()
        .init(vec![a.to_vec()])
        .solve((&mut proxes[..], &couplings[..], &[])).unwrap_err();
    assert_eq!(err, SolverError::InitCount { blocks: 2, init: 1 });

    let err = Solver::<L>::new()
        .init(vec![a.to_vec(), a.to_vec()])
        .solve((&mut proxes[..], &couplings[..], &[])).unwrap_err();
    assert_eq!(err, SolverError::InitMismatch { block: 1, len: 2, dim: 3 });
    assert!(!err.is_recoverable());
}
