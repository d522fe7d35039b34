use float_eq::assert_float_eq;
use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256StarStar;
use proxsplit::prelude::*;
use proxsplit::*;
use totsu::MatBuild;

type L = FloatGeneric<f64>;
type AMatBuild = MatBuild<L>;

#[test]
fn test_prox_neg_log_det()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = Xoshiro256StarStar::seed_from_u64(20);
    let q = 4;
    let t = 0.7;

    let mat_m = AMatBuild::new(MatType::General(q, q))
                .by_fn(|_, _| rng.sample(StandardNormal));
    let sym_q = AMatBuild::new(MatType::SymPack(q))
                .by_fn(|r, c| (0.. q).map(|k| mat_m[(r, k)] * mat_m[(c, k)]).sum::<f64>() / q as f64);

    // not symmetric, not definite
    let v: Vec<f64> = (0.. q * q).map(|_| rng.sample(StandardNormal)).collect();
    let mut s = vec![0.; q * q];

    let mut prox = ProxNegLogDet::new(&sym_q, 1e-12).unwrap();
    assert_eq!(prox.dim(), q * q);
    prox.prox(t, &v, &mut s).unwrap();

    let w = |r: usize, c: usize| (v[c * q + r] + v[r * q + c]) / 2. - t * sym_q[(r, c)];

    // (S - W) S = t I
    for c in 0.. q {
        for r in 0.. q {
            let mut e = 0.;
            for k in 0.. q {
                e += (s[k * q + r] - w(r, k)) * s[c * q + k];
            }
            let expected = if r == c {t} else {0.};
            assert_float_eq!(e, expected, abs <= 1e-8);
            assert_float_eq!(s[c * q + r], s[r * q + c], abs <= 1e-12);
        }
    }

    // positive diagonal of a positive definite result
    for i in 0.. q {
        assert!(s[i * q + i] > 0.);
    }

    // only the symmetric part of V enters
    let v_sym: Vec<f64> = (0.. q * q).map(|i| (v[i] + v[(i % q) * q + i / q]) / 2.).collect();
    let mut s_sym = vec![0.; q * q];
    prox.prox(t, &v_sym, &mut s_sym).unwrap();
    assert_float_eq!(s_sym.as_slice(), s.as_slice(), abs_all <= 1e-10);
}

#[test]
fn test_prox_neg_log_det_shape()
{
    let mat = AMatBuild::new(MatType::General(2, 3));
    let r = ProxNegLogDet::new(&mat, 1e-12);
    assert_eq!(r.err(), Some(matrix::ShapeError::NotSquare { len: 6 }));
}

#[test]
fn test_prox_norm1()
{
    let mut prox = ProxNorm1::<L>::new(5, 2.);
    let v = [3., -0.5, 0.2, -2., 1.];
    let mut x = [0.; 5];

    prox.prox(0.5, &v, &mut x).unwrap();
    assert_float_eq!(x.as_ref(), [2., 0., 0., -1., 0.].as_ref(), abs_all <= 1e-12);

    // zero weight is the identity
    let mut prox = ProxNorm1::<L>::new(5, 0.);
    prox.prox(0.5, &v, &mut x).unwrap();
    assert_float_eq!(x.as_ref(), v.as_ref(), abs_all <= 1e-12);
}

// Q = I, c = 0, x0 + x1 <= 1
fn prox_qp_sample<B: QpBackend<L>>(backend: B) -> ProxQP<L, B>
{
    let sym_q = AMatBuild::new(MatType::SymPack(2)).by_fn(|r, c| if r == c {1.} else {0.});
    let mat_f = AMatBuild::new(MatType::General(1, 2)).by_fn(|_, _| 1.);

    ProxQP::new(sym_q, &[0., 0.], mat_f, &[1.], backend).unwrap()
}

#[test]
fn test_prox_qp_clarabel()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut prox = prox_qp_sample(QpClarabel::new());
    let mut x = [0.; 2];

    // active: unconstrained minimizer v / 3 violates the constraint
    prox.prox(1., &[2., 2.], &mut x).unwrap();
    assert_float_eq!(x.as_ref(), [0.5, 0.5].as_ref(), abs_all <= 1e-6);

    // inactive
    prox.prox(1., &[0.3, -0.6], &mut x).unwrap();
    assert_float_eq!(x.as_ref(), [0.1, -0.2].as_ref(), abs_all <= 1e-6);

    // step size t = 0.5: P = 4 I, q = -2 v
    prox.prox(0.5, &[0.3, -0.6], &mut x).unwrap();
    assert_float_eq!(x.as_ref(), [0.15, -0.3].as_ref(), abs_all <= 1e-6);
}

#[test]
fn test_prox_qp_totsu()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut prox = prox_qp_sample(QpTotsu::<L>::new());
    let mut x = [0.; 2];

    prox.prox(1., &[2., 2.], &mut x).unwrap();
    assert_float_eq!(x.as_ref(), [0.5, 0.5].as_ref(), abs_all <= 1e-3);

    prox.prox(1., &[0.3, -0.6], &mut x).unwrap();
    assert_float_eq!(x.as_ref(), [0.1, -0.2].as_ref(), abs_all <= 1e-3);
}

#[test]
fn test_prox_qp_infeasible()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // x <= -1 and x >= 1
    let sym_q = AMatBuild::new(MatType::SymPack(1)).by_fn(|_, _| 1.);
    let mat_f = AMatBuild::new(MatType::General(2, 1)).iter_colmaj(&[1., -1.]);
    let mut prox = ProxQP::new(sym_q, &[0.], mat_f, &[-1., -1.], QpClarabel::new()).unwrap();

    let mut x = [0.];
    assert_eq!(prox.prox(1., &[0.], &mut x), Err(ProxError::Infeasible));
}

#[test]
fn test_prox_qp_shape()
{
    let sym_q = AMatBuild::new(MatType::SymPack(2));
    let mat_f = AMatBuild::new(MatType::General(1, 2));

    let r = ProxQP::new(sym_q, &[0., 0., 0.], mat_f, &[1.], QpClarabel::new());
    assert_eq!(r.err(), Some(matrix::ShapeError::LenMismatch { expected: 2, found: 3 }));
}
