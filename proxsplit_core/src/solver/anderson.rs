use std::collections::VecDeque;
use num_traits::{Float, Zero, One, ToPrimitive, cast};
use crate::solver::SliceLike;
use totsu_core::LinAlgEx;

//

const SAFEGUARD_D: f64 = 1e6;
const SAFEGUARD_R: f64 = 10.;
const SAFEGUARD_EPS: f64 = 1e-6;

fn dot<L: LinAlgEx>(x: &[L::F], y: &[L::F]) -> L::F
{
    let f0 = L::F::zero();
    let f1 = L::F::one();

    let mut r = [f0];
    L::transform_ge(true, x.len(), 1, f1, &L::Sl::new_ref(x), &L::Sl::new_ref(y), f0, &mut L::Sl::new_mut(&mut r));
    r[0]
}

/// Type-II Anderson acceleration of the fixed-point map \\(v \mapsto F(v)\\)
/// with residual \\(g(v) = v - F(v)\\).
/// 
/// An accelerated point is kept only while the residual norm obeys a decaying bound;
/// otherwise the plain fixed-point step is restored and the memory is cleared.
pub(crate) struct Anderson<L: LinAlgEx>
{
    m_accel: usize,
    lam_accel: L::F,
    eps_zero: L::F,

    hist_dg: VecDeque<Vec<L::F>>,
    hist_df: VecDeque<Vec<L::F>>,
    g_prev: Vec<L::F>,
    f_prev: Vec<L::F>,
    has_prev: bool,

    g0_norm: Option<L::F>,
    n_aa: usize,
    v_safe: Option<Vec<L::F>>,
}

impl<L: LinAlgEx> Anderson<L>
{
    pub fn new(n: usize, m_accel: usize, lam_accel: L::F, eps_zero: L::F) -> Self
    {
        let f0 = L::F::zero();

        Anderson {
            m_accel,
            lam_accel,
            eps_zero,
            hist_dg: VecDeque::with_capacity(m_accel),
            hist_df: VecDeque::with_capacity(m_accel),
            g_prev: vec![f0; n],
            f_prev: vec![f0; n],
            has_prev: false,
            g0_norm: None,
            n_aa: 0,
            v_safe: None,
        }
    }

    fn reset(&mut self)
    {
        self.hist_dg.clear();
        self.hist_df.clear();
        self.has_prev = false;
    }

    /// Judges the point produced by the last [`Anderson::next`] from its residual norm.
    /// 
    /// Returns the plain fixed-point step to restart from if the point is rejected.
    pub fn safeguard(&mut self, g_norm: L::F) -> Option<Vec<L::F>>
    {
        let g0_norm = *self.g0_norm.get_or_insert(g_norm);

        let v_safe = self.v_safe.take()?;

        let f1 = L::F::one();
        let d = cast(SAFEGUARD_D).unwrap_or(f1);
        let r = cast(SAFEGUARD_R).unwrap_or(f1);
        let p = -(f1 + cast(SAFEGUARD_EPS).unwrap_or(L::F::zero()));
        let n_aa = cast(self.n_aa).unwrap_or(f1);

        if g_norm <= d * g0_norm * (n_aa / r + f1).powf(p) {
            self.n_aa += 1;
            None
        }
        else {
            log::warn!("anderson step rejected: residual {:.2e}", g_norm.to_f64().unwrap_or(f64::NAN));
            self.reset();
            Some(v_safe)
        }
    }

    /// Computes the next point into `v` from the fixed-point image `f` and the residual `g` of the current point.
    pub fn next(&mut self, f: &[L::F], g: &[L::F], v: &mut [L::F])
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();

        if self.has_prev {
            let mut dg = g.to_vec();
            L::add(-f1, &L::Sl::new_ref(&self.g_prev), &mut L::Sl::new_mut(&mut dg));
            let mut df = f.to_vec();
            L::add(-f1, &L::Sl::new_ref(&self.f_prev), &mut L::Sl::new_mut(&mut df));

            if self.hist_dg.len() == self.m_accel {
                self.hist_dg.pop_front();
                self.hist_df.pop_front();
            }
            self.hist_dg.push_back(dg);
            self.hist_df.push_back(df);
        }
        self.g_prev.copy_from_slice(g);
        self.f_prev.copy_from_slice(f);
        self.has_prev = true;

        v.copy_from_slice(f);

        let k = self.hist_dg.len();
        if k == 0 {
            return;
        }

        // regularized least squares: (dG^T dG + reg I) gamma = dG^T g
        let mut reg = f0;
        for (dg, df) in self.hist_dg.iter().zip(&self.hist_df) {
            let ng = L::norm(&L::Sl::new_ref(dg));
            let nf = L::norm(&L::Sl::new_ref(df));
            reg = reg + ng * ng + nf * nf;
        }
        reg = reg * self.lam_accel;

        let mut sym_m = vec![f0; k * (k + 1) / 2];
        let mut rhs = vec![f0; k];
        for c in 0.. k {
            for r in 0..= c {
                sym_m[c * (c + 1) / 2 + r] = dot::<L>(&self.hist_dg[r], &self.hist_dg[c]);
            }
            sym_m[c * (c + 1) / 2 + c] = sym_m[c * (c + 1) / 2 + c] + reg;
            rhs[c] = dot::<L>(&self.hist_dg[c], g);
        }

        let mut trace = f0;
        for i in 0.. k {
            trace = trace + sym_m[i * (i + 1) / 2 + i];
        }
        let tol = self.eps_zero * trace.max(f1);

        let mut work = vec![f0; L::map_eig_worklen(k)];
        L::map_eig(&mut L::Sl::new_mut(&mut sym_m), None, self.eps_zero, &mut L::Sl::new_mut(&mut work), |e| {
            if e > tol {
                Some(e.recip())
            }
            else {
                Some(f0)
            }
        });

        let mut gamma = vec![f0; k];
        L::transform_sp(k, f1, &L::Sl::new_ref(&sym_m), &L::Sl::new_ref(&rhs), f0, &mut L::Sl::new_mut(&mut gamma));

        for (gm, df) in gamma.iter().zip(&self.hist_df) {
            L::add(-*gm, &L::Sl::new_ref(df), &mut L::Sl::new_mut(v));
        }

        self.v_safe = Some(f.to_vec());
    }
}

//

#[test]
fn test_anderson1()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    // affine contraction F(v) = A v + b; AA-II with full memory is exact after n + 1 steps
    let a = [0.5, 0.0, 0.0, -0.3];
    let b = [1.0, 2.0];
    let fixed = [1.0 / 0.5, 2.0 / 1.3];

    let map = |v: &[f64], f: &mut [f64]| {
        f[0] = a[0] * v[0] + a[1] * v[1] + b[0];
        f[1] = a[2] * v[0] + a[3] * v[1] + b[1];
    };

    let mut aa = Anderson::<L>::new(2, 5, 0., 1e-12);
    let mut v = [0.0; 2];
    let mut f = [0.0; 2];
    let mut g = [0.0; 2];
    for _ in 0.. 4 {
        map(&v, &mut f);
        g[0] = v[0] - f[0];
        g[1] = v[1] - f[1];
        let g_norm = (g[0] * g[0] + g[1] * g[1]).sqrt();
        if let Some(v_safe) = aa.safeguard(g_norm) {
            v.copy_from_slice(&v_safe);
            continue;
        }
        aa.next(&f, &g, &mut v);
    }

    assert_float_eq!(v.as_ref(), fixed.as_ref(), abs_all <= 1e-9);
}

#[test]
fn test_anderson_safeguard()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let mut aa = Anderson::<L>::new(2, 5, 0., 1e-12);
    let mut v = [0.0; 2];

    assert!(aa.safeguard(1.).is_none());
    aa.next(&[1., 1.], &[-1., -1.], &mut v);
    assert_eq!(v, [1., 1.]);

    assert!(aa.safeguard(0.5).is_none());
    aa.next(&[1.5, 0.5], &[-0.5, 0.5], &mut v);
    assert_eq!(aa.hist_dg.len(), 1);

    // accepted: residual within the bound
    assert!(aa.safeguard(0.1).is_none());
    assert_eq!(aa.n_aa, 1);
    aa.next(&[2., 0.], &[-0.2, 0.1], &mut v);
    assert_eq!(aa.hist_dg.len(), 2);

    // rejected: the plain step is restored and the memory cleared
    let v_safe = aa.safeguard(1e9).unwrap();
    assert_float_eq!(v_safe.as_slice(), [2., 0.].as_ref(), abs_all <= 0.);
    assert!(aa.hist_dg.is_empty());
    assert!(aa.hist_df.is_empty());
    assert!(!aa.has_prev);
    assert_eq!(aa.n_aa, 1);

    // nothing pending after a rejection
    assert!(aa.safeguard(1e9).is_none());

    // restarts with the plain step
    aa.next(&[3., -1.], &[1., 1.], &mut v);
    assert_eq!(v, [3., -1.]);
    assert!(aa.hist_dg.is_empty());
}
