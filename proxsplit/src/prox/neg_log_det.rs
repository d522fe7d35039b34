use num_traits::{Float, Zero, One};
use proxsplit_core::solver::{Prox, ProxError, SliceLike};
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};
use crate::matrix::ShapeError;

//

/// Proximal operator of the negative log-determinant with a trace term
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// For a symmetric \\(Q \in \mathcal{S}^q\\), the function is
/// \\[
/// f(S) = -\log\det S + {\bf tr}(SQ),
/// \\]
/// with \\(f(S) = +\infty\\) unless \\(S \succ 0\\).
/// The variable is \\(S\\) flattened in column-major, of length \\(q^2\\).
/// 
/// With \\(W = {V + V^T \over 2} - tQ = U {\bf diag}(\lambda) U^T\\),
/// the operator returns \\(U {\bf diag}(s) U^T\\) where \\(s_i = {\lambda_i + \sqrt{\lambda_i^2 + 4t} \over 2}\\).
/// The result is always positive definite.
/// 
/// A non-symmetric \\(V\\) is not rejected; only its symmetric part enters, so the result is the same as for \\({V + V^T \over 2}\\).
pub struct ProxNegLogDet<L: LinAlgEx>
{
    q: usize,
    sym_q: MatBuild<L>,
    eps_zero: L::F,

    sym_w: MatBuild<L>,
    work: Vec<L::F>,
}

impl<L: LinAlgEx> ProxNegLogDet<L>
{
    /// Creates an instance.
    /// 
    /// Returns [`ProxNegLogDet`] instance, or `Err` with [`ShapeError`] if `sym_q` is not square.
    /// * `sym_q` is \\(Q\\). Both [`MatType::SymPack`] and square [`MatType::General`] are accepted;
    ///   the upper triangle is used.
    /// * `eps_zero` should be the same value as [`proxsplit_core::solver::SolverParam::eps_zero`].
    pub fn new(sym_q: &MatBuild<L>, eps_zero: L::F) -> Result<Self, ShapeError>
    {
        let (nr, nc) = sym_q.size();
        if nr != nc {
            return Err(ShapeError::NotSquare { len: nr * nc });
        }

        Ok(Self::from_parts(sym_q, eps_zero))
    }

    pub(crate) fn from_parts(sym_q: &MatBuild<L>, eps_zero: L::F) -> Self
    {
        let q = sym_q.size().0;
        assert_eq!(sym_q.size(), (q, q));

        ProxNegLogDet {
            q,
            sym_q: MatBuild::new(MatType::SymPack(q)).by_fn(|r, c| sym_q[(r, c)]),
            eps_zero,
            sym_w: MatBuild::new(MatType::SymPack(q)),
            work: vec![L::F::zero(); L::map_eig_worklen(q)],
        }
    }
}

impl<L: LinAlgEx> Prox<L> for ProxNegLogDet<L>
{
    fn dim(&self) -> usize
    {
        self.q * self.q
    }

    fn prox(&mut self, t: L::F, v: &L::Sl, x: &mut L::Sl) -> Result<(), ProxError>
    {
        let q = self.q;
        assert_eq!(v.len(), q * q);
        assert_eq!(x.len(), q * q);

        let f1 = L::F::one();
        let f2 = f1 + f1;
        let f4 = f2 + f2;

        let v_ref = v.get_ref();
        let sym_q = &self.sym_q;
        self.sym_w.set_by_fn(|r, c| {
            (v_ref[c * q + r] + v_ref[r * q + c]) / f2 - t * sym_q[(r, c)]
        });

        L::map_eig(&mut L::Sl::new_mut(self.sym_w.as_mut()), None, self.eps_zero, &mut L::Sl::new_mut(&mut self.work), |e| {
            let d = (e * e + f4 * t).sqrt();
            if e >= L::F::zero() {
                Some((e + d) / f2)
            }
            else {
                // cancellation-free form of (e + d) / 2
                Some(f2 * t / (d - e))
            }
        });

        let x_mut = x.get_mut();
        for c in 0.. q {
            for r in 0.. q {
                x_mut[c * q + r] = self.sym_w[(r, c)];
            }
        }

        if x_mut.iter().any(|e| !e.is_finite()) {
            log::error!("non-finite eigenvalue map");
            return Err(ProxError::Failure);
        }

        Ok(())
    }
}
