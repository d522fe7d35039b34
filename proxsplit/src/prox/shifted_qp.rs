use num_traits::{Float, Zero, One};
use proxsplit_core::solver::{Prox, ProxError, SliceLike};
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};
use crate::matrix::ShapeError;
use crate::qp_backend::QpBackend;

//

/// Proximal operator of an inequality-constrained QP
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// The function is
/// \\[
/// f(x) = x^T Q x + c^T x + I(F x \preceq d),
/// \\]
/// where \\(I\\) is the indicator function.
/// Its proximal operator solves, by a [`QpBackend`],
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & {1 \over 2} x^T (2Q + t^{-1} I) x + (c - t^{-1} v)^T x \\\\
/// {\rm subject \ to} & F x \preceq d,
/// \end{array}
/// \\]
/// which has a unique solution if feasible.
pub struct ProxQP<L: LinAlgEx, B: QpBackend<L>>
{
    sym_q: MatBuild<L>,
    vec_c: MatBuild<L>,
    mat_f: MatBuild<L>,
    vec_d: MatBuild<L>,
    backend: B,

    sym_p: MatBuild<L>,
    vec_q: MatBuild<L>,
}

impl<L: LinAlgEx, B: QpBackend<L>> ProxQP<L, B>
{
    /// Creates an instance.
    /// 
    /// Returns [`ProxQP`] instance, or `Err` with [`ShapeError`] describing the expected length.
    /// * `sym_q` is \\(Q\\), [`MatType::SymPack`] of size \\(n\\).
    /// * `vec_c` is \\(c\\), of length \\(n\\).
    /// * `mat_f` is \\(F\\), of size \\(p \times n\\).
    /// * `vec_d` is \\(d\\), of length \\(p\\).
    /// * `backend` solves each QP.
    pub fn new(sym_q: MatBuild<L>, vec_c: &[L::F], mat_f: MatBuild<L>, vec_d: &[L::F], backend: B) -> Result<Self, ShapeError>
    {
        let (n, n_) = sym_q.size();
        if n != n_ {
            return Err(ShapeError::NotSquare { len: n * n_ });
        }
        if vec_c.len() != n {
            return Err(ShapeError::LenMismatch { expected: n, found: vec_c.len() });
        }
        let (p, n_) = mat_f.size();
        if n_ != n {
            return Err(ShapeError::LenMismatch { expected: p * n, found: p * n_ });
        }
        if vec_d.len() != p {
            return Err(ShapeError::LenMismatch { expected: p, found: vec_d.len() });
        }

        Ok(Self::from_parts(sym_q, vec_c, mat_f, vec_d, backend))
    }

    pub(crate) fn from_parts(sym_q: MatBuild<L>, vec_c: &[L::F], mat_f: MatBuild<L>, vec_d: &[L::F], backend: B) -> Self
    {
        let n = vec_c.len();
        let p = vec_d.len();
        assert_eq!(sym_q.size(), (n, n));
        assert_eq!(mat_f.size(), (p, n));

        ProxQP {
            sym_q: MatBuild::new(MatType::SymPack(n)).by_fn(|r, c| sym_q[(r, c)]),
            vec_c: MatBuild::new(MatType::General(n, 1)).iter_colmaj(vec_c),
            mat_f,
            vec_d: MatBuild::new(MatType::General(p, 1)).iter_colmaj(vec_d),
            backend,
            sym_p: MatBuild::new(MatType::SymPack(n)),
            vec_q: MatBuild::new(MatType::General(n, 1)),
        }
    }
}

impl<L: LinAlgEx, B: QpBackend<L>> Prox<L> for ProxQP<L, B>
{
    fn dim(&self) -> usize
    {
        self.vec_c.size().0
    }

    fn prox(&mut self, t: L::F, v: &L::Sl, x: &mut L::Sl) -> Result<(), ProxError>
    {
        let n = self.dim();
        assert_eq!(v.len(), n);
        assert_eq!(x.len(), n);

        let f0 = L::F::zero();
        let f2 = L::F::one() + L::F::one();
        let inv_t = t.recip();

        let sym_q = &self.sym_q;
        self.sym_p.set_by_fn(|r, c| {
            f2 * sym_q[(r, c)] + if r == c {inv_t} else {f0}
        });

        let vec_c = &self.vec_c;
        let v_ref = v.get_ref();
        self.vec_q.set_by_fn(|r, _| {
            vec_c[(r, 0)] - v_ref[r] * inv_t
        });

        self.backend.solve_qp(&self.sym_p, &self.vec_q, &self.mat_f, &self.vec_d, x.get_mut())
    }
}
