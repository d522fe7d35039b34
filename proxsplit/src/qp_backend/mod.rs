//! Backends solving QP subproblems

use proxsplit_core::solver::ProxError;
use totsu::MatBuild;
use totsu_core::LinAlgEx;

mod qp_clarabel;
mod qp_totsu;

pub use qp_clarabel::*;
pub use qp_totsu::*;

/// QP backend trait
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Solves a QP with inequality constraints only:
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & {1 \over 2} x^T P x + q^T x \\\\
/// {\rm subject \ to} & G x \preceq h.
/// \end{array}
/// \\]
pub trait QpBackend<L: LinAlgEx>
{
    /// Solves the QP.
    /// 
    /// Returns `Ok` with the optimal point written in `x`, or `Err` with [`ProxError`].
    /// * `sym_p` is \\(P\\), [`totsu_core::MatType::SymPack`] of size \\(n\\).
    /// * `vec_q` is \\(q\\), of size \\(n \times 1\\).
    /// * `mat_g` is \\(G\\), of size \\(m \times n\\).
    /// * `vec_h` is \\(h\\), of size \\(m \times 1\\).
    /// * `x` has length \\(n\\).
    fn solve_qp(&mut self,
        sym_p: &MatBuild<L>, vec_q: &MatBuild<L>,
        mat_g: &MatBuild<L>, vec_h: &MatBuild<L>,
        x: &mut [L::F]
    ) -> Result<(), ProxError>;
}
