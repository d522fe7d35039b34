//! Proximal operator

use crate::solver::LinAlg;

/// Proximal operator errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProxError
{
    /// The subproblem has no feasible point.
    Infeasible,
    /// The subproblem is unbounded below.
    Unbounded,
    /// Any other failure of the method evaluating the operator.
    Failure,
}

impl core::fmt::Display for ProxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            ProxError::Infeasible => "Infeasible: proximal subproblem is infeasible",
            ProxError::Unbounded  => "Unbounded: proximal subproblem is unbounded",
            ProxError::Failure    => "Failure: proximal subproblem failed",
        })
    }
}

impl std::error::Error for ProxError {}

//

/// Proximal operator trait
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Expresses the proximal operator of a closed convex function \\(f: \mathbb{R}^n \to \mathbb{R} \cup \lbrace +\infty \rbrace\\):
/// \\[
/// {\bf prox}\_{tf}(v) = \arg\min_x \left( f(x) + {1 \over 2t} \\|x - v\\|_2^2 \right).
/// \\]
/// The function itself is never evaluated by the solver.
pub trait Prox<L: LinAlg>
{
    /// Dimension \\(n\\) of the block variable.
    fn dim(&self) -> usize;

    /// Calculate \\(x = {\bf prox}\_{tf}(v)\\).
    /// 
    /// Returns `Err` with [`ProxError`] if the operator cannot be evaluated.
    /// * `t` is a step size \\(t > 0\\).
    /// * `v` is a point \\(v\\).
    ///   The length of `v` shall be \\(n\\).
    /// * `x` is the resulted \\({\bf prox}\_{tf}(v)\\) on exit.
    ///   The length of `x` shall be \\(n\\).
    fn prox(&mut self, t: L::F, v: &L::Sl, x: &mut L::Sl) -> Result<(), ProxError>;
}
