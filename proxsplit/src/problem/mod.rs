//! Splitting problems

use proxsplit_core::solver::{check_dims, Prox, Operator, SolverError};
use totsu_core::LinAlgEx;

mod sparse_inv_cov;
mod coupled_qp;

pub use sparse_inv_cov::*;
pub use coupled_qp::*;

//

/// Assembled splitting problem
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Owns the proximal operators of \\(f_l\\), the coupling operators \\(G_l\\) and \\(h\\)
/// that [`proxsplit_core::solver::Solver`] takes.
pub struct SplitProblem<'a, L: LinAlgEx>
{
    proxes: Vec<Box<dyn Prox<L> + 'a>>,
    couplings: Vec<Box<dyn Operator<L> + 'a>>,
    vec_h: Vec<L::F>,
}

impl<'a, L: LinAlgEx> SplitProblem<'a, L>
{
    /// Creates an instance.
    /// 
    /// Returns [`SplitProblem`] instance, or `Err` with [`SolverError`] describing the expected shape.
    /// * `proxes` are the proximal operators, one per block.
    /// * `couplings` are \\(G_l\\), one per block, each with columns equal to its block dimension
    ///   and rows equal to the length of `vec_h`.
    ///   It may be empty together with `vec_h`, for no coupling constraint.
    /// * `vec_h` is \\(h\\).
    pub fn new(proxes: Vec<Box<dyn Prox<L> + 'a>>, couplings: Vec<Box<dyn Operator<L> + 'a>>, vec_h: Vec<L::F>) -> Result<Self, SolverError>
    {
        check_dims(&proxes, &couplings, vec_h.len())?;

        Ok(SplitProblem {
            proxes, couplings, vec_h,
        })
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize
    {
        self.proxes.len()
    }

    /// Generates the problem to be solved.
    /// 
    /// Returns a tuple that [`proxsplit_core::solver::Solver::solve`] takes.
    pub fn problem(&mut self) -> (&mut [Box<dyn Prox<L> + 'a>], &[Box<dyn Operator<L> + 'a>], &[L::F])
    {
        (&mut self.proxes[..], &self.couplings[..], &self.vec_h[..])
    }
}
