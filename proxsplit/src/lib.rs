/*!
Proximal operators and splitting problems that can be solved by [`proxsplit_core`].

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

# General usage

1. Express each term \\(f_l\\) of a separable objective by a [`proxsplit_core::solver::Prox`]:
   [`ProxNegLogDet`], [`ProxNorm1`], [`ProxQP`] or your own.
1. Express the coupling constraint \\(\sum_l G_l z_l = h\\) by [`proxsplit_core::solver::Operator`]s,
   such as [`totsu_core::MatOp`] from [`totsu::MatBuild::as_op`] or [`proxsplit_core::OpEye`].
1. Assemble them into a [`SplitProblem`], which checks their shapes.
1. Create a [`prelude::Solver`] instance and optionally set its parameters.
1. Feed the problem to the solver and invoke [`prelude::Solver::solve`] to get a [`prelude::SolverResult`].

[`ProbSparseInvCov`] and [`ProbCoupledQP`] assemble the two bundled problems.

# Examples

Sum of two absolute values \\(|z_0 - 1| + |z_1 + 1|\\) under \\(z_0 = z_1\\):

```
use float_eq::assert_float_eq;
use proxsplit::prelude::*;
use proxsplit::*;

type La = FloatGeneric<f64>;

// |x - a| by the shifted argument of the L1 operator
struct ProxAbsShift(f64);

impl Prox<La> for ProxAbsShift
{
    fn dim(&self) -> usize {1}

    fn prox(&mut self, t: f64, v: &[f64], x: &mut [f64]) -> Result<(), ProxError>
    {
        let u = v[0] - self.0;
        x[0] = self.0 + u.signum() * (u.abs() - t).max(0.);
        Ok(())
    }
}

let proxes: Vec<Box<dyn Prox<La>>> = vec![
    Box::new(ProxAbsShift(1.)),
    Box::new(ProxAbsShift(-1.)),
];
let couplings: Vec<Box<dyn Operator<La>>> = vec![
    Box::new(OpEye::new(1, 1.)),
    Box::new(OpEye::new(1, -1.)),
];

let mut prob = SplitProblem::new(proxes, couplings, vec![0.]).unwrap();
let rslt = Solver::new().solve(prob.problem()).unwrap();

// any point in [-1, 1] is optimal
assert_float_eq!(rslt.x_vals[0][0], rslt.x_vals[1][0], abs <= 1e-4);
assert!(rslt.x_vals[0][0].abs() <= 1. + 1e-4);
```
*/

pub mod matrix;

//

mod prox;

pub use prox::*;

//

mod qp_backend;

pub use qp_backend::*;

//

mod problem;

pub use problem::*;

//

/// Prelude
pub mod prelude
{
   pub use proxsplit_core::solver::{Solver, SolverError, SolverParam, SolverResult, Prox, ProxError, Operator};
   pub use proxsplit_core::OpEye;
   pub use totsu_core::{FloatGeneric, MatType};
}
