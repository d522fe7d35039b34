use num_traits::{Float, Zero, One, cast};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use proxsplit_core::solver::{Prox, Operator, SliceLike, SolverError, SolverResult};
use proxsplit_core::OpEye;
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};
use crate::matrix::{self, ShapeError, ZERO_SNAP_TOL};
use crate::prox::{ProxNegLogDet, ProxNorm1};
use super::SplitProblem;

//

/// Sparse inverse covariance estimation (graphical lasso)
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// For a sample covariance \\(Q \in \mathcal{S}_+^q\\) and \\(\alpha \ge 0\\),
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & -\log\det S + {\bf tr}(SQ) + \alpha \\|S\\|_1,
/// \end{array}
/// \\]
/// which is split into two blocks \\(S_1 = S_2\\):
/// [`ProxNegLogDet`] on \\(S_1\\) and [`ProxNorm1`] on \\(S_2\\), coupled by \\(I S_1 - I S_2 = 0\\).
pub struct ProbSparseInvCov<L: LinAlgEx>
{
    sym_q: MatBuild<L>,
    sym_s_true: Option<MatBuild<L>>,
    eps_zero: L::F,
}

impl<L: LinAlgEx> ProbSparseInvCov<L>
{
    /// Creates an instance from a given sample covariance.
    /// 
    /// Returns `Err` with [`ShapeError`] if `sym_q` is not square.
    /// * `eps_zero` should be the same value as [`proxsplit_core::solver::SolverParam::eps_zero`].
    pub fn new(sym_q: &MatBuild<L>, eps_zero: L::F) -> Result<Self, ShapeError>
    {
        let (nr, nc) = sym_q.size();
        if nr != nc {
            return Err(ShapeError::NotSquare { len: nr * nc });
        }

        Ok(ProbSparseInvCov {
            sym_q: MatBuild::new(MatType::SymPack(nr)).by_fn(|r, c| sym_q[(r, c)]),
            sym_s_true: None,
            eps_zero,
        })
    }

    /// Generates a synthetic instance.
    /// 
    /// A sparse, diagonally dominant precision matrix \\(S_{\rm true}\\) is drawn first,
    /// then \\(Q\\) is the sample covariance of `n_samples` draws from \\(\mathcal{N}(0, S_{\rm true}^{-1})\\).
    /// * `rng` is the random number generator, seeded by the caller.
    /// * `q` is the size of the matrices.
    /// * `density` is the probability that each off-diagonal pair of \\(S_{\rm true}\\) is nonzero.
    /// * `n_samples` is the number of samples, typically `10 * q`.
    /// * `eps_zero` should be the same value as [`proxsplit_core::solver::SolverParam::eps_zero`].
    pub fn generate<R: Rng>(rng: &mut R, q: usize, density: f64, n_samples: usize, eps_zero: L::F) -> Self
    where StandardNormal: Distribution<L::F>
    {
        assert!((0. ..= 1.).contains(&density));
        assert!(n_samples > 0);

        let f0 = L::F::zero();
        let f1 = L::F::one();
        let half = f1 / (f1 + f1);

        //----- sparse precision matrix

        let mut sym_s = MatBuild::<L>::new(MatType::SymPack(q));
        for c in 0.. q {
            for r in 0.. c {
                if rng.gen_bool(density) {
                    sym_s[(r, c)] = rng.sample(StandardNormal);
                }
            }
        }
        for i in 0.. q {
            let mut sum = f0;
            for j in 0.. q {
                if j != i {
                    sum = sum + sym_s[(i, j)].abs();
                }
            }
            sym_s[(i, i)] = sum + half;
        }

        //----- samples y = S^{-1/2} z

        let mut sym_r_sqrt = MatBuild::<L>::new(MatType::SymPack(q)).by_fn(|r, c| sym_s[(r, c)]);
        let mut work = vec![f0; L::map_eig_worklen(q)];
        L::map_eig(&mut L::Sl::new_mut(sym_r_sqrt.as_mut()), None, eps_zero, &mut L::Sl::new_mut(&mut work), |e| {
            if e > f0 {
                Some(e.sqrt().recip())
            }
            else {
                Some(f0)
            }
        });

        let mut sym_q = MatBuild::<L>::new(MatType::SymPack(q));
        let mut z = vec![f0; q];
        let mut y = vec![f0; q];
        for _ in 0.. n_samples {
            for z_i in z.iter_mut() {
                *z_i = rng.sample(StandardNormal);
            }
            sym_r_sqrt.as_op().op(f1, &L::Sl::new_ref(&z), f0, &mut L::Sl::new_mut(&mut y));

            for c in 0.. q {
                for r in 0..= c {
                    sym_q[(r, c)] = sym_q[(r, c)] + y[r] * y[c];
                }
            }
        }
        sym_q.set_scale(cast::<usize, L::F>(n_samples).unwrap_or(f1).recip());

        log::debug!("generated q {} with {} samples", q, n_samples);

        ProbSparseInvCov {
            sym_q,
            sym_s_true: Some(sym_s),
            eps_zero,
        }
    }

    /// Size \\(q\\) of the matrices.
    pub fn size(&self) -> usize
    {
        self.sym_q.size().0
    }

    /// Sample covariance \\(Q\\), [`MatType::SymPack`].
    pub fn sym_q(&self) -> &MatBuild<L>
    {
        &self.sym_q
    }

    /// Precision matrix that generated \\(Q\\), if generated by [`ProbSparseInvCov::generate`].
    pub fn true_precision(&self) -> Option<&MatBuild<L>>
    {
        self.sym_s_true.as_ref()
    }

    /// Largest off-diagonal magnitude of \\(Q\\).
    /// 
    /// With \\(\alpha\\) at or above it, the estimate is diagonal: \\({\bf diag}(Q_{ii} + \alpha)^{-1}\\).
    pub fn alpha_max(&self) -> L::F
    {
        let q = self.size();

        let mut a = L::F::zero();
        for c in 0.. q {
            for r in 0.. c {
                a = a.max(self.sym_q[(r, c)].abs());
            }
        }
        a
    }

    /// Assembles the splitting problem for a weight \\(\alpha\\).
    /// 
    /// Block 0 is the log-determinant term and block 1 is the L1 term,
    /// each of dimension \\(q^2\\).
    /// Returns `Err` with [`SolverError::InvalidParam`] unless `alpha` is non-negative.
    pub fn problem<'a>(&self, alpha: L::F) -> Result<SplitProblem<'a, L>, SolverError>
    where L: 'a
    {
        if !(alpha >= L::F::zero()) {
            log::error!("Invalid parameter: alpha must be non-negative");
            return Err(SolverError::InvalidParam("alpha must be non-negative"));
        }

        let q = self.size();

        let proxes: Vec<Box<dyn Prox<L> + 'a>> = vec![
            Box::new(ProxNegLogDet::from_parts(&self.sym_q, self.eps_zero)),
            Box::new(ProxNorm1::new(q * q, alpha)),
        ];
        let couplings: Vec<Box<dyn Operator<L> + 'a>> = vec![
            Box::new(OpEye::new(q * q, L::F::one())),
            Box::new(OpEye::new(q * q, -L::F::one())),
        ];

        SplitProblem::new(proxes, couplings, vec![L::F::zero(); q * q])
    }

    /// Post-processes a result into the estimated precision matrix.
    /// 
    /// Returns the log-determinant block reshaped into a square matrix,
    /// with entries of magnitude at most [`ZERO_SNAP_TOL`] snapped to zero,
    /// or `Err` with [`ShapeError`] if the result does not fit.
    pub fn estimate(&self, result: &SolverResult<L::F>) -> Result<MatBuild<L>, ShapeError>
    {
        let q = self.size();

        let x = result.x_vals.first().map_or(&[][..], |x| x.as_slice());
        if x.len() != q * q {
            return Err(ShapeError::LenMismatch { expected: q * q, found: x.len() });
        }

        let mut mat_s = matrix::colvec_to_square(x)?;
        matrix::snap_zeros(&mut mat_s, cast(ZERO_SNAP_TOL).unwrap_or(L::F::zero()));

        Ok(mat_s)
    }
}
