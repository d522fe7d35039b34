//! Douglas-Rachford splitting solver

use num_traits::{Float, Zero, One};
use core::fmt::{Debug, LowerExp};
use std::time::{Duration, Instant};
use crate::solver::{Prox, Operator, SliceLike, SolverError};
use crate::solver::projector::Projector;
use crate::solver::anderson::Anderson;
use totsu_core::LinAlgEx;

//

/// Solver parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParam<F: Float>
{
    /// Max iteration number. `None` means no upper limit.
    pub max_iter: Option<usize>,
    /// Step size \\(t\\) given to every proximal operator.
    pub rho: F,
    /// Absolute tolerance of the primal and dual residuals.
    pub eps_abs: F,
    /// Relative tolerance of the primal and dual residuals, scaled by their initial values.
    pub eps_rel: F,
    /// Enables type-II Anderson acceleration.
    pub anderson: bool,
    /// Memory size of Anderson acceleration.
    pub m_accel: usize,
    /// Regularization coefficient of Anderson acceleration.
    pub lam_accel: F,
    /// Tolerance of small positive value to avoid division by zero.
    pub eps_zero: F,
    /// Period of iterations to output progress log(for debug/trace level).
    pub log_period: usize,
}

impl<F: Float> Default for SolverParam<F>
{
    fn default() -> Self
    {
        let ten = F::from(10).unwrap();

        SolverParam {
            max_iter: Some(1000),
            rho: F::one(),
            eps_abs: ten.powi(-6),
            eps_rel: ten.powi(-8),
            anderson: false,
            m_accel: 5,
            lam_accel: ten.powi(-8),
            eps_zero: ten.powi(-12),
            log_period: 100,
        }
    }
}

impl<F: Float> SolverParam<F>
{
    fn validate(&self) -> Result<(), SolverError>
    {
        let f0 = F::zero();

        let what = if self.max_iter == Some(0) {
            Some("max_iter must be positive")
        }
        else if !(self.rho > f0) {
            Some("rho must be positive")
        }
        else if !(self.eps_abs >= f0) || !(self.eps_rel >= f0) {
            Some("eps_abs and eps_rel must be non-negative")
        }
        else if self.m_accel == 0 {
            Some("m_accel must be positive")
        }
        else if !(self.lam_accel >= f0) {
            Some("lam_accel must be non-negative")
        }
        else {
            None
        };

        match what {
            Some(what) => {
                log::error!("Invalid parameter: {}", what);
                Err(SolverError::InvalidParam(what))
            },
            None => Ok(()),
        }
    }
}

//

/// Result of a converged solve.
#[derive(Debug, Clone)]
pub struct SolverResult<F>
{
    /// Solution of each block, in the order of the proximal operators.
    pub x_vals: Vec<Vec<F>>,
    /// Primal residual \\(\\|\sum_l G_l x_l - h\\|_2\\) of each iteration.
    pub primal: Vec<F>,
    /// Dual residual of each iteration.
    pub dual: Vec<F>,
    /// Number of iterations.
    pub num_iters: usize,
    /// Elapsed wall-clock time.
    pub solve_time: Duration,
}

//

/// Checks the shapes of a splitting problem.
/// 
/// Returns `Ok` if the shapes are consistent, or `Err` with [`SolverError`] describing the expected shape.
/// * `proxes` are the proximal operators of the blocks.
/// * `couplings` are \\(G_l\\) of the blocks, or empty for no coupling constraint.
/// * `len_h` is the length of \\(h\\).
pub fn check_dims<L: LinAlgEx>(proxes: &[Box<dyn Prox<L> + '_>], couplings: &[Box<dyn Operator<L> + '_>], len_h: usize) -> Result<(), SolverError>
{
    if proxes.is_empty() || (couplings.len() != proxes.len() && !(couplings.is_empty() && len_h == 0)) {
        log::error!("Block count mismatch: proxes {}, couplings {}, h {}", proxes.len(), couplings.len(), len_h);
        return Err(SolverError::BlockCount { proxes: proxes.len(), couplings: couplings.len() });
    }

    for (block, (prox, op)) in proxes.iter().zip(couplings).enumerate() {
        let (rows, cols) = op.size();

        if cols != prox.dim() {
            log::error!("Size mismatch: block {} op{:?}, dim {}", block, op.size(), prox.dim());
            return Err(SolverError::ColMismatch { block, cols, dim: prox.dim() });
        }
        if rows != len_h {
            log::error!("Size mismatch: block {} op{:?}, h {}", block, op.size(), len_h);
            return Err(SolverError::RowMismatch { block, rows, len_h });
        }
    }

    Ok(())
}

fn check_init<L: LinAlgEx>(proxes: &[Box<dyn Prox<L> + '_>], v_init: &[Vec<L::F>]) -> Result<(), SolverError>
{
    if v_init.len() != proxes.len() {
        log::error!("Initial point count mismatch: proxes {}, init {}", proxes.len(), v_init.len());
        return Err(SolverError::InitCount { blocks: proxes.len(), init: v_init.len() });
    }

    for (block, (prox, v)) in proxes.iter().zip(v_init).enumerate() {
        if v.len() != prox.dim() {
            log::error!("Initial point size mismatch: block {} len {}, dim {}", block, v.len(), prox.dim());
            return Err(SolverError::InitMismatch { block, len: v.len(), dim: prox.dim() });
        }
    }

    Ok(())
}

//

/// Douglas-Rachford splitting solver struct.
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// This struct abstracts a solver of a problem in the splitting form:
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & \sum_{l=1}^N f_l(z_l) \\\\
/// {\rm subject \ to} & \sum_{l=1}^N G_l z_l = h,
/// \end{array}
/// \\]
/// where
/// * variables \\( z_l \in \mathbb{R}^{n_l} \\)
/// * closed convex \\( f_l \\) given by its proximal operator [`Prox`]
/// * \\( G_l \in \mathbb{R}^{m \times n_l} \\) as linear [`Operator`]s and \\( h \in \mathbb{R}^m \\).
/// 
/// Each iteration evaluates every \\({\bf prox}\_{tf_l}\\) once, with \\(t\\) = [`SolverParam::rho`],
/// then projects onto the coupling constraint.
/// With no \\(G_l\\), it reduces to the proximal point method on each block.
pub struct Solver<L: LinAlgEx>
{
    /// solver parameters.
    pub par: SolverParam<L::F>,

    v_init: Option<Vec<Vec<L::F>>>,
}

impl<L: LinAlgEx> Solver<L>
{
    /// Creates an instance.
    /// 
    /// Returns [`Solver`] instance.
    pub fn new() -> Self
    {
        Solver {
            par: SolverParam::default(),
            v_init: None,
        }
    }

    /// Changes solver parameters.
    /// 
    /// Returns [`Solver`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SolverParam<L::F>)
    {
        f(&mut self.par);
        self
    }

    /// Sets an initial point of the iteration, zeros if not set.
    /// 
    /// Returns [`Solver`] with the initial point.
    /// * `v_init` is a vector per block, in the order of the proximal operators,
    ///   each of the block dimension. It is checked when solving.
    ///   A previous [`SolverResult::x_vals`] of a nearby problem is a typical choice.
    pub fn init(mut self, v_init: Vec<Vec<L::F>>) -> Self
    {
        self.v_init = Some(v_init);
        self
    }
}

impl<L: LinAlgEx> Solver<L>
where L::F: Float + Debug + LowerExp
{
    /// Starts to solve a problem in the splitting form.
    /// 
    /// Returns `Ok` with [`SolverResult`] or `Err` with [`SolverError`] type.
    /// * `proxes` are the proximal operators of \\(f_l\\).
    /// * `couplings` are \\(G_l\\), or empty together with `vec_h`.
    /// * `vec_h` is \\(h\\).
    pub fn solve<'a>(self,
        (proxes, couplings, vec_h): (&mut [Box<dyn Prox<L> + 'a>], &[Box<dyn Operator<L> + 'a>], &[L::F])
    ) -> Result<SolverResult<L::F>, SolverError>
    {
        self.par.validate()?;
        check_dims(proxes, couplings, vec_h.len())?;
        if let Some(v_init) = &self.v_init {
            check_init(proxes, v_init)?;
        }

        log::debug!("{:?}", self.par);

        let core = SolverCore {
            par: self.par,
            v_init: self.v_init,
            proxes,
            couplings,
            vec_h,
        };

        core.solve()
    }
}

//

struct SolverCore<'s, 'a, L: LinAlgEx>
{
    par: SolverParam<L::F>,
    v_init: Option<Vec<Vec<L::F>>>,

    proxes: &'s mut [Box<dyn Prox<L> + 'a>],
    couplings: &'s [Box<dyn Operator<L> + 'a>],
    vec_h: &'s [L::F],
}

impl<'s, 'a, L: LinAlgEx> SolverCore<'s, 'a, L>
where L::F: Float + Debug + LowerExp
{
    fn solve(mut self) -> Result<SolverResult<L::F>, SolverError>
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let f2 = f1 + f1;

        log::info!("----- Initializing");
        let time_start = Instant::now();

        let dims: Vec<usize> = self.proxes.iter().map(|p| p.dim()).collect();
        let mut offsets = vec![0; dims.len() + 1];
        for (l, n_l) in dims.iter().enumerate() {
            offsets[l + 1] = offsets[l] + n_l;
        }
        let n = offsets[dims.len()];
        let m = self.vec_h.len();

        let mut proj = Projector::<L>::new(self.couplings, &dims, m, self.par.eps_zero);

        let mut aa = if self.par.anderson {
            Some(Anderson::<L>::new(n, self.par.m_accel, self.par.lam_accel, self.par.eps_zero))
        }
        else {
            None
        };

        let mut v = vec![f0; n];
        if let Some(v_init) = &self.v_init {
            for (l, v_l) in v_init.iter().enumerate() {
                v[offsets[l]..offsets[l + 1]].copy_from_slice(v_l);
            }
        }
        let mut x_half = vec![f0; n];
        let mut v_half = vec![f0; n];
        let mut x_new = vec![f0; n];
        let mut v_f = vec![f0; n];
        let mut g = vec![f0; n];
        let mut s = vec![f0; n];
        let mut work = vec![f0; n];

        let mut primal = Vec::new();
        let mut dual = Vec::new();
        let mut r_init: Option<(L::F, L::F)> = None;

        // Iteration
        log::info!("----- Started");
        let mut i = 0;
        loop {
            let excess_iter = if let Some(max_iter) = self.par.max_iter {
                i + 1 >= max_iter
            } else {
                false
            };

            let log_trig = if self.par.log_period > 0 {
                i % self.par.log_period == 0
            }
            else {
                if i == 0 && log::log_enabled!(log::Level::Debug) {
                    log::warn!("log_period == 0: no periodic log");
                }
                false
            };

            // x_half = prox(v)
            for (l, prox) in self.proxes.iter_mut().enumerate() {
                let r = offsets[l]..offsets[l + 1];
                prox.prox(self.par.rho, &L::Sl::new_ref(&v[r.clone()]), &mut L::Sl::new_mut(&mut x_half[r]))
                    .map_err(|e| {
                        log::warn!("{}: block {} {}", i, l, e);
                        SolverError::from_prox(l, e)
                    })?;
            }

            // x_new = proj(2 x_half - v)
            v_half.copy_from_slice(&x_half);
            L::scale(f2, &mut L::Sl::new_mut(&mut v_half));
            L::add(-f1, &L::Sl::new_ref(&v), &mut L::Sl::new_mut(&mut v_half));
            proj.proj(self.couplings, self.vec_h, &v_half, &mut x_new);

            // F(v) = v + x_new - x_half, g(v) = v - F(v)
            g.copy_from_slice(&x_half);
            L::add(-f1, &L::Sl::new_ref(&x_new), &mut L::Sl::new_mut(&mut g));
            v_f.copy_from_slice(&v);
            L::add(-f1, &L::Sl::new_ref(&g), &mut L::Sl::new_mut(&mut v_f));

            // Residuals
            let r_pri = proj.residual(self.couplings, self.vec_h, &x_half);

            s.copy_from_slice(&v);
            L::add(-f1, &L::Sl::new_ref(&x_half), &mut L::Sl::new_mut(&mut s));
            L::scale(self.par.rho.recip(), &mut L::Sl::new_mut(&mut s));
            let r_dual = proj.range_residual(self.couplings, &s, &mut work);

            primal.push(r_pri);
            dual.push(r_dual);

            let (r_pri0, r_dual0) = *r_init.get_or_insert((r_pri, r_dual));

            let term_conv = (r_pri <= self.par.eps_abs + self.par.eps_rel * r_pri0)
                && (r_dual <= self.par.eps_abs + self.par.eps_rel * r_dual0);

            if log_trig || excess_iter || term_conv {
                log::debug!("{}: pri_dual {:.2e} {:.2e}", i, r_pri, r_dual);
            }
            else {
                log::trace!("{}: pri_dual {:.2e} {:.2e}", i, r_pri, r_dual);
            }

            if excess_iter || term_conv {
                log::trace!("{}: x {:?}", i, x_half);

                if term_conv {
                    log::info!("----- Converged");

                    let x_vals = (0.. dims.len()).map(|l| x_half[offsets[l]..offsets[l + 1]].to_vec()).collect();

                    return Ok(SolverResult {
                        x_vals,
                        primal,
                        dual,
                        num_iters: i + 1,
                        solve_time: time_start.elapsed(),
                    });
                }
                else {
                    log::warn!("----- ExcessIter");

                    return Err(SolverError::ExcessIter);
                }
            }

            // Next point
            if let Some(aa) = &mut aa {
                let g_norm = L::norm(&L::Sl::new_ref(&g));

                if let Some(v_safe) = aa.safeguard(g_norm) {
                    v.copy_from_slice(&v_safe);
                }
                else {
                    aa.next(&v_f, &g, &mut v);
                }
            }
            else {
                v.copy_from_slice(&v_f);
            }

            i += 1;
            assert!(!excess_iter);
        } // end of loop
    }
}
