use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT, NonnegativeConeT};
use proxsplit_core::solver::ProxError;
use totsu::MatBuild;
use totsu_core::LinAlgEx;
use super::QpBackend;

/// [`QpBackend`] by the Clarabel interior point solver.
#[derive(Debug, Clone)]
pub struct QpClarabel
{
    /// Max iteration number of Clarabel.
    pub max_iter: u32,
    /// Absolute tolerance of Clarabel's gap and feasibility.
    pub tol: f64,
}

impl Default for QpClarabel
{
    fn default() -> Self
    {
        QpClarabel {
            max_iter: 200,
            tol: 1e-9,
        }
    }
}

impl QpClarabel
{
    /// Creates an instance with default settings.
    pub fn new() -> Self
    {
        Self::default()
    }
}

// compressed sparse column, dropping exact zeros
fn to_csc<L: LinAlgEx<F=f64>>(mat: &MatBuild<L>, triu: bool) -> CscMatrix<f64>
{
    let (nr, nc) = mat.size();

    let mut colptr = Vec::with_capacity(nc + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    colptr.push(0);
    for c in 0.. nc {
        let r_end = if triu {(c + 1).min(nr)} else {nr};
        for r in 0.. r_end {
            let e = mat[(r, c)];
            if e != 0. {
                rowval.push(r);
                nzval.push(e);
            }
        }
        colptr.push(rowval.len());
    }

    CscMatrix::new(nr, nc, colptr, rowval, nzval)
}

impl<L: LinAlgEx<F=f64>> QpBackend<L> for QpClarabel
{
    fn solve_qp(&mut self,
        sym_p: &MatBuild<L>, vec_q: &MatBuild<L>,
        mat_g: &MatBuild<L>, vec_h: &MatBuild<L>,
        x: &mut [f64]
    ) -> Result<(), ProxError>
    {
        let n = vec_q.size().0;
        let m = vec_h.size().0;
        assert_eq!(x.len(), n);

        let p = to_csc(sym_p, true);
        let a = to_csc(mat_g, false);

        let cones: Vec<SupportedConeT<f64>> = if m > 0 {
            vec![NonnegativeConeT(m)]
        }
        else {
            Vec::new()
        };

        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .max_iter(self.max_iter)
            .tol_gap_abs(self.tol)
            .tol_gap_rel(self.tol)
            .tol_feas(self.tol)
            .build()
            .map_err(|e| {
                log::error!("clarabel settings: {}", e);
                ProxError::Failure
            })?;

        let mut solver = DefaultSolver::new(&p, vec_q.as_ref(), &a, vec_h.as_ref(), &cones, settings)
            .map_err(|e| {
                log::error!("clarabel setup: {:?}", e);
                ProxError::Failure
            })?;
        solver.solve();

        log::trace!("clarabel: {:?} in {} iterations", solver.solution.status, solver.solution.iterations);

        match solver.solution.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                x.copy_from_slice(&solver.solution.x);
                Ok(())
            },
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                Err(ProxError::Infeasible)
            },
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                Err(ProxError::Unbounded)
            },
            status => {
                log::warn!("clarabel: {:?}", status);
                Err(ProxError::Failure)
            },
        }
    }
}
