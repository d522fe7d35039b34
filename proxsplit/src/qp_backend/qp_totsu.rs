use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use proxsplit_core::solver::ProxError;
use totsu::prelude::{Solver, SolverError, SolverParam};
use totsu::{MatBuild, ProbQP};
use totsu_core::{LinAlgEx, MatType};
use super::QpBackend;

/// [`QpBackend`] by the first-order conic solver of `totsu`.
/// 
/// Slower and less accurate than [`super::QpClarabel`], but generic over [`LinAlgEx`].
pub struct QpTotsu<L: LinAlgEx>
{
    /// Parameters given to [`totsu::prelude::Solver`] on each solve.
    pub par: SolverParam<L::F>,
}

impl<L: LinAlgEx> QpTotsu<L>
{
    /// Creates an instance.
    pub fn new() -> Self
    {
        let mut par = SolverParam::default();
        par.max_iter = Some(100_000);

        QpTotsu {
            par,
        }
    }

    /// Changes parameters of the inner solver.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SolverParam<L::F>)
    {
        f(&mut self.par);
        self
    }
}

impl<L: LinAlgEx> QpBackend<L> for QpTotsu<L>
where L::F: Float + Debug + LowerExp
{
    fn solve_qp(&mut self,
        sym_p: &MatBuild<L>, vec_q: &MatBuild<L>,
        mat_g: &MatBuild<L>, vec_h: &MatBuild<L>,
        x: &mut [L::F]
    ) -> Result<(), ProxError>
    {
        let n = vec_q.size().0;
        let m = vec_h.size().0;
        assert_eq!(x.len(), n);

        // ProbQP takes its matrices by value
        let sym_p = MatBuild::new(MatType::SymPack(n)).by_fn(|r, c| sym_p[(r, c)]);
        let vec_q = MatBuild::new(MatType::General(n, 1)).iter_colmaj(vec_q.as_ref());
        let mat_g = MatBuild::new(MatType::General(m, n)).iter_colmaj(mat_g.as_ref());
        let vec_h = MatBuild::new(MatType::General(m, 1)).iter_colmaj(vec_h.as_ref());
        let mat_a = MatBuild::new(MatType::General(0, n));
        let vec_b = MatBuild::new(MatType::General(0, 1));

        let par = self.par.clone();
        let s = Solver::<L>::new().par(|p| *p = par);
        let mut qp = ProbQP::new(sym_p, vec_q, mat_g, vec_h, mat_a, vec_b, s.par.eps_zero);

        match s.solve(qp.problem()) {
            Ok((x_opt, _)) => {
                x.copy_from_slice(&x_opt[0.. n]);
                Ok(())
            },
            Err(SolverError::Infeasible) => Err(ProxError::Infeasible),
            Err(SolverError::Unbounded) => Err(ProxError::Unbounded),
            Err(e) => {
                log::warn!("totsu: {}", e);
                Err(ProxError::Failure)
            },
        }
    }
}
