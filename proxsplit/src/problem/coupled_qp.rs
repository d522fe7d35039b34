use num_traits::{Float, Zero, One, cast};
use rand::Rng;
use rand::distributions::Standard;
use rand_distr::{Distribution, StandardNormal};
use proxsplit_core::solver::{Prox, Operator, SliceLike, SolverError};
use totsu::MatBuild;
use totsu_core::{LinAlgEx, MatType};
use crate::prox::ProxQP;
use crate::qp_backend::QpBackend;
use super::SplitProblem;

//

/// Data of a block of [`ProbCoupledQP`].
pub struct QpBlock<L: LinAlgEx>
{
    /// \\(Q_l\\), [`MatType::SymPack`] of size \\(q_l\\).
    pub sym_q: MatBuild<L>,
    /// \\(c_l\\), of length \\(q_l\\).
    pub vec_c: Vec<L::F>,
    /// \\(F_l\\), of size \\(p_l \times q_l\\).
    pub mat_f: MatBuild<L>,
    /// \\(d_l\\), of length \\(p_l\\).
    pub vec_d: Vec<L::F>,
    /// \\(G_l\\), of size \\(s \times q_l\\).
    pub mat_g: MatBuild<L>,
}

/// QP with blocks coupled by linear equalities
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & \sum_{l=1}^L \left( x_l^T Q_l x_l + c_l^T x_l \right) \\\\
/// {\rm subject \ to} & F_l x_l \preceq d_l \quad (l = 1, \ldots, L) \\\\
/// & \sum_{l=1}^L G_l x_l = h,
/// \end{array}
/// \\]
/// where each block is handled by a [`ProxQP`].
pub struct ProbCoupledQP<L: LinAlgEx>
{
    blocks: Vec<QpBlock<L>>,
    vec_h: Vec<L::F>,
}

impl<L: LinAlgEx> ProbCoupledQP<L>
{
    /// Generates a synthetic feasible instance.
    /// 
    /// With a hidden point \\(\hat x_l\\), \\(d_l = F_l \hat x_l + u_l\\) for uniform \\(u_l \in [0, 1)\\)
    /// and \\(h = \sum_l G_l \hat x_l\\).
    /// * `rng` is the random number generator, seeded by the caller.
    /// * `n_blocks` is the number of blocks \\(L\\).
    /// * `s` is the number of coupling equalities.
    /// * `q` is the dimension \\(q_l\\) of every block.
    /// * `p` is the number \\(p_l\\) of inequalities of every block.
    pub fn generate<R: Rng>(rng: &mut R, n_blocks: usize, s: usize, q: usize, p: usize) -> Self
    where StandardNormal: Distribution<L::F>, Standard: Distribution<L::F>
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let scale_q = cast::<usize, L::F>(q.max(1)).unwrap_or(f1).recip();

        let mut blocks = Vec::with_capacity(n_blocks);
        let mut vec_h = vec![f0; s];

        for _ in 0.. n_blocks {
            let mat_m = MatBuild::<L>::new(MatType::General(q, q))
                        .by_fn(|_, _| rng.sample(StandardNormal));
            let sym_q = MatBuild::<L>::new(MatType::SymPack(q))
                        .by_fn(|r, c| {
                            let mut e = f0;
                            for k in 0.. q {
                                e = e + mat_m[(r, k)] * mat_m[(c, k)];
                            }
                            e * scale_q
                        });

            let vec_c: Vec<L::F> = (0.. q).map(|_| rng.sample(StandardNormal)).collect();
            let mat_f = MatBuild::<L>::new(MatType::General(p, q))
                        .by_fn(|_, _| rng.sample(StandardNormal));
            let x_hat: Vec<L::F> = (0.. q).map(|_| rng.sample(StandardNormal)).collect();

            let mut vec_d: Vec<L::F> = (0.. p).map(|_| rng.sample(Standard)).collect();
            mat_f.as_op().op(f1, &L::Sl::new_ref(&x_hat), f1, &mut L::Sl::new_mut(&mut vec_d));

            let mat_g = MatBuild::<L>::new(MatType::General(s, q))
                        .by_fn(|_, _| rng.sample(StandardNormal));
            mat_g.as_op().op(f1, &L::Sl::new_ref(&x_hat), f1, &mut L::Sl::new_mut(&mut vec_h));

            blocks.push(QpBlock {
                sym_q, vec_c, mat_f, vec_d, mat_g,
            });
        }

        log::debug!("generated {} blocks, s {} q {} p {}", n_blocks, s, q, p);

        ProbCoupledQP {
            blocks,
            vec_h,
        }
    }

    /// Number of blocks \\(L\\).
    pub fn num_blocks(&self) -> usize
    {
        self.blocks.len()
    }

    /// Data of the block `l`.
    pub fn block(&self, l: usize) -> &QpBlock<L>
    {
        &self.blocks[l]
    }

    /// Right-hand side \\(h\\) of the coupling equalities.
    pub fn vec_h(&self) -> &[L::F]
    {
        &self.vec_h
    }

    /// Proximal operator of the block `l`, solving its QPs by `backend`.
    pub fn block_prox<B: QpBackend<L>>(&self, l: usize, backend: B) -> ProxQP<L, B>
    {
        let blk = &self.blocks[l];
        let (p, q) = blk.mat_f.size();

        ProxQP::from_parts(
            MatBuild::new(MatType::SymPack(q)).by_fn(|r, c| blk.sym_q[(r, c)]),
            &blk.vec_c,
            MatBuild::new(MatType::General(p, q)).iter_colmaj(blk.mat_f.as_ref()),
            &blk.vec_d,
            backend
        )
    }

    /// Assembles the splitting problem.
    /// 
    /// * `backend` is called once per block to create its [`QpBackend`].
    pub fn problem<'a, B, FB>(&'a self, mut backend: FB) -> Result<SplitProblem<'a, L>, SolverError>
    where B: QpBackend<L> + 'a, FB: FnMut() -> B
    {
        let proxes = (0.. self.blocks.len())
            .map(|l| Box::new(self.block_prox(l, backend())) as Box<dyn Prox<L> + 'a>)
            .collect();
        let couplings = self.blocks.iter()
            .map(|blk| Box::new(blk.mat_g.as_op()) as Box<dyn Operator<L> + 'a>)
            .collect();

        SplitProblem::new(proxes, couplings, self.vec_h.clone())
    }

    //

    /// Realized objective \\(\sum_l (x_l^T Q_l x_l + c_l^T x_l)\\).
    pub fn objective(&self, x_vals: &[Vec<L::F>]) -> L::F
    {
        assert_eq!(x_vals.len(), self.blocks.len());

        let f0 = L::F::zero();
        let f1 = L::F::one();

        let mut obj = f0;
        for (blk, x) in self.blocks.iter().zip(x_vals) {
            let mut qx = vec![f0; x.len()];
            blk.sym_q.as_op().op(f1, &L::Sl::new_ref(x), f0, &mut L::Sl::new_mut(&mut qx));

            for ((x_i, qx_i), c_i) in x.iter().zip(&qx).zip(&blk.vec_c) {
                obj = obj + *x_i * (*qx_i + *c_i);
            }
        }
        obj
    }

    /// Norm of the violated part \\(\max(F_l x_l - d_l, 0)\\) stacked over the blocks.
    pub fn ineq_violation(&self, x_vals: &[Vec<L::F>]) -> L::F
    {
        assert_eq!(x_vals.len(), self.blocks.len());

        let f0 = L::F::zero();
        let f1 = L::F::one();

        let mut sq = f0;
        for (blk, x) in self.blocks.iter().zip(x_vals) {
            let mut r = blk.vec_d.clone();
            blk.mat_f.as_op().op(f1, &L::Sl::new_ref(x), -f1, &mut L::Sl::new_mut(&mut r));

            for r_i in r {
                let e = r_i.max(f0);
                sq = sq + e * e;
            }
        }
        sq.sqrt()
    }

    /// Norm of the coupling residual \\(\sum_l G_l x_l - h\\).
    pub fn eq_residual(&self, x_vals: &[Vec<L::F>]) -> L::F
    {
        assert_eq!(x_vals.len(), self.blocks.len());

        let f1 = L::F::one();

        let mut r = self.vec_h.clone();
        L::scale(-f1, &mut L::Sl::new_mut(&mut r));
        for (blk, x) in self.blocks.iter().zip(x_vals) {
            blk.mat_g.as_op().op(f1, &L::Sl::new_ref(x), f1, &mut L::Sl::new_mut(&mut r));
        }
        let norm = L::norm(&L::Sl::new_ref(&r));
        norm
    }

    /// Combined violation, the Euclidean norm of [`ProbCoupledQP::ineq_violation`] and [`ProbCoupledQP::eq_residual`].
    pub fn violation(&self, x_vals: &[Vec<L::F>]) -> L::F
    {
        let vi = self.ineq_violation(x_vals);
        let ve = self.eq_residual(x_vals);

        (vi * vi + ve * ve).sqrt()
    }
}
