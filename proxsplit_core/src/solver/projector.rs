use num_traits::{Float, Zero, One, cast};
use crate::solver::{Operator, SliceLike};
use totsu_core::LinAlgEx;

//

/// Euclidean projection onto \\(\lbrace z \mid \sum_l G_l z_l = h \rbrace\\)
/// through the pseudo-inverse of the Gram matrix \\(\sum_l G_l G_l^T\\).
pub(crate) struct Projector<L: LinAlgEx>
{
    m: usize,
    offsets: Vec<usize>,
    sym_pinv: Vec<L::F>,
    w_m: Vec<L::F>,
    w_d: Vec<L::F>,
}

impl<L: LinAlgEx> Projector<L>
{
    pub fn new(couplings: &[Box<dyn Operator<L> + '_>], dims: &[usize], m: usize, eps_zero: L::F) -> Self
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();

        let mut offsets = vec![0; dims.len() + 1];
        for (l, n_l) in dims.iter().enumerate() {
            offsets[l + 1] = offsets[l] + n_l;
        }

        let mut sym_pinv = vec![f0; m * (m + 1) / 2];

        if !couplings.is_empty() && m > 0 {
            // Gram matrix column by column
            let mut e = vec![f0; m];
            let mut col = vec![f0; m];
            for c in 0.. m {
                e[c] = f1;
                L::scale(f0, &mut L::Sl::new_mut(&mut col));
                for (op, n_l) in couplings.iter().zip(dims) {
                    let mut w_l = vec![f0; *n_l];
                    op.trans_op(f1, &L::Sl::new_ref(&e), f0, &mut L::Sl::new_mut(&mut w_l));
                    op.op(f1, &L::Sl::new_ref(&w_l), f1, &mut L::Sl::new_mut(&mut col));
                }
                e[c] = f0;

                for r in 0..= c {
                    sym_pinv[c * (c + 1) / 2 + r] = col[r];
                }
            }

            let mut trace = f0;
            for i in 0.. m {
                trace = trace + sym_pinv[i * (i + 1) / 2 + i];
            }
            let tol = eps_zero * trace.max(f1) * cast(m).unwrap_or(f1);

            let mut work = vec![f0; L::map_eig_worklen(m)];
            L::map_eig(&mut L::Sl::new_mut(&mut sym_pinv), None, eps_zero, &mut L::Sl::new_mut(&mut work), |e| {
                if e > tol {
                    Some(e.recip())
                }
                else {
                    Some(f0)
                }
            });
        }

        Projector {
            m,
            offsets,
            sym_pinv,
            w_m: vec![f0; m],
            w_d: vec![f0; m],
        }
    }

    fn range(&self, l: usize) -> core::ops::Range<usize>
    {
        self.offsets[l]..self.offsets[l + 1]
    }

    // w_m = sum_l G_l x_l - h
    fn stack_op(&mut self, couplings: &[Box<dyn Operator<L> + '_>], x: &[L::F], vec_h: Option<&[L::F]>)
    {
        let f1 = L::F::one();

        match vec_h {
            Some(h) => {
                self.w_m.copy_from_slice(h);
                L::scale(-f1, &mut L::Sl::new_mut(&mut self.w_m));
            },
            None => {
                L::scale(L::F::zero(), &mut L::Sl::new_mut(&mut self.w_m));
            },
        }

        for (l, op) in couplings.iter().enumerate() {
            let x_l = &x[self.range(l)];
            op.op(f1, &L::Sl::new_ref(x_l), f1, &mut L::Sl::new_mut(&mut self.w_m));
        }
    }

    // y = y - sum_l G_l^T pinv w_m
    fn sub_trans_pinv(&mut self, couplings: &[Box<dyn Operator<L> + '_>], y: &mut [L::F])
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();

        L::transform_sp(self.m, f1, &L::Sl::new_ref(&self.sym_pinv), &L::Sl::new_ref(&self.w_m), f0, &mut L::Sl::new_mut(&mut self.w_d));

        for (l, op) in couplings.iter().enumerate() {
            let r = self.range(l);
            op.trans_op(-f1, &L::Sl::new_ref(&self.w_d), f1, &mut L::Sl::new_mut(&mut y[r]));
        }
    }

    /// Projects `v` onto the coupling constraint set, stored into `x`.
    pub fn proj(&mut self, couplings: &[Box<dyn Operator<L> + '_>], vec_h: &[L::F], v: &[L::F], x: &mut [L::F])
    {
        x.copy_from_slice(v);

        if self.m > 0 && !couplings.is_empty() {
            self.stack_op(couplings, v, Some(vec_h));
            self.sub_trans_pinv(couplings, x);
        }
    }

    /// Norm of the coupling constraint residual \\(\sum_l G_l x_l - h\\).
    pub fn residual(&mut self, couplings: &[Box<dyn Operator<L> + '_>], vec_h: &[L::F], x: &[L::F]) -> L::F
    {
        if self.m == 0 || couplings.is_empty() {
            return L::F::zero();
        }

        self.stack_op(couplings, x, Some(vec_h));
        L::norm(&L::Sl::new_ref(&self.w_m))
    }

    /// Norm of the component of `g` orthogonal to the range of \\([G_1 \cdots G_N]^T\\).
    /// 
    /// `work` is overwritten with that component.
    pub fn range_residual(&mut self, couplings: &[Box<dyn Operator<L> + '_>], g: &[L::F], work: &mut [L::F]) -> L::F
    {
        work.copy_from_slice(g);

        if self.m > 0 && !couplings.is_empty() {
            self.stack_op(couplings, g, None);
            self.sub_trans_pinv(couplings, work);
        }

        L::norm(&L::Sl::new_ref(work))
    }
}

//

#[test]
fn test_projector1()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;
    use crate::OpEye;

    type L = FloatGeneric<f64>;

    // z_0 - z_1 = 0
    let couplings: Vec<Box<dyn Operator<L>>> = vec![
        Box::new(OpEye::new(3, 1.)),
        Box::new(OpEye::new(3, -1.)),
    ];
    let vec_h = [0.; 3];

    let mut proj = Projector::<L>::new(&couplings, &[3, 3], 3, 1e-12);

    let v = [1., 2., 3., 3., 2., 1.];
    let mut x = [0.; 6];
    proj.proj(&couplings, &vec_h, &v, &mut x);

    assert_float_eq!(x.as_ref(), [2., 2., 2., 2., 2., 2.].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(proj.residual(&couplings, &vec_h, &x), 0., abs <= 1e-12);

    // (1, 1) lies in the range of [I; -I]^T only through its zero component
    let mut w = [0.; 6];
    let r = proj.range_residual(&couplings, &[1., 0., 0., 1., 0., 0.], &mut w);
    assert_float_eq!(r, 2_f64.sqrt(), abs <= 1e-12);
}
