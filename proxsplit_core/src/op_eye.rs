use num_traits::Float;
use core::marker::PhantomData;
use crate::solver::{LinAlg, Operator};

//

/// Scaled identity operator
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Implements [`Operator`] of \\(\alpha I \in \mathbb{R}^{n \times n}\\) without storing the matrix.
#[derive(Debug, Clone)]
pub struct OpEye<L: LinAlg>
{
    ph_l: PhantomData<L>,
    n: usize,
    alpha: L::F,
}

impl<L: LinAlg> OpEye<L>
{
    /// Creates an instance
    /// 
    /// Returns [`OpEye`] instance.
    /// * `n`: number of rows and columns.
    /// * `alpha`: scaling factor \\(\alpha\\).
    pub fn new(n: usize, alpha: L::F) -> Self
    {
        OpEye {
            ph_l: PhantomData,
            n, alpha,
        }
    }
}

impl<L: LinAlg> Operator<L> for OpEye<L>
{
    fn size(&self) -> (usize, usize)
    {
        (self.n, self.n)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        L::scale(beta, y);
        L::add(alpha * self.alpha, x, y);
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        self.op(alpha, x, beta, y);
    }

    fn absadd_cols(&self, tau: &mut L::Sl)
    {
        L::adds(self.alpha.abs(), tau);
    }

    fn absadd_rows(&self, sigma: &mut L::Sl)
    {
        L::adds(self.alpha.abs(), sigma);
    }
}

//

#[test]
fn test_op_eye1()
{
    use float_eq::assert_float_eq;
    use totsu_core::FloatGeneric;

    type L = FloatGeneric<f64>;

    let op = OpEye::<L>::new(3, -2.);
    assert_eq!(op.size(), (3, 3));

    let x = [1., 2., 3.];
    let mut y = [1., 1., 1.];
    op.op(0.5, &x, 3., &mut y);
    assert_float_eq!(y.as_ref(), [2., 1., 0.].as_ref(), abs_all <= 1e-12);

    let mut y = [0.; 3];
    op.trans_op(1., &x, 0., &mut y);
    assert_float_eq!(y.as_ref(), [-2., -4., -6.].as_ref(), abs_all <= 1e-12);

    let mut tau = [1.; 3];
    op.absadd_cols(&mut tau);
    assert_float_eq!(tau.as_ref(), [3., 3., 3.].as_ref(), abs_all <= 1e-12);
}
