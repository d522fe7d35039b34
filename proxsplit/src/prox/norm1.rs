use num_traits::{Float, Zero};
use core::marker::PhantomData;
use proxsplit_core::solver::{LinAlg, Prox, ProxError, SliceLike};

//

/// Proximal operator of the scaled elementwise L1 norm
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// \\(f(x) = \alpha \\|x\\|_1\\), so that
/// \\({\bf prox}\_{tf}(v)_i = {\bf sign}(v_i) \max(|v_i| - t\alpha, 0)\\).
pub struct ProxNorm1<L: LinAlg>
{
    ph_l: PhantomData<L>,
    n: usize,
    alpha: L::F,
}

impl<L: LinAlg> ProxNorm1<L>
{
    /// Creates an instance.
    /// 
    /// * `n` is the dimension of the variable.
    /// * `alpha` is the weight \\(\alpha \ge 0\\).
    pub fn new(n: usize, alpha: L::F) -> Self
    {
        assert!(alpha >= L::F::zero());

        ProxNorm1 {
            ph_l: PhantomData,
            n, alpha,
        }
    }
}

impl<L: LinAlg> Prox<L> for ProxNorm1<L>
{
    fn dim(&self) -> usize
    {
        self.n
    }

    fn prox(&mut self, t: L::F, v: &L::Sl, x: &mut L::Sl) -> Result<(), ProxError>
    {
        assert_eq!(v.len(), self.n);
        assert_eq!(x.len(), self.n);

        let f0 = L::F::zero();
        let thr = t * self.alpha;

        for (x_i, v_i) in x.get_mut().iter_mut().zip(v.get_ref()) {
            let a = (v_i.abs() - thr).max(f0);
            *x_i = if *v_i < f0 {-a} else {a};
        }

        Ok(())
    }
}
