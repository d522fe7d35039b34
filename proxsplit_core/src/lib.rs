/*!
Douglas-Rachford operator-splitting solver driven by proximal operators.

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

This crate solves problems in the splitting form
\\[
\begin{array}{ll}
{\rm minimize} & \sum_{l=1}^N f_l(z_l) \\\\
{\rm subject \ to} & \sum_{l=1}^N G_l z_l = h,
\end{array}
\\]
where each \\(f_l\\) is a closed convex function accessible only through its proximal operator
(see [`solver::Prox`]) and each \\(G_l\\) is a linear [`totsu_core::solver::Operator`].

Linear algebra is abstracted by [`totsu_core::LinAlgEx`],
so that [`totsu_core::FloatGeneric`] or any other implementation can be chosen.

Problem assembly and concrete proximal operators are found in `proxsplit` crate.
*/

pub mod solver;

//

mod op_eye;

pub use op_eye::*;
