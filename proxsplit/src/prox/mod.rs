//! Proximal operators

mod neg_log_det;
mod norm1;
mod shifted_qp;

pub use neg_log_det::*;
pub use norm1::*;
pub use shifted_qp::*;
