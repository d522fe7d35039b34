//! Splitting solver

mod prox;
mod solver_error;
mod projector;
mod anderson;
mod solver;

pub use prox::*;
pub use solver_error::*;
pub use solver::*;

pub use totsu_core::solver::{LinAlg, SliceLike, Operator};
