use crate::solver::ProxError;

/// Solver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError
{
    /// Exceed max iterations without convergence.
    ExcessIter,
    /// Proximal subproblem of the block is infeasible.
    Infeasible { block: usize },
    /// Proximal subproblem of the block is unbounded.
    Unbounded { block: usize },
    /// Proximal operator of the block failed.
    ProxFailure { block: usize },

    /// Numbers of proximal operators and coupling operators differ.
    BlockCount { proxes: usize, couplings: usize },
    /// Columns of the coupling operator differ from the dimension of its block.
    ColMismatch { block: usize, cols: usize, dim: usize },
    /// Rows of the coupling operator differ from the length of the right-hand side.
    RowMismatch { block: usize, rows: usize, len_h: usize },
    /// Numbers of proximal operators and initial point vectors differ.
    InitCount { blocks: usize, init: usize },
    /// Length of the initial point vector differs from the dimension of its block.
    InitMismatch { block: usize, len: usize, dim: usize },
    /// Invalid [`crate::solver::SolverParam`].
    InvalidParam(&'static str),
}

impl SolverError
{
    /// Wraps [`ProxError`] of a block.
    pub fn from_prox(block: usize, e: ProxError) -> Self
    {
        match e {
            ProxError::Infeasible => SolverError::Infeasible { block },
            ProxError::Unbounded  => SolverError::Unbounded { block },
            ProxError::Failure    => SolverError::ProxFailure { block },
        }
    }

    /// Checks if re-solving with relaxed parameters may succeed.
    /// 
    /// Returns `true` only for [`SolverError::ExcessIter`].
    pub fn is_recoverable(&self) -> bool
    {
        matches!(self, SolverError::ExcessIter)
    }
}

impl core::fmt::Display for SolverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            SolverError::ExcessIter =>
                write!(f, "ExcessIter: exceed max iterations"),
            SolverError::Infeasible { block } =>
                write!(f, "Infeasible: proximal subproblem of block {} is infeasible", block),
            SolverError::Unbounded { block } =>
                write!(f, "Unbounded: proximal subproblem of block {} is unbounded", block),
            SolverError::ProxFailure { block } =>
                write!(f, "ProxFailure: proximal operator of block {} failed", block),
            SolverError::BlockCount { proxes, couplings } =>
                write!(f, "BlockCount: {} coupling operators given for {} proximal operators, expected {} or none", couplings, proxes, proxes),
            SolverError::ColMismatch { block, cols, dim } =>
                write!(f, "ColMismatch: coupling operator of block {} has {} columns, expected {} (block dimension)", block, cols, dim),
            SolverError::RowMismatch { block, rows, len_h } =>
                write!(f, "RowMismatch: coupling operator of block {} has {} rows, expected {} (right-hand side length)", block, rows, len_h),
            SolverError::InitCount { blocks, init } =>
                write!(f, "InitCount: {} initial point vectors given, expected {} (blocks)", init, blocks),
            SolverError::InitMismatch { block, len, dim } =>
                write!(f, "InitMismatch: initial point of block {} has length {}, expected {} (block dimension)", block, len, dim),
            SolverError::InvalidParam(what) =>
                write!(f, "InvalidParam: {}", what),
        }
    }
}

impl std::error::Error for SolverError {}
