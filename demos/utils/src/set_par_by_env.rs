use proxsplit::prelude::SolverParam;
use num_traits::Float;
use num_traits::Num;

pub fn num_by_env<N: Num + std::fmt::Display>(e: &str) -> Option<N>
{
    if let Some(v) = std::env::var(e).ok()
                     .and_then(|s| {N::from_str_radix(&s, 10).ok()}) {
        log::info!("{}: {}", e, v);
        Some(v)
    }
    else {
        None
    }
}

pub fn flag_by_env(e: &str) -> Option<bool>
{
    num_by_env::<u8>(e).map(|v| v != 0)
}

pub fn set_par_by_env<F: Float + std::fmt::Display>(p: &mut SolverParam<F>)
{
    p.max_iter = num_by_env("MAX_ITER").or(p.max_iter);
    p.rho = num_by_env("RHO").unwrap_or(p.rho);
    p.eps_abs = num_by_env("EPS_ABS").unwrap_or(p.eps_abs);
    p.eps_rel = num_by_env("EPS_REL").unwrap_or(p.eps_rel);
    p.anderson = flag_by_env("ANDERSON").unwrap_or(p.anderson);
    p.m_accel = num_by_env("M_ACCEL").unwrap_or(p.m_accel);
    p.eps_zero = num_by_env("EPS_ZERO").unwrap_or(p.eps_zero);
    p.log_period = num_by_env("LOG_PERIOD").unwrap_or(p.log_period);
}

/// Backend of the proximal QP subproblems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QpBackendKind
{
    Clarabel,
    Totsu,
}

/// `QP_BACKEND=totsu` selects [`QpBackendKind::Totsu`], otherwise [`QpBackendKind::Clarabel`].
pub fn qp_backend_by_env() -> QpBackendKind
{
    match std::env::var("QP_BACKEND").ok().as_deref() {
        Some("totsu") => {
            log::info!("QP_BACKEND: totsu");
            QpBackendKind::Totsu
        },
        _ => QpBackendKind::Clarabel,
    }
}
