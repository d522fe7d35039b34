mod set_par_by_env;
pub use set_par_by_env::*;

mod spy_series;
pub use spy_series::*;
