mod bo_config;
mod bo_solver;
mod bo_state;

pub use bo_config::*;
pub use bo_solver::*;
pub use bo_state::*;
