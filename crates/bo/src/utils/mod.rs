mod misc;
mod run_recorder;

pub use misc::*;
pub use run_recorder::*;
