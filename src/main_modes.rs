mod claimer_mode;

pub use claimer_mode::{run_check, run_once, run_scheduled};
