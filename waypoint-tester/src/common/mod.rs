pub mod util;

pub use util::{parse_durations, parse_seeds};
