//! Small helpers shared by every crate in the workspace.

#[macro_use]
extern crate log;

mod logger;
mod tags;
mod time;

pub use crate::logger::setup as setup_logger;
pub use crate::tags::Tags;
pub use crate::time::{elapsed_seconds, prettyprint_time, prettyprint_usize, Timer};

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.2;

// Thanks https://stackoverflow.com/a/49806368
#[macro_export]
macro_rules! skip_fail {
    ($res:expr) => {
        match $res {
            Some(val) => val,
            None => {
                continue;
            }
        }
    };
}
