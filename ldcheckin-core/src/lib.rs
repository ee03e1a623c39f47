pub mod artifact;
pub mod checkin;
pub mod config;
pub mod constants;
pub mod cookie;
pub mod report;
pub mod target;

pub use checkin::{CheckinOutcome, CheckinRequest, ExitStatus, run_checkin};
pub use config::{ActionIdPair, ActionMap};
