//! Dashboard client: session credential, gauge state and polling through the offline worker

pub mod dashboard;
pub mod session;

pub use dashboard::{
    poll_once, CurrentAndMax, DashboardController, Gauges, PollOutcome, Reading, YieldEntry,
};
pub use session::{SessionError, SessionScope, SessionStore};
