mod cache;
mod dashboard;
mod serve;
mod session;

pub use cache::cache_clear;
pub use dashboard::dashboard;
pub use serve::serve;
pub use session::{login, logout};
