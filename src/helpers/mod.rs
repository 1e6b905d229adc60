mod time;

pub use time::format_epoch;

pub mod base_path;
