pub mod actions;
pub mod asset;
pub mod blob;
pub mod checklist;
pub mod config;
pub mod error;
pub mod identity;
pub mod io;
pub mod iteration;
pub mod paths;
pub mod plan;
pub mod project;
pub mod seed;
pub mod status;
pub mod store;
pub mod time_log;
pub mod types;

pub use error::{Result, WeekendError};
