pub mod attendance;
pub mod config;
pub mod profile;
pub mod schedule;
pub mod subject;
pub mod watch;
