//! Port traits (hexagonal architecture boundaries).

pub mod config_port;
pub mod report_port;
