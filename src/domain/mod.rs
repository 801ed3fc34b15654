pub mod config_validation;
pub mod contract;
pub mod error;
pub mod goal;
pub mod parameters;
pub mod period;
pub mod policy;
pub mod presets;
pub mod projection;
