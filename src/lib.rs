//! accrue: quarterly gold accumulation projection engine.
//!
//! Hexagonal architecture: the pure calculation core lives in [`domain`],
//! port traits in [`ports`], concrete INI/CSV/Typst implementations in
//! [`adapters`], and the command-line front-end in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
