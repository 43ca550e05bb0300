//! The driver (§6 "External interfaces"): command-line parsing, project
//! configuration, and orchestration of the resolve → analyze → emit →
//! toolchain pipeline.

pub mod cli;
pub mod driver;
pub mod settings;
