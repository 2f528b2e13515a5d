//! Test helpers shared by the workspace crates.

pub mod log;

pub use log::init_global_test_logging;
