//! Process-level plumbing shared by the binaries: command line and
//! environment configuration, and logger setup.

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::Logger;
