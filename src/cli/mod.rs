//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod build_chain;
mod config;
mod logging;
mod version;

pub use build_chain::{BuildChainArgs, execute};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use version::display_version;
