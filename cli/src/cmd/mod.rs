pub mod resolve;
pub mod rewrite;
pub mod session;

use anyhow::{Context, Result};
use sandbox_paths::SandboxPathsConfig;
use std::path::Path;

pub use resolve::handle_resolve_command;
pub use rewrite::handle_rewrite_command;
pub use session::handle_session_command;

/// Load the config file if one was given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<SandboxPathsConfig> {
    match path {
        Some(path) => SandboxPathsConfig::from_file(path).context("Failed to load config"),
        None => Ok(SandboxPathsConfig::default()),
    }
}
