use anyhow::Result;
use sandbox_paths::{resolve_sandbox_path, SessionContextCache, StaticResolver};
use std::path::Path;

use crate::cmd::load_config;

/// Look up a session's workspace and translate paths with it.
///
/// Prints the workspace as JSON (`null` when the session has no sandbox),
/// followed by one translated path per line.
pub async fn handle_session_command(
    stdout: &mut impl std::io::Write,
    sessions_path: &Path,
    config_path: Option<&Path>,
    session_key: &str,
    paths: &[String],
) -> Result<()> {
    let config = load_config(config_path)?;
    let resolver = StaticResolver::from_file(sessions_path)?;
    tracing::debug!(sessions = resolver.len(), "loaded session table");

    let cache = SessionContextCache::with_options(resolver, (), &config.cache);
    let workspace = cache.get_context(Some(session_key)).await?;

    serde_json::to_writer(&mut *stdout, &workspace.as_deref())?;
    writeln!(stdout)?;
    for path in paths {
        writeln!(stdout, "{}", resolve_sandbox_path(path, workspace.as_deref()))?;
    }
    Ok(())
}
