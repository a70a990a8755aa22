use anyhow::Result;
use sandbox_paths::{resolve_sandbox_path, WorkspaceInfo};

/// Print the host path for each container path, one per line.
pub fn handle_resolve_command(
    stdout: &mut impl std::io::Write,
    workspace: &WorkspaceInfo,
    paths: &[String],
) -> Result<()> {
    for path in paths {
        writeln!(stdout, "{}", resolve_sandbox_path(path, Some(workspace)))?;
    }
    Ok(())
}
