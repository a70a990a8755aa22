//! Container-to-host path translation.
//!
//! Translation is a plain string prefix rewrite. Nothing here touches the
//! filesystem: paths are not checked for existence and `..` or symlink
//! components are carried through untouched.

use crate::workspace::WorkspaceInfo;
use std::path::{is_separator, MAIN_SEPARATOR};

/// Translate a path as seen inside a sandbox into the matching host path.
///
/// With no workspace every path is already a host path and comes back
/// unchanged. Otherwise a path starting with `container_workdir` has that
/// prefix replaced by `workspace_dir`; any other path is returned as-is.
///
/// ```
/// use sandbox_paths::{resolve_sandbox_path, WorkspaceAccess, WorkspaceInfo};
///
/// let ws = WorkspaceInfo::new("/opt/sandboxes/agent-1", "/workspace", WorkspaceAccess::ReadWrite);
/// assert_eq!(
///     resolve_sandbox_path("/workspace/notes.md", Some(&ws)),
///     "/opt/sandboxes/agent-1/notes.md"
/// );
/// assert_eq!(resolve_sandbox_path("/etc/hosts", Some(&ws)), "/etc/hosts");
/// assert_eq!(resolve_sandbox_path("/workspace/notes.md", None), "/workspace/notes.md");
/// ```
pub fn resolve_sandbox_path(file_path: &str, workspace: Option<&WorkspaceInfo>) -> String {
    match workspace {
        Some(workspace) => workspace.to_host_path(file_path),
        None => file_path.to_string(),
    }
}

/// Join the host root with whatever followed the container prefix.
///
/// An empty remainder yields `base` exactly. A remainder made only of
/// separators keeps a single trailing separator on the result.
pub(crate) fn join_host_path(base: &str, rest: &str) -> String {
    if rest.is_empty() {
        return base.to_string();
    }

    let head = base.trim_end_matches(is_separator);
    let tail = rest.trim_start_matches(is_separator);

    let mut joined = String::with_capacity(head.len() + tail.len() + 1);
    joined.push_str(head);
    joined.push(MAIN_SEPARATOR);
    joined.push_str(tail);
    joined
}
