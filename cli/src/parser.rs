use clap::{Parser, Subcommand};
use sandbox_paths::{WorkspaceAccess, WorkspaceInfo};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sandbox-paths")]
#[command(version)]
#[command(about = "Translate sandbox container paths into host paths", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate container paths using an explicit workspace mapping
    Resolve {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Paths as seen inside the sandbox
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Rewrite path fields of a JSON parameter object
    Rewrite {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Parameter name to rewrite (can be specified multiple times)
        #[arg(long = "key", value_name = "NAME")]
        keys: Vec<String>,

        /// Path to a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON object to rewrite (read from stdin if omitted)
        params: Option<String>,
    },
    /// Resolve a session's workspace from a session table and translate paths
    Session {
        /// JSON file mapping session keys to workspace metadata
        #[arg(long, value_name = "FILE")]
        sessions: PathBuf,

        /// Path to a JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Session key to look up
        session_key: String,

        /// Paths as seen inside the sandbox
        paths: Vec<String>,
    },
}

/// Workspace mapping given directly on the command line.
#[derive(clap::Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Host directory backing the sandbox workspace
    #[arg(long, value_name = "PATH")]
    pub workspace_dir: String,

    /// Workspace root as seen inside the sandbox
    #[arg(long, value_name = "PATH", default_value = "/workspace")]
    pub container_workdir: String,

    /// Workspace access mode (ro, rw)
    #[arg(long, default_value = "rw")]
    pub access: WorkspaceAccess,
}

impl From<WorkspaceArgs> for WorkspaceInfo {
    fn from(args: WorkspaceArgs) -> Self {
        WorkspaceInfo::new(args.workspace_dir, args.container_workdir, args.access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let args = Args::try_parse_from([
            "sandbox-paths",
            "resolve",
            "--workspace-dir",
            "/opt/sb/agent-1",
            "/workspace/a.txt",
            "/workspace/b.txt",
        ])
        .unwrap();

        let Command::Resolve { workspace, paths } = args.command else {
            panic!("expected resolve command");
        };
        let workspace = WorkspaceInfo::from(workspace);
        assert_eq!(workspace.container_workdir, "/workspace");
        assert_eq!(workspace.workspace_access, WorkspaceAccess::ReadWrite);
        assert_eq!(paths, vec!["/workspace/a.txt", "/workspace/b.txt"]);
    }

    #[test]
    fn test_parse_rewrite_keys() {
        let args = Args::try_parse_from([
            "sandbox-paths",
            "rewrite",
            "--workspace-dir",
            "/host",
            "--access",
            "ro",
            "--key",
            "outputDir",
            "--key",
            "path",
            r#"{"path":"/workspace/x"}"#,
        ])
        .unwrap();

        let Command::Rewrite {
            workspace,
            keys,
            params,
            ..
        } = args.command
        else {
            panic!("expected rewrite command");
        };
        assert_eq!(workspace.access, WorkspaceAccess::ReadOnly);
        assert_eq!(keys, vec!["outputDir", "path"]);
        assert!(params.is_some());
    }

    #[test]
    fn test_invalid_access_rejected() {
        let result = Args::try_parse_from([
            "sandbox-paths",
            "resolve",
            "--workspace-dir",
            "/host",
            "--access",
            "rwx",
            "/workspace/a",
        ]);
        assert!(result.is_err());
    }
}
