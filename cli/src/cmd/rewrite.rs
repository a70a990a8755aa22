use anyhow::{Context, Result};
use sandbox_paths::{rewrite_params, ParamBag, PathKeys, WorkspaceInfo};
use serde_json::Value;
use std::path::Path;

use crate::cmd::load_config;

/// Rewrite the path fields of a JSON object and print the result.
///
/// Keys given with `--key` take precedence over the config file's
/// `path_keys`.
pub fn handle_rewrite_command(
    stdout: &mut impl std::io::Write,
    stdin: impl std::io::Read,
    workspace: &WorkspaceInfo,
    keys: Vec<String>,
    config_path: Option<&Path>,
    params: Option<String>,
) -> Result<()> {
    let keys = if keys.is_empty() {
        load_config(config_path)?.path_keys
    } else {
        PathKeys::new(keys)
    };

    let raw = match params {
        Some(params) => params,
        None => std::io::read_to_string(stdin).context("Failed to read parameters from stdin")?,
    };
    let params = parse_param_bag(&raw)?;

    let rewritten = rewrite_params(&params, Some(workspace), &keys);
    serde_json::to_writer(&mut *stdout, rewritten.as_ref())?;
    writeln!(stdout)?;
    Ok(())
}

fn parse_param_bag(raw: &str) -> Result<ParamBag> {
    match serde_json::from_str::<Value>(raw).context("Parameters are not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Parameters must be a JSON object"),
    }
}
