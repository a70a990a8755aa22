//! Rewriting of path-bearing fields in tool parameter bags.

use crate::workspace::WorkspaceInfo;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::is_separator;

/// An untyped bag of tool parameters as received from a caller.
pub type ParamBag = Map<String, Value>;

/// Field names that are known to carry filesystem paths.
const DEFAULT_PATH_KEYS: [&str; 3] = ["filePath", "path", "media"];

/// Allow-list of parameter names whose values may be rewritten.
///
/// Anything not listed here is treated as opaque and never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKeys(Vec<String>);

impl PathKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Extend the allow-list with one more field name.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.0.contains(&key) {
            self.0.push(key);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PathKeys {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_KEYS)
    }
}

/// Translate the path-bearing fields of `params` into host paths.
///
/// Only string values under one of `keys` that start with a path separator
/// are rewritten; numbers, booleans, nested values and relative paths pass
/// through. Without a workspace the input is handed back borrowed. With one,
/// a new bag is returned and `params` is left untouched.
pub fn rewrite_params<'a>(
    params: &'a ParamBag,
    workspace: Option<&WorkspaceInfo>,
    keys: &PathKeys,
) -> Cow<'a, ParamBag> {
    let Some(workspace) = workspace else {
        return Cow::Borrowed(params);
    };

    let mut rewritten = params.clone();
    for key in keys.iter() {
        let Some(Value::String(value)) = rewritten.get_mut(key) else {
            continue;
        };
        if !value.starts_with(is_separator) {
            continue;
        }
        let host_path = workspace.to_host_path(value);
        if host_path != *value {
            tracing::trace!(key, from = %value, to = %host_path, "rewrote sandbox path");
            *value = host_path;
        }
    }

    Cow::Owned(rewritten)
}

/// [`rewrite_params`] with the default `filePath`, `path` and `media` keys.
pub fn rewrite_default_params<'a>(
    params: &'a ParamBag,
    workspace: Option<&WorkspaceInfo>,
) -> Cow<'a, ParamBag> {
    rewrite_params(params, workspace, &PathKeys::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceAccess;
    use serde_json::json;

    fn test_workspace() -> WorkspaceInfo {
        WorkspaceInfo::new(
            "/opt/openclaw/sandboxes/agent-test-123",
            "/workspace",
            WorkspaceAccess::ReadWrite,
        )
    }

    fn bag(value: Value) -> ParamBag {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_rewrites_only_path_fields() {
        let ws = test_workspace();
        let params = bag(json!({
            "filePath": "/workspace/a.txt",
            "count": 42,
            "flag": true,
        }));

        let out = rewrite_default_params(&params, Some(&ws));
        assert_eq!(
            out["filePath"],
            "/opt/openclaw/sandboxes/agent-test-123/a.txt"
        );
        assert_eq!(out["count"], 42);
        assert_eq!(out["flag"], true);
    }

    #[test]
    fn test_all_default_keys() {
        let ws = test_workspace();
        let params = bag(json!({
            "filePath": "/workspace/a",
            "path": "/workspace/b",
            "media": "/workspace/c.png",
            "target": "/workspace/d",
        }));

        let out = rewrite_default_params(&params, Some(&ws));
        assert_eq!(out["filePath"], "/opt/openclaw/sandboxes/agent-test-123/a");
        assert_eq!(out["path"], "/opt/openclaw/sandboxes/agent-test-123/b");
        assert_eq!(out["media"], "/opt/openclaw/sandboxes/agent-test-123/c.png");
        // Not in the allow-list
        assert_eq!(out["target"], "/workspace/d");
    }

    #[test]
    fn test_relative_paths_untouched() {
        let ws = test_workspace();
        let params = bag(json!({ "filePath": "./relative.txt", "path": "workspace/x" }));

        let out = rewrite_default_params(&params, Some(&ws));
        assert_eq!(out["filePath"], "./relative.txt");
        assert_eq!(out["path"], "workspace/x");
    }

    #[test]
    fn test_non_string_values_untouched() {
        let ws = test_workspace();
        let params = bag(json!({
            "path": ["/workspace/a"],
            "media": { "src": "/workspace/b" },
            "filePath": null,
        }));

        let out = rewrite_default_params(&params, Some(&ws));
        assert_eq!(*out, params);
    }

    #[test]
    fn test_host_paths_untouched() {
        let ws = test_workspace();
        let params = bag(json!({ "path": "/etc/hosts" }));
        let out = rewrite_default_params(&params, Some(&ws));
        assert_eq!(out["path"], "/etc/hosts");
    }

    #[test]
    fn test_no_workspace_borrows_input() {
        let params = bag(json!({ "filePath": "/workspace/a.txt", "n": 1 }));
        let out = rewrite_default_params(&params, None);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(*out, params);
    }

    #[test]
    fn test_input_not_mutated() {
        let ws = test_workspace();
        let params = bag(json!({ "filePath": "/workspace/a.txt", "n": 1 }));
        let snapshot = params.clone();

        let out = rewrite_default_params(&params, Some(&ws));
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(params, snapshot);
        assert_ne!(*out, params);
    }

    #[test]
    fn test_second_pass_without_workspace_is_noop() {
        let ws = test_workspace();
        let params = bag(json!({ "filePath": "/workspace/a.txt", "path": "rel" }));

        let once = rewrite_default_params(&params, Some(&ws)).into_owned();
        let twice = rewrite_default_params(&once, None);
        assert_eq!(*twice, once);
    }

    #[test]
    fn test_custom_keys() {
        let ws = test_workspace();
        let params = bag(json!({ "filePath": "/workspace/a", "outputDir": "/workspace/out" }));
        let keys = PathKeys::new(["outputDir"]);

        let out = rewrite_params(&params, Some(&ws), &keys);
        assert_eq!(out["filePath"], "/workspace/a");
        assert_eq!(out["outputDir"], "/opt/openclaw/sandboxes/agent-test-123/out");
    }

    #[test]
    fn test_path_keys() {
        let keys = PathKeys::default().with_key("outputDir").with_key("path");
        assert!(keys.contains("outputDir"));
        assert_eq!(keys.iter().count(), 4);
        assert!(PathKeys::new(Vec::<String>::new()).is_empty());

        let parsed: PathKeys = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(parsed, PathKeys::new(["a", "b"]));
    }
}
