pub mod config;
pub mod context;
pub mod params;
pub mod resolver;
pub mod translate;
pub mod workspace;

pub use config::{CacheConfig, ConfigError, SandboxPathsConfig};
pub use context::{
    clock::{Clock, ManualClock, TokioClock},
    CachedWorkspace, ContextError, SessionContextCache,
};
pub use params::{rewrite_default_params, rewrite_params, ParamBag, PathKeys};
pub use resolver::{StaticResolver, WorkspaceResolver};
pub use translate::resolve_sandbox_path;
pub use workspace::{WorkspaceAccess, WorkspaceInfo};
