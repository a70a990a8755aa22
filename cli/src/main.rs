use clap::Parser;
use sandbox_paths::WorkspaceInfo;
use sandbox_paths_cli::{
    cmd,
    parser::{Args, Command},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::ERROR.into())
        .from_env_lossy();
    if let Err(e) = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(default_env_filter)
        .try_init()
    {
        eprintln!("Unable to setup tracing appender: {e:?}");
    }

    let mut stdout = std::io::stdout().lock();
    let result = match args.command {
        Command::Resolve { workspace, paths } => {
            cmd::handle_resolve_command(&mut stdout, &WorkspaceInfo::from(workspace), &paths)
        }
        Command::Rewrite {
            workspace,
            keys,
            config,
            params,
        } => cmd::handle_rewrite_command(
            &mut stdout,
            std::io::stdin().lock(),
            &WorkspaceInfo::from(workspace),
            keys,
            config.as_deref(),
            params,
        ),
        Command::Session {
            sessions,
            config,
            session_key,
            paths,
        } => {
            cmd::handle_session_command(
                &mut stdout,
                &sessions,
                config.as_deref(),
                &session_key,
                &paths,
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
