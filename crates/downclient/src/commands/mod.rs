//! Command dispatch: bridges CLI args -> download service -> output formatting.

pub mod config_cmd;
pub mod connection;
pub mod torrents;
pub mod watch;

use downclient_config::FileScope;
use downclient_core::DownloadService;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that works against the stored configuration.
pub async fn dispatch(
    cmd: Command,
    service: &DownloadService,
    scope: &mut FileScope,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Config(args) => config_cmd::handle(args, service, scope, global),
        Command::Test => connection::handle(service, scope, global).await,
        Command::Add(args) => torrents::add(args, service, scope, global).await,
        Command::Info(args) => torrents::info(&args, service, scope, global).await,
        Command::Watch(args) => watch::handle(args, service, scope, global).await,
        // Completions are generated before any config is opened
        Command::Completions(_) => Ok(()),
    }
}
