//! Clap derive structures for the `downclient` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use downclient_config::ConfigKey;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// downclient -- drive a qBittorrent daemon from the command line
#[derive(Debug, Parser)]
#[command(
    name = "downclient",
    version,
    about = "Submit and monitor downloads on a qBittorrent daemon",
    long_about = "Submit and monitor downloads on a qBittorrent daemon.\n\n\
        Talks to the daemon's WebUI API (v2) with the credentials stored by\n\
        `downclient config set`.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path
    #[arg(long, env = "DOWNCLIENT_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DOWNCLIENT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DOWNCLIENT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "DOWNCLIENT_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or change the stored daemon settings
    Config(ConfigArgs),

    /// Log in with the stored credentials and report the outcome
    Test,

    /// Submit a download by URL or magnet link
    Add(AddArgs),

    /// Show the properties of a torrent
    Info(InfoArgs),

    /// Follow a torrent's progress until it completes
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the stored settings (password masked)
    Show,

    /// Change one setting
    Set(ConfigSetArgs),

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Setting to change
    pub key: Setting,

    /// New value; prompted for when setting the password
    pub value: Option<String>,
}

/// CLI names of the stored settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Setting {
    /// Daemon WebUI URL, e.g. http://localhost:8080
    BaseUrl,
    Username,
    Password,
    /// Category attached to new downloads
    Category,
    /// Forward the requested name with new downloads (1/0, true/false)
    RenameTorrents,
}

impl Setting {
    pub fn from_key(key: ConfigKey) -> Self {
        match key {
            ConfigKey::BaseUrl => Self::BaseUrl,
            ConfigKey::Username => Self::Username,
            ConfigKey::Password => Self::Password,
            ConfigKey::Category => Self::Category,
            ConfigKey::RenameTorrents => Self::RenameTorrents,
        }
    }

    /// Name as typed on the command line.
    pub fn cli_name(self) -> &'static str {
        match self {
            Self::BaseUrl => "base-url",
            Self::Username => "username",
            Self::Password => "password",
            Self::Category => "category",
            Self::RenameTorrents => "rename-torrents",
        }
    }
}

impl From<Setting> for ConfigKey {
    fn from(setting: Setting) -> Self {
        match setting {
            Setting::BaseUrl => Self::BaseUrl,
            Setting::Username => Self::Username,
            Setting::Password => Self::Password,
            Setting::Category => Self::Category,
            Setting::RenameTorrents => Self::RenameTorrents,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// http(s) URL of a .torrent file, or a magnet link
    pub url: String,

    /// Name to give the download (sent only when rename-torrents is on)
    #[arg(long)]
    pub rename: Option<String>,

    /// Category for this download, instead of the stored one
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Torrent info hash
    pub hash: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Torrent info hash
    pub hash: String,

    /// Seconds between refreshes
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn setting_names_match_value_enum() {
        for setting in Setting::value_variants() {
            let name = setting.to_possible_value().map(|v| v.get_name().to_owned());
            assert_eq!(name.as_deref(), Some(setting.cli_name()));
            assert_eq!(Setting::from_key((*setting).into()), *setting);
        }
    }
}
