//! Config subcommand handlers.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use downclient_config::{ConfigScope, DownclientConfig, FileScope};
use downclient_core::DownloadService;

use crate::cli::{ConfigArgs, ConfigCommand, ConfigSetArgs, GlobalOpts, Setting};
use crate::error::CliError;
use crate::output::{self, DetailRow};

const NOT_SET: &str = "(not set)";
const MASK: &str = "********";

// ── Show ────────────────────────────────────────────────────────────

/// Stored settings as shown to the user. The password is never echoed.
#[derive(Debug, Serialize)]
struct SettingsView {
    path: String,
    base_url: Option<String>,
    username: Option<String>,
    password: Option<&'static str>,
    category: Option<String>,
    rename_torrents: bool,
}

impl SettingsView {
    fn load(config: &DownclientConfig, scope: &FileScope) -> Self {
        Self {
            path: scope.path().display().to_string(),
            base_url: config.get_base_url(scope).filter(|v| !v.is_empty()),
            username: config.get_username(scope).filter(|v| !v.is_empty()),
            password: config
                .get_password(scope)
                .and_then(|p| (!p.expose_secret().is_empty()).then_some(MASK)),
            category: config.get_category(scope),
            rename_torrents: config.get_rename_torrents(scope),
        }
    }

    fn detail(&self) -> String {
        let or_unset = |v: Option<&str>| v.unwrap_or(NOT_SET).to_owned();
        output::render_detail(&[
            DetailRow::new("Config file", self.path.clone()),
            DetailRow::new("Base URL", or_unset(self.base_url.as_deref())),
            DetailRow::new("Username", or_unset(self.username.as_deref())),
            DetailRow::new("Password", or_unset(self.password)),
            DetailRow::new("Category", or_unset(self.category.as_deref())),
            DetailRow::new("Rename torrents", if self.rename_torrents { "yes" } else { "no" }),
        ])
    }

    fn plain(&self) -> String {
        [
            ("base-url", self.base_url.as_deref()),
            ("username", self.username.as_deref()),
            ("password", self.password),
            ("category", self.category.as_deref()),
            (
                "rename-torrents",
                Some(if self.rename_torrents { "1" } else { "0" }),
            ),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={}", value.unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
    }
}

// ── Set ─────────────────────────────────────────────────────────────

fn require_value(args: &ConfigSetArgs) -> Result<&str, CliError> {
    args.value.as_deref().ok_or_else(|| CliError::Validation {
        field: args.key.cli_name().into(),
        reason: "a value is required".into(),
    })
}

/// Daemon URLs must be absolute http(s) URLs.
fn validate_base_url(value: &str) -> Result<(), CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: Setting::BaseUrl.cli_name().into(),
        reason,
    };
    let url = url::Url::parse(value).map_err(|e| invalid(format!("{e}: {value}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}', expected http or https"))),
    }
}

/// Accepts 1/0, true/false, yes/no, on/off.
fn parse_flag(value: &str) -> Result<bool, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CliError::Validation {
            field: Setting::RenameTorrents.cli_name().into(),
            reason: format!("expected 1 or 0, got '{value}'"),
        }),
    }
}

fn set<S: ConfigScope + ?Sized>(
    config: &DownclientConfig,
    scope: &mut S,
    args: &ConfigSetArgs,
) -> Result<(), CliError> {
    match args.key {
        Setting::BaseUrl => {
            let value = require_value(args)?;
            validate_base_url(value)?;
            config.set_base_url(scope, value)?;
        }
        Setting::Username => config.set_username(scope, require_value(args)?)?,
        Setting::Password => {
            let password = match args.value.clone() {
                Some(value) => value,
                None => rpassword::prompt_password("Password: ")?,
            };
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: Setting::Password.cli_name().into(),
                    reason: "password cannot be empty".into(),
                });
            }
            config.set_password(scope, &SecretString::from(password))?;
        }
        // No value clears the category.
        Setting::Category => config.set_category(scope, args.value.as_deref().unwrap_or_default())?,
        Setting::RenameTorrents => {
            config.set_rename_torrents(scope, parse_flag(require_value(args)?)?)?;
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    args: ConfigArgs,
    service: &DownloadService,
    scope: &mut FileScope,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = service.registry().config();
    match args.command {
        ConfigCommand::Show => {
            let view = SettingsView::load(config, scope);
            let out = output::render_single(global.output, &view, SettingsView::detail, SettingsView::plain)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set(set_args) => {
            set(config, scope, &set_args)?;
            if !global.quiet {
                eprintln!("✓ {} updated in {}", set_args.key.cli_name(), scope.path().display());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&scope.path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
