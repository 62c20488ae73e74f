//! `downclient test`: log in with the stored credentials.

use downclient_config::FileScope;
use downclient_core::{ConnectionReport, DownloadService};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const AUTH_REASONS: [&str; 2] = ["Unauthorized", "IP blocked. Too many login attempts."];

pub async fn handle(
    service: &DownloadService,
    scope: &FileScope,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = service.test_connection(scope).await?;
    let base_url = service
        .registry()
        .config()
        .get_base_url(scope)
        .unwrap_or_default();
    let color = output::should_color(global.color);

    let detail = |_: &ConnectionReport| {
        format!("{} Connected to {base_url}", output::status_mark(true, color))
    };
    let plain = |r: &ConnectionReport| {
        if r.success {
            "ok".to_owned()
        } else {
            r.reason.clone()
        }
    };

    // A failed test is still reported on stdout for scripting formats;
    // the table view leaves it to the error diagnostic.
    if report.success || !matches!(global.output, OutputFormat::Table) {
        let out = output::render_single(global.output, &report, detail, plain)?;
        output::print_output(&out, global.quiet);
    }

    if report.success {
        Ok(())
    } else {
        Err(CliError::TestFailed {
            auth: AUTH_REASONS.contains(&report.reason.as_str()),
            reason: report.reason,
        })
    }
}
