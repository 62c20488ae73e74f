//! `downclient watch`: poll a torrent until it completes or Ctrl-C.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use downclient_config::FileScope;
use downclient_core::{CoreError, DownloadService, ProgressPoller, Torrent};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

fn progress_line(hash: &str, t: &Torrent) -> String {
    let short = hash.get(..8).unwrap_or(hash);
    format!(
        "{short}  {:>6}  ↓ {:>11}  ↑ {:>11}  ETA {}",
        output::fmt_percent(t.progress()),
        output::fmt_rate(t.dl_speed),
        output::fmt_rate(t.up_speed),
        output::fmt_eta(t.eta),
    )
}

fn render_tick(format: OutputFormat, hash: &str, t: &Torrent) -> Result<String, CliError> {
    match format {
        // One object per line, even when pretty JSON was asked for.
        OutputFormat::Json | OutputFormat::JsonCompact => {
            output::render_single(OutputFormat::JsonCompact, t, |_| String::new(), |_| String::new())
        }
        OutputFormat::Plain => Ok(super::torrents::torrent_plain(t)),
        OutputFormat::Table => Ok(progress_line(hash, t)),
    }
}

/// Whether polling can continue after this error.
fn is_fatal(err: &CoreError) -> bool {
    err.is_not_found() || err.is_config_error() || !(err.is_transient() || err.is_auth_error())
}

pub async fn handle(
    args: WatchArgs,
    service: &DownloadService,
    scope: &FileScope,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.output;
    let quiet = global.quiet;

    // First fetch up front so configuration and lookup errors surface
    // before the loop starts.
    let first = service.torrent(scope, &args.hash).await?;
    output::print_output(&render_tick(format, &args.hash, &first)?, quiet);
    if first.is_complete() {
        return Ok(());
    }

    let failure: Arc<Mutex<Option<CliError>>> = Arc::new(Mutex::new(None));
    let tick = {
        let service = service.clone();
        let scope = Arc::new(scope.clone());
        let hash = Arc::<str>::from(args.hash.as_str());
        let failure = Arc::clone(&failure);
        move || {
            let service = service.clone();
            let scope = Arc::clone(&scope);
            let hash = Arc::clone(&hash);
            let failure = Arc::clone(&failure);
            async move {
                let outcome = match service.torrent(scope.as_ref(), &hash).await {
                    Ok(t) => render_tick(format, &hash, &t).map(|line| {
                        output::print_output(&line, quiet);
                        t.is_complete()
                    }),
                    Err(e) if is_fatal(&e) => Err(e.into()),
                    Err(e) => {
                        warn!(error = %e, "refresh failed, retrying");
                        Ok(false)
                    }
                };
                match outcome {
                    Ok(false) => ControlFlow::Continue(()),
                    Ok(true) => ControlFlow::Break(()),
                    Err(e) => {
                        *failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(e);
                        ControlFlow::Break(())
                    }
                }
            }
        }
    };

    let poller = ProgressPoller::spawn(Duration::from_secs(args.interval), tick);
    let cancel = poller.cancel_token();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, stopping watch");
            cancel.cancel();
        }
    });

    poller.join().await;
    signal.abort();

    let failed = failure.lock().unwrap_or_else(PoisonError::into_inner).take();
    failed.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use downclient_api::Error as ApiError;

    use super::*;

    #[test]
    fn transient_and_auth_errors_keep_polling() {
        assert!(!is_fatal(&CoreError::Api(ApiError::Timeout { timeout_secs: 30 })));
        assert!(!is_fatal(&CoreError::Api(ApiError::LoginUnauthorized)));
    }

    #[test]
    fn lookup_and_config_errors_stop_polling() {
        assert!(is_fatal(&CoreError::Api(ApiError::TorrentNotFound {
            hash: "abc".into()
        })));
        assert!(is_fatal(&CoreError::NotConfigured));
        assert!(is_fatal(&CoreError::Api(ApiError::LoginIpBlocked)));
    }
}
