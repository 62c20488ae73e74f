//! `downclient add` and `downclient info`.

use tracing::warn;

use downclient_config::FileScope;
use downclient_core::{DownloadService, Torrent};

use crate::cli::{AddArgs, GlobalOpts, InfoArgs};
use crate::error::CliError;
use crate::output::{self, DetailRow};

// ── Add ─────────────────────────────────────────────────────────────

pub async fn add(
    args: AddArgs,
    service: &DownloadService,
    scope: &FileScope,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.rename.is_some() && !service.registry().config().get_rename_torrents(scope) {
        warn!("renaming is disabled, --rename ignored (enable with: downclient config set rename-torrents 1)");
    }

    match args.category.as_deref() {
        Some(category) => {
            service
                .start_download_in(scope, &args.url, category, args.rename.as_deref())
                .await?;
        }
        None => {
            service
                .start_download(scope, &args.url, args.rename.as_deref())
                .await?;
        }
    }

    if !global.quiet {
        eprintln!("✓ Submitted {}", args.url);
    }
    Ok(())
}

// ── Info ────────────────────────────────────────────────────────────

pub(crate) fn torrent_detail(t: &Torrent) -> String {
    output::render_detail(&[
        DetailRow::new("Progress", output::fmt_percent(t.progress())),
        DetailRow::new("Size", output::fmt_bytes(t.total_size)),
        DetailRow::new("Downloaded", output::fmt_bytes(t.total_downloaded)),
        DetailRow::new("Uploaded", output::fmt_bytes(t.total_uploaded)),
        DetailRow::new("Ratio", format!("{:.2}", t.share_ratio)),
        DetailRow::new("Download speed", output::fmt_rate(t.dl_speed)),
        DetailRow::new("Upload speed", output::fmt_rate(t.up_speed)),
        DetailRow::new("ETA", output::fmt_eta(t.eta)),
        DetailRow::new("Seeds", format!("{} ({} total)", t.seeds, t.seeds_total)),
        DetailRow::new("Peers", format!("{} ({} total)", t.peers, t.peers_total)),
        DetailRow::new("Pieces", format!("{}/{}", t.pieces_have, t.pieces_num)),
        DetailRow::new("Save path", t.save_path.clone()),
        DetailRow::new("Private", if t.is_private { "yes" } else { "no" }),
        DetailRow::new("Complete", if t.is_complete() { "yes" } else { "no" }),
    ])
}

/// Progress percentage without the sign, for scripts.
pub(crate) fn torrent_plain(t: &Torrent) -> String {
    format!("{:.1}", t.progress() * 100.0)
}

pub async fn info(
    args: &InfoArgs,
    service: &DownloadService,
    scope: &FileScope,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let torrent = service.torrent(scope, &args.hash).await?;
    let out = output::render_single(global.output, &torrent, torrent_detail, torrent_plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
