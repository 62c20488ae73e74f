// Wire models for the daemon API.
//
// `Torrent` mirrors `GET /api/v2/torrents/properties` field for field.
// Integers are signed: the daemon reports -1 for "unlimited" and "never".

use serde::{Deserialize, Serialize};

/// Transfer statistics, paths, timing, and privacy flag of one torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torrent {
    /// Torrent save path
    pub save_path: String,
    /// Creation date (Unix timestamp)
    pub creation_date: i64,
    /// Piece size (bytes)
    pub piece_size: i64,
    pub comment: String,
    /// Total data wasted (bytes)
    pub total_wasted: i64,
    /// Total data uploaded (bytes)
    pub total_uploaded: i64,
    /// Data uploaded this session (bytes)
    pub total_uploaded_session: i64,
    /// Total data downloaded (bytes)
    pub total_downloaded: i64,
    /// Data downloaded this session (bytes)
    pub total_downloaded_session: i64,
    /// Upload limit (bytes/s)
    pub up_limit: i64,
    /// Download limit (bytes/s)
    pub dl_limit: i64,
    /// Elapsed time (seconds)
    pub time_elapsed: i64,
    /// Elapsed time while complete (seconds)
    pub seeding_time: i64,
    pub nb_connections: i64,
    pub nb_connections_limit: i64,
    pub share_ratio: f64,
    /// When the torrent was added (Unix timestamp)
    pub addition_date: i64,
    /// Completion date (Unix timestamp)
    pub completion_date: i64,
    pub created_by: String,
    /// Average download speed (bytes/s)
    pub dl_speed_avg: i64,
    /// Download speed (bytes/s)
    pub dl_speed: i64,
    /// ETA (seconds)
    pub eta: i64,
    /// Last seen complete (Unix timestamp)
    pub last_seen: i64,
    /// Peers connected to
    pub peers: i64,
    /// Peers in the swarm
    pub peers_total: i64,
    pub pieces_have: i64,
    pub pieces_num: i64,
    /// Seconds until the next announce
    pub reannounce: i64,
    /// Seeds connected to
    pub seeds: i64,
    /// Seeds in the swarm
    pub seeds_total: i64,
    /// Total size (bytes)
    pub total_size: i64,
    /// Average upload speed (bytes/s)
    pub up_speed_avg: i64,
    /// Upload speed (bytes/s)
    pub up_speed: i64,
    /// True if the torrent is from a private tracker
    #[serde(rename = "isPrivate")]
    pub is_private: bool,
}

impl Torrent {
    /// Fraction of pieces present, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.pieces_num <= 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
        let ratio = self.pieces_have as f64 / self.pieces_num as f64;
        ratio.clamp(0.0, 1.0)
    }

    /// Whether the daemon reports the download as finished.
    ///
    /// `completion_date` stays at -1 until every piece is present.
    pub fn is_complete(&self) -> bool {
        self.completion_date > 0
    }
}

/// A new download submission for `POST /api/v2/torrents/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTorrent {
    pub url: String,
    pub category: Option<String>,
    pub rename: Option<String>,
}

impl AddTorrent {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: None,
            rename: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn rename(mut self, rename: impl Into<String>) -> Self {
        self.rename = Some(rename.into());
        self
    }
}
