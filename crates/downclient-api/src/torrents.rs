// Torrent endpoints
//
// Properties lookup and download submission. Both run through
// `QbitClient::authorised` and check for an invalidated session before
// interpreting the response.

use reqwest::StatusCode;
use reqwest::multipart::Form;
use tracing::{debug, info, warn};

use crate::client::QbitClient;
use crate::error::Error;
use crate::models::{AddTorrent, Torrent};

/// URL prefixes the daemon accepts in the `urls` field. `bc://bt/` is the
/// legacy BitComet link form.
const ACCEPTED_PREFIXES: [&str; 4] = ["http://", "https://", "magnet:", "bc://bt/"];

/// Fail with [`Error::UrlInvalid`] unless `url` starts with an accepted prefix.
pub fn validate_torrent_url(url: &str) -> Result<(), Error> {
    if ACCEPTED_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
    {
        Ok(())
    } else {
        Err(Error::UrlInvalid {
            url: url.to_owned(),
        })
    }
}

impl QbitClient {
    /// Fetch the properties of one torrent.
    ///
    /// `GET /api/v2/torrents/properties?hash={hash}`
    pub async fn torrent_properties(&self, hash: &str) -> Result<Torrent, Error> {
        self.authorised(|token| async move {
            let url = self.endpoint("torrents/properties")?;
            debug!("GET {} hash={}", url, hash);

            let resp = self
                .send_authorised(self.http().get(url).query(&[("hash", hash)]), &token)
                .await?;

            let status = resp.status();
            self.check_bad_login(status)?;

            if status == StatusCode::NOT_FOUND {
                info!(%hash, "torrent wasn't found");
                return Err(Error::TorrentNotFound {
                    hash: hash.to_owned(),
                });
            }

            let body = resp.text().await?;
            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: preview(&body),
                });
            }

            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            })
        })
        .await
    }

    /// Submit a new download.
    ///
    /// `POST /api/v2/torrents/add` (multipart). `category` and `rename` are
    /// only sent when set. The URL is validated before anything touches the
    /// network, login included.
    pub async fn add_torrent(&self, request: &AddTorrent) -> Result<(), Error> {
        validate_torrent_url(&request.url)?;

        self.authorised(|token| async move {
            let url = self.endpoint("torrents/add")?;
            debug!("POST {}", url);

            let mut form = Form::new().text("urls", request.url.clone());
            if let Some(ref category) = request.category {
                form = form.text("category", category.clone());
            }
            if let Some(ref rename) = request.rename {
                form = form.text("rename", rename.clone());
            }

            let resp = self
                .send_authorised(self.http().post(url).multipart(form), &token)
                .await?;

            let status = resp.status();
            self.check_bad_login(status)?;

            if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
                warn!(url = %request.url, "daemon rejected torrent payload");
                return Err(Error::TorrentFileInvalid {
                    url: request.url.clone(),
                });
            }

            let body = resp.text().await?;
            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: preview(&body),
                });
            }

            // Older daemons answer 200 with "Fails." when nothing was added.
            if body.trim() == "Fails." {
                return Err(Error::Api {
                    status: status.as_u16(),
                    message: "daemon refused to add the torrent".into(),
                });
            }

            info!(url = %request.url, "torrent submitted");
            Ok(())
        })
        .await
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
