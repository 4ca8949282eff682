//! Remote feed gateway over the YouTube Data API.
//!
//! Every outcome, including transport and decoding failures, comes back as a
//! normal [`FeedPage`] / [`PlaylistBatch`]. Failures degrade to the sample
//! dataset with a human-readable diagnostic; nothing is retried.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::mock;
use crate::models::{FeedItem, FeedPage, PlaylistBatch};

pub const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
pub const YOUTUBE_PLAYLISTS_URL: &str = "https://www.googleapis.com/youtube/v3/playlists";
pub const PLAYLIST_PAGE_SIZE: usize = 25;
const USER_AGENT: &str = concat!("showcase-tools/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET seam. `Err` is reserved for transport failures; any
/// response that arrived, including 4xx/5xx, is `Ok`.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// Production transport backed by a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        match request.call() {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .with_context(|| format!("reading response body from {url}"))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => Ok(HttpResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(err) => Err(err).with_context(|| format!("requesting {url}")),
        }
    }
}

/// Where the gateway sends its two requests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub search_url: String,
    pub playlists_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_url: YOUTUBE_SEARCH_URL.to_string(),
            playlists_url: YOUTUBE_PLAYLISTS_URL.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    items: Option<Vec<SearchResult>>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct SearchResult {
    id: SearchResultId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: String,
}

#[derive(Deserialize)]
struct PlaylistListResponse {
    items: Option<Vec<PlaylistResource>>,
}

#[derive(Deserialize)]
struct PlaylistResource {
    id: String,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize)]
struct Thumbnails {
    high: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Snippet {
    fn into_item(self, id: String) -> FeedItem {
        FeedItem {
            id,
            title: self.title,
            description: self.description,
            thumbnail_url: self.thumbnails.high.url,
        }
    }
}

/// How a single request went wrong.
enum Failure {
    /// The API answered with a non-success status.
    Upstream(String),
    /// The request never completed or the body could not be decoded.
    Transport(String),
}

pub struct FeedGateway {
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
}

impl FeedGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Fetches one page of the channel's uploads, newest first.
    pub fn fetch_videos(
        &self,
        channel_id: &str,
        api_key: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> FeedPage {
        if api_key.is_empty() {
            let message = "YouTube API key is not provided. Please add one in the admin settings. Displaying sample data.";
            warn!("{message}");
            return FeedPage::degraded(mock::sample_videos_truncated(page_size), message);
        }
        if channel_id.is_empty() {
            return FeedPage::empty();
        }

        let max_results = page_size.to_string();
        let mut query = vec![
            ("key", api_key),
            ("channelId", channel_id),
            ("part", "snippet,id"),
            ("order", "date"),
            ("maxResults", max_results.as_str()),
            ("type", "video"),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token));
        }

        match self.request::<SearchListResponse>(&self.endpoints.search_url, &query) {
            Ok(response) => {
                let Some(items) = response.items else {
                    return FeedPage::empty();
                };
                let items: Vec<FeedItem> = items
                    .into_iter()
                    .map(|result| result.snippet.into_item(result.id.video_id))
                    .collect();
                debug!(count = items.len(), has_next = response.next_page_token.is_some(), "fetched video page");
                FeedPage {
                    items,
                    next_page_token: response.next_page_token,
                    diagnostic: None,
                }
            }
            Err(Failure::Upstream(reason)) => {
                let message = format!(
                    "Failed to fetch videos from YouTube. Reason: {reason}. Displaying sample data."
                );
                error!(channel_id, "{message}");
                FeedPage::degraded(mock::sample_videos(), message)
            }
            Err(Failure::Transport(reason)) => {
                let message = format!(
                    "Network or parsing error when fetching videos: {reason}. Displaying sample data."
                );
                error!(channel_id, "{message}");
                FeedPage::degraded(mock::sample_videos(), message)
            }
        }
    }

    /// Fetches the channel's playlists in a single unpaginated batch.
    pub fn fetch_playlists(&self, channel_id: &str, api_key: &str) -> PlaylistBatch {
        if api_key.is_empty() {
            let message = "YouTube API key not provided. Displaying sample playlists.";
            warn!("{message}");
            return PlaylistBatch::degraded(mock::sample_playlists(), message);
        }
        if channel_id.is_empty() {
            return PlaylistBatch::default();
        }

        let max_results = PLAYLIST_PAGE_SIZE.to_string();
        let query = [
            ("key", api_key),
            ("channelId", channel_id),
            ("part", "snippet"),
            ("maxResults", max_results.as_str()),
        ];

        match self.request::<PlaylistListResponse>(&self.endpoints.playlists_url, &query) {
            Ok(response) => {
                let items = response
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(|playlist| playlist.snippet.into_item(playlist.id))
                    .collect();
                PlaylistBatch {
                    items,
                    diagnostic: None,
                }
            }
            Err(Failure::Upstream(reason)) => {
                let message = format!(
                    "Failed to fetch playlists. Reason: {reason}. Displaying sample data."
                );
                error!(channel_id, "{message}");
                PlaylistBatch::degraded(mock::sample_playlists(), message)
            }
            Err(Failure::Transport(reason)) => {
                let message = format!(
                    "Network or parsing error when fetching playlists: {reason}. Displaying sample data."
                );
                error!(channel_id, "{message}");
                PlaylistBatch::degraded(mock::sample_playlists(), message)
            }
        }
    }

    fn request<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Failure> {
        let response = self
            .transport
            .get(url, query)
            .map_err(|err| Failure::Transport(format!("{err:#}")))?;
        if !response.is_success() {
            return Err(Failure::Upstream(upstream_reason(&response)));
        }
        serde_json::from_str(&response.body).map_err(|err| Failure::Transport(err.to_string()))
    }
}

/// Prefers the API's own `error.message`, else a generic status line.
fn upstream_reason(response: &HttpResponse) -> String {
    serde_json::from_str::<ErrorEnvelope>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("API request failed with status {}", response.status))
}
