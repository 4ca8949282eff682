//! Feed acquisition: the initial video + playlist fetch and cursor-driven
//! "load more" pagination.
//!
//! All mutable feed state lives in one [`FeedController`]. Guard flags in
//! that state, not locks held across requests, keep at most one load of each
//! kind in flight.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::gateway::FeedGateway;
use crate::mock;
use crate::models::{FeedPage, Playlist, PlaylistBatch, Settings, Video};

pub const INITIAL_PAGE_SIZE: usize = 30;
pub const LOAD_MORE_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// No settings yet.
    #[default]
    Idle,
    LoadingInitial,
    Ready,
    LoadingMore,
}

/// Read-only copy of the controller state for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub phase: FeedPhase,
    pub settings: Option<Settings>,
    pub videos: Vec<Video>,
    pub playlists: Vec<Playlist>,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub error: Option<String>,
    pub has_next_page: bool,
}

impl FeedSnapshot {
    /// Same snapshot with the API key removed from the settings.
    pub fn redacted(mut self) -> Self {
        self.settings = self.settings.map(|settings| settings.redacted());
        self
    }
}

#[derive(Default)]
struct FeedState {
    phase: FeedPhase,
    settings: Option<Settings>,
    videos: Vec<Video>,
    playlists: Vec<Playlist>,
    cursor: Option<String>,
    error: Option<String>,
    /// Bumped by every refresh; results from an older generation are dropped.
    generation: u64,
}

pub struct FeedController {
    gateway: Arc<FeedGateway>,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(gateway: Arc<FeedGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn phase(&self) -> FeedPhase {
        self.state.lock().phase
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock();
        FeedSnapshot {
            phase: state.phase,
            settings: state.settings.clone(),
            videos: state.videos.clone(),
            playlists: state.playlists.clone(),
            is_loading_initial: state.phase == FeedPhase::LoadingInitial,
            is_loading_more: state.phase == FeedPhase::LoadingMore,
            error: state.error.clone(),
            has_next_page: state.cursor.is_some(),
        }
    }

    /// Installs a settings record and runs the initial fetch for it.
    pub async fn apply_settings(&self, settings: Settings) {
        self.state.lock().settings = Some(settings);
        self.refresh().await;
    }

    /// Fetches the first video page and the playlists, replacing whatever
    /// the controller held before. Does nothing until settings exist.
    pub async fn refresh(&self) {
        let (settings, generation) = {
            let mut state = self.state.lock();
            let Some(settings) = state.settings.clone() else {
                return;
            };
            state.generation += 1;
            state.phase = FeedPhase::LoadingInitial;
            state.error = None;
            (settings, state.generation)
        };

        if let Some(diagnostic) = missing_credentials(&settings) {
            warn!("{diagnostic}");
            let mut state = self.state.lock();
            state.videos = mock::sample_videos_truncated(INITIAL_PAGE_SIZE);
            state.playlists = mock::sample_playlists();
            state.cursor = None;
            state.error = Some(diagnostic);
            state.phase = FeedPhase::Ready;
            return;
        }

        let (videos, playlists) = tokio::join!(
            self.fetch_videos(&settings, INITIAL_PAGE_SIZE, None),
            self.fetch_playlists(&settings),
        );
        info!(
            videos = videos.items.len(),
            playlists = playlists.items.len(),
            has_next = videos.next_page_token.is_some(),
            "initial feed loaded"
        );

        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        state.videos = videos.items;
        state.playlists = playlists.items;
        state.cursor = videos.next_page_token;
        state.error = videos.diagnostic.or(playlists.diagnostic);
        state.phase = FeedPhase::Ready;
    }

    /// Appends the next page of videos. Returns `false` without touching the
    /// network when there is no cursor or another load is running.
    pub async fn load_more(&self) -> bool {
        let (settings, cursor, generation) = {
            let mut state = self.state.lock();
            if state.phase != FeedPhase::Ready {
                return false;
            }
            let (Some(settings), Some(cursor)) = (state.settings.clone(), state.cursor.clone())
            else {
                return false;
            };
            state.phase = FeedPhase::LoadingMore;
            (settings, cursor, state.generation)
        };

        let page = self
            .fetch_videos(&settings, LOAD_MORE_PAGE_SIZE, Some(cursor))
            .await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("discarding page fetched before a refresh");
            return true;
        }
        match page.diagnostic {
            Some(diagnostic) => state.error = Some(diagnostic),
            None => {
                info!(
                    appended = page.items.len(),
                    has_next = page.next_page_token.is_some(),
                    "loaded more videos"
                );
                state.videos.extend(page.items);
                state.cursor = page.next_page_token;
            }
        }
        state.phase = FeedPhase::Ready;
        true
    }

    async fn fetch_videos(
        &self,
        settings: &Settings,
        page_size: usize,
        cursor: Option<String>,
    ) -> FeedPage {
        let gateway = Arc::clone(&self.gateway);
        let channel_id = settings.channel_id.clone();
        let api_key = settings.api_key.clone();
        tokio::task::spawn_blocking(move || {
            gateway.fetch_videos(&channel_id, &api_key, page_size, cursor.as_deref())
        })
        .await
        .unwrap_or_else(|err| {
            FeedPage::degraded(
                mock::sample_videos(),
                format!("Video fetch task failed: {err}. Displaying sample data."),
            )
        })
    }

    async fn fetch_playlists(&self, settings: &Settings) -> PlaylistBatch {
        let gateway = Arc::clone(&self.gateway);
        let channel_id = settings.channel_id.clone();
        let api_key = settings.api_key.clone();
        tokio::task::spawn_blocking(move || gateway.fetch_playlists(&channel_id, &api_key))
            .await
            .unwrap_or_else(|err| {
                PlaylistBatch::degraded(
                    mock::sample_playlists(),
                    format!("Playlist fetch task failed: {err}. Displaying sample data."),
                )
            })
    }
}

fn missing_credentials(settings: &Settings) -> Option<String> {
    let channel_missing = settings.channel_id.is_empty();
    let key_missing = settings.api_key.is_empty();
    let what = match (channel_missing, key_missing) {
        (false, false) => return None,
        (true, true) => "Channel ID and YouTube API key are",
        (true, false) => "Channel ID is",
        (false, true) => "YouTube API key is",
    };
    Some(format!(
        "{what} not configured. Please update the admin settings. Displaying sample data."
    ))
}
