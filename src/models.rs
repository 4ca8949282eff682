//! Records shared by the configuration sources, the gateway and the
//! controller.
//!
//! Field names serialize in camelCase so the persisted settings blob and the
//! JSON handed to the presentation layer keep the shape the front end reads.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL_ID: &str = "UC-lHJZR3Gqxm24_Vd_AJ5Yw";
pub const DEFAULT_BANNER_IMAGE_URL: &str = "https://placehold.co/1200x400/1a202c/1a202c.png?text=+";

/// Text colour tokens the admin panel offers. Serialized as the utility class
/// the front end applies verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextColor {
    #[serde(rename = "text-white")]
    White,
    #[serde(rename = "text-gray-300")]
    LightGray,
    #[serde(rename = "text-gray-400")]
    Gray,
    #[serde(rename = "text-cyan-400")]
    Cyan,
    #[serde(rename = "text-yellow-300")]
    Yellow,
    #[serde(rename = "text-green-400")]
    Green,
}

impl TextColor {
    pub const ALL: [TextColor; 6] = [
        Self::White,
        Self::LightGray,
        Self::Gray,
        Self::Cyan,
        Self::Yellow,
        Self::Green,
    ];

    pub fn class(self) -> &'static str {
        match self {
            Self::White => "text-white",
            Self::LightGray => "text-gray-300",
            Self::Gray => "text-gray-400",
            Self::Cyan => "text-cyan-400",
            Self::Yellow => "text-yellow-300",
            Self::Green => "text-green-400",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::LightGray => "Light Gray",
            Self::Gray => "Gray",
            Self::Cyan => "Cyan",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
        }
    }

    /// Accepts either the class token (`text-cyan-400`) or the label, case
    /// and spacing insensitive (`cyan`, `light-gray`).
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Self::ALL.into_iter().find(|color| {
            color.class().replace('-', " ") == wanted || color.label().to_ascii_lowercase() == wanted
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSettings {
    pub title_color: TextColor,
    pub description_color: TextColor,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            title_color: TextColor::White,
            description_color: TextColor::Gray,
        }
    }
}

/// Social profile links. An empty string hides the matching icon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: String,
    pub twitter: String,
    pub youtube: String,
}

/// The single settings record a session runs with.
///
/// `api_key` is a secret: use [`Settings::redacted`] before handing the record
/// to anything public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub channel_id: String,
    pub api_key: String,
    pub style_settings: StyleSettings,
    pub banner_image_url: String,
    pub social_links: SocialLinks,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            api_key: String::new(),
            style_settings: StyleSettings::default(),
            banner_image_url: DEFAULT_BANNER_IMAGE_URL.to_string(),
            social_links: SocialLinks::default(),
        }
    }
}

impl Settings {
    /// Copy with the API key blanked out.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: String::new(),
            ..self.clone()
        }
    }

    /// Checks applied to admin edits before they are saved.
    pub fn validate(&self) -> Result<()> {
        if self.channel_id.trim().is_empty() {
            bail!("Channel ID cannot be empty.");
        }
        Ok(())
    }
}

/// A video or playlist card. Both upstream shapes normalize to this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
}

pub type Video = FeedItem;
pub type Playlist = FeedItem;

/// One page of the video feed.
///
/// When `diagnostic` is set the items are either empty or entirely sample
/// data, and `next_page_token` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<Video>,
    pub next_page_token: Option<String>,
    pub diagnostic: Option<String>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn degraded(items: Vec<Video>, diagnostic: impl Into<String>) -> Self {
        Self {
            items,
            next_page_token: None,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// The playlist batch. Playlists are fetched once and never paginated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistBatch {
    pub items: Vec<Playlist>,
    pub diagnostic: Option<String>,
}

impl PlaylistBatch {
    pub fn degraded(items: Vec<Playlist>, diagnostic: impl Into<String>) -> Self {
        Self {
            items,
            diagnostic: Some(diagnostic.into()),
        }
    }
}
