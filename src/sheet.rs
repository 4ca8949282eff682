//! Read-only settings published as a two-column spreadsheet export.
//!
//! Each line is `label,value`. Only the first comma separates the columns so
//! URLs containing commas survive, and one layer of surrounding double quotes
//! is stripped from each side the way spreadsheet exports quote cells.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result, bail};
use tracing::{error, info};

use crate::gateway::HttpTransport;
use crate::models::{DEFAULT_BANNER_IMAGE_URL, Settings, SocialLinks, StyleSettings};

pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1FQWYa4qY0nSr9m8Y9Sjl6_teF8Ix9EtdeYVcpaF67cQ/export?format=csv";

pub const LABEL_CHANNEL_ID: &str = "UID";
pub const LABEL_API_KEY: &str = "API";
pub const LABEL_BANNER: &str = "CH Image Link";
pub const LABEL_FACEBOOK: &str = "FB Link";
pub const LABEL_TWITTER: &str = "X (Twitter) URL";
pub const LABEL_YOUTUBE: &str = "Youtube Link";

/// Parses the export into a label lookup. Later duplicates win.
pub fn parse_sheet(text: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in text.split(['\r', '\n']) {
        let Some((key, value)) = line.split_once(',') else {
            continue;
        };
        let key = unquote(key).trim();
        let value = unquote(value).trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        values.insert(key.to_string(), value.to_string());
    }
    values
}

fn unquote(cell: &str) -> &str {
    if cell.starts_with('"') && cell.ends_with('"') {
        cell.get(1..cell.len().saturating_sub(1)).unwrap_or("")
    } else {
        cell
    }
}

/// Maps recognised labels onto a settings record. Style settings never come
/// from the sheet.
pub fn settings_from_sheet(values: &HashMap<String, String>) -> Settings {
    let lookup = |label: &str| values.get(label).cloned();
    Settings {
        channel_id: lookup(LABEL_CHANNEL_ID).unwrap_or_default(),
        api_key: lookup(LABEL_API_KEY).unwrap_or_default(),
        style_settings: StyleSettings::default(),
        banner_image_url: lookup(LABEL_BANNER)
            .unwrap_or_else(|| DEFAULT_BANNER_IMAGE_URL.to_string()),
        social_links: SocialLinks {
            facebook: lookup(LABEL_FACEBOOK).unwrap_or_default(),
            twitter: lookup(LABEL_TWITTER).unwrap_or_default(),
            youtube: lookup(LABEL_YOUTUBE).unwrap_or_default(),
        },
    }
}

/// Remote settings document plus the transport used to fetch it.
#[derive(Clone)]
pub struct SheetSource {
    url: String,
    transport: Arc<dyn HttpTransport>,
}

impl SheetSource {
    pub fn new(url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    /// Fetches and parses the sheet. Any failure is returned to the caller;
    /// no fallback settings are synthesised.
    pub fn fetch(&self) -> Result<Settings> {
        let outcome = self.fetch_inner();
        match &outcome {
            Ok(settings) => info!(
                url = %self.url,
                channel_configured = !settings.channel_id.is_empty(),
                "loaded settings from sheet"
            ),
            Err(err) => error!(url = %self.url, "failed to load settings sheet: {err:#}"),
        }
        outcome
    }

    fn fetch_inner(&self) -> Result<Settings> {
        let response = self
            .transport
            .get(&self.url, &[])
            .context("Failed to fetch settings sheet")?;
        if !response.is_success() {
            bail!("Failed to fetch settings sheet: status {}", response.status);
        }
        Ok(settings_from_sheet(&parse_sheet(&response.body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SHEET_URL, ScriptedTransport, ok, status};
    use anyhow::anyhow;

    const SAMPLE: &str = "UID,UC42\r\n\"API\",\"abc123\"\n\"FB Link\",\"https://x,y\"\nCH Image Link , https://img.test/banner.png \n# notes,\nYoutube Link,\n,orphan\nno delimiter here\rX (Twitter) URL,https://x.com/chan";

    #[test]
    fn splits_only_at_first_comma() {
        let values = parse_sheet("\"FB Link\",\"https://x,y\"");
        assert_eq!(values.get("FB Link").map(String::as_str), Some("https://x,y"));
    }

    #[test]
    fn parse_handles_quotes_whitespace_and_line_endings() {
        let values = parse_sheet(SAMPLE);
        assert_eq!(values["UID"], "UC42");
        assert_eq!(values["API"], "abc123");
        assert_eq!(values["CH Image Link"], "https://img.test/banner.png");
        assert_eq!(values["X (Twitter) URL"], "https://x.com/chan");
        assert!(!values.contains_key("Youtube Link"));
        assert!(!values.contains_key("# notes"));
        assert!(!values.contains_key(""));
        assert_eq!(values.len(), 5);
    }

    #[test]
    fn lone_quote_cells_become_empty() {
        let values = parse_sheet("\",value\nkey,\"");
        assert!(values.is_empty());
    }

    #[test]
    fn later_duplicates_win() {
        let values = parse_sheet("UID,first\nUID,second");
        assert_eq!(values["UID"], "second");
    }

    #[test]
    fn parsing_twice_yields_identical_settings() {
        let first = settings_from_sheet(&parse_sheet(SAMPLE));
        let second = settings_from_sheet(&parse_sheet(SAMPLE));
        assert_eq!(first, second);
    }

    #[test]
    fn settings_map_labels_and_default_the_rest() {
        let settings = settings_from_sheet(&parse_sheet(SAMPLE));
        assert_eq!(settings.channel_id, "UC42");
        assert_eq!(settings.api_key, "abc123");
        assert_eq!(settings.banner_image_url, "https://img.test/banner.png");
        assert_eq!(settings.social_links.facebook, "https://x,y");
        assert_eq!(settings.social_links.twitter, "https://x.com/chan");
        assert_eq!(settings.social_links.youtube, "");
        assert_eq!(settings.style_settings, StyleSettings::default());
    }

    #[test]
    fn empty_sheet_gives_blank_credentials() {
        let settings = settings_from_sheet(&parse_sheet(""));
        assert!(settings.channel_id.is_empty());
        assert!(settings.api_key.is_empty());
        assert_eq!(settings.banner_image_url, DEFAULT_BANNER_IMAGE_URL);
    }

    #[test]
    fn fetch_parses_remote_document() {
        let transport = ScriptedTransport::new(|_| ok("UID,UC9\nAPI,key"));
        let source = SheetSource::new(SHEET_URL, transport.clone());
        let settings = source.fetch().unwrap();
        assert_eq!(settings.channel_id, "UC9");
        assert_eq!(settings.api_key, "key");
        assert_eq!(transport.calls()[0].url, SHEET_URL);
    }

    #[test]
    fn fetch_fails_on_bad_status() {
        let transport = ScriptedTransport::new(|_| status(404, "not found"));
        let err = SheetSource::new(SHEET_URL, transport).fetch().unwrap_err();
        assert!(err.to_string().contains("status 404"));
    }

    #[test]
    fn fetch_fails_on_transport_error() {
        let transport = ScriptedTransport::new(|_| Err(anyhow!("dns failure")));
        let err = SheetSource::new(SHEET_URL, transport).fetch().unwrap_err();
        assert!(format!("{err:#}").contains("dns failure"));
    }
}
