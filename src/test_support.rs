//! In-memory HTTP fixtures shared by the unit tests.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use serde_json::json;

use crate::gateway::{Endpoints, FeedGateway, HttpResponse, HttpTransport};

pub(crate) const SEARCH_URL: &str = "https://youtube.test/search";
pub(crate) const PLAYLISTS_URL: &str = "https://youtube.test/playlists";
pub(crate) const SHEET_URL: &str = "https://sheet.test/export?format=csv";

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

type Handler = Box<dyn Fn(&RecordedCall) -> Result<HttpResponse> + Send + Sync>;

/// Records every request and answers through a closure. The handler runs
/// outside the record lock so it may block.
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<RecordedCall>>,
    handler: Handler,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&RecordedCall) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.url == url).count()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let call = RecordedCall {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        };
        self.calls.lock().push(call.clone());
        (self.handler)(&call)
    }
}

pub(crate) fn gateway_for(transport: &Arc<ScriptedTransport>) -> FeedGateway {
    let transport: Arc<dyn HttpTransport> = transport.clone();
    FeedGateway::new(
        transport,
        Endpoints {
            search_url: SEARCH_URL.to_string(),
            playlists_url: PLAYLISTS_URL.to_string(),
        },
    )
}

pub(crate) fn ok(body: &str) -> Result<HttpResponse> {
    status(200, body)
}

pub(crate) fn status(status: u16, body: &str) -> Result<HttpResponse> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

fn snippet(id: &str) -> serde_json::Value {
    json!({
        "title": format!("Title {id}"),
        "description": format!("About {id}"),
        "thumbnails": {
            "default": { "url": format!("https://img.test/{id}/default.jpg") },
            "high": { "url": format!("https://img.test/{id}/high.jpg") }
        }
    })
}

pub(crate) fn search_body(ids: &[&str], next_page_token: Option<&str>) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": { "kind": "youtube#video", "videoId": id }, "snippet": snippet(id) }))
        .collect();
    let mut body = json!({ "items": items });
    if let Some(token) = next_page_token {
        body["nextPageToken"] = json!(token);
    }
    body.to_string()
}

pub(crate) fn playlists_body(ids: &[&str]) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "snippet": snippet(id) }))
        .collect();
    json!({ "items": items }).to_string()
}
