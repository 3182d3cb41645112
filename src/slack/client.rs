//! Slack Web API client.
//!
//! Methods consumed: `conversations.list`, `chat.postMessage`, and
//! `chat.update`. Threaded replies go through `chat.postMessage` with a
//! parent timestamp and the broadcast flag.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{check_http_response, Channel, ChatApi, PostedMessage, SlackError};
use crate::message::MessagePayload;

/// HTTP connect timeout for the reqwest client.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// HTTP request timeout for normal operations.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size for `conversations.list`. Only the first page is read.
const CHANNEL_PAGE_LIMIT: u32 = 1000;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListChannelsResponse {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
}

#[derive(Deserialize)]
struct AckResponse {
    ok: bool,
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Slack Web API.
pub struct SlackClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl SlackClient {
    /// Create a client for the given API base URL and bot token.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build HTTP client with timeouts, using default");
                reqwest::Client::default()
            });
        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }
}

// ---------------------------------------------------------------------------
// Request builders / response parsers (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build the `chat.postMessage` request body for a payload.
#[doc(hidden)]
pub fn post_message_body(channel_id: &str, payload: &MessagePayload) -> Value {
    serde_json::json!({
        "channel": channel_id,
        "text": payload.text,
        "blocks": payload.blocks,
    })
}

/// Build the `chat.update` request body for an edit in place.
#[doc(hidden)]
pub fn update_message_body(channel_id: &str, ts: &str, payload: &MessagePayload) -> Value {
    serde_json::json!({
        "channel": channel_id,
        "ts": ts,
        "text": payload.text,
        "blocks": payload.blocks,
    })
}

/// Build the broadcast threaded-reply body (`chat.postMessage`).
#[doc(hidden)]
pub fn thread_reply_body(channel_id: &str, thread_ts: &str, text: &str) -> Value {
    serde_json::json!({
        "channel": channel_id,
        "text": text,
        "thread_ts": thread_ts,
        "reply_broadcast": true,
    })
}

/// Parse a `conversations.list` response body.
///
/// Returns the channels plus whether the listing was truncated (a
/// continuation cursor was present; later pages are not fetched).
///
/// # Errors
///
/// Returns [`SlackError::Parse`] on schema mismatch, [`SlackError::Api`]
/// when Slack answers `ok: false`.
#[doc(hidden)]
pub fn parse_channel_list(body: &str) -> Result<(Vec<Channel>, bool), SlackError> {
    let resp: ListChannelsResponse =
        serde_json::from_str(body).map_err(|e| SlackError::Parse(e.to_string()))?;
    check_ok("conversations.list", resp.ok, resp.error)?;
    let truncated = resp
        .response_metadata
        .is_some_and(|meta| !meta.next_cursor.is_empty());
    Ok((resp.channels, truncated))
}

/// Parse a `chat.postMessage` response into the posted confirmation.
///
/// # Errors
///
/// Returns [`SlackError::Parse`] on schema mismatch, [`SlackError::Api`]
/// when Slack answers `ok: false`, [`SlackError::MissingField`] when the
/// confirmation lacks the channel or timestamp.
#[doc(hidden)]
pub fn parse_posted_message(body: &str) -> Result<PostedMessage, SlackError> {
    let resp: PostMessageResponse =
        serde_json::from_str(body).map_err(|e| SlackError::Parse(e.to_string()))?;
    check_ok("chat.postMessage", resp.ok, resp.error)?;
    let channel = resp.channel.ok_or(SlackError::MissingField {
        method: "chat.postMessage",
        field: "channel",
    })?;
    let ts = resp.ts.ok_or(SlackError::MissingField {
        method: "chat.postMessage",
        field: "ts",
    })?;
    Ok(PostedMessage { channel, ts })
}

/// Parse an acknowledgement-only response (`chat.update`, thread replies).
///
/// # Errors
///
/// Returns [`SlackError::Parse`] on schema mismatch, [`SlackError::Api`]
/// when Slack answers `ok: false`.
#[doc(hidden)]
pub fn parse_ack(method: &'static str, body: &str) -> Result<(), SlackError> {
    let resp: AckResponse =
        serde_json::from_str(body).map_err(|e| SlackError::Parse(e.to_string()))?;
    check_ok(method, resp.ok, resp.error)
}

fn check_ok(method: &'static str, ok: bool, error: Option<String>) -> Result<(), SlackError> {
    if !ok {
        return Err(SlackError::Api {
            method,
            error: error.unwrap_or_else(|| "unknown_error".to_owned()),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl ChatApi for SlackClient {
    async fn list_channels(&self) -> Result<Vec<Channel>, SlackError> {
        let response = self
            .client
            .get(self.method_url("conversations.list"))
            .bearer_auth(&self.token)
            .query(&[("types", "public_channel,private_channel")])
            // TODO: cursor support
            .query(&[("limit", CHANNEL_PAGE_LIMIT)])
            .send()
            .await?;

        let body = check_http_response(response).await?;
        let (channels, truncated) = parse_channel_list(&body)?;
        if truncated {
            warn!(
                count = channels.len(),
                limit = CHANNEL_PAGE_LIMIT,
                "channel list truncated at the first page; later pages were not fetched"
            );
        }
        debug!(count = channels.len(), "listed channels");
        Ok(channels)
    }

    async fn post_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<PostedMessage, SlackError> {
        let response = self
            .client
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&post_message_body(channel_id, payload))
            .send()
            .await?;

        let body = check_http_response(response).await?;
        let posted = parse_posted_message(&body)?;
        debug!(channel = %posted.channel, ts = %posted.ts, "message posted");
        Ok(posted)
    }

    async fn update_message(
        &self,
        channel_id: &str,
        ts: &str,
        payload: &MessagePayload,
    ) -> Result<(), SlackError> {
        let response = self
            .client
            .post(self.method_url("chat.update"))
            .bearer_auth(&self.token)
            .json(&update_message_body(channel_id, ts, payload))
            .send()
            .await?;

        let body = check_http_response(response).await?;
        parse_ack("chat.update", &body)?;
        debug!(channel = %channel_id, ts = %ts, "message updated in place");
        Ok(())
    }

    async fn post_thread_reply(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        let response = self
            .client
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&thread_reply_body(channel_id, thread_ts, text))
            .send()
            .await?;

        let body = check_http_response(response).await?;
        parse_ack("chat.postMessage", &body)?;
        debug!(channel = %channel_id, thread_ts = %thread_ts, "broadcast thread reply posted");
        Ok(())
    }
}
