//! Slack delivery layer.
//!
//! Defines the [`ChatApi`] trait over the four Web API methods this
//! system consumes, and the shared wire-facing types.
//!
//! Two halves are built on top:
//! - [`client::SlackClient`]: the HTTP implementation
//! - [`notifier::Notifier`]: channel resolution and delivery coordination
//!
//! The trait is the test seam: coordinator behavior (skip on unknown
//! channel, reschedule threading) is exercised against a recording fake
//! with no network.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::message::MessagePayload;

pub mod client;
pub mod notifier;

pub use client::SlackClient;
pub use notifier::{Delivery, DeliveryHandle, Notifier};

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// A channel visible to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    /// Opaque channel identifier.
    pub id: String,
    /// Human-readable name, without the leading `#`.
    pub name: String,
}

/// Slack's confirmation of a posted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// Channel the message landed in.
    pub channel: String,
    /// Message timestamp, Slack's message identity within the channel.
    pub ts: String,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The chat API surface the delivery coordinator needs.
///
/// All implementations must be `Send + Sync`; the notifier holds one
/// behind an `Arc` and may be driven from concurrent tasks.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// List every channel visible to the bot, public and private.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] on transport or API failure.
    async fn list_channels(&self) -> Result<Vec<Channel>, SlackError>;

    /// Post a payload to a channel id as a new message.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] on transport or API failure.
    async fn post_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<PostedMessage, SlackError>;

    /// Replace the text and blocks of the message at `ts` in place.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] on transport or API failure.
    async fn update_message(
        &self,
        channel_id: &str,
        ts: &str,
        payload: &MessagePayload,
    ) -> Result<(), SlackError>;

    /// Post a plain-text reply in the thread under `thread_ts`, broadcast
    /// so it is visible outside the thread as well.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] on transport or API failure.
    async fn post_thread_reply(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), SlackError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by Slack Web API calls.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    /// HTTP transport failure.
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("slack response parse error: {0}")]
    Parse(String),
    /// Slack responded with a non-success HTTP status.
    #[error("slack returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Slack answered the call with `ok: false`.
    #[error("slack {method} failed: {error}")]
    Api {
        /// Web API method name.
        method: &'static str,
        /// Slack's error code, e.g. `channel_not_found`.
        error: String,
    },
    /// Slack confirmed the call but omitted a field the caller needs.
    #[error("slack {method} response missing field {field}")]
    MissingField {
        /// Web API method name.
        method: &'static str,
        /// Name of the absent response field.
        field: &'static str,
    },
}

/// Errors from event-level notification operations.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The event could not be composed into a payload.
    #[error("message composition failed: {0}")]
    Compose(#[from] crate::message::ComposeError),
    /// A Slack call failed during delivery.
    #[error("slack delivery failed: {0}")]
    Slack(#[from] SlackError),
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns [`SlackError::Request`] on transport failure,
/// [`SlackError::HttpStatus`] on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, SlackError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SlackError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let sanitized = match Regex::new(r"xox[a-z]-[A-Za-z0-9\-]{10,}") {
        Ok(regex) => regex.replace_all(&collapsed, "[REDACTED]").into_owned(),
        Err(_) => collapsed,
    };

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
