//! Delivery coordination: resolve channels by name, post, edit, and reply.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Channel, ChatApi, NotifyError, SlackError};
use crate::config::ChannelsConfig;
use crate::event::{Appointment, Event};
use crate::message::{compose, compose_appointment, reschedule_note, MessagePayload};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reference to a delivered message, sufficient to edit it or thread on it.
///
/// Created when a message is first posted and kept for the lifetime of the
/// appointment it announces, so a reschedule edits the original message
/// instead of posting a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryHandle {
    /// Channel the message was posted to (Slack channel id, not name).
    pub channel_id: String,
    /// Message timestamp, Slack's message identifier within a channel.
    pub ts: String,
}

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The message was posted; the handle can edit or thread on it later.
    Sent(DeliveryHandle),
    /// The named channel does not exist; nothing was posted.
    Skipped,
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Sends notifications over a chat API, resolving channels by name.
pub struct Notifier {
    api: Arc<dyn ChatApi>,
    channels: ChannelsConfig,
}

impl Notifier {
    /// Create a notifier over the given API with the given channel bindings.
    pub fn new(api: Arc<dyn ChatApi>, channels: ChannelsConfig) -> Self {
        Self { api, channels }
    }

    /// Look up a channel by exact name.
    ///
    /// Fetches the full channel listing on every call, nothing is cached.
    /// When several channels share a name, the first listed wins.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] when the listing request fails.
    pub async fn resolve_channel(&self, name: &str) -> Result<Option<Channel>, SlackError> {
        let channels = self.api.list_channels().await?;
        Ok(channels.into_iter().find(|c| c.name == name))
    }

    /// Post a payload to the named channel.
    ///
    /// An unknown channel name is not an error: the delivery is skipped
    /// and a warning logged.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] when the listing or the post request fails.
    pub async fn send(
        &self,
        channel_name: &str,
        payload: &MessagePayload,
    ) -> Result<Delivery, SlackError> {
        let Some(channel) = self.resolve_channel(channel_name).await? else {
            warn!(channel = channel_name, "channel not found, skipping delivery");
            return Ok(Delivery::Skipped);
        };
        let posted = self.api.post_message(&channel.id, payload).await?;
        debug!(channel = %posted.channel, ts = %posted.ts, "delivered");
        Ok(Delivery::Sent(DeliveryHandle {
            channel_id: posted.channel,
            ts: posted.ts,
        }))
    }

    /// Replace a previously delivered message in place.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] when the edit request fails.
    pub async fn update(
        &self,
        handle: &DeliveryHandle,
        payload: &MessagePayload,
    ) -> Result<(), SlackError> {
        self.api
            .update_message(&handle.channel_id, &handle.ts, payload)
            .await
    }

    /// Post a reply in the thread under a delivered message, broadcast to
    /// the channel.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError`] when the reply request fails.
    pub async fn reply(&self, handle: &DeliveryHandle, text: &str) -> Result<(), SlackError> {
        self.api
            .post_thread_reply(&handle.channel_id, &handle.ts, text)
            .await
    }

    /// Compose and deliver the notification for an event to its bound
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when composition rejects the event or a
    /// Slack request fails.
    pub async fn announce(&self, event: &Event) -> Result<Delivery, NotifyError> {
        let payload = compose(event)?;
        let delivery = self.send(self.channel_for(event), &payload).await?;
        Ok(delivery)
    }

    /// Announce a rescheduled appointment: edit the original message to
    /// the new details, then note the change in a thread reply.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when composition rejects the appointment or
    /// a Slack request fails.
    pub async fn reschedule(
        &self,
        appointment: &Appointment,
        handle: &DeliveryHandle,
    ) -> Result<(), NotifyError> {
        let payload = compose_appointment(appointment)?;
        self.update(handle, &payload).await?;
        self.reply(handle, &reschedule_note(appointment)).await?;
        Ok(())
    }

    fn channel_for(&self, event: &Event) -> &str {
        match event {
            Event::JoinRequest { .. } => &self.channels.join_requests,
            Event::Panorama { .. } => &self.channels.panoramas,
            Event::Appointment { .. } => &self.channels.install_team,
        }
    }
}
