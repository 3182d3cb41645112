//! Message composition: domain events to channel-agnostic payloads.
//!
//! Pure code, no I/O. [`compose`] maps an [`Event`](crate::event::Event)
//! to a [`MessagePayload`]; [`blocks`] defines the Block Kit wire shapes
//! and [`links`] the deterministic URL templates embedded in them.

pub mod blocks;
pub mod compose;
pub mod links;

pub use compose::{
    compose, compose_appointment, compose_join_request, compose_pano, format_date, los_summary,
    reschedule_note,
};

use serde::Serialize;
use thiserror::Error;

use crate::message::blocks::Block;

/// Errors that can occur during message composition.
///
/// Always the caller's bug: events are typed, so the only malformed
/// shapes left to catch are empty required fields.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// A field the composition rules require was empty.
    #[error("required field is empty: {0}")]
    EmptyField(&'static str),
}

/// A composed chat message, ready for delivery to any resolved channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePayload {
    /// Plain-text body. Slack shows it in notifications and in clients
    /// that cannot render blocks, so it doubles as the fallback text.
    /// Never empty.
    pub text: String,
    /// Rich content, rendered top to bottom.
    pub blocks: Vec<Block>,
}
