//! Meshline: Slack notifications for community mesh network operations.
//!
//! Turns domain events (join requests, rooftop panoramas, install
//! appointments) into Block Kit messages, resolves destination channels by
//! name, and delivers, edits, or thread-replies via the Slack Web API.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod event;
pub mod logging;
pub mod message;
pub mod slack;
