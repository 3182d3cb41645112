//! Delivery coordination tests against a recording fake.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use meshline::config::ChannelsConfig;
use meshline::event::{
    Appointment, AppointmentKind, Building, Event, JoinRequest, Member, Pano,
};
use meshline::message::blocks::Block;
use meshline::message::MessagePayload;
use meshline::slack::{
    Channel, ChatApi, Delivery, DeliveryHandle, Notifier, NotifyError, PostedMessage, SlackError,
};

const POSTED_TS: &str = "1700000000.000100";

// ---------------------------------------------------------------------------
// Recording fake
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum ApiCall {
    List,
    Post {
        channel_id: String,
        text: String,
    },
    Update {
        channel_id: String,
        ts: String,
        text: String,
    },
    Reply {
        channel_id: String,
        thread_ts: String,
        text: String,
    },
}

struct RecordingApi {
    channels: Vec<Channel>,
    calls: Mutex<Vec<ApiCall>>,
}

impl RecordingApi {
    fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl ChatApi for RecordingApi {
    async fn list_channels(&self) -> Result<Vec<Channel>, SlackError> {
        self.record(ApiCall::List);
        Ok(self.channels.clone())
    }

    async fn post_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<PostedMessage, SlackError> {
        self.record(ApiCall::Post {
            channel_id: channel_id.to_owned(),
            text: payload.text.clone(),
        });
        Ok(PostedMessage {
            channel: channel_id.to_owned(),
            ts: POSTED_TS.to_owned(),
        })
    }

    async fn update_message(
        &self,
        channel_id: &str,
        ts: &str,
        payload: &MessagePayload,
    ) -> Result<(), SlackError> {
        self.record(ApiCall::Update {
            channel_id: channel_id.to_owned(),
            ts: ts.to_owned(),
            text: payload.text.clone(),
        });
        Ok(())
    }

    async fn post_thread_reply(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        self.record(ApiCall::Reply {
            channel_id: channel_id.to_owned(),
            thread_ts: thread_ts.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }
}

/// Fake whose write methods always fail, recording what was attempted,
/// for error propagation tests.
struct FailingApi {
    calls: Mutex<Vec<&'static str>>,
}

impl FailingApi {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().expect("calls lock").push(method);
    }
}

#[async_trait]
impl ChatApi for FailingApi {
    async fn list_channels(&self) -> Result<Vec<Channel>, SlackError> {
        self.record("list");
        Ok(vec![Channel {
            id: "C1".to_owned(),
            name: "join-requests-test".to_owned(),
        }])
    }

    async fn post_message(
        &self,
        _channel_id: &str,
        _payload: &MessagePayload,
    ) -> Result<PostedMessage, SlackError> {
        self.record("post");
        Err(SlackError::Api {
            method: "chat.postMessage",
            error: "ratelimited".to_owned(),
        })
    }

    async fn update_message(
        &self,
        _channel_id: &str,
        _ts: &str,
        _payload: &MessagePayload,
    ) -> Result<(), SlackError> {
        self.record("update");
        Err(SlackError::Api {
            method: "chat.update",
            error: "message_not_found".to_owned(),
        })
    }

    async fn post_thread_reply(
        &self,
        _channel_id: &str,
        _thread_ts: &str,
        _text: &str,
    ) -> Result<(), SlackError> {
        self.record("reply");
        Err(SlackError::Api {
            method: "chat.postMessage",
            error: "thread_not_found".to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn test_channels() -> Vec<Channel> {
    vec![
        Channel {
            id: "C_JOIN".to_owned(),
            name: "join-requests-test".to_owned(),
        },
        Channel {
            id: "C_PANO".to_owned(),
            name: "panoramas-test".to_owned(),
        },
        Channel {
            id: "C_INSTALL".to_owned(),
            name: "install-team-test".to_owned(),
        },
    ]
}

fn payload(text: &str) -> MessagePayload {
    MessagePayload {
        text: text.to_owned(),
        blocks: vec![Block::markdown(text)],
    }
}

fn building() -> Building {
    Building {
        address: "115 Broadway, New York, NY".to_owned(),
        lat: 40.708,
        lng: -74.0107,
        alt: 120.0,
        bin: 1_001_234,
    }
}

fn appointment() -> Appointment {
    Appointment {
        kind: AppointmentKind::Install,
        date: NaiveDate::from_ymd_opt(2024, 3, 14)
            .expect("valid date")
            .and_hms_opt(18, 30, 0)
            .expect("valid time"),
        request_id: 427,
        node_id: 9147,
        notes: None,
        building: building(),
        member: Member {
            name: "Ada Lovelace".to_owned(),
            phone: "+1 555 271 8282".to_owned(),
            email: "ada@example.com".to_owned(),
        },
    }
}

// ---------------------------------------------------------------------------
// Channel resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_channel_finds_by_exact_name() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());

    let found = notifier
        .resolve_channel("install-team-test")
        .await
        .expect("should list");
    assert_eq!(found.map(|c| c.id), Some("C_INSTALL".to_owned()));

    let missing = notifier
        .resolve_channel("no-such-channel")
        .await
        .expect("should list");
    assert!(missing.is_none());
}

#[tokio::test]
async fn resolution_fetches_the_listing_on_every_call() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());

    notifier
        .send("panoramas-test", &payload("one"))
        .await
        .expect("should send");
    notifier
        .send("panoramas-test", &payload("two"))
        .await
        .expect("should send");

    let lists = api
        .calls()
        .iter()
        .filter(|c| matches!(c, ApiCall::List))
        .count();
    assert_eq!(lists, 2);
}

#[tokio::test]
async fn duplicate_names_resolve_to_the_first_listed() {
    let channels = vec![
        Channel {
            id: "C_FIRST".to_owned(),
            name: "panoramas-test".to_owned(),
        },
        Channel {
            id: "C_SECOND".to_owned(),
            name: "panoramas-test".to_owned(),
        },
    ];
    let api = Arc::new(RecordingApi::new(channels));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());

    for _ in 0..2 {
        notifier
            .send("panoramas-test", &payload("p"))
            .await
            .expect("should send");
    }

    let posts: Vec<_> = api
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ApiCall::Post { channel_id, .. } => Some(channel_id),
            _ => None,
        })
        .collect();
    assert_eq!(posts, vec!["C_FIRST", "C_FIRST"]);
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_returns_a_handle_for_the_posted_message() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());

    let delivery = notifier
        .send("join-requests-test", &payload("hi"))
        .await
        .expect("should send");

    match delivery {
        Delivery::Sent(handle) => {
            assert_eq!(handle.channel_id, "C_JOIN");
            assert_eq!(handle.ts, POSTED_TS);
        }
        Delivery::Skipped => panic!("expected Sent, got Skipped"),
    }
}

#[tokio::test]
async fn unknown_channel_skips_without_posting() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());

    let delivery = notifier
        .send("no-such-channel", &payload("hi"))
        .await
        .expect("skip is not an error");

    assert_eq!(delivery, Delivery::Skipped);
    assert_eq!(api.calls(), vec![ApiCall::List]);
}

#[tokio::test]
async fn post_failures_propagate() {
    let notifier = Notifier::new(Arc::new(FailingApi::new()), ChannelsConfig::default());

    let err = notifier
        .send("join-requests-test", &payload("hi"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, SlackError::Api { error, .. } if error == "ratelimited"));
}

#[tokio::test]
async fn reply_failures_propagate() {
    let notifier = Notifier::new(Arc::new(FailingApi::new()), ChannelsConfig::default());
    let handle = DeliveryHandle {
        channel_id: "C_INSTALL".to_owned(),
        ts: "1690000000.000200".to_owned(),
    };

    let err = notifier
        .reply(&handle, "Rescheduled to Friday")
        .await
        .expect_err("should fail");
    assert!(matches!(err, SlackError::Api { error, .. } if error == "thread_not_found"));
}

// ---------------------------------------------------------------------------
// Event-level operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn announce_routes_each_event_kind_to_its_channel() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());

    let join = Event::JoinRequest {
        request: JoinRequest {
            id: 427,
            roof_access: true,
        },
        building: building(),
        visible_nodes: None,
    };
    let pano = Event::Panorama {
        pano: Pano {
            url: "https://example.com/p.jpg".to_owned(),
            node_id: 12,
        },
    };
    let install = Event::Appointment {
        appointment: appointment(),
    };

    for event in [&join, &pano, &install] {
        notifier.announce(event).await.expect("should deliver");
    }

    let posts: Vec<_> = api
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ApiCall::Post { channel_id, .. } => Some(channel_id),
            _ => None,
        })
        .collect();
    assert_eq!(posts, vec!["C_JOIN", "C_PANO", "C_INSTALL"]);
}

#[tokio::test]
async fn announce_skips_when_the_bound_channel_is_gone() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let channels = ChannelsConfig {
        panoramas: "renamed-elsewhere".to_owned(),
        ..ChannelsConfig::default()
    };
    let notifier = Notifier::new(api.clone(), channels);

    let event = Event::Panorama {
        pano: Pano {
            url: "https://example.com/p.jpg".to_owned(),
            node_id: 12,
        },
    };
    let delivery = notifier.announce(&event).await.expect("skip is not an error");

    assert_eq!(delivery, Delivery::Skipped);
    assert_eq!(api.calls(), vec![ApiCall::List]);
}

#[tokio::test]
async fn reschedule_edits_in_place_and_threads_the_note() {
    let api = Arc::new(RecordingApi::new(test_channels()));
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());
    let handle = DeliveryHandle {
        channel_id: "C_INSTALL".to_owned(),
        ts: "1690000000.000200".to_owned(),
    };

    notifier
        .reschedule(&appointment(), &handle)
        .await
        .expect("should reschedule");

    // Edits the stored channel and timestamp; no re-resolution in between.
    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(
        &calls[0],
        ApiCall::Update { channel_id, ts, .. }
            if channel_id == "C_INSTALL" && ts == "1690000000.000200"
    ));
    assert!(matches!(
        &calls[1],
        ApiCall::Reply { channel_id, thread_ts, text }
            if channel_id == "C_INSTALL"
                && thread_ts == "1690000000.000200"
                && text == "Rescheduled to Thursday, Mar 14 6:30 PM"
    ));
}

#[tokio::test]
async fn reschedule_propagates_update_failures() {
    let api = Arc::new(FailingApi::new());
    let notifier = Notifier::new(api.clone(), ChannelsConfig::default());
    let handle = DeliveryHandle {
        channel_id: "C_INSTALL".to_owned(),
        ts: "1690000000.000200".to_owned(),
    };

    let err = notifier
        .reschedule(&appointment(), &handle)
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        NotifyError::Slack(SlackError::Api { error, .. }) if error == "message_not_found"
    ));
    // The failed edit ends the flow; nothing lands in the thread.
    assert_eq!(api.calls(), vec!["update"]);
}
