use std::collections::{BTreeMap, HashMap};

use anyhow::{Error, Result, anyhow};
use serde::Deserialize;

pub const DEFAULT_CHANNEL_ID: &str = "general_channel";
pub const CHANNEL_ID_KEY: &str = "channelId";

/// Upper bound on tokens per multicast call imposed by FCM.
pub const MULTICAST_TOKEN_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToUserRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<HashMap<String, String>>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendToAllRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendToTopicRequest {
    pub topic: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    Token(String),
    Topic(String),
}

/// OS-specific delivery hints attached to single-target messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformHints {
    pub channel_id: String,
    pub apns_badge: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub target: PushTarget,
    pub content: NotificationContent,
    pub hints: Option<PlatformHints>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastMessage {
    tokens: Vec<String>,
    content: NotificationContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFailure {
    pub token: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticastOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<TokenFailure>,
}

impl PushMessage {
    /// Direct message to one device. The channel id is merged into the custom data.
    pub fn to_device(token: String, mut content: NotificationContent, channel_id: String) -> Self {
        content
            .data
            .insert(CHANNEL_ID_KEY.to_string(), channel_id.clone());

        Self {
            target: PushTarget::Token(token),
            content,
            hints: Some(PlatformHints {
                channel_id,
                apns_badge: Some(1),
            }),
        }
    }

    pub fn to_topic(topic: String, content: NotificationContent) -> Self {
        Self {
            target: PushTarget::Topic(topic),
            content,
            hints: Some(PlatformHints {
                channel_id: DEFAULT_CHANNEL_ID.to_string(),
                apns_badge: None,
            }),
        }
    }
}

impl MulticastMessage {
    pub fn new(tokens: Vec<String>, content: NotificationContent) -> Result<Self, Error> {
        if tokens.is_empty() {
            return Err(anyhow!("Multicast message requires at least one token"));
        }

        if tokens.len() > MULTICAST_TOKEN_LIMIT {
            return Err(anyhow!(
                "Multicast message has {} tokens (maximum {})",
                tokens.len(),
                MULTICAST_TOKEN_LIMIT
            ));
        }

        Ok(Self { tokens, content })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn content(&self) -> &NotificationContent {
        &self.content
    }
}

impl MulticastOutcome {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, token: String, reason: String) {
        self.failure_count += 1;
        self.failures.push(TokenFailure { token, reason });
    }

    pub fn merge(&mut self, other: MulticastOutcome) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
        self.failures.extend(other.failures);
    }

    /// Failure count per distinct reason, e.g. `{"UNREGISTERED": 3}`.
    pub fn failure_reasons(&self) -> BTreeMap<&str, usize> {
        let mut reasons = BTreeMap::new();
        for failure in &self.failures {
            *reasons.entry(failure.reason.as_str()).or_insert(0) += 1;
        }
        reasons
    }
}
