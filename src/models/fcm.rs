use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::notification::{NotificationContent, PlatformHints, PushTarget};

#[derive(Debug, Clone, Serialize)]
pub struct FcmRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    pub notification: FcmNotification,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<ApnsConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndroidConfig {
    pub priority: &'static str,
    pub notification: AndroidNotification,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidNotification {
    pub sound: &'static str,
    pub channel_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aps {
    pub sound: &'static str,
    pub badge: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmResponse {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmErrorResponse {
    pub error: FcmErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmErrorBody {
    pub message: Option<String>,
    pub status: Option<String>,

    #[serde(default)]
    pub details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FcmErrorDetail {
    pub error_code: Option<String>,
}

impl FcmMessage {
    pub fn new(target: &PushTarget, content: &NotificationContent, hints: Option<&PlatformHints>) -> Self {
        let (token, topic) = match target {
            PushTarget::Token(token) => (Some(token.clone()), None),
            PushTarget::Topic(topic) => (None, Some(topic.clone())),
        };

        Self {
            token,
            topic,
            notification: FcmNotification {
                title: content.title.clone(),
                body: content.body.clone(),
            },
            data: content.data.clone(),
            android: hints.map(|h| AndroidConfig {
                priority: "high",
                notification: AndroidNotification {
                    sound: "default",
                    channel_id: h.channel_id.clone(),
                },
            }),
            apns: hints.and_then(|h| h.apns_badge).map(|badge| ApnsConfig {
                payload: ApnsPayload {
                    aps: Aps {
                        sound: "default",
                        badge,
                    },
                },
            }),
        }
    }
}

impl FcmErrorBody {
    /// FCM-specific code such as `UNREGISTERED`, falling back to the RPC status.
    pub fn code(&self) -> Option<&str> {
        self.details
            .iter()
            .find_map(|d| d.error_code.as_deref())
            .or(self.status.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::PushMessage;

    fn content() -> NotificationContent {
        NotificationContent {
            title: "Hi".to_string(),
            body: "There".to_string(),
            data: HashMap::new(),
        }
    }

    #[test]
    fn test_device_message_wire_shape() {
        let message = PushMessage::to_device("tok123".to_string(), content(), "general_channel".to_string());
        let request = FcmRequest {
            message: FcmMessage::new(&message.target, &message.content, message.hints.as_ref()),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "message": {
                    "token": "tok123",
                    "notification": {"title": "Hi", "body": "There"},
                    "data": {"channelId": "general_channel"},
                    "android": {
                        "priority": "high",
                        "notification": {"sound": "default", "channelId": "general_channel"}
                    },
                    "apns": {"payload": {"aps": {"sound": "default", "badge": 1}}}
                }
            })
        );
    }

    #[test]
    fn test_plain_message_omits_platform_blocks() {
        let message = FcmMessage::new(&PushTarget::Token("tok".to_string()), &content(), None);
        let json = serde_json::to_value(&message).unwrap();

        assert!(json.get("android").is_none());
        assert!(json.get("apns").is_none());
        assert!(json.get("data").is_none());
        assert!(json.get("topic").is_none());
    }

    #[test]
    fn test_error_code_prefers_fcm_detail() {
        let error: FcmErrorResponse = serde_json::from_value(serde_json::json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "UNREGISTERED"
                }]
            }
        }))
        .unwrap();

        assert_eq!(error.error.code(), Some("UNREGISTERED"));
    }
}
