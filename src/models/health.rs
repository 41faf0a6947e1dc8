use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceBanner {
    pub message: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl HealthCheckResponse {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            timestamp: Utc::now(),
        }
    }
}

impl ServiceBanner {
    pub fn new() -> Self {
        let endpoints = BTreeMap::from([
            (
                "POST /api/notifications/send-to-user",
                "Send a notification to one user",
            ),
            (
                "POST /api/notifications/send-to-all",
                "Send a notification to every user with a token",
            ),
            (
                "POST /api/notifications/send-to-topic",
                "Send a notification to a topic",
            ),
            ("GET /api/notifications/users", "List users and token presence"),
            ("GET /health", "Health check"),
        ]);

        Self {
            message: "Push notification gateway",
            status: "running",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            endpoints,
        }
    }
}

impl Default for ServiceBanner {
    fn default() -> Self {
        Self::new()
    }
}
