use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::{
    clients::{
        PushDelivery,
        credentials::{AccessTokenSource, FCM_SCOPE},
    },
    models::{
        fcm::{FcmErrorResponse, FcmMessage, FcmRequest, FcmResponse},
        notification::{
            MULTICAST_TOKEN_LIMIT, MulticastMessage, MulticastOutcome, PushMessage, PushTarget,
        },
    },
};

pub const FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// Concurrent per-token requests while fanning out a multicast batch.
const MULTICAST_CONCURRENCY: usize = 50;

pub struct FcmClient {
    http_client: Client,
    tokens: Arc<dyn AccessTokenSource>,
    send_url: String,
}

impl FcmClient {
    pub fn new(project_id: &str, tokens: Arc<dyn AccessTokenSource>) -> Result<Self, Error> {
        Self::with_base_url(FCM_BASE_URL, project_id, tokens)
    }

    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            base_url.trim_end_matches('/'),
            project_id
        );

        info!(project_id, "FCM client initialized");

        Ok(Self {
            http_client,
            tokens,
            send_url,
        })
    }

    async fn post_message(&self, access_token: &str, request: &FcmRequest) -> Result<String, Error> {
        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("FCM request failed: {}", e))?;

        let status = response.status();

        if status.is_success() {
            let body: FcmResponse = response.json().await?;
            return Ok(body.name);
        }

        let error_text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<FcmErrorResponse>(&error_text) {
            Ok(parsed) => Err(anyhow!(
                "FCM request failed ({}): {} {}",
                status,
                parsed.error.code().unwrap_or("UNKNOWN"),
                parsed.error.message.as_deref().unwrap_or_default()
            )),
            Err(_) => Err(anyhow!("FCM request failed ({}): {}", status, error_text)),
        }
    }
}

#[async_trait]
impl PushDelivery for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<String, Error> {
        let target_kind = match &message.target {
            PushTarget::Token(_) => "token",
            PushTarget::Topic(_) => "topic",
        };

        debug!(target_kind, title = %message.content.title, "Sending FCM push notification");

        let access_token = self.tokens.access_token(&[FCM_SCOPE]).await?;
        let request = FcmRequest {
            message: FcmMessage::new(&message.target, &message.content, message.hints.as_ref()),
        };

        let message_id = self.post_message(&access_token, &request).await?;

        info!(message_id = %message_id, target_kind, "FCM push notification sent successfully");

        Ok(message_id)
    }

    async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastOutcome, Error> {
        let tokens = message.tokens();

        if tokens.len() > MULTICAST_TOKEN_LIMIT {
            return Err(anyhow!(
                "Multicast batch of {} exceeds the limit of {}",
                tokens.len(),
                MULTICAST_TOKEN_LIMIT
            ));
        }

        let access_token = self.tokens.access_token(&[FCM_SCOPE]).await?;

        let results: Vec<(String, Result<String, Error>)> = stream::iter(tokens.iter().cloned())
            .map(|token| {
                let request = FcmRequest {
                    message: FcmMessage::new(
                        &PushTarget::Token(token.clone()),
                        message.content(),
                        None,
                    ),
                };
                let access_token = access_token.as_str();

                async move {
                    let result = self.post_message(access_token, &request).await;
                    (token, result)
                }
            })
            .buffer_unordered(MULTICAST_CONCURRENCY)
            .collect()
            .await;

        let mut outcome = MulticastOutcome::default();

        for (token, result) in results {
            match result {
                Ok(_) => outcome.record_success(),
                Err(e) => {
                    debug!(error = %e, "Multicast delivery to token failed");
                    outcome.record_failure(token, e.to_string());
                }
            }
        }

        if outcome.failure_count > 0 {
            warn!(
                success_count = outcome.success_count,
                failure_count = outcome.failure_count,
                "Multicast batch completed with failures"
            );
        } else {
            info!(success_count = outcome.success_count, "Multicast batch completed");
        }

        Ok(outcome)
    }
}
