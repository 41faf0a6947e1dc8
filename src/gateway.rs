//! Notification Gateway operations: validate, resolve targets, deliver, summarise.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    clients::{PushDelivery, UserDirectory},
    errors::GatewayError,
    models::{
        notification::{
            DEFAULT_CHANNEL_ID, MulticastMessage, MulticastOutcome, NotificationContent,
            PushMessage, SendToAllRequest, SendToTopicRequest, SendToUserRequest,
        },
        user::UserSummary,
        validation::RequiredFields,
    },
    utils::multicast_batches,
};

const SEND_TO_USER_FIELDS: &[&str] = &["userId", "title", "body"];
const SEND_TO_ALL_FIELDS: &[&str] = &["title", "body"];
const SEND_TO_TOPIC_FIELDS: &[&str] = &["topic", "title", "body"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDelivery {
    pub message_id: String,
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub total_users: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDelivery {
    pub message_id: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListing {
    pub total: usize,
    pub with_tokens: usize,
    pub users: Vec<UserSummary>,
}

#[derive(Clone)]
pub struct NotificationGateway {
    directory: Arc<dyn UserDirectory>,
    delivery: Arc<dyn PushDelivery>,
}

impl NotificationGateway {
    pub fn new(directory: Arc<dyn UserDirectory>, delivery: Arc<dyn PushDelivery>) -> Self {
        Self {
            directory,
            delivery,
        }
    }

    pub async fn send_to_user(&self, request: SendToUserRequest) -> Result<UserDelivery, GatewayError> {
        let mut fields = RequiredFields::new(SEND_TO_USER_FIELDS);
        let user_id = fields.take("userId", request.user_id);
        let title = fields.take("title", request.title);
        let body = fields.take("body", request.body);
        fields.finish()?;

        info!(user_id = %user_id, "Sending notification to user");

        let user = self
            .directory
            .get_user(&user_id)
            .await?
            .ok_or_else(|| GatewayError::UserNotFound {
                user_id: user_id.clone(),
            })?;

        let token = user
            .delivery_token()
            .ok_or_else(|| GatewayError::MissingToken {
                user_id: user_id.clone(),
            })?
            .to_string();

        let channel_id = request
            .channel_id
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL_ID.to_string());

        let content = NotificationContent {
            title,
            body,
            data: request.data.unwrap_or_default(),
        };

        let message_id = self
            .delivery
            .send(&PushMessage::to_device(token, content, channel_id))
            .await?;

        info!(
            user_id = %user_id,
            email = user.email.as_deref().unwrap_or(""),
            message_id = %message_id,
            "Notification delivered to user"
        );

        Ok(UserDelivery {
            message_id,
            user_id,
            email: user.email,
        })
    }

    pub async fn send_to_all(&self, request: SendToAllRequest) -> Result<BroadcastSummary, GatewayError> {
        let mut fields = RequiredFields::new(SEND_TO_ALL_FIELDS);
        let title = fields.take("title", request.title);
        let body = fields.take("body", request.body);
        fields.finish()?;

        let tokens: Vec<String> = self
            .directory
            .list_users_with_tokens()
            .await?
            .iter()
            .filter_map(|user| user.delivery_token().map(str::to_string))
            .collect();

        if tokens.is_empty() {
            return Err(GatewayError::NoRecipients);
        }

        info!(total_tokens = tokens.len(), "Broadcasting notification to all users");

        let content = NotificationContent {
            title,
            body,
            data: request.data.unwrap_or_default(),
        };

        let mut totals = MulticastOutcome::default();

        for (index, batch) in multicast_batches(&tokens).into_iter().enumerate() {
            let message = MulticastMessage::new(batch.to_vec(), content.clone())?;
            let outcome = self.delivery.send_multicast(&message).await?;

            info!(
                batch = index,
                batch_size = batch.len(),
                success_count = outcome.success_count,
                failure_count = outcome.failure_count,
                "Multicast batch delivered"
            );

            totals.merge(outcome);
        }

        if totals.failure_count > 0 {
            warn!(
                success_count = totals.success_count,
                failure_count = totals.failure_count,
                reasons = ?totals.failure_reasons(),
                "Broadcast finished with delivery failures"
            );
        } else {
            info!(success_count = totals.success_count, "Broadcast finished");
        }

        Ok(BroadcastSummary {
            total_users: tokens.len(),
            success_count: totals.success_count,
            failure_count: totals.failure_count,
        })
    }

    pub async fn send_to_topic(&self, request: SendToTopicRequest) -> Result<TopicDelivery, GatewayError> {
        let mut fields = RequiredFields::new(SEND_TO_TOPIC_FIELDS);
        let topic = fields.take("topic", request.topic);
        let title = fields.take("title", request.title);
        let body = fields.take("body", request.body);
        fields.finish()?;

        let content = NotificationContent {
            title,
            body,
            data: request.data.unwrap_or_default(),
        };

        let message_id = self
            .delivery
            .send(&PushMessage::to_topic(topic.clone(), content))
            .await?;

        info!(topic = %topic, message_id = %message_id, "Notification delivered to topic");

        Ok(TopicDelivery { message_id, topic })
    }

    pub async fn list_users(&self) -> Result<UserListing, GatewayError> {
        let users: Vec<UserSummary> = self
            .directory
            .list_users()
            .await?
            .iter()
            .map(|user| user.summary())
            .collect();

        let with_tokens = users.iter().filter(|u| u.has_token).count();

        Ok(UserListing {
            total: users.len(),
            with_tokens,
            users,
        })
    }
}
