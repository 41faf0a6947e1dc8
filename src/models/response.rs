use serde::Serialize;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToUserResponse {
    pub success: bool,
    pub message: String,
    pub message_id: String,
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToAllResponse {
    pub success: bool,
    pub message: String,
    pub total_users: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToTopicResponse {
    pub success: bool,
    pub message: String,
    pub message_id: String,
    pub topic: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    pub success: bool,
    pub total: usize,
    pub with_tokens: usize,
    pub users: Vec<UserSummary>,
}
