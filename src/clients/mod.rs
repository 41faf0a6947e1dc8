pub mod credentials;
pub mod fcm;
pub mod firestore;

use anyhow::{Error, Result};
use async_trait::async_trait;

use crate::models::{
    notification::{MulticastMessage, MulticastOutcome, PushMessage},
    user::UserRecord,
};

/// Read access to registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, Error>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, Error>;

    /// Users whose token is present and non-empty.
    async fn list_users_with_tokens(&self) -> Result<Vec<UserRecord>, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushDelivery: Send + Sync {
    /// Returns the backend message id.
    async fn send(&self, message: &PushMessage) -> Result<String, Error>;

    /// Per-token failures are reported in the outcome; only transport or auth failures are errors.
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastOutcome, Error>;
}
