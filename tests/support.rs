use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use push_gateway::{
    api::{AppState, router},
    clients::{PushDelivery, UserDirectory, credentials::AccessTokenSource},
    gateway::NotificationGateway,
    models::{
        notification::{MulticastMessage, MulticastOutcome, PushMessage},
        user::UserRecord,
    },
};
use serde_json::Value;
use tower::ServiceExt;

pub struct StaticToken(pub &'static str);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self, _scopes: &[&str]) -> Result<String, Error> {
        Ok(self.0.to_string())
    }
}

pub struct FailingToken;

#[async_trait]
impl AccessTokenSource for FailingToken {
    async fn access_token(&self, _scopes: &[&str]) -> Result<String, Error> {
        Err(anyhow!("invalid_grant: account not found"))
    }
}

pub fn user(id: &str, email: Option<&str>, token: Option<&str>) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        email: email.map(str::to_string),
        fcm_token: token.map(str::to_string),
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    users: Vec<UserRecord>,
    calls: AtomicUsize,
    unavailable: bool,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable {
            Err(anyhow!("Firestore list failed (503 Service Unavailable)"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, Error> {
        self.record_call()?;
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
        self.record_call()?;
        Ok(self.users.clone())
    }

    async fn list_users_with_tokens(&self) -> Result<Vec<UserRecord>, Error> {
        self.record_call()?;
        Ok(self.users.iter().filter(|u| u.has_token()).cloned().collect())
    }
}

/// Records every delivery; tokens starting with `bad` fail individually in multicasts.
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<PushMessage>>,
    batches: Mutex<Vec<usize>>,
    failure: Option<&'static str>,
}

impl RecordingDelivery {
    pub fn failing(reason: &'static str) -> Self {
        Self {
            failure: Some(reason),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDelivery for RecordingDelivery {
    async fn send(&self, message: &PushMessage) -> Result<String, Error> {
        if let Some(reason) = self.failure {
            return Err(anyhow!(reason));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(format!("projects/demo/messages/{}", sent.len()))
    }

    async fn send_multicast(&self, message: &MulticastMessage) -> Result<MulticastOutcome, Error> {
        if let Some(reason) = self.failure {
            return Err(anyhow!(reason));
        }

        self.batches.lock().unwrap().push(message.tokens().len());

        let mut outcome = MulticastOutcome::default();
        for token in message.tokens() {
            if token.starts_with("bad") {
                outcome.record_failure(token.clone(), "UNREGISTERED".to_string());
            } else {
                outcome.record_success();
            }
        }
        Ok(outcome)
    }
}

pub fn app(directory: Arc<InMemoryDirectory>, delivery: Arc<RecordingDelivery>) -> Router {
    let state = Arc::new(AppState {
        gateway: NotificationGateway::new(directory, delivery),
    });
    router(state)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    respond(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    respond(app, request).await
}

async fn respond(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}
