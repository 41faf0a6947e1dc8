use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    errors::GatewayError,
    gateway::NotificationGateway,
    models::{
        health::{HealthCheckResponse, ServiceBanner},
        notification::{SendToAllRequest, SendToTopicRequest, SendToUserRequest},
        response::{ListUsersResponse, SendToAllResponse, SendToTopicResponse, SendToUserResponse},
    },
};

pub struct AppState {
    pub gateway: NotificationGateway,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/notifications/send-to-user", post(send_to_user))
        .route("/api/notifications/send-to-all", post(send_to_all))
        .route("/api/notifications/send-to-topic", post(send_to_topic))
        .route("/api/notifications/users", get(list_users))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(port: u16, state: Arc<AppState>) -> Result<(), Error> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Notification gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| GatewayError::InvalidBody(rejection.body_text()))
}

async fn index() -> Json<ServiceBanner> {
    Json(ServiceBanner::new())
}

async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::healthy())
}

async fn send_to_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendToUserRequest>, JsonRejection>,
) -> Result<Json<SendToUserResponse>, GatewayError> {
    let delivery = state.gateway.send_to_user(body(payload)?).await?;

    Ok(Json(SendToUserResponse {
        success: true,
        message: "Notification sent successfully".to_string(),
        message_id: delivery.message_id,
        user_id: delivery.user_id,
        email: delivery.email,
    }))
}

async fn send_to_all(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendToAllRequest>, JsonRejection>,
) -> Result<Json<SendToAllResponse>, GatewayError> {
    let summary = state.gateway.send_to_all(body(payload)?).await?;

    Ok(Json(SendToAllResponse {
        success: true,
        message: "Notifications sent".to_string(),
        total_users: summary.total_users,
        success_count: summary.success_count,
        failure_count: summary.failure_count,
    }))
}

async fn send_to_topic(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendToTopicRequest>, JsonRejection>,
) -> Result<Json<SendToTopicResponse>, GatewayError> {
    let delivery = state.gateway.send_to_topic(body(payload)?).await?;

    Ok(Json(SendToTopicResponse {
        success: true,
        message: "Notification sent to topic".to_string(),
        message_id: delivery.message_id,
        topic: delivery.topic,
    }))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListUsersResponse>, GatewayError> {
    let listing = state.gateway.list_users().await?;

    Ok(Json(ListUsersResponse {
        success: true,
        total: listing.total,
        with_tokens: listing.with_tokens,
        users: listing.users,
    }))
}
