use std::sync::Arc;

use anyhow::{Error, Result};
use push_gateway::{
    api::{AppState, run_api_server},
    clients::{
        credentials::{AccessTokenSource, ServiceAccountCredentials},
        fcm::FcmClient,
        firestore::FirestoreDirectory,
    },
    config::Config,
    gateway::NotificationGateway,
    logging::init_tracing,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = Config::load()?;
    let source = config.credential_source();

    info!(port = config.port, credential_source = source.kind(), "Configuration loaded");

    let credentials = match ServiceAccountCredentials::load(&source) {
        Ok(credentials) => Arc::new(credentials),
        Err(e) => {
            error!(error = %e, "Failed to initialize Firebase credentials");
            return Err(e);
        }
    };

    let project_id = credentials.project_id().to_string();
    let tokens: Arc<dyn AccessTokenSource> = credentials;

    let directory = FirestoreDirectory::new(&project_id, Arc::clone(&tokens))?;
    let delivery = FcmClient::new(&project_id, tokens)?;

    let state = Arc::new(AppState {
        gateway: NotificationGateway::new(Arc::new(directory), Arc::new(delivery)),
    });

    run_api_server(config.port, state).await
}
