use std::fs;

use anyhow::{Context, Error, Result, anyhow};
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::CredentialSource;

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self, scopes: &[&str]) -> Result<String, Error>;
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    project_id: Option<String>,
    client_email: Option<String>,
}

pub struct ServiceAccountCredentials {
    project_id: String,
    account: CustomServiceAccount,
}

impl ServiceAccountCredentials {
    pub fn load(source: &CredentialSource) -> Result<Self, Error> {
        let json = match source {
            CredentialSource::Inline(json) => json.clone(),
            CredentialSource::File(path) => fs::read_to_string(path).with_context(|| {
                format!("Failed to read credentials file {}", path.display())
            })?,
        };

        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let key = read_service_account_key(json)?;
        let project_id = key
            .project_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("Service account key has no project_id"))?;

        let account = CustomServiceAccount::from_json(json)
            .map_err(|e| anyhow!("Invalid service account key: {}", e))?;

        info!(
            project_id = %project_id,
            client_email = key.client_email.as_deref().unwrap_or("unknown"),
            "Service account credentials loaded"
        );

        Ok(Self {
            project_id,
            account,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountCredentials {
    async fn access_token(&self, scopes: &[&str]) -> Result<String, Error> {
        let token = self
            .account
            .token(scopes)
            .await
            .map_err(|e| anyhow!("Failed to obtain access token: {}", e))?;

        debug!(?scopes, "Access token obtained");

        Ok(token.as_str().to_string())
    }
}

fn read_service_account_key(json: &str) -> Result<ServiceAccountKey, Error> {
    serde_json::from_str(json).map_err(|e| anyhow!("Credentials are not valid JSON: {}", e))
}
