use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    clients::{
        UserDirectory,
        credentials::{AccessTokenSource, DATASTORE_SCOPE},
    },
    models::{
        firestore::{
            BatchGetRequest, BatchGetResponseItem, ListDocumentsResponse, RunQueryRequest,
            RunQueryResponseItem, TOKEN_FIELD,
        },
        user::UserRecord,
    },
};

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
pub const USERS_COLLECTION: &str = "usuarios_registrados";

const PAGE_SIZE: u32 = 300;

pub struct FirestoreDirectory {
    http_client: Client,
    tokens: Arc<dyn AccessTokenSource>,
    database: String,
    documents_url: String,
    collection: String,
}

impl FirestoreDirectory {
    pub fn new(project_id: &str, tokens: Arc<dyn AccessTokenSource>) -> Result<Self, Error> {
        Self::with_base_url(FIRESTORE_BASE_URL, project_id, tokens)
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

        let database = format!("projects/{}/databases/(default)", project_id);
        let documents_url = format!("{}/v1/{}/documents", base_url.trim_end_matches('/'), database);

        info!(project_id, collection = USERS_COLLECTION, "Firestore directory initialized");

        Ok(Self {
            http_client,
            tokens,
            database,
            documents_url,
            collection: USERS_COLLECTION.to_string(),
        })
    }

    fn document_name(&self, document_id: &str) -> Result<String, Error> {
        if document_id.contains('/') {
            return Err(anyhow!("Invalid document id: {}", document_id));
        }

        Ok(format!(
            "{}/documents/{}/{}",
            self.database, self.collection, document_id
        ))
    }

    async fn bearer(&self) -> Result<String, Error> {
        self.tokens.access_token(&[DATASTORE_SCOPE]).await
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<ListDocumentsResponse, Error> {
        let url = format!("{}/{}", self.documents_url, self.collection);
        let page_size = PAGE_SIZE.to_string();

        let mut query = vec![("pageSize", page_size.as_str())];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .query(&query)
            .send()
            .await
            .map_err(|e| anyhow!("Firestore list request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Firestore list failed ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl UserDirectory for FirestoreDirectory {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, Error> {
        let url = format!("{}:batchGet", self.documents_url);
        let request = BatchGetRequest {
            documents: vec![self.document_name(user_id)?],
        };

        debug!(user_id, "Fetching user document");

        // A 404 here means the project or database is wrong, not that the user is absent.
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Firestore get request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Firestore get failed ({}): {}", status, error_text));
        }

        let items: Vec<BatchGetResponseItem> = response.json().await?;

        match items.into_iter().find(|item| item.found.is_some() || item.missing.is_some()) {
            Some(BatchGetResponseItem {
                found: Some(document),
                ..
            }) => Ok(Some(document.into())),
            Some(_) => Ok(None),
            None => Err(anyhow!("Firestore batchGet returned no result for {}", user_id)),
        }
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
        let mut users = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            users.extend(page.documents.into_iter().map(UserRecord::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(count = users.len(), "Listed user documents");

        Ok(users)
    }

    async fn list_users_with_tokens(&self) -> Result<Vec<UserRecord>, Error> {
        let url = format!("{}:runQuery", self.documents_url);
        let query = RunQueryRequest::field_not_null(&self.collection, TOKEN_FIELD);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&query)
            .send()
            .await
            .map_err(|e| anyhow!("Firestore query request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Firestore query failed ({}): {}", status, error_text));
        }

        let items: Vec<RunQueryResponseItem> = response.json().await?;

        let users: Vec<UserRecord> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(UserRecord::from)
            .filter(UserRecord::has_token)
            .collect();

        debug!(count = users.len(), "Queried users with tokens");

        Ok(users)
    }
}
