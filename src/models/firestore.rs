use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::user::UserRecord;

pub const EMAIL_FIELD: &str = "email";
pub const TOKEN_FIELD: &str = "fcmToken";

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub name: String,

    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
}

/// Only string values matter here; other Firestore value kinds deserialize with `string_value: None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub string_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchGetRequest {
    pub documents: Vec<String>,
}

/// One entry of a `batchGet` response: either `found` or the `missing` document name.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchGetResponseItem {
    pub found: Option<Document>,
    pub missing: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunQueryResponseItem {
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where")]
    pub filter: QueryFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    pub unary_filter: UnaryFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnaryFilter {
    pub op: &'static str,
    pub field: FieldReference,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl RunQueryRequest {
    pub fn field_not_null(collection: &str, field: &str) -> Self {
        Self {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection.to_string(),
                }],
                filter: QueryFilter {
                    unary_filter: UnaryFilter {
                        op: "IS_NOT_NULL",
                        field: FieldReference {
                            field_path: field.to_string(),
                        },
                    },
                },
            },
        }
    }
}

impl Document {
    /// Last path segment of the resource name, e.g. `.../usuarios_registrados/u1` -> `u1`.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn string_field(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(|v| v.string_value.clone())
    }
}

impl From<Document> for UserRecord {
    fn from(document: Document) -> Self {
        UserRecord {
            id: document.id().to_string(),
            email: document.string_field(EMAIL_FIELD),
            fcm_token: document.string_field(TOKEN_FIELD),
        }
    }
}
