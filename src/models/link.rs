use serde::{Deserialize, Serialize};

/// A persisted short link. `id` and `user_id` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub user_id: i64,
    pub url: String,
    pub keyword: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `PATCH /link/:id`. Every field is optional on the wire so that a
/// missing field can be reported by name instead of as a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateLink {
    pub title: Option<String>,
    pub keyword: Option<String>,
    pub url: Option<String>,
}

/// Body of `POST /link` and of the creation dialog form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateLink {
    pub url: Option<String>,
    pub keyword: Option<String>,
}

/// Field values that passed validation and are ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFields {
    pub url: String,
    pub keyword: String,
    pub title: String,
}
