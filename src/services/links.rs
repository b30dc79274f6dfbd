//! Link ownership, validation and persistence.
//!
//! Every mutating operation checks its preconditions in a fixed order and
//! stops at the first failure, so a rejected request never touches the
//! `links` table:
//!
//! 1. the caller is signed in,
//! 2. the link id is present,
//! 3. (update only) `url`, `keyword` and `title` are present, then the
//!    keyword is well-formed and not reserved,
//! 4. the link exists,
//! 5. the caller owns it,
//! 6. (update only) no other link holds the keyword.
//!
//! Step 6 is checked up front for the common case and again by the
//! `UNIQUE (keyword)` constraint at write time, which [`LinkError::from`]
//! translates into [`LinkError::KeywordTaken`].

use crate::models::{CreateLink, Link, LinkFields, UpdateLink};
use crate::Database;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{ErrorCode, OptionalExtension};
use thiserror::Error;

pub const KEYWORD_TAKEN_MESSAGE: &str = "Please enter different keyword.";

static KEYWORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_-]{2,}$").expect("Invalid keyword regex pattern"));

/// First path segments served by fixed routes; a short link there could never redirect.
pub const RESERVED_KEYWORDS: &[&str] = &["health", "link", "links", "login", "logout"];

const LINK_COLUMNS: &str = "id, user_id, url, keyword, title, created_at, updated_at";

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("You must be signed in.")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Please enter different keyword.")]
    KeywordTaken,

    #[error("Link not found.")]
    NotFound,

    #[error("You do not own this link.")]
    Forbidden,

    #[error("{0}")]
    Internal(String),
}

impl LinkError {
    /// The form field the error belongs to, when it belongs to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { field, .. } => Some(*field),
            Self::KeywordTaken => Some("keyword"),
            _ => None,
        }
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}

fn is_keyword_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == ErrorCode::ConstraintViolation && msg.contains("links.keyword")
        }
        _ => false,
    }
}

impl From<rusqlite::Error> for LinkError {
    fn from(err: rusqlite::Error) -> Self {
        if is_keyword_conflict(&err) {
            return Self::KeywordTaken;
        }
        tracing::error!("Link store error: {}", err);
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for LinkError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<rusqlite::Error>() {
            Ok(sqlite) => sqlite.into(),
            Err(other) => {
                tracing::error!("Link store error: {:#}", other);
                Self::Internal(other.to_string())
            }
        }
    }
}

// Input validation

pub fn require_caller(caller: Option<i64>) -> Result<i64, LinkError> {
    caller.ok_or(LinkError::Unauthenticated)
}

pub fn require_link_id(link_id: Option<&str>) -> Result<&str, LinkError> {
    match link_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(LinkError::BadRequest("Link ID is required.".to_string())),
    }
}

fn required<'a>(
    value: Option<&'a str>,
    field: &'static str,
    label: &str,
) -> Result<&'a str, LinkError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LinkError::invalid(field, format!("{} is required.", label))),
    }
}

/// Presence checks for an update, in url, keyword, title order. Once all three
/// are present the keyword must also be one `GET /:keyword` can resolve.
pub fn validate_update(input: &UpdateLink) -> Result<LinkFields, LinkError> {
    let url = required(input.url.as_deref(), "url", "URL")?;
    let keyword = required(input.keyword.as_deref(), "keyword", "Keyword")?;
    let title = required(input.title.as_deref(), "title", "Title")?;
    let keyword = normalize_keyword(keyword)?;

    Ok(LinkFields {
        url: url.to_string(),
        keyword,
        title: title.to_string(),
    })
}

/// The destination must parse as an absolute URL.
pub fn validate_url(raw: &str) -> Result<String, LinkError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LinkError::invalid("url", "URL is required."));
    }
    url::Url::parse(raw)
        .map(|_| raw.to_string())
        .map_err(|_| LinkError::invalid("url", "Please enter a valid URL."))
}

/// Case-folds the keyword, then requires two or more of `[a-z0-9_-]` and
/// rejects [`RESERVED_KEYWORDS`].
pub fn normalize_keyword(raw: &str) -> Result<String, LinkError> {
    let keyword = raw.trim().to_lowercase();
    if keyword.is_empty() {
        return Err(LinkError::invalid("keyword", "Keyword is required."));
    }
    if !KEYWORD_REGEX.is_match(&keyword) {
        return Err(LinkError::invalid(
            "keyword",
            "Keyword must be at least 2 characters of a-z, 0-9, - or _.",
        ));
    }
    if RESERVED_KEYWORDS.contains(&keyword.as_str()) {
        return Err(LinkError::invalid(
            "keyword",
            format!("The keyword \"{}\" is reserved.", keyword),
        ));
    }
    Ok(keyword)
}

pub fn validate_create(input: &CreateLink) -> Result<(String, String), LinkError> {
    let url = validate_url(input.url.as_deref().unwrap_or(""))?;
    let keyword = normalize_keyword(input.keyword.as_deref().unwrap_or(""))?;
    Ok((url, keyword))
}

// Store access

fn row_to_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        id: row.get(0)?,
        user_id: row.get(1)?,
        url: row.get(2)?,
        keyword: row.get(3)?,
        title: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn find_link(db: &Database, id: &str) -> Result<Option<Link>> {
    let conn = db.get()?;
    let link = conn
        .query_row(
            &format!("SELECT {} FROM links WHERE id = ?", LINK_COLUMNS),
            [id],
            row_to_link,
        )
        .optional()?;
    Ok(link)
}

pub fn find_link_by_keyword(db: &Database, keyword: &str) -> Result<Option<Link>> {
    let conn = db.get()?;
    let link = conn
        .query_row(
            &format!("SELECT {} FROM links WHERE keyword = ?", LINK_COLUMNS),
            [keyword.trim().to_lowercase()],
            row_to_link,
        )
        .optional()?;
    Ok(link)
}

/// Whether a link other than `excluding` already holds `keyword`.
pub fn keyword_taken(db: &Database, keyword: &str, excluding: Option<&str>) -> Result<bool> {
    let conn = db.get()?;
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM links WHERE keyword = ?1 AND (?2 IS NULL OR id <> ?2)",
            rusqlite::params![keyword, excluding],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn list_links_for_user(db: &Database, user_id: i64) -> Result<Vec<Link>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM links WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        LINK_COLUMNS
    ))?;
    let links = stmt
        .query_map([user_id], row_to_link)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(links)
}

pub fn count_links(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
    Ok(count)
}

/// Inserts a new link. A keyword collision surfaces as [`LinkError::KeywordTaken`].
pub fn insert_link(db: &Database, user_id: i64, fields: &LinkFields) -> Result<Link, LinkError> {
    let id = uuid::Uuid::new_v4().to_string();
    let conn = db.get()?;
    let link = conn.query_row(
        &format!(
            "INSERT INTO links (id, user_id, url, keyword, title) VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {}",
            LINK_COLUMNS
        ),
        rusqlite::params![id, user_id, fields.url, fields.keyword, fields.title],
        row_to_link,
    )?;
    Ok(link)
}

/// Overwrites url, keyword and title of an existing link in one statement.
pub fn apply_update(db: &Database, id: &str, fields: &LinkFields) -> Result<Link, LinkError> {
    let conn = db.get()?;
    let link = conn
        .query_row(
            &format!(
                "UPDATE links SET url = ?1, keyword = ?2, title = ?3, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?4
                 RETURNING {}",
                LINK_COLUMNS
            ),
            rusqlite::params![fields.url, fields.keyword, fields.title, id],
            row_to_link,
        )
        .optional()?;
    link.ok_or(LinkError::NotFound)
}

fn remove_link(db: &Database, id: &str) -> Result<Link, LinkError> {
    let conn = db.get()?;
    let link = conn
        .query_row(
            &format!("DELETE FROM links WHERE id = ? RETURNING {}", LINK_COLUMNS),
            [id],
            row_to_link,
        )
        .optional()?;
    link.ok_or(LinkError::NotFound)
}

// Operations

/// Loads the link and checks it belongs to `caller`.
pub fn authorize(db: &Database, caller: i64, link_id: &str) -> Result<Link, LinkError> {
    let link = find_link(db, link_id)?.ok_or(LinkError::NotFound)?;
    if link.user_id != caller {
        tracing::warn!(
            "User {} attempted to modify link {} owned by user {}",
            caller,
            link.id,
            link.user_id
        );
        return Err(LinkError::Forbidden);
    }
    Ok(link)
}

pub fn update_link(
    db: &Database,
    caller: Option<i64>,
    link_id: Option<&str>,
    input: &UpdateLink,
) -> Result<Link, LinkError> {
    let caller = require_caller(caller)?;
    let link_id = require_link_id(link_id)?;
    let fields = validate_update(input)?;
    let existing = authorize(db, caller, link_id)?;

    if keyword_taken(db, &fields.keyword, Some(&existing.id))? {
        return Err(LinkError::KeywordTaken);
    }

    let link = apply_update(db, &existing.id, &fields)?;
    tracing::info!("Link {} updated by user {}", link.id, caller);
    Ok(link)
}

/// Deletes an owned link and returns it as it was before deletion.
pub fn delete_link(
    db: &Database,
    caller: Option<i64>,
    link_id: Option<&str>,
) -> Result<Link, LinkError> {
    let caller = require_caller(caller)?;
    let link_id = require_link_id(link_id)?;
    let existing = authorize(db, caller, link_id)?;

    let link = remove_link(db, &existing.id)?;
    tracing::info!("Link {} ({}) deleted by user {}", link.id, link.keyword, caller);
    Ok(link)
}

/// Creates a link for `caller`. A missing or blank `title` falls back to the URL.
pub fn create_link(
    db: &Database,
    caller: Option<i64>,
    input: &CreateLink,
    title: Option<&str>,
) -> Result<Link, LinkError> {
    let caller = require_caller(caller)?;
    let (url, keyword) = validate_create(input)?;
    let title = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => url.clone(),
    };

    let link = insert_link(
        db,
        caller,
        &LinkFields {
            url,
            keyword,
            title,
        },
    )?;
    tracing::info!("Link {} ({}) created by user {}", link.id, link.keyword, caller);
    Ok(link)
}

pub fn list_links(db: &Database, caller: Option<i64>) -> Result<Vec<Link>, LinkError> {
    let caller = require_caller(caller)?;
    Ok(list_links_for_user(db, caller)?)
}
