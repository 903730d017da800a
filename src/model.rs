//! Records exchanged with the LinkVault REST API.
//!
//! `Tag` and `Bookmark` mirror what the server returns; `NewTag`,
//! `NewBookmark` and `BookmarkPatch` are the request bodies the client sends.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

pub type TagId = i64;
pub type BookmarkId = i64;

/// Color the server assigns when a tag is stored without one.
pub const SERVER_TAG_COLOR: &str = "#94a3b8";
/// Longest tag name the server column accepts.
pub const TAG_NAME_MAX: usize = 32;
/// Longest bookmark title the server column accepts.
pub const TITLE_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default = "server_tag_color")]
    pub color: String,
}

fn server_tag_color() -> String {
    SERVER_TAG_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub url: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Bookmark {
    /// Tag ids in the order the server returned the tags.
    pub fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub notes: String,
    pub tag_ids: Vec<TagId>,
}

/// Partial update sent with `PATCH /api/bookmarks/{id}/`. The url is not
/// editable once a bookmark exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkPatch {
    pub title: String,
    pub notes: String,
    pub tag_ids: Vec<TagId>,
}

/// Query for `GET /api/bookmarks/`. Tag ids are matched conjunctively by the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkQuery {
    pub tag_ids: Vec<TagId>,
    pub search: Option<String>,
}

impl BookmarkQuery {
    /// Render the query string including the leading `?`, or an empty
    /// string when nothing is filtered. Ids keep selection order and the
    /// commas stay literal.
    pub fn query_string(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if !self.tag_ids.is_empty() {
            params.push(format!("tag_ids={}", join_ids(&self.tag_ids)));
        }
        if let Some(q) = self.search.as_deref().map(str::trim) {
            if !q.is_empty() {
                params.push(format!("q={}", urlencoding::encode(q)));
            }
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

pub fn join_ids(ids: &[TagId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Servers running without timezone support send naive timestamps; those are
// dropped instead of failing the whole list.
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()))
}
