//! Access to the LinkVault REST API.
//!
//! [`Backend`] is the seam between the client state machine and the network.
//! [`HttpBackend`] talks to a real server; tests swap in an in-memory double.

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::HttpBackend;

use crate::error::ClientError;
use crate::model::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, NewBookmark, NewTag,
    Tag, TagId,
};

pub const TAGS_PATH: &str = "/api/tags/";
pub const BOOKMARKS_PATH: &str = "/api/bookmarks/";

pub fn tag_path(id: TagId) -> String {
    format!("{TAGS_PATH}{id}/")
}

pub fn bookmark_path(id: BookmarkId) -> String {
    format!("{BOOKMARKS_PATH}{id}/")
}

/// Every call maps to exactly one HTTP request. Non-2xx answers come back
/// as [`ClientError::Http`].
pub trait Backend {
    fn list_tags(&mut self) -> Result<Vec<Tag>, ClientError>;

    fn create_tag(&mut self, tag: &NewTag) -> Result<Tag, ClientError>;

    fn delete_tag(&mut self, id: TagId) -> Result<(), ClientError>;

    /// Bookmarks carrying every tag in `query.tag_ids`, filtered server-side.
    fn list_bookmarks(
        &mut self,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, ClientError>;

    fn create_bookmark(
        &mut self,
        bookmark: &NewBookmark,
    ) -> Result<(), ClientError>;

    fn update_bookmark(
        &mut self,
        id: BookmarkId,
        patch: &BookmarkPatch,
    ) -> Result<(), ClientError>;

    fn delete_bookmark(&mut self, id: BookmarkId) -> Result<(), ClientError>;
}
