//! In-memory stand-in for the LinkVault server used by unit tests. It applies
//! the same filtering rules as the real service and records every request
//! so tests can assert on what went over the wire.

use super::{BOOKMARKS_PATH, Backend, TAGS_PATH, bookmark_path, tag_path};
use crate::error::{ClientError, Operation};
use crate::model::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, NewBookmark, NewTag,
    Tag, TagId,
};

#[derive(Debug, Clone)]
struct StoredBookmark {
    id: BookmarkId,
    url: String,
    title: String,
    notes: String,
    tag_ids: Vec<TagId>,
}

#[derive(Debug, Clone)]
struct Failure {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryBackend {
    tags: Vec<Tag>,
    bookmarks: Vec<StoredBookmark>,
    next_id: i64,
    failures: Vec<Failure>,
    pub requests: Vec<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self { next_id: 1, ..Default::default() }
    }

    pub fn seed_tag(&mut self, name: &str, color: &str) -> TagId {
        let id = self.alloc_id();
        self.tags.push(Tag { id, name: name.into(), color: color.into() });
        id
    }

    pub fn seed_bookmark(
        &mut self,
        url: &str,
        title: &str,
        tag_ids: &[TagId],
    ) -> BookmarkId {
        let id = self.alloc_id();
        self.bookmarks.push(StoredBookmark {
            id,
            url: url.into(),
            title: title.into(),
            notes: String::new(),
            tag_ids: tag_ids.to_vec(),
        });
        id
    }

    /// Answer `method path` with `status` until [`clear_failures`] is called.
    pub fn fail(&mut self, method: &'static str, path: &str, status: u16, body: &str) {
        self.failures.push(Failure {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
        });
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    pub fn take_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests)
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }

    pub fn stored_notes(&self, id: BookmarkId) -> Option<String> {
        self.bookmarks.iter().find(|b| b.id == id).map(|b| b.notes.clone())
    }

    fn alloc_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(
        &mut self,
        operation: Operation,
        method: &'static str,
        path: String,
    ) -> Result<(), ClientError> {
        self.requests.push(format!("{method} {path}"));
        match self
            .failures
            .iter()
            .find(|f| f.method == method && f.path == path)
        {
            Some(f) => Err(ClientError::Http {
                operation,
                status: f.status,
                body: f.body.clone(),
            }),
            None => Ok(()),
        }
    }

    fn render(&self, b: &StoredBookmark) -> Bookmark {
        Bookmark {
            id: b.id,
            url: b.url.clone(),
            title: b.title.clone(),
            notes: b.notes.clone(),
            tags: b
                .tag_ids
                .iter()
                .filter_map(|id| self.tags.iter().find(|t| t.id == *id))
                .cloned()
                .collect(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Backend for MemoryBackend {
    fn list_tags(&mut self) -> Result<Vec<Tag>, ClientError> {
        self.record(Operation::LoadTags, "GET", TAGS_PATH.to_string())?;
        Ok(self.tags.clone())
    }

    fn create_tag(&mut self, tag: &NewTag) -> Result<Tag, ClientError> {
        self.record(Operation::CreateTag, "POST", TAGS_PATH.to_string())?;
        let id = self.alloc_id();
        let created =
            Tag { id, name: tag.name.clone(), color: tag.color.clone() };
        self.tags.push(created.clone());
        Ok(created)
    }

    fn delete_tag(&mut self, id: TagId) -> Result<(), ClientError> {
        self.record(Operation::DeleteTag, "DELETE", tag_path(id))?;
        self.tags.retain(|t| t.id != id);
        for b in &mut self.bookmarks {
            b.tag_ids.retain(|t| *t != id);
        }
        Ok(())
    }

    fn list_bookmarks(
        &mut self,
        query: &BookmarkQuery,
    ) -> Result<Vec<Bookmark>, ClientError> {
        let path = format!("{BOOKMARKS_PATH}{}", query.query_string());
        self.record(Operation::LoadBookmarks, "GET", path)?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        Ok(self
            .bookmarks
            .iter()
            .filter(|b| query.tag_ids.iter().all(|id| b.tag_ids.contains(id)))
            .filter(|b| match &needle {
                Some(q) => [&b.title, &b.notes, &b.url]
                    .iter()
                    .any(|field| field.to_lowercase().contains(q.as_str())),
                None => true,
            })
            .map(|b| self.render(b))
            .collect())
    }

    fn create_bookmark(
        &mut self,
        bookmark: &NewBookmark,
    ) -> Result<(), ClientError> {
        self.record(
            Operation::CreateBookmark,
            "POST",
            BOOKMARKS_PATH.to_string(),
        )?;
        let id = self.alloc_id();
        self.bookmarks.push(StoredBookmark {
            id,
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            notes: bookmark.notes.clone(),
            tag_ids: bookmark.tag_ids.clone(),
        });
        Ok(())
    }

    fn update_bookmark(
        &mut self,
        id: BookmarkId,
        patch: &BookmarkPatch,
    ) -> Result<(), ClientError> {
        self.record(Operation::UpdateBookmark, "PATCH", bookmark_path(id))?;
        let Some(b) = self.bookmarks.iter_mut().find(|b| b.id == id) else {
            return Err(ClientError::Http {
                operation: Operation::UpdateBookmark,
                status: 404,
                body: "Not found".into(),
            });
        };
        b.title = patch.title.clone();
        b.notes = patch.notes.clone();
        b.tag_ids = patch.tag_ids.clone();
        Ok(())
    }

    fn delete_bookmark(&mut self, id: BookmarkId) -> Result<(), ClientError> {
        self.record(Operation::DeleteBookmark, "DELETE", bookmark_path(id))?;
        self.bookmarks.retain(|b| b.id != id);
        Ok(())
    }
}
