//! In-memory application state: the canonical lists as last fetched, the
//! three tag selections, form contents and edit mode. Nothing here is
//! persisted.

use crate::error::ClientError;
use crate::model::{
    Bookmark, BookmarkId, BookmarkPatch, BookmarkQuery, NewBookmark, NewTag,
    TITLE_MAX, Tag, TagId,
};
use crate::selection::Selection;
use crate::tags::{validate_tag_color, validate_tag_name};

/// "Add a bookmark" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkForm {
    pub url: String,
    pub title: String,
    pub notes: String,
    pub tag_ids: Selection,
}

impl BookmarkForm {
    /// Validate and build the create request. Strings are trimmed.
    pub fn payload(&self) -> Result<NewBookmark, ClientError> {
        let url = self.url.trim();
        let title = self.title.trim();
        if url.is_empty() || title.is_empty() {
            return Err(ClientError::validation("URL and Title are required."));
        }
        check_title_len(title)?;
        Ok(NewBookmark {
            url: url.to_string(),
            title: title.to_string(),
            notes: self.notes.trim().to_string(),
            tag_ids: self.tag_ids.to_vec(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// "New tag" form shown under the creation form's tag picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagForm {
    pub open: bool,
    pub name: String,
    pub color: String,
}

impl TagForm {
    pub fn new(default_color: &str) -> Self {
        Self { open: false, name: String::new(), color: default_color.into() }
    }

    pub fn payload(&self) -> Result<NewTag, ClientError> {
        Ok(NewTag {
            name: validate_tag_name(&self.name)?,
            color: validate_tag_color(&self.color)?,
        })
    }
}

/// Editable snapshot of one bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: BookmarkId,
    pub title: String,
    pub notes: String,
    pub tag_ids: Selection,
}

impl EditSession {
    pub fn snapshot(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id,
            title: bookmark.title.clone(),
            notes: bookmark.notes.clone(),
            tag_ids: Selection::from_ids(bookmark.tag_ids()),
        }
    }

    pub fn payload(&self) -> Result<BookmarkPatch, ClientError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::validation("Title is required."));
        }
        check_title_len(title)?;
        Ok(BookmarkPatch {
            title: title.to_string(),
            notes: self.notes.trim().to_string(),
            tag_ids: self.tag_ids.to_vec(),
        })
    }
}

fn check_title_len(title: &str) -> Result<(), ClientError> {
    if title.chars().count() > TITLE_MAX {
        return Err(ClientError::validation(format!(
            "Title must be at most {TITLE_MAX} characters."
        )));
    }
    Ok(())
}

/// Handle for one bookmark list request. Only the response to the most
/// recently issued ticket may replace the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    pub query: BookmarkQuery,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub tags: Vec<Tag>,
    pub bookmarks: Vec<Bookmark>,
    pub loading: bool,
    /// Banner text; replaced by the next failure, cleared when an
    /// operation starts.
    pub error: Option<String>,
    pub filter: Selection,
    pub search: Option<String>,
    pub manage_tags: bool,
    pub bookmark_form: BookmarkForm,
    pub tag_form: TagForm,
    pub editing: Option<EditSession>,
    fetch_seq: u64,
}

impl AppState {
    pub fn new(default_tag_color: &str) -> Self {
        Self {
            tags: Vec::new(),
            bookmarks: Vec::new(),
            loading: false,
            error: None,
            filter: Selection::new(),
            search: None,
            manage_tags: false,
            bookmark_form: BookmarkForm::default(),
            tag_form: TagForm::new(default_tag_color),
            editing: None,
            fetch_seq: 0,
        }
    }

    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn bookmark(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn current_query(&self) -> BookmarkQuery {
        BookmarkQuery {
            tag_ids: self.filter.to_vec(),
            search: self.search.clone(),
        }
    }

    /// Issue a ticket for a new list request and mark the list loading.
    pub fn begin_fetch(&mut self, query: BookmarkQuery) -> FetchTicket {
        self.fetch_seq += 1;
        self.loading = true;
        FetchTicket { seq: self.fetch_seq, query }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.fetch_seq
    }

    /// Apply a list response. Returns false and leaves state untouched when
    /// a newer request has been issued since.
    pub fn finish_fetch(
        &mut self,
        ticket: &FetchTicket,
        bookmarks: Vec<Bookmark>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.bookmarks = bookmarks;
        self.loading = false;
        true
    }

    /// Record a failed list request. Stale failures are ignored.
    pub fn fail_fetch(&mut self, ticket: &FetchTicket, err: &ClientError) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        self.set_error(err);
        true
    }

    /// Strip a deleted tag from every selection so nothing refers to it.
    pub fn forget_tag(&mut self, id: TagId) {
        self.bookmark_form.tag_ids.remove(id);
        self.filter.remove(id);
        if let Some(edit) = self.editing.as_mut() {
            edit.tag_ids.remove(id);
        }
    }

    pub fn set_error(&mut self, err: &ClientError) {
        self.error = Some(err.to_string());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;

    fn bookmark(id: BookmarkId, tags: &[TagId]) -> Bookmark {
        Bookmark {
            id,
            url: format!("https://example.com/{id}"),
            title: format!("B{id}"),
            notes: String::new(),
            tags: tags
                .iter()
                .map(|t| Tag {
                    id: *t,
                    name: format!("t{t}"),
                    color: "#000000".into(),
                })
                .collect(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_bookmark_form_requires_url_and_title() {
        let mut form = BookmarkForm { url: "  ".into(), ..Default::default() };
        form.title = "Title".into();
        let err = form.payload().unwrap_err();
        assert_eq!(err.to_string(), "URL and Title are required.");

        form.url = "https://x.dev".into();
        form.title = String::new();
        assert!(form.payload().unwrap_err().is_validation());
    }

    #[test]
    fn test_bookmark_form_trims_fields() {
        let form = BookmarkForm {
            url: " https://x.dev ".into(),
            title: " X ".into(),
            notes: "\nnote\n".into(),
            tag_ids: Selection::from_ids([2, 1]),
        };
        let p = form.payload().unwrap();
        assert_eq!(p.url, "https://x.dev");
        assert_eq!(p.title, "X");
        assert_eq!(p.notes, "note");
        assert_eq!(p.tag_ids, vec![2, 1]);
    }

    #[test]
    fn test_title_length_limit() {
        let form = BookmarkForm {
            url: "u".into(),
            title: "t".repeat(TITLE_MAX + 1),
            ..Default::default()
        };
        assert!(form.payload().is_err());
    }

    #[test]
    fn test_edit_snapshot_copies_bookmark() {
        let mut b = bookmark(4, &[3, 1]);
        b.notes = "n".into();
        let edit = EditSession::snapshot(&b);
        assert_eq!(edit.id, 4);
        assert_eq!(edit.title, "B4");
        assert_eq!(edit.notes, "n");
        assert_eq!(edit.tag_ids.ids(), &[3, 1]);
    }

    #[test]
    fn test_tag_form_defaults_and_validation() {
        let mut form = TagForm::new("#60a5fa");
        assert!(!form.open);
        assert!(form.payload().is_err());
        form.name = " uw ".into();
        let p = form.payload().unwrap();
        assert_eq!(p.name, "uw");
        assert_eq!(p.color, "#60a5fa");
    }

    #[test]
    fn test_forget_tag_strips_every_selection() {
        let mut state = AppState::new("#60a5fa");
        state.bookmark_form.tag_ids = Selection::from_ids([1, 2]);
        state.filter = Selection::from_ids([2, 3]);
        state.editing = Some(EditSession::snapshot(&bookmark(9, &[2, 4])));

        state.forget_tag(2);

        assert_eq!(state.bookmark_form.tag_ids.ids(), &[1]);
        assert_eq!(state.filter.ids(), &[3]);
        assert_eq!(state.editing.as_ref().unwrap().tag_ids.ids(), &[4]);
        assert_eq!(state.current_query().tag_ids, vec![3]);
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut state = AppState::new("#60a5fa");
        let older = state.begin_fetch(BookmarkQuery { tag_ids: vec![1], search: None });
        let newer = state.begin_fetch(BookmarkQuery { tag_ids: vec![1, 2], search: None });
        assert!(newer.seq() > older.seq());

        assert!(state.finish_fetch(&newer, vec![bookmark(1, &[1, 2])]));
        assert!(!state.loading);

        // The older answer arrives late and must not overwrite the list.
        assert!(!state.finish_fetch(&older, vec![bookmark(1, &[1, 2]), bookmark(2, &[1])]));
        assert_eq!(state.bookmarks.len(), 1);
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut state = AppState::new("#60a5fa");
        let older = state.begin_fetch(BookmarkQuery::default());
        let _newer = state.begin_fetch(BookmarkQuery::default());
        let err = ClientError::Http {
            operation: Operation::LoadBookmarks,
            status: 502,
            body: String::new(),
        };
        assert!(!state.fail_fetch(&older, &err));
        assert!(state.error.is_none());
        assert!(state.loading);
    }
}
