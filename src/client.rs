//! The bookmark client: every user action that touches the server goes
//! through here. Each operation clears the banner, validates before sending
//! anything, issues its requests in order, and re-fetches the canonical list
//! afterwards. On failure the banner is set and the state the operation
//! started from is left as it was.

use crate::api::Backend;
use crate::error::ClientError;
use crate::model::{Bookmark, BookmarkId, Tag, TagId};
use crate::state::{AppState, EditSession, FetchTicket};
use tracing::{debug, info, warn};

pub const DELETE_TAG_PROMPT: &str =
    "Delete this tag? It will be removed from all bookmarks.";
pub const DELETE_BOOKMARK_PROMPT: &str = "Delete this bookmark?";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct BookmarkClient<B: Backend> {
    backend: B,
    state: AppState,
}

impl<B: Backend> BookmarkClient<B> {
    pub fn new(backend: B, state: AppState) -> Self {
        Self { backend, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Direct access for form input; no request is made.
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Initial load: tags first so chips can be drawn, then bookmarks for
    /// the current filter.
    pub fn mount(&mut self) -> Result<(), ClientError> {
        self.state.clear_error();
        let result = self.load_tags().and_then(|()| self.load_bookmarks());
        self.record(result)
    }

    pub fn refresh(&mut self) -> Result<(), ClientError> {
        self.mount()
    }

    pub fn toggle_filter(&mut self, id: TagId) -> Result<(), ClientError> {
        let selected = self.state.filter.toggle(id);
        debug!(tag_id = id, selected, "filter toggled");
        self.reload_bookmarks()
    }

    pub fn clear_filter(&mut self) -> Result<(), ClientError> {
        self.state.filter.clear();
        self.reload_bookmarks()
    }

    /// Set or clear the free-text search sent along with the tag filter.
    pub fn set_search(&mut self, text: Option<&str>) -> Result<(), ClientError> {
        self.state.search = text
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.reload_bookmarks()
    }

    pub fn toggle_create_tag(&mut self, id: TagId) -> bool {
        self.state.bookmark_form.tag_ids.toggle(id)
    }

    /// Flip a tag in the open edit session. Returns `None` when nothing is
    /// being edited.
    pub fn toggle_edit_tag(&mut self, id: TagId) -> Option<bool> {
        self.state.editing.as_mut().map(|e| e.tag_ids.toggle(id))
    }

    pub fn toggle_manage_tags(&mut self) -> bool {
        self.state.manage_tags = !self.state.manage_tags;
        self.state.manage_tags
    }

    pub fn toggle_tag_form(&mut self) -> bool {
        self.state.tag_form.open = !self.state.tag_form.open;
        self.state.tag_form.open
    }

    /// Create the tag described by the new-tag form. On success the tag is
    /// pre-selected on the bookmark form and the name field is cleared.
    pub fn create_tag(&mut self) -> Result<Tag, ClientError> {
        self.state.clear_error();
        let result = self.create_tag_inner();
        self.record(result)
    }

    fn create_tag_inner(&mut self) -> Result<Tag, ClientError> {
        let payload = self.state.tag_form.payload()?;
        let created = self.backend.create_tag(&payload)?;
        self.load_tags()?;
        self.state.bookmark_form.tag_ids.insert(created.id);
        self.state.tag_form.name.clear();
        self.state.tag_form.open = false;
        info!(tag_id = created.id, "new tag selected on bookmark form");
        Ok(created)
    }

    /// Delete a tag after confirmation. Returns `Ok(false)` when the user
    /// declined and nothing was sent.
    pub fn delete_tag(
        &mut self,
        id: TagId,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, ClientError> {
        if !confirm.confirm(DELETE_TAG_PROMPT) {
            return Ok(false);
        }
        self.state.clear_error();
        let result = self.delete_tag_inner(id);
        self.record(result).map(|()| true)
    }

    fn delete_tag_inner(&mut self, id: TagId) -> Result<(), ClientError> {
        self.backend.delete_tag(id)?;
        // Selections must not outlive the tag, and the next list request
        // has to use the reduced filter.
        self.state.forget_tag(id);
        // The tag list is reloaded even when the bookmark fetch fails so the
        // deleted tag cannot be picked again.
        let listed = self.load_bookmarks();
        self.load_tags()?;
        listed
    }

    pub fn create_bookmark(&mut self) -> Result<(), ClientError> {
        self.state.clear_error();
        let result = self.create_bookmark_inner();
        self.record(result)
    }

    fn create_bookmark_inner(&mut self) -> Result<(), ClientError> {
        let payload = self.state.bookmark_form.payload()?;
        self.backend.create_bookmark(&payload)?;
        self.state.bookmark_form.reset();
        self.load_bookmarks()
    }

    /// Enter edit mode for a bookmark in the current list.
    pub fn start_edit(&mut self, id: BookmarkId) -> Result<(), ClientError> {
        let session = self
            .state
            .bookmark(id)
            .map(EditSession::snapshot)
            .ok_or(ClientError::NotFound { kind: "Bookmark", id });
        match session {
            Ok(session) => {
                self.state.editing = Some(session);
                Ok(())
            }
            Err(err) => self.record(Err(err)),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.state.editing = None;
    }

    /// Send the edit session. Edit mode is left only when the update
    /// succeeds, so a failed save keeps the user's changes.
    pub fn save_edit(&mut self) -> Result<(), ClientError> {
        self.state.clear_error();
        let result = self.save_edit_inner();
        self.record(result)
    }

    fn save_edit_inner(&mut self) -> Result<(), ClientError> {
        let Some(session) = self.state.editing.as_ref() else {
            return Err(ClientError::validation("No bookmark is being edited."));
        };
        let id = session.id;
        let payload = session.payload()?;
        self.backend.update_bookmark(id, &payload)?;
        self.state.editing = None;
        self.load_bookmarks()
    }

    pub fn delete_bookmark(
        &mut self,
        id: BookmarkId,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, ClientError> {
        if !confirm.confirm(DELETE_BOOKMARK_PROMPT) {
            return Ok(false);
        }
        self.state.clear_error();
        let result = self
            .backend
            .delete_bookmark(id)
            .and_then(|()| self.load_bookmarks());
        self.record(result).map(|()| true)
    }

    /// Apply the outcome of a list request issued with `ticket`. Responses
    /// to superseded tickets are dropped.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Bookmark>, ClientError>,
    ) -> Result<(), ClientError> {
        match result {
            Ok(bookmarks) => {
                let count = bookmarks.len();
                if self.state.finish_fetch(&ticket, bookmarks) {
                    debug!(seq = ticket.seq(), count, "bookmarks applied");
                } else {
                    warn!(seq = ticket.seq(), "discarding stale bookmark response");
                }
                Ok(())
            }
            Err(err) => {
                if self.state.fail_fetch(&ticket, &err) {
                    Err(err)
                } else {
                    warn!(seq = ticket.seq(), error = %err, "discarding stale bookmark failure");
                    Ok(())
                }
            }
        }
    }

    /// Re-issue the list request for the current filter and search.
    pub fn reload_bookmarks(&mut self) -> Result<(), ClientError> {
        self.state.clear_error();
        let result = self.load_bookmarks();
        self.record(result)
    }

    pub fn reload_tags(&mut self) -> Result<(), ClientError> {
        self.state.clear_error();
        let result = self.load_tags();
        self.record(result)
    }

    fn load_tags(&mut self) -> Result<(), ClientError> {
        self.state.tags = self.backend.list_tags()?;
        Ok(())
    }

    fn load_bookmarks(&mut self) -> Result<(), ClientError> {
        let ticket = self.state.begin_fetch(self.state.current_query());
        let result = self.backend.list_bookmarks(&ticket.query);
        self.complete_fetch(ticket, result)
    }

    fn record<T>(
        &mut self,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if let Err(err) = &result {
            self.state.set_error(err);
        }
        result
    }
}
