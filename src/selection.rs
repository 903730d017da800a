use crate::model::TagId;

/// Ordered set of selected tag ids. Insertion order is kept so the filter
/// query lists ids in the order the user picked them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<TagId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from ids, keeping the first occurrence of each.
    pub fn from_ids(ids: impl IntoIterator<Item = TagId>) -> Self {
        let mut sel = Self::new();
        for id in ids {
            sel.insert(id);
        }
        sel
    }

    /// Flip membership: a present id is removed, an absent one appended.
    /// Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: TagId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Append `id` unless it is already selected.
    pub fn insert(&mut self, id: TagId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: TagId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| *x != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[TagId] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<TagId> {
        self.ids.clone()
    }
}
