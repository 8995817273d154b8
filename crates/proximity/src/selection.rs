use std::collections::HashSet;

use feed::{Marker, MarkerId};

/// Advisory set of marker ids toggled "on" for display.
///
/// Independent of search text and filter criteria. An id with no matching
/// marker in the current snapshot is simply ignored at render time; stale
/// entries are never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<MarkerId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Inserts `id` into the set.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, id: impl Into<MarkerId>) -> bool {
        self.ids.insert(id.into())
    }

    /// Removes `id` from the set.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flips membership of `id`; returns `true` if it is now selected.
    ///
    /// Toggling the same id twice is a net no-op.
    pub fn toggle(&mut self, id: impl Into<MarkerId>) -> bool {
        let id = id.into();
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Selects every marker in `markers` (first-load default).
    pub fn select_all<'a, I>(&mut self, markers: I)
    where
        I: IntoIterator<Item = &'a Marker>,
    {
        for marker in markers {
            self.ids.insert(marker.id().to_string());
        }
    }

    /// Whether `marker` survives selection + search narrowing.
    ///
    /// Visible means: selected, label matches `search_text` as a
    /// case-insensitive substring (empty text matches everything), and the
    /// coordinate is valid.
    pub fn is_visible(&self, marker: &Marker, search_text: &str) -> bool {
        self.contains(marker.id())
            && label_matches(marker.label(), search_text)
            && marker.coordinate().is_valid()
    }

    /// The narrowed render set, preserving input order.
    pub fn visible_set<'a>(&self, markers: &'a [Marker], search_text: &str) -> Vec<&'a Marker> {
        markers
            .iter()
            .filter(|m| self.is_visible(m, search_text))
            .collect()
    }
}

fn label_matches(label: &str, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    label.to_lowercase().contains(&search_text.to_lowercase())
}
