use std::collections::VecDeque;

/// Most-recently-visited pages, newest first, capped and de-duplicated.
pub const RECENT_CAPACITY: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct RecentPages {
    ids: VecDeque<String>,
}

impl RecentPages {
    /// Move (or insert) the id to the front.
    pub fn record(&mut self, page_id: &str) {
        self.ids.retain(|id| id != page_id);
        self.ids.push_front(page_id.to_string());
        self.ids.truncate(RECENT_CAPACITY);
    }

    pub fn remove(&mut self, page_id: &str) {
        self.ids.retain(|id| id != page_id);
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Replace the whole list, e.g. from the backend's recent endpoint.
    /// Keeps first occurrence of each id, newest first, up to capacity.
    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.ids.clear();
        for id in ids {
            if self.ids.len() == RECENT_CAPACITY {
                break;
            }
            if !self.ids.contains(&id) {
                self.ids.push_back(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
