use std::collections::HashSet;

/// Which pages are expanded in the tree view. Client-side only; unknown ids
/// are tolerated (toggling an id the tree no longer shows is a no-op later).
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    pub fn toggle(&mut self, page_id: &str) {
        if !self.expanded.remove(page_id) {
            self.expanded.insert(page_id.to_string());
        }
    }

    pub fn is_expanded(&self, page_id: &str) -> bool {
        self.expanded.contains(page_id)
    }

    pub fn remove(&mut self, page_id: &str) {
        self.expanded.remove(page_id);
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    pub fn restore<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.expanded = ids.into_iter().collect();
    }
}
