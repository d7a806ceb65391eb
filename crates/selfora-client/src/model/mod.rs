pub mod expansion;
pub mod recent;
pub mod tree;

use selfora_shared::{
    api::{CreatePageRequest, UpdatePageRequest},
    Page, PageTreeNode,
};
use tracing::debug;

use crate::api::ApiError;
use crate::store::PageStore;

pub use expansion::ExpansionState;
pub use recent::{RecentPages, RECENT_CAPACITY};

#[derive(Debug, thiserror::Error)]
pub enum PageTreeError {
    #[error("failed to load pages: {0}")]
    Fetch(#[source] ApiError),
    #[error("failed to create page: {0}")]
    Create(#[source] ApiError),
    #[error("failed to rename page: {0}")]
    Rename(#[source] ApiError),
    #[error("failed to toggle favorite: {0}")]
    Favorite(#[source] ApiError),
    #[error("failed to delete page: {0}")]
    Delete(#[source] ApiError),
    #[error("failed to duplicate page: {0}")]
    Duplicate(#[source] ApiError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    LoadFailed,
}

/// Handle for an in-flight load. A token whose sequence number has been
/// superseded by a newer `begin_load` is discarded on completion, so a slow
/// stale response can never clobber fresher state.
#[derive(Debug)]
pub struct LoadToken {
    seq: u64,
    workspace_id: String,
}

/// Client-side view of one workspace's pages: a flat cache for lookups, a
/// forest computed on demand for rendering, and the expansion/recency state
/// layered on top. Every mutation is confirmed by the backend before (or
/// rolled back after) it lands in the cache.
#[derive(Debug, Default)]
pub struct PageTreeModel {
    workspace_id: Option<String>,
    pages: Vec<Page>,
    state: LoadState,
    load_seq: u64,
    expansion: ExpansionState,
    recent: RecentPages,
}

impl PageTreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Loading ============

    pub fn begin_load(&mut self, workspace_id: &str) -> LoadToken {
        self.load_seq += 1;
        self.state = LoadState::Loading;
        LoadToken {
            seq: self.load_seq,
            workspace_id: workspace_id.to_string(),
        }
    }

    /// Commit (or discard) the result of a load started with `begin_load`.
    ///
    /// On failure the previous cache is kept untouched: showing stale pages
    /// beats showing none.
    pub fn finish_load(
        &mut self,
        token: LoadToken,
        result: Result<Vec<Page>, ApiError>,
    ) -> Result<(), PageTreeError> {
        if token.seq != self.load_seq {
            debug!(workspace_id = %token.workspace_id, "discarding stale load result");
            return Ok(());
        }

        match result {
            Ok(pages) => {
                debug!(
                    workspace_id = %token.workspace_id,
                    count = pages.len(),
                    "loaded pages"
                );
                self.workspace_id = Some(token.workspace_id);
                self.pages = pages;
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(err) => {
                self.state = if self.workspace_id.is_some() {
                    LoadState::Loaded
                } else {
                    LoadState::LoadFailed
                };
                Err(PageTreeError::Fetch(err))
            }
        }
    }

    /// Fetch and install the full page list for a workspace.
    pub async fn load<S: PageStore>(
        &mut self,
        store: &mut S,
        workspace_id: &str,
    ) -> Result<(), PageTreeError> {
        let token = self.begin_load(workspace_id);
        let result = store.list_pages(workspace_id).await;
        self.finish_load(token, result)
    }

    /// Seed the recent list from the backend's recent endpoint.
    pub async fn load_recent<S: PageStore>(&mut self, store: &mut S) -> Result<(), PageTreeError> {
        let pages = store.recent_pages().await.map_err(PageTreeError::Fetch)?;
        self.recent.replace(pages.into_iter().map(|p| p.id));
        Ok(())
    }

    // ============ Mutations ============

    /// Create an untitled page under `parent` (or at the workspace root),
    /// appended after the last sibling.
    pub async fn create_page<S: PageStore>(
        &mut self,
        store: &mut S,
        workspace_id: &str,
        parent: Option<&str>,
    ) -> Result<Page, PageTreeError> {
        let req = CreatePageRequest {
            workspace: workspace_id.to_string(),
            title: "Untitled".to_string(),
            parent: parent.map(str::to_string),
            order: self.next_sibling_order(parent),
        };
        let page = store
            .create_page(&req)
            .await
            .map_err(PageTreeError::Create)?;
        self.pages.push(page.clone());
        Ok(page)
    }

    /// Optimistic rename: the new title shows immediately and reverts to the
    /// last confirmed title if the backend rejects it.
    pub async fn rename_page<S: PageStore>(
        &mut self,
        store: &mut S,
        page_id: &str,
        new_title: &str,
    ) -> Result<Page, PageTreeError> {
        let idx = self
            .index_of(page_id)
            .ok_or(PageTreeError::Rename(ApiError::NotFound))?;

        let previous = std::mem::replace(&mut self.pages[idx].title, new_title.to_string());

        let req = UpdatePageRequest {
            title: Some(new_title.to_string()),
            ..Default::default()
        };
        match store.update_page(page_id, &req).await {
            Ok(page) => {
                self.pages[idx] = page.clone();
                Ok(page)
            }
            Err(err) => {
                self.pages[idx].title = previous;
                Err(PageTreeError::Rename(err))
            }
        }
    }

    /// Pessimistic favorite flip: local state only changes once the backend
    /// confirms.
    pub async fn toggle_favorite<S: PageStore>(
        &mut self,
        store: &mut S,
        page_id: &str,
    ) -> Result<(), PageTreeError> {
        let idx = self
            .index_of(page_id)
            .ok_or(PageTreeError::Favorite(ApiError::NotFound))?;

        let req = UpdatePageRequest {
            is_favorite: Some(!self.pages[idx].is_favorite),
            ..Default::default()
        };
        let page = store
            .update_page(page_id, &req)
            .await
            .map_err(PageTreeError::Favorite)?;
        self.pages[idx] = page;
        Ok(())
    }

    /// Delete a page. The backend cascades to descendants, and the local
    /// cache, expansion state and recent list are pruned to match.
    pub async fn delete_page<S: PageStore>(
        &mut self,
        store: &mut S,
        page_id: &str,
    ) -> Result<(), PageTreeError> {
        store
            .delete_page(page_id)
            .await
            .map_err(PageTreeError::Delete)?;

        let doomed = self.subtree_ids(page_id);
        self.pages.retain(|p| !doomed.contains(&p.id));
        for id in &doomed {
            self.expansion.remove(id);
            self.recent.remove(id);
        }
        Ok(())
    }

    /// Duplicate a page; the copy comes back as a sibling of the original.
    /// Descendant duplication is the backend's job.
    pub async fn duplicate_page<S: PageStore>(
        &mut self,
        store: &mut S,
        page_id: &str,
    ) -> Result<Page, PageTreeError> {
        let page = store
            .duplicate_page(page_id)
            .await
            .map_err(PageTreeError::Duplicate)?;
        self.pages.push(page.clone());
        Ok(page)
    }

    // ============ UI state ============

    pub fn toggle_expansion(&mut self, page_id: &str) {
        self.expansion.toggle(page_id);
    }

    pub fn is_expanded(&self, page_id: &str) -> bool {
        self.expansion.is_expanded(page_id)
    }

    pub fn expanded_ids(&self) -> Vec<String> {
        self.expansion.ids().map(str::to_string).collect()
    }

    pub fn restore_expansion<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.expansion.restore(ids);
    }

    pub fn record_visit(&mut self, page_id: &str) {
        self.recent.record(page_id);
    }

    // ============ Views ============

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// The navigable forest, computed on demand from the flat cache.
    pub fn forest(&self) -> Vec<PageTreeNode> {
        tree::build_forest(&self.pages)
    }

    /// Favorite pages, in cache order.
    pub fn favorites(&self) -> Vec<&Page> {
        self.pages.iter().filter(|p| p.is_favorite).collect()
    }

    /// Recently visited pages resolved against the cache; ids the cache no
    /// longer knows are skipped.
    pub fn recent(&self) -> Vec<&Page> {
        self.recent.ids().filter_map(|id| self.page(id)).collect()
    }

    // ============ Internals ============

    fn index_of(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id == page_id)
    }

    /// Append-to-end: one past the largest sibling order.
    fn next_sibling_order(&self, parent: Option<&str>) -> f64 {
        let max = self
            .pages
            .iter()
            .filter(|p| p.parent.as_deref() == parent)
            .map(|p| p.order)
            .fold(f64::NEG_INFINITY, f64::max);
        if max.is_finite() {
            max + 1.0
        } else {
            0.0
        }
    }

    /// The page plus all its descendants, breadth-first. The membership
    /// check doubles as a cycle guard.
    fn subtree_ids(&self, page_id: &str) -> Vec<String> {
        let mut ids = vec![page_id.to_string()];
        let mut i = 0;
        while i < ids.len() {
            for page in &self.pages {
                if page.parent.as_deref() == Some(ids[i].as_str()) && !ids.contains(&page.id) {
                    ids.push(page.id.clone());
                }
            }
            i += 1;
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn page(id: &str, parent: Option<&str>, order: f64) -> Page {
        Page {
            id: id.to_string(),
            title: id.to_string(),
            icon: None,
            parent: parent.map(str::to_string),
            order,
            is_favorite: false,
            workspace_id: "ws-a".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// In-memory stand-in for the REST backend, with switchable failure.
    #[derive(Default)]
    struct MemoryStore {
        pages: Vec<Page>,
        fail: bool,
        next_id: u32,
    }

    impl MemoryStore {
        fn with_pages(pages: Vec<Page>) -> Self {
            Self {
                pages,
                ..Default::default()
            }
        }

        fn err() -> ApiError {
            ApiError::Server("500 Internal Server Error: boom".to_string())
        }
    }

    impl PageStore for MemoryStore {
        async fn list_pages(&mut self, workspace_id: &str) -> Result<Vec<Page>, ApiError> {
            if self.fail {
                return Err(Self::err());
            }
            Ok(self
                .pages
                .iter()
                .filter(|p| p.workspace_id == workspace_id)
                .cloned()
                .collect())
        }

        async fn create_page(&mut self, req: &CreatePageRequest) -> Result<Page, ApiError> {
            if self.fail {
                return Err(Self::err());
            }
            self.next_id += 1;
            let now = Utc::now();
            let page = Page {
                id: format!("srv-{}", self.next_id),
                title: req.title.clone(),
                icon: None,
                parent: req.parent.clone(),
                order: req.order,
                is_favorite: false,
                workspace_id: req.workspace.clone(),
                created_at: now,
                updated_at: now,
            };
            self.pages.push(page.clone());
            Ok(page)
        }

        async fn update_page(
            &mut self,
            page_id: &str,
            req: &UpdatePageRequest,
        ) -> Result<Page, ApiError> {
            if self.fail {
                return Err(Self::err());
            }
            let page = self
                .pages
                .iter_mut()
                .find(|p| p.id == page_id)
                .ok_or(ApiError::NotFound)?;
            if let Some(title) = &req.title {
                page.title = title.clone();
            }
            if let Some(icon) = &req.icon {
                page.icon = Some(icon.clone());
            }
            if let Some(fav) = req.is_favorite {
                page.is_favorite = fav;
            }
            if let Some(order) = req.order {
                page.order = order;
            }
            page.updated_at = Utc::now();
            Ok(page.clone())
        }

        async fn delete_page(&mut self, page_id: &str) -> Result<(), ApiError> {
            if self.fail {
                return Err(Self::err());
            }
            if !self.pages.iter().any(|p| p.id == page_id) {
                return Err(ApiError::NotFound);
            }
            // The backend cascades over the parent relation.
            let mut doomed = vec![page_id.to_string()];
            let mut i = 0;
            while i < doomed.len() {
                for p in &self.pages {
                    if p.parent.as_deref() == Some(doomed[i].as_str())
                        && !doomed.contains(&p.id)
                    {
                        doomed.push(p.id.clone());
                    }
                }
                i += 1;
            }
            self.pages.retain(|p| !doomed.contains(&p.id));
            Ok(())
        }

        async fn duplicate_page(&mut self, page_id: &str) -> Result<Page, ApiError> {
            if self.fail {
                return Err(Self::err());
            }
            let original = self
                .pages
                .iter()
                .find(|p| p.id == page_id)
                .ok_or(ApiError::NotFound)?
                .clone();
            self.next_id += 1;
            let copy = Page {
                id: format!("srv-{}", self.next_id),
                title: format!("{} (Copy)", original.title),
                ..original
            };
            self.pages.push(copy.clone());
            Ok(copy)
        }

        async fn recent_pages(&mut self) -> Result<Vec<Page>, ApiError> {
            if self.fail {
                return Err(Self::err());
            }
            Ok(self.pages.clone())
        }
    }

    #[tokio::test]
    async fn load_populates_cache() {
        let mut store =
            MemoryStore::with_pages(vec![page("1", None, 0.0), page("2", Some("1"), 0.0)]);
        let mut model = PageTreeModel::new();

        model.load(&mut store, "ws-a").await.unwrap();

        assert_eq!(model.state(), LoadState::Loaded);
        assert_eq!(model.pages().len(), 2);
        let forest = model.forest();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children[0].page.id, "2");
    }

    #[tokio::test]
    async fn stale_load_never_clobbers_newer_state() {
        let mut model = PageTreeModel::new();

        let token_a = model.begin_load("ws-a");
        let token_b = model.begin_load("ws-b");

        let mut page_b = page("b1", None, 0.0);
        page_b.workspace_id = "ws-b".to_string();

        model.finish_load(token_b, Ok(vec![page_b])).unwrap();
        // The older request resolves last; its payload must be discarded.
        model.finish_load(token_a, Ok(vec![page("a1", None, 0.0)])).unwrap();

        assert_eq!(model.workspace_id(), Some("ws-b"));
        assert_eq!(model.pages().len(), 1);
        assert_eq!(model.pages()[0].id, "b1");
        assert_eq!(model.state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_pages() {
        let mut store = MemoryStore::with_pages(vec![page("1", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        store.fail = true;
        let err = model.load(&mut store, "ws-a").await.unwrap_err();

        assert!(matches!(err, PageTreeError::Fetch(_)));
        assert_eq!(model.pages().len(), 1);
        assert_eq!(model.state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn first_load_failure_is_load_failed() {
        let mut store = MemoryStore::default();
        store.fail = true;
        let mut model = PageTreeModel::new();

        let err = model.load(&mut store, "ws-a").await.unwrap_err();

        assert!(matches!(err, PageTreeError::Fetch(_)));
        assert_eq!(model.state(), LoadState::LoadFailed);
        assert!(model.pages().is_empty());
    }

    #[tokio::test]
    async fn create_appends_after_last_sibling() {
        let mut store =
            MemoryStore::with_pages(vec![page("1", None, 3.0), page("2", None, 7.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        let created = model.create_page(&mut store, "ws-a", None).await.unwrap();

        assert_eq!(created.title, "Untitled");
        assert_eq!(created.order, 8.0);
        assert!(model.page(&created.id).is_some());

        // First child of an expanded-to-be parent starts at zero.
        let child = model
            .create_page(&mut store, "ws-a", Some("1"))
            .await
            .unwrap();
        assert_eq!(child.order, 0.0);
        assert_eq!(child.parent.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn rename_reverts_on_failure() {
        let mut store = MemoryStore::with_pages(vec![page("1", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        store.fail = true;
        let err = model
            .rename_page(&mut store, "1", "New title")
            .await
            .unwrap_err();

        assert!(matches!(err, PageTreeError::Rename(_)));
        assert_eq!(model.page("1").unwrap().title, "1");
    }

    #[tokio::test]
    async fn rename_commits_server_copy() {
        let mut store = MemoryStore::with_pages(vec![page("1", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        let renamed = model
            .rename_page(&mut store, "1", "New title")
            .await
            .unwrap();

        assert_eq!(renamed.title, "New title");
        assert_eq!(model.page("1").unwrap().title, "New title");
    }

    #[tokio::test]
    async fn favorite_toggle_unchanged_on_server_error() {
        let mut store = MemoryStore::with_pages(vec![page("2", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        store.fail = true;
        let err = model.toggle_favorite(&mut store, "2").await.unwrap_err();

        assert!(matches!(err, PageTreeError::Favorite(_)));
        assert!(!model.page("2").unwrap().is_favorite);
        assert!(model.favorites().is_empty());
    }

    #[tokio::test]
    async fn favorite_toggle_updates_view_on_success() {
        let mut store = MemoryStore::with_pages(vec![page("2", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        model.toggle_favorite(&mut store, "2").await.unwrap();
        assert_eq!(model.favorites().len(), 1);

        model.toggle_favorite(&mut store, "2").await.unwrap();
        assert!(model.favorites().is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_through_local_state() {
        let mut store = MemoryStore::with_pages(vec![
            page("1", None, 0.0),
            page("2", Some("1"), 0.0),
            page("3", Some("2"), 0.0),
            page("4", None, 1.0),
        ]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        model.toggle_expansion("2");
        model.record_visit("3");

        model.delete_page(&mut store, "1").await.unwrap();

        assert!(model.page("1").is_none());
        assert!(model.page("2").is_none());
        assert!(model.page("3").is_none());
        assert!(model.page("4").is_some());
        assert!(!model.is_expanded("2"));
        assert!(model.recent().is_empty());

        // The backend agrees after a fresh load.
        model.load(&mut store, "ws-a").await.unwrap();
        assert_eq!(model.pages().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_inserts_sibling_copy() {
        let mut store = MemoryStore::with_pages(vec![page("1", Some("root"), 0.0), page("root", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        let copy = model.duplicate_page(&mut store, "1").await.unwrap();

        assert_eq!(copy.parent.as_deref(), Some("root"));
        assert_eq!(model.pages().len(), 3);
        assert!(model.page(&copy.id).is_some());
    }

    #[tokio::test]
    async fn recent_view_skips_unknown_ids() {
        let mut store = MemoryStore::with_pages(vec![page("1", None, 0.0)]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        model.record_visit("1");
        model.record_visit("gone");

        let recent = model.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "1");
    }

    #[tokio::test]
    async fn load_recent_seeds_from_backend() {
        let mut store = MemoryStore::with_pages(vec![
            page("1", None, 0.0),
            page("2", None, 1.0),
        ]);
        let mut model = PageTreeModel::new();
        model.load(&mut store, "ws-a").await.unwrap();

        model.load_recent(&mut store).await.unwrap();

        let recent = model.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "1");
    }
}
