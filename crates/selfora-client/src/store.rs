use selfora_shared::{
    api::{CreatePageRequest, UpdatePageRequest},
    Page,
};

use crate::api::{ApiClient, ApiError};

/// The page-storage collaborator as the tree model sees it.
///
/// `ApiClient` is the real implementation; tests substitute an in-memory
/// store so model behavior can be exercised without a backend.
#[allow(async_fn_in_trait)]
pub trait PageStore {
    async fn list_pages(&mut self, workspace_id: &str) -> Result<Vec<Page>, ApiError>;
    async fn create_page(&mut self, req: &CreatePageRequest) -> Result<Page, ApiError>;
    async fn update_page(&mut self, page_id: &str, req: &UpdatePageRequest)
        -> Result<Page, ApiError>;
    async fn delete_page(&mut self, page_id: &str) -> Result<(), ApiError>;
    async fn duplicate_page(&mut self, page_id: &str) -> Result<Page, ApiError>;
    async fn recent_pages(&mut self) -> Result<Vec<Page>, ApiError>;
}

impl PageStore for ApiClient {
    async fn list_pages(&mut self, workspace_id: &str) -> Result<Vec<Page>, ApiError> {
        ApiClient::list_pages(self, workspace_id).await
    }

    async fn create_page(&mut self, req: &CreatePageRequest) -> Result<Page, ApiError> {
        ApiClient::create_page(self, req).await
    }

    async fn update_page(
        &mut self,
        page_id: &str,
        req: &UpdatePageRequest,
    ) -> Result<Page, ApiError> {
        ApiClient::update_page(self, page_id, req).await
    }

    async fn delete_page(&mut self, page_id: &str) -> Result<(), ApiError> {
        ApiClient::delete_page(self, page_id).await
    }

    async fn duplicate_page(&mut self, page_id: &str) -> Result<Page, ApiError> {
        ApiClient::duplicate_page(self, page_id).await
    }

    async fn recent_pages(&mut self) -> Result<Vec<Page>, ApiError> {
        ApiClient::recent_pages(self).await
    }
}
