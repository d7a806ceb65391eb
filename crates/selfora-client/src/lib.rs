pub mod api;
pub mod model;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use model::{LoadState, PageTreeError, PageTreeModel};
pub use store::PageStore;
