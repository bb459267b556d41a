//! User listing

use crate::config::PaginationConfig;
use crate::domain::{User, UserFilter, UserView};
use crate::error::Result;
use crate::pagination::{CursorPaginator, Page, PageParams};
use crate::store::RecordStore;
use crate::types::OrderBy;
use std::sync::Arc;

/// Any store that can list users
pub type UserStore = dyn RecordStore<Record = User, Filter = UserFilter>;

/// Lists user accounts
#[derive(Clone)]
pub struct UserService {
    store: Arc<UserStore>,
    pagination: PaginationConfig,
}

impl UserService {
    pub fn new(store: Arc<UserStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    /// One page of users, newest first, with a total count
    pub async fn list(&self, query: UserFilter, page: &PageParams) -> Result<Page<UserView>> {
        page.validate(self.pagination.max_take)?;

        let request = page
            .to_request(
                query,
                OrderBy::newest_first(),
                self.pagination.users_default_take,
            )
            .with_total(true);

        CursorPaginator::new(self.store.as_ref())
            .paginate_entities(&request, UserView::from)
            .await
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}
