//! Recipe listing

use crate::config::PaginationConfig;
use crate::domain::{Recipe, RecipeFilter, RecipeQuery, RecipeView, Viewer};
use crate::error::Result;
use crate::pagination::{CursorPaginator, Page, PageParams};
use crate::store::RecordStore;
use crate::types::OrderBy;
use std::sync::Arc;

/// Any store that can list recipes
pub type RecipeStore = dyn RecordStore<Record = Recipe, Filter = RecipeFilter>;

/// Lists recipes visible to a viewer
#[derive(Clone)]
pub struct RecipeService {
    store: Arc<RecipeStore>,
    pagination: PaginationConfig,
}

impl RecipeService {
    /// Create a service over `store`
    pub fn new(store: Arc<RecipeStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    /// One page of recipes, newest first, with a total count
    ///
    /// Anonymous viewers see public recipes only; a signed-in viewer also
    /// sees their own private recipes.
    pub async fn list(
        &self,
        viewer: Option<&Viewer>,
        query: RecipeQuery,
        page: &PageParams,
    ) -> Result<Page<RecipeView>> {
        page.validate(self.pagination.max_take)?;
        query.validate()?;

        let request = page
            .to_request(
                query.into_filter(viewer),
                OrderBy::newest_first(),
                self.pagination.recipes_default_take,
            )
            .with_total(true);

        CursorPaginator::new(self.store.as_ref())
            .paginate_entities(&request, RecipeView::from)
            .await
    }
}

impl std::fmt::Debug for RecipeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeService")
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}
