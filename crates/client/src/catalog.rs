//! Product catalog listing.
//!
//! Thin client over `GET /products` plus [`ProductFeed`], the incremental
//! list a catalog screen holds: one [`PagedList`] and the query currently
//! driving it. Changing the query resets the accumulator and invalidates any
//! in-flight page in one step.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::instrument;

use greenbasket_core::{Page, ProductSummary, SortOrder};

use crate::gateway::{ApiError, HttpGateway};
use crate::pagination::{PageLoader, PagedList, PagedSnapshot};

/// Query parameters for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Category slug filter.
    pub category: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Sort order.
    pub sort: SortOrder,
}

impl ProductQuery {
    fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", page.to_string()),
            ("sort", self.sort.as_param().to_owned()),
        ];
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("q", search.clone()));
        }
        params
    }
}

/// Client for the paginated product listing endpoint.
#[derive(Clone)]
pub struct ProductCatalog {
    gateway: HttpGateway,
}

impl ProductCatalog {
    /// Create a catalog client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }

    /// Fetch one page of products for a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self, query), fields(page = page))]
    pub async fn list(
        &self,
        query: &ProductQuery,
        page: u32,
    ) -> Result<Page<ProductSummary>, ApiError> {
        self.gateway
            .get_json("products", &query.params(page))
            .await
    }
}

/// Loader that reads the feed's current query at request time.
struct FeedLoader {
    catalog: ProductCatalog,
    query: Arc<RwLock<ProductQuery>>,
}

impl PageLoader<ProductSummary> for FeedLoader {
    fn load_page(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<Page<ProductSummary>, ApiError>> + Send {
        let query = self
            .query
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let catalog = self.catalog.clone();
        async move { catalog.list(&query, page).await }
    }
}

/// Incrementally loaded product list bound to a mutable query.
#[derive(Clone)]
pub struct ProductFeed {
    list: PagedList<ProductSummary, FeedLoader>,
    query: Arc<RwLock<ProductQuery>>,
}

impl ProductFeed {
    /// Create a feed with the default query; nothing is loaded yet.
    #[must_use]
    pub fn new(catalog: ProductCatalog) -> Self {
        let query = Arc::new(RwLock::new(ProductQuery::default()));
        let list = PagedList::new(FeedLoader {
            catalog,
            query: Arc::clone(&query),
        });
        Self { list, query }
    }

    /// Current snapshot for rendering.
    #[must_use]
    pub fn snapshot(&self) -> PagedSnapshot<ProductSummary> {
        self.list.snapshot()
    }

    /// Load the next page; no-op while loading or after the last page.
    pub async fn load_more(&self) -> bool {
        self.list.load_more().await
    }

    /// Replace the query, discard the accumulated list, and load page 1.
    ///
    /// Any response still in flight for the old query is invalidated before
    /// the new load starts.
    #[instrument(skip(self, query))]
    pub async fn set_query(&self, query: ProductQuery) {
        {
            let mut current = self
                .query
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *current = query;
        }
        self.list.reset().await;
    }
}
