//! Catalog Store

use std::{collections::BTreeSet, sync::Arc};

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::{
    catalog::{
        api::{CatalogApi, Category, Cursor},
        errors::CatalogError,
    },
    filters::{self, FilterState, SortOrder},
    products::{Product, ProductId, ProductPage},
};

/// Catalog Store
///
/// Products loaded from the remote catalog, plus the filter state applied to them.
pub struct CatalogStore {
    api: Arc<dyn CatalogApi>,
    page_size: u32,
    products: Vec<Product>,
    total: u32,
    next_skip: u32,

    /// False once the list holds a one-shot search or category result.
    paging: bool,

    filter: FilterState,
    last_error: Option<String>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("page_size", &self.page_size)
            .field("products", &self.products.len())
            .field("total", &self.total)
            .field("next_skip", &self.next_skip)
            .field("paging", &self.paging)
            .field("filter", &self.filter)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Create an empty store that fetches `page_size` products per page.
    pub fn new(api: Arc<dyn CatalogApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            products: Vec::new(),
            total: 0,
            next_skip: 0,
            paging: true,
            filter: FilterState::default(),
            last_error: None,
        }
    }

    /// Discard loaded products and fetch the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched; loaded products are kept.
    pub async fn load_first_page(&mut self) -> Result<(), CatalogError> {
        let cursor = Cursor {
            skip: 0,
            limit: self.page_size,
        };

        let result = self.api.products(cursor).await;
        let page = self.record(result)?;

        self.products.clear();
        self.paging = true;
        self.append(page);

        Ok(())
    }

    /// Fetch the next page and append the products not loaded yet.
    ///
    /// Returns the number of products added. No request is made once every
    /// product has been loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    pub async fn load_more(&mut self) -> Result<usize, CatalogError> {
        if !self.has_more() {
            return Ok(0);
        }

        let cursor = Cursor {
            skip: self.next_skip,
            limit: self.page_size,
        };

        let result = self.api.products(cursor).await;
        let page = self.record(result)?;

        Ok(self.append(page))
    }

    /// Whether more pages are available.
    pub fn has_more(&self) -> bool {
        self.paging && self.next_skip < self.total
    }

    /// Replace the loaded products with a remote search result.
    ///
    /// A blank query reloads the first page instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn search_remote(&mut self, query: &str) -> Result<(), CatalogError> {
        let query = query.trim();

        if query.is_empty() {
            return self.load_first_page().await;
        }

        let result = self.api.search(query).await;
        let page = self.record(result)?;

        self.replace(page);

        Ok(())
    }

    /// Replace the loaded products with the products of one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    pub async fn load_category(&mut self, category: &str) -> Result<(), CatalogError> {
        let result = self.api.products_in_category(category).await;
        let page = self.record(result)?;

        self.replace(page);

        Ok(())
    }

    /// A single product, taken from the loaded products when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has to be fetched and the request fails.
    pub async fn fetch_product(&mut self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = self.product(id) {
            return Ok(product.clone());
        }

        let result = self.api.product(id).await;

        self.record(result)
    }

    /// Every category the remote catalog knows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_categories(&mut self) -> Result<Vec<Category>, CatalogError> {
        let result = self.api.categories().await;

        self.record(result)
    }

    /// A loaded product.
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Loaded products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Total number of products the catalog reported.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Distinct categories of the loaded products, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|product| product.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Current filter.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Set the free-text query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    /// Select a category, or `None` for all.
    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.category = category;
    }

    /// Set the sort order.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.filter.sort = sort;
    }

    /// Reset the filter to its defaults.
    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
    }

    /// Loaded products after the current filter.
    pub fn visible(&self) -> Vec<Product> {
        filters::apply(&self.products, &self.filter)
    }

    /// Message of the most recent failed fetch, until cleared or a fetch succeeds.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Dismiss the recorded fetch error.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn record<T>(&mut self, result: Result<T, CatalogError>) -> Result<T, CatalogError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(error) => {
                warn!(%error, "catalog fetch failed");

                self.last_error = Some(error.to_string());
            }
        }

        result
    }

    fn append(&mut self, page: ProductPage) -> usize {
        let fetched = u32::try_from(page.products.len()).unwrap_or(u32::MAX);
        let mut loaded: FxHashSet<ProductId> = self.products.iter().map(|product| product.id).collect();

        let before = self.products.len();

        self.products.extend(
            page.products
                .into_iter()
                .filter(|product| loaded.insert(product.id)),
        );

        self.next_skip = page.skip.saturating_add(fetched);

        // An empty page means the reported total was stale.
        self.total = if fetched == 0 {
            self.next_skip
        } else {
            page.total
        };

        let added = self.products.len() - before;

        debug!(added, loaded = self.products.len(), total = self.total, "catalog page loaded");

        added
    }

    fn replace(&mut self, page: ProductPage) {
        let mut seen = FxHashSet::default();

        self.products = page
            .products
            .into_iter()
            .filter(|product| seen.insert(product.id))
            .collect();

        self.total = page.total;
        self.next_skip = u32::try_from(self.products.len()).unwrap_or(u32::MAX);
        self.paging = false;
    }
}
