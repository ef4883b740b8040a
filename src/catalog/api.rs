//! Catalog API

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    catalog::errors::CatalogError,
    products::{Product, ProductId, ProductPage},
};

/// Paging cursor: `limit` products starting at offset `skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Offset of the first product
    pub skip: u32,

    /// Page size
    pub limit: u32,
}

/// Product category.
///
/// The catalog lists categories either as bare slugs or as `{ slug, name }`
/// objects; a bare slug doubles as its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryRepr")]
pub struct Category {
    /// Slug products refer to
    pub slug: String,

    /// Display name
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    Slug(String),
    Full { slug: String, name: String },
}

impl From<CategoryRepr> for Category {
    fn from(repr: CategoryRepr) -> Self {
        match repr {
            CategoryRepr::Slug(slug) => Self {
                name: slug.clone(),
                slug,
            },
            CategoryRepr::Full { slug, name } => Self { slug, name },
        }
    }
}

/// Remote Product Catalog
#[automock]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of products.
    async fn products(&self, cursor: Cursor) -> Result<ProductPage, CatalogError>;

    /// Fetch a single product.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Full-text product search.
    async fn search(&self, query: &str) -> Result<ProductPage, CatalogError>;

    /// List every category.
    async fn categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Fetch the products of one category.
    async fn products_in_category(&self, category: &str) -> Result<ProductPage, CatalogError>;
}

/// HTTP client for a `DummyJSON`-style catalog.
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogApi {
    /// Create a client for the catalog at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let url = format!("{}{path}", self.base_url);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        debug!(%url, %status, "catalog response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(CatalogError::UnexpectedStatus { status, body });
        }

        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn products(&self, cursor: Cursor) -> Result<ProductPage, CatalogError> {
        self.get("/products", &[("limit", cursor.limit), ("skip", cursor.skip)])
            .await
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get(&format!("/products/{id}"), &()).await
    }

    async fn search(&self, query: &str) -> Result<ProductPage, CatalogError> {
        self.get("/products/search", &[("q", query)]).await
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.get("/products/categories", &()).await
    }

    async fn products_in_category(&self, category: &str) -> Result<ProductPage, CatalogError> {
        self.get("/products", &[("category", category)]).await
    }
}
