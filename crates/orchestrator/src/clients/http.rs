//! HTTP adapters for the identity and catalog services.

use std::time::Duration;

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::{Product, User};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{CatalogClient, Dependency, DownstreamError, IdentityClient};

fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

fn transport_error(dependency: Dependency, err: reqwest::Error) -> DownstreamError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    DownstreamError::Upstream {
        dependency,
        status: err.status().map(|s| s.as_u16()),
        message,
    }
}

async fn decode<T: DeserializeOwned>(
    dependency: Dependency,
    response: Response,
) -> Result<T, DownstreamError> {
    response.json::<T>().await.map_err(|err| {
        if err.is_decode() {
            DownstreamError::Schema {
                dependency,
                message: err.to_string(),
            }
        } else {
            transport_error(dependency, err)
        }
    })
}

/// Classifies a response. `Ok(None)` is a 404.
async fn classify<T: DeserializeOwned>(
    dependency: Dependency,
    response: Response,
) -> Result<Option<T>, DownstreamError> {
    let status = response.status();
    if status.is_success() {
        return decode(dependency, response).await.map(Some);
    }
    match status {
        StatusCode::NOT_FOUND => Ok(None),
        StatusCode::BAD_REQUEST => Err(DownstreamError::BadRequest {
            dependency,
            message: "Bad request".to_string(),
        }),
        other => Err(DownstreamError::Upstream {
            dependency,
            status: Some(other.as_u16()),
            message: format!("status {other}"),
        }),
    }
}

/// Identity service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    http: Client,
    base_url: String,
}

impl HttpIdentityClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:9090`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_client(timeout)?, base_url))
    }

    /// Creates a client sharing an existing connection pool.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    #[tracing::instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, DownstreamError> {
        let dependency = Dependency::Identity;
        let url = format!("{}/api/users/{}", self.base_url, user_id);
        tracing::debug!(%url, "fetching user");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(dependency, e))?;
        classify(dependency, response).await
    }

    #[tracing::instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, DownstreamError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let dependency = Dependency::Identity;
        let url = format!("{}/api/users/search", self.base_url);
        let query: Vec<(&str, String)> = user_ids.iter().map(|id| ("ids", id.to_string())).collect();
        tracing::debug!(%url, "fetching users");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error(dependency, e))?;
        let users: Option<Vec<Option<User>>> = classify(dependency, response).await?;
        Ok(users.unwrap_or_default().into_iter().flatten().collect())
    }
}

/// Catalog service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_client(timeout)?, base_url))
    }

    /// Creates a client sharing an existing connection pool.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[tracing::instrument(skip(self))]
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, DownstreamError> {
        let dependency = Dependency::Catalog;
        let url = format!("{}/api/products/search/product-id/{}", self.base_url, product_id);
        tracing::debug!(%url, "fetching product");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(dependency, e))?;
        classify(dependency, response).await
    }

    #[tracing::instrument(skip(self, product_ids), fields(count = product_ids.len()))]
    async fn get_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Product>, DownstreamError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let dependency = Dependency::Catalog;
        let url = format!("{}/api/products/search", self.base_url);
        let query: Vec<(&str, String)> = product_ids
            .iter()
            .map(|id| ("ids", id.to_string()))
            .collect();
        tracing::debug!(%url, "fetching products");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error(dependency, e))?;
        let products: Option<Vec<Option<Product>>> = classify(dependency, response).await?;
        Ok(products.unwrap_or_default().into_iter().flatten().collect())
    }
}
