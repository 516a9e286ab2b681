use common::ProductId;
use domain::Product;
use tracing::warn;

use super::{record_fallback, record_outcome};
use crate::clients::{CatalogClient, Dependency, DownstreamError};

/// Products returned by a catalog batch lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLookup {
    pub products: Vec<Product>,
    /// The catalog could not be reached and `products` are placeholders.
    pub degraded: bool,
}

/// Catalog lookups with placeholder fallback.
///
/// A failed batch lookup yields one placeholder per requested id and marks
/// the lookup degraded. Bad requests are returned to the caller unchanged.
#[derive(Debug)]
pub struct CatalogPolicy<C> {
    client: C,
}

impl<C: CatalogClient> CatalogPolicy<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Looks up many products. Unknown ids are omitted.
    pub async fn get_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<ProductLookup, DownstreamError> {
        if product_ids.is_empty() {
            return Ok(ProductLookup {
                products: Vec::new(),
                degraded: false,
            });
        }
        let result = self.client.get_products(product_ids).await;
        record_outcome(Dependency::Catalog, &result);

        match result {
            Ok(products) => Ok(ProductLookup {
                products,
                degraded: false,
            }),
            Err(err) if !err.is_bad_request() => {
                warn!(count = product_ids.len(), error = %err, "catalog unavailable, using placeholder products");
                record_fallback(Dependency::Catalog);
                Ok(ProductLookup {
                    products: product_ids.iter().copied().map(Product::placeholder).collect(),
                    degraded: true,
                })
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{InMemoryCatalogClient, SimulatedFailure};
    use domain::UNAVAILABLE;

    fn product(name: &str) -> Product {
        Product {
            product_id: ProductId::new(),
            product_name: Some(name.to_string()),
            category: Some(name.to_string()),
            unit_price: 4.0,
            quantity_in_stock: 2,
        }
    }

    #[tokio::test]
    async fn test_outage_yields_degraded_placeholders() {
        let policy = CatalogPolicy::new(InMemoryCatalogClient::new());
        policy.client().set_failure(SimulatedFailure::Unavailable);
        let ids = [ProductId::new(), ProductId::new()];

        let lookup = policy.get_products(&ids).await.unwrap();

        assert!(lookup.degraded);
        assert_eq!(lookup.products.len(), 2);
        assert_eq!(lookup.products[1].product_id, ids[1]);
    }

    #[tokio::test]
    async fn test_real_product_named_like_placeholder_is_not_degraded() {
        let policy = CatalogPolicy::new(InMemoryCatalogClient::new());
        let lookalike = product(UNAVAILABLE);
        policy.client().insert_product(lookalike.clone());

        let lookup = policy.get_products(&[lookalike.product_id]).await.unwrap();

        assert!(!lookup.degraded);
        assert_eq!(lookup.products, vec![lookalike]);
    }

    #[tokio::test]
    async fn test_bad_request_propagates() {
        let policy = CatalogPolicy::new(InMemoryCatalogClient::new());
        policy.client().set_failure(SimulatedFailure::BadRequest);

        let result = policy.get_products(&[ProductId::new()]).await;

        assert!(matches!(result, Err(DownstreamError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_empty_request_skips_catalog() {
        let policy = CatalogPolicy::new(InMemoryCatalogClient::new());

        let lookup = policy.get_products(&[]).await.unwrap();

        assert!(lookup.products.is_empty());
        assert_eq!(policy.client().get_products_calls(), 0);
    }
}
