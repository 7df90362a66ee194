//! Catalog reads, cached in memory.

use std::sync::Arc;

use reqwest::Method;
use tote_core::{Product, ProductId};
use tracing::{debug, instrument};

use super::ApiClient;
use super::cache::{CacheKey, CacheValue};
use crate::error::ApiError;

impl ApiClient {
    /// List every product in the catalog.
    ///
    /// Results are cached; each listed product also primes the single-product
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products.as_ref().clone());
        }

        let products: Vec<Product> = self
            .execute_json(self.request(Method::GET, "products"))
            .await?;

        for product in &products {
            self.inner
                .cache
                .insert(
                    CacheKey::Product(product.id),
                    CacheValue::Product(Box::new(product.clone())),
                )
                .await;
        }
        self.inner
            .cache
            .insert(
                CacheKey::Products,
                CacheValue::Products(Arc::new(products.clone())),
            )
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .execute_json(self.request(Method::GET, &format!("products/{id}")))
            .await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }
}
