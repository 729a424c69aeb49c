//! Catalog application service.
//!
//! Ties the pure pieces together: condition building for listings, category
//! resolution + reconciliation for updates, owner scoping everywhere. Every
//! operation acts strictly within the requesting user's scope; the
//! owner-scope predicate comes from the condition builder and is never
//! derived from filter input.

use std::sync::Arc;

use tracing::debug;

use storefront_catalog::{
    Category, NewCategory, NewProduct, Product, ProductPatch, reconcile,
};
use storefront_core::{DomainError, DomainResult, Entity, ProductId, UserId};
use storefront_query::{ConditionBuilder, Filter};

use crate::repository::{CategoryRepository, ProductRepository};

/// Store table holding product rows.
const PRODUCT_TABLE: &str = "product";

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    conditions: ConditionBuilder,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            products,
            categories,
            conditions: ConditionBuilder::new(PRODUCT_TABLE),
        }
    }

    /// List the caller's products matching `filter`.
    ///
    /// An empty filter lists everything the caller owns; the owner scope is
    /// applied regardless of filter content.
    pub async fn list_products(&self, owner: UserId, filter: &Filter) -> DomainResult<Vec<Product>> {
        let conditions = self.conditions.build(owner, filter);
        debug!(owner = %owner, conditions = conditions.len(), "listing products");
        Ok(self.products.list(&conditions).await?)
    }

    pub async fn get_product(&self, owner: UserId, id: ProductId) -> DomainResult<Product> {
        Ok(self.products.find_one(owner, id).await?)
    }

    /// Create a product for `owner`. Requested category ids resolve to the
    /// subset of existing categories; unknown ids are dropped, not errored.
    pub async fn create_product(&self, owner: UserId, input: NewProduct) -> DomainResult<Product> {
        input.validate()?;
        let categories = self.categories.find_by_ids(&input.category_ids).await?;
        let product = self.products.insert(owner, input, categories).await?;
        debug!(owner = %owner, product_id = %product.id(), "product created");
        Ok(product)
    }

    /// Update a product: scalar fields from the patch, categories by union
    /// merge. Absent `category_ids` leaves the category set untouched;
    /// present ones are resolved (unknown ids dropped) and merged with the
    /// current set, deduplicated by id.
    pub async fn update_product(
        &self,
        owner: UserId,
        id: ProductId,
        patch: ProductPatch,
    ) -> DomainResult<Product> {
        patch.validate()?;
        let mut product = self.products.find_one(owner, id).await?;
        product.apply(&patch);

        let requested = match &patch.category_ids {
            Some(ids) => Some(self.categories.find_by_ids(ids).await?),
            None => None,
        };
        let merged = reconcile(product.categories(), requested);
        product.set_categories(merged);

        Ok(self.products.update(&product).await?)
    }

    pub async fn remove_product(&self, owner: UserId, id: ProductId) -> DomainResult<()> {
        self.products.delete(owner, id).await?;
        debug!(owner = %owner, product_id = %id, "product removed");
        Ok(())
    }

    pub async fn create_category(&self, input: NewCategory) -> DomainResult<Category> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(self.categories.insert(input).await?)
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        Ok(self.categories.list().await?)
    }
}
