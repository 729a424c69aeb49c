//! In-memory store backed by `RwLock`ed maps.
//!
//! Intended for tests/dev. Conditions are evaluated directly against product
//! field values, which keeps the listing semantics identical to the SQL
//! path: every condition must hold, and a condition on a column the row
//! lacks excludes the row.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use storefront_catalog::{Category, NewCategory, NewProduct, Product};
use storefront_core::{CategoryId, Entity, ProductId, UserId};
use storefront_query::{Condition, OWNER_COLUMN, Scalar};

use crate::repository::{
    CategoryRepository, ProductRepository, RepositoryError, RepositoryResult,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<ProductId, Product>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
    next_product_id: AtomicI64,
    next_category_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Map a store column name to a product's value for it.
fn product_field(product: &Product, column: &str) -> Option<Scalar> {
    match column {
        "id" => Some(Scalar::Int(product.id().value())),
        "name" => Some(Scalar::Text(product.name().to_string())),
        "priceSubunit" => Some(Scalar::Int(product.price_subunit())),
        OWNER_COLUMN => Some(Scalar::Uuid(*product.owner_id().as_uuid())),
        _ => None,
    }
}

fn poisoned(_: impl core::fmt::Debug) -> RepositoryError {
    RepositoryError::storage("lock poisoned")
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert(
        &self,
        owner: UserId,
        input: NewProduct,
        categories: Vec<Category>,
    ) -> RepositoryResult<Product> {
        let id = ProductId::new(self.next_product_id.fetch_add(1, Ordering::SeqCst) + 1);
        let product = Product::new(
            id,
            owner,
            input.name,
            input.price_subunit,
            categories,
            Utc::now(),
        );

        let mut products = self.products.write().map_err(poisoned)?;
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn find_one(&self, owner: UserId, id: ProductId) -> RepositoryResult<Product> {
        let products = self.products.read().map_err(poisoned)?;
        products
            .get(&id)
            .filter(|p| p.owner_id() == owner)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, conditions: &[Condition]) -> RepositoryResult<Vec<Product>> {
        let products = self.products.read().map_err(poisoned)?;
        let mut matched: Vec<Product> = products
            .values()
            .filter(|p| {
                conditions
                    .iter()
                    .all(|c| c.matches(product_field(p, c.column()).as_ref()))
            })
            .cloned()
            .collect();

        // HashMap iteration order is arbitrary; sort for stable output.
        matched.sort_by_key(|p| p.id());
        Ok(matched)
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        let mut products = self.products.write().map_err(poisoned)?;
        match products.get_mut(&product.id()) {
            Some(stored) if stored.owner_id() == product.owner_id() => {
                *stored = product.clone();
                Ok(product.clone())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, owner: UserId, id: ProductId) -> RepositoryResult<()> {
        let mut products = self.products.write().map_err(poisoned)?;
        match products.get(&id) {
            Some(stored) if stored.owner_id() == owner => {
                products.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn insert(&self, input: NewCategory) -> RepositoryResult<Category> {
        let id = CategoryId::new(self.next_category_id.fetch_add(1, Ordering::SeqCst) + 1);
        let category = Category::new(id, input.name, Utc::now());

        let mut categories = self.categories.write().map_err(poisoned)?;
        categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list(&self) -> RepositoryResult<Vec<Category>> {
        let categories = self.categories.read().map_err(poisoned)?;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        Ok(all)
    }

    async fn find_by_ids(&self, ids: &[CategoryId]) -> RepositoryResult<Vec<Category>> {
        let categories = self.categories.read().map_err(poisoned)?;
        let mut yielded = std::collections::HashSet::with_capacity(ids.len());
        Ok(ids
            .iter()
            .filter(|id| yielded.insert(**id))
            .filter_map(|id| categories.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price_subunit: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price_subunit,
            category_ids: vec![],
        }
    }

    #[tokio::test]
    async fn find_one_with_wrong_owner_is_not_found() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let product = ProductRepository::insert(&store, owner, new_product("widget", 100), vec![])
            .await
            .unwrap();

        let err = store.find_one(UserId::new(), product.id()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(store.find_one(owner, product.id()).await.is_ok());
    }

    #[tokio::test]
    async fn find_by_ids_drops_unknown_and_duplicate_ids() {
        let store = InMemoryStore::new();
        let a = CategoryRepository::insert(&store, NewCategory { name: "tools".into() })
            .await
            .unwrap();

        let found = store
            .find_by_ids(&[a.id, CategoryId::new(999), a.id])
            .await
            .unwrap();
        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn update_with_wrong_owner_is_not_found() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let product = ProductRepository::insert(&store, owner, new_product("widget", 100), vec![])
            .await
            .unwrap();

        let foreign = Product::new(
            product.id(),
            UserId::new(),
            "stolen",
            1,
            vec![],
            Utc::now(),
        );
        let err = store.update(&foreign).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
