use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity, ProductId, UserId};

use crate::category::Category;

/// A catalog record owned by exactly one user.
///
/// # Invariants
/// - The owner is set at creation and never changes.
/// - The category set contains no duplicate category ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    owner_id: UserId,
    name: String,
    price_subunit: i64,
    categories: Vec<Category>,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        owner_id: UserId,
        name: impl Into<String>,
        price_subunit: i64,
        categories: Vec<Category>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut product = Self {
            id,
            owner_id,
            name: name.into(),
            price_subunit,
            categories: Vec::new(),
            created_at,
        };
        product.set_categories(categories);
        product
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price in the smallest currency unit (e.g. cents).
    pub fn price_subunit(&self) -> i64 {
        self.price_subunit
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the category set, collapsing duplicate ids (first occurrence
    /// wins). Callers computing a merge should go through
    /// [`crate::category::reconcile`] first.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        let mut seen: HashSet<CategoryId> = HashSet::with_capacity(categories.len());
        self.categories = categories
            .into_iter()
            .filter(|c| seen.insert(c.id))
            .collect();
    }

    /// Apply the scalar fields of a patch. Category changes are resolved by
    /// the caller (lookup + reconcile) and applied via [`Self::set_categories`].
    pub fn apply(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price_subunit) = patch.price_subunit {
            self.price_subunit = price_subunit;
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Creation input for a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price_subunit: i64,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl NewProduct {
    /// Deterministic input validation, checked before any storage work.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.price_subunit < 0 {
            return Err(DomainError::validation("price_subunit cannot be negative"));
        }
        Ok(())
    }
}

/// Update input: absent fields mean "no change". An absent `category_ids`
/// leaves the category set untouched; a present one is merged by union.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price_subunit: Option<i64>,
    pub category_ids: Option<Vec<CategoryId>>,
}

impl ProductPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(price_subunit) = self.price_subunit {
            if price_subunit < 0 {
                return Err(DomainError::validation("price_subunit cannot be negative"));
            }
        }
        Ok(())
    }
}
