use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, Entity};

/// Tag-like record referenced, never owned, by products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Creation input for a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// Compute the category set to persist for a product update.
///
/// `None` means the caller supplied no category ids: the current set is
/// returned unchanged. `Some(requested)` merges by union: every current
/// member is retained, then requested members not already present are
/// appended. Membership is by category id; duplicates across the two sets,
/// or within `requested` itself, collapse. Ordering carries no
/// meaning; current-then-new order is kept for determinism.
pub fn reconcile(current: &[Category], requested: Option<Vec<Category>>) -> Vec<Category> {
    let Some(requested) = requested else {
        return current.to_vec();
    };

    let mut seen: HashSet<CategoryId> = current.iter().map(|c| c.id).collect();
    let mut result = current.to_vec();
    for category in requested {
        if seen.insert(category.id) {
            result.push(category);
        }
    }
    result
}
