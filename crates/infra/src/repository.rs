//! Repository abstraction over the backing store.
//!
//! The store itself is an external collaborator; these traits are the whole
//! surface the application layer sees. Implementations must honor owner
//! scoping: a product lookup with the wrong owner is a `NotFound`, never a
//! leak.

use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::{Category, NewCategory, NewProduct, Product};
use storefront_core::{CategoryId, DomainError, ProductId, UserId};
use storefront_query::Condition;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched within the caller's scope.
    #[error("not found")]
    NotFound,

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => DomainError::NotFound,
            RepositoryError::Storage(msg) => DomainError::Storage(msg),
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product for `owner`. The store assigns the id and
    /// creation timestamp. `categories` are the already-resolved entities
    /// for `input.category_ids` (the service resolves ids; unknown ids have
    /// been dropped by then).
    async fn insert(
        &self,
        owner: UserId,
        input: NewProduct,
        categories: Vec<Category>,
    ) -> RepositoryResult<Product>;

    /// Owner-scoped lookup. A miss (unknown id or wrong owner) is
    /// `NotFound`.
    async fn find_one(&self, owner: UserId, id: ProductId) -> RepositoryResult<Product>;

    /// Return the rows satisfying the conjunction of `conditions`.
    ///
    /// Callers obtain `conditions` from the condition builder, whose first
    /// element is always the owner scope; this method ANDs whatever it is
    /// given and applies no scoping of its own. Conjunction is commutative:
    /// condition order must not affect the result set.
    async fn list(&self, conditions: &[Condition]) -> RepositoryResult<Vec<Product>>;

    /// Persist updated fields and category set. Owner-scoped: the stored
    /// row's owner must match.
    async fn update(&self, product: &Product) -> RepositoryResult<Product>;

    /// Owner-scoped delete.
    async fn delete(&self, owner: UserId, id: ProductId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, input: NewCategory) -> RepositoryResult<Category>;

    async fn list(&self) -> RepositoryResult<Vec<Category>>;

    /// Resolve ids to the subset of existing categories. Unknown ids are
    /// silently dropped, never errored; duplicate ids resolve once.
    async fn find_by_ids(&self, ids: &[CategoryId]) -> RepositoryResult<Vec<Category>>;
}
