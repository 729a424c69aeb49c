//! `storefront-query` — predicate construction for catalog listings.
//!
//! Converts a caller-supplied filter object (field → scalar equality, or
//! field → `gte`/`lte` range object) into an ordered sequence of
//! parameterized conditions, ANDed onto an owner-scoped base query by the
//! data-access layer. Everything here is pure and deterministic.

pub mod condition;
pub mod filter;
pub mod normalize;

pub use condition::{CompareOp, Condition, ConditionBuilder, OWNER_COLUMN};
pub use filter::{Filter, FilterValue, RangeSpec, Scalar};
pub use normalize::normalize;
