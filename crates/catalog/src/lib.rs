//! `storefront-catalog` — product and category domain model.
//!
//! Products belong to exactly one user and reference zero or more
//! categories; the category set is duplicate-free at every observable point.

pub mod category;
pub mod product;

pub use category::{Category, NewCategory, reconcile};
pub use product::{NewProduct, Product, ProductPatch};
