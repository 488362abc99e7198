//! `catalog-core`: domain foundation building blocks for the product catalog.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the closed enumerations items are classified by, and the
//! domain error model.

pub mod error;
pub mod id;
pub mod model;

pub use error::{DomainError, DomainResult};
pub use id::{BrandId, CategoryId, ItemId, StoreId, TenantId};
pub use model::{BcgTag, Visibility};
