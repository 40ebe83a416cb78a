//! Shared types and domain logic for the Pharmacy Chain Management Platform
//!
//! This crate contains the models, the pure price-comparison and shortage
//! analysis computations, and the role/permission tables shared between the
//! backend and other components of the system.

pub mod models;
pub mod pricing;
pub mod shortage;
pub mod types;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use shortage::*;
pub use types::*;
pub use validation::*;
