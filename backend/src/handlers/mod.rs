//! HTTP request handlers

pub mod auth;
pub mod client;
pub mod comparison;
pub mod health;
pub mod inventory;
pub mod order;
pub mod pharmacy;
pub mod price_list;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod user;

pub use auth::*;
pub use client::*;
pub use comparison::*;
pub use health::*;
pub use inventory::*;
pub use order::*;
pub use pharmacy::*;
pub use price_list::*;
pub use report::*;
pub use sale::*;
pub use supplier::*;
pub use user::*;
