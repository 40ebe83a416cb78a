//! Domain models for the Pharmacy Chain Management Platform

mod client;
mod inventory;
mod order;
mod pharmacy;
mod sale;
mod supplier;
mod user;

pub use client::*;
pub use inventory::*;
pub use order::*;
pub use pharmacy::*;
pub use sale::*;
pub use supplier::*;
pub use user::*;
