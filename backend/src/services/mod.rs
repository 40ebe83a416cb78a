//! Business logic services

pub mod auth;
pub mod client;
pub mod comparison;
pub mod inventory;
pub mod order;
pub mod pharmacy;
pub mod price_list;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod user;
