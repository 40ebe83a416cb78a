//! Client models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retail client of the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}
