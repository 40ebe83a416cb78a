//! Client directory service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Client;

/// Client service for the customer directory
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    phone: Option<String>,
    email: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
        }
    }
}

/// Input for creating a client
#[derive(Debug, Deserialize)]
pub struct CreateClientInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Input for updating a client
#[derive(Debug, Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ClientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all clients
    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, phone, email FROM clients ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Get a client by ID
    pub async fn get_client(&self, client_id: Uuid) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, phone, email FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(Client::from(row))
    }

    /// Create a new client
    pub async fn create_client(&self, input: CreateClientInput) -> AppResult<Client> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Client name is required".to_string(),
                message_es: "El nombre del cliente es obligatorio".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (name, phone, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone, email
            "#,
        )
        .bind(name)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        Ok(Client::from(row))
    }

    /// Update a client
    pub async fn update_client(
        &self,
        client_id: Uuid,
        input: UpdateClientInput,
    ) -> AppResult<Client> {
        let existing = self.get_client(client_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET name = $1, phone = $2, email = $3
            WHERE id = $4
            RETURNING id, name, phone, email
            "#,
        )
        .bind(&name)
        .bind(&phone)
        .bind(&email)
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Client::from(row))
    }

    /// Delete a client
    pub async fn delete_client(&self, client_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        Ok(())
    }
}
