//! User administration service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::UserRow;
use crate::error::{AppError, AppResult};
use shared::models::{PermissionOverrides, Role, User};

/// User administration service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Input for updating a user account
#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub role: Option<String>,
    pub permission_overrides: Option<PermissionOverrides>,
    pub supplier_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all user accounts
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, role, permission_overrides,
                   supplier_id, is_active, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, role, permission_overrides,
                   supplier_id, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(User::from(row))
    }

    /// Update a user's role, overrides, or status
    pub async fn update_user(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        let existing = self.get_user(user_id).await?;

        let email = input.email.unwrap_or(existing.email);
        shared::validation::validate_email(&email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
            message_es: format!("Correo inválido: {}", msg),
        })?;

        let role = input
            .role
            .as_deref()
            .map(Role::parse_or_fallback)
            .unwrap_or(existing.role);
        let overrides = input
            .permission_overrides
            .unwrap_or(existing.permission_overrides);
        let supplier_id = if role == Role::Supplier {
            input.supplier_id.or(existing.supplier_id)
        } else {
            None
        };
        let is_active = input.is_active.unwrap_or(existing.is_active);

        let overrides_json = serde_json::to_value(&overrides)
            .map_err(|e| AppError::Internal(format!("Failed to serialize overrides: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $1, role = $2, permission_overrides = $3, supplier_id = $4, is_active = $5
            WHERE id = $6
            RETURNING id, username, email, password_hash, role, permission_overrides,
                      supplier_id, is_active, created_at
            "#,
        )
        .bind(&email)
        .bind(role.as_str())
        .bind(overrides_json)
        .bind(supplier_id)
        .bind(is_active)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(User::from(row))
    }

    /// Deactivate a user account
    ///
    /// Accounts are disabled rather than deleted so audit trails keep their
    /// author.
    pub async fn deactivate_user(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!("Deactivated user {}", user_id);
        Ok(())
    }
}
