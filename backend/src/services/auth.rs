//! Authentication service: registration, login, and token issuance

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Claims;
use crate::Config;
use shared::models::{PermissionOverrides, Role, User};
use shared::validation::{validate_email, validate_username};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    config: Arc<Config>,
}

/// Database row for a user account
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub permission_overrides: serde_json::Value,
    pub supplier_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let overrides: PermissionOverrides =
            serde_json::from_value(row.permission_overrides).unwrap_or_default();
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            role: Role::parse_or_fallback(&row.role),
            permission_overrides: overrides,
            supplier_id: row.supplier_id,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Input for registering a new user
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub supplier_id: Option<Uuid>,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl AuthService {
    pub fn new(db: PgPool, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Register a new user account
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        validate_username(&input.username).map_err(|msg| AppError::Validation {
            field: "username".to_string(),
            message: msg.to_string(),
            message_es: format!("Nombre de usuario inválido: {}", msg),
        })?;
        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
            message_es: format!("Correo inválido: {}", msg),
        })?;
        if input.password.len() < 8 {
            return Err(AppError::Validation {
                field: "password".to_string(),
                message: "Password must be at least 8 characters".to_string(),
                message_es: "La contraseña debe tener al menos 8 caracteres".to_string(),
            });
        }

        // Uniqueness check before insert for a friendly error
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = $1 OR email = $2",
        )
        .bind(&input.username)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if exists > 0 {
            return Err(AppError::DuplicateEntry("username or email".to_string()));
        }

        // Unknown role strings collapse to the most restricted role
        let role = input
            .role
            .as_deref()
            .map(Role::parse_or_fallback)
            .unwrap_or_else(Role::fallback);

        // Supplier accounts must reference an existing supplier
        if role == Role::Supplier {
            let supplier_id = input.supplier_id.ok_or_else(|| AppError::Validation {
                field: "supplier_id".to_string(),
                message: "Supplier accounts require a supplier_id".to_string(),
                message_es: "Las cuentas de proveedor requieren supplier_id".to_string(),
            })?;
            let known = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM suppliers WHERE id = $1 AND active = TRUE",
            )
            .bind(supplier_id)
            .fetch_one(&self.db)
            .await?;
            if known == 0 {
                return Err(AppError::NotFound("Supplier".to_string()));
            }
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, role, supplier_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, role, permission_overrides,
                      supplier_id, is_active, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(if role == Role::Supplier {
            input.supplier_id
        } else {
            None
        })
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Registered user {} with role {}", row.username, row.role);
        Ok(User::from(row))
    }

    /// Authenticate a user and issue an access token
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, role, permission_overrides,
                   supplier_id, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !row.is_active {
            return Err(AppError::Unauthorized {
                message: "Account is disabled".to_string(),
                message_es: "La cuenta está deshabilitada".to_string(),
            });
        }

        let valid = bcrypt::verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = User::from(row);
        let access_token = self.issue_token(&user)?;
        let expires_in = self.config.jwt.access_token_expiry;

        tracing::info!("User {} logged in", user.username);

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        })
    }

    /// Fetch the full user record for an authenticated user
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

    /// Sign a JWT carrying the user's effective permissions
    fn issue_token(&self, user: &User) -> AppResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now().timestamp();
        let permissions: Vec<String> = user
            .permission_overrides
            .effective(user.role)
            .into_iter()
            .collect();

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            permissions,
            supplier_id: user.supplier_id.map(|id| id.to_string()),
            exp: now + self.config.jwt.access_token_expiry,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }
}
