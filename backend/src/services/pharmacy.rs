//! Pharmacy branch management service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Pharmacy;
use shared::validation::validate_percentage;

/// Pharmacy service for managing chain branches
#[derive(Clone)]
pub struct PharmacyService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PharmacyRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    daily_discount_pct: Option<Decimal>,
    daily_discount_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl From<PharmacyRow> for Pharmacy {
    fn from(row: PharmacyRow) -> Self {
        Pharmacy {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email: row.email,
            daily_discount_pct: row.daily_discount_pct,
            daily_discount_date: row.daily_discount_date,
            created_at: row.created_at,
        }
    }
}

/// Input for creating a pharmacy
#[derive(Debug, Deserialize)]
pub struct CreatePharmacyInput {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Input for updating a pharmacy
#[derive(Debug, Deserialize)]
pub struct UpdatePharmacyInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Input for setting today's storewide discount
#[derive(Debug, Deserialize)]
pub struct SetDailyDiscountInput {
    pub discount_pct: Decimal,
}

const SELECT_PHARMACY: &str = r#"
    SELECT id, name, address, phone, email, daily_discount_pct, daily_discount_date, created_at
    FROM pharmacies
"#;

impl PharmacyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all pharmacies in the chain
    pub async fn list_pharmacies(&self) -> AppResult<Vec<Pharmacy>> {
        let rows = sqlx::query_as::<_, PharmacyRow>(&format!("{} ORDER BY name", SELECT_PHARMACY))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Pharmacy::from).collect())
    }

    /// Get a pharmacy by ID
    pub async fn get_pharmacy(&self, pharmacy_id: Uuid) -> AppResult<Pharmacy> {
        let row =
            sqlx::query_as::<_, PharmacyRow>(&format!("{} WHERE id = $1", SELECT_PHARMACY))
                .bind(pharmacy_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Pharmacy".to_string()))?;

        Ok(Pharmacy::from(row))
    }

    /// Create a new pharmacy branch
    pub async fn create_pharmacy(&self, input: CreatePharmacyInput) -> AppResult<Pharmacy> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Pharmacy name is required".to_string(),
                message_es: "El nombre de la farmacia es obligatorio".to_string(),
            });
        }

        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pharmacies WHERE name = $1")
                .bind(name)
                .fetch_one(&self.db)
                .await?;
        if exists > 0 {
            return Err(AppError::DuplicateEntry("pharmacy name".to_string()));
        }

        let row = sqlx::query_as::<_, PharmacyRow>(
            r#"
            INSERT INTO pharmacies (name, address, phone, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, phone, email, daily_discount_pct, daily_discount_date, created_at
            "#,
        )
        .bind(name)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created pharmacy {}", row.name);
        Ok(Pharmacy::from(row))
    }

    /// Update a pharmacy
    pub async fn update_pharmacy(
        &self,
        pharmacy_id: Uuid,
        input: UpdatePharmacyInput,
    ) -> AppResult<Pharmacy> {
        let existing = self.get_pharmacy(pharmacy_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let address = input.address.or(existing.address);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);

        let row = sqlx::query_as::<_, PharmacyRow>(
            r#"
            UPDATE pharmacies
            SET name = $1, address = $2, phone = $3, email = $4
            WHERE id = $5
            RETURNING id, name, address, phone, email, daily_discount_pct, daily_discount_date, created_at
            "#,
        )
        .bind(&name)
        .bind(&address)
        .bind(&phone)
        .bind(&email)
        .bind(pharmacy_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Pharmacy::from(row))
    }

    /// Delete a pharmacy branch
    pub async fn delete_pharmacy(&self, pharmacy_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM pharmacies WHERE id = $1")
            .bind(pharmacy_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pharmacy".to_string()));
        }

        tracing::info!("Deleted pharmacy {}", pharmacy_id);
        Ok(())
    }

    /// Set the storewide discount for today at a branch
    ///
    /// The discount is stamped with the current date; a stale stamp means no
    /// discount applies.
    pub async fn set_daily_discount(
        &self,
        pharmacy_id: Uuid,
        input: SetDailyDiscountInput,
    ) -> AppResult<Pharmacy> {
        validate_percentage(input.discount_pct).map_err(|msg| AppError::Validation {
            field: "discount_pct".to_string(),
            message: msg.to_string(),
            message_es: format!("Porcentaje inválido: {}", msg),
        })?;

        let row = sqlx::query_as::<_, PharmacyRow>(
            r#"
            UPDATE pharmacies
            SET daily_discount_pct = $1, daily_discount_date = CURRENT_DATE
            WHERE id = $2
            RETURNING id, name, address, phone, email, daily_discount_pct, daily_discount_date, created_at
            "#,
        )
        .bind(input.discount_pct)
        .bind(pharmacy_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pharmacy".to_string()))?;

        tracing::info!(
            "Set daily discount {}% at pharmacy {}",
            input.discount_pct,
            pharmacy_id
        );
        Ok(Pharmacy::from(row))
    }

    /// Get today's storewide discount for a branch, if one is active
    pub async fn get_daily_discount(&self, pharmacy_id: Uuid) -> AppResult<Option<Decimal>> {
        let pharmacy = self.get_pharmacy(pharmacy_id).await?;

        let today = Utc::now().date_naive();
        Ok(match (pharmacy.daily_discount_pct, pharmacy.daily_discount_date) {
            (Some(pct), Some(date)) if date == today => Some(pct),
            _ => None,
        })
    }
}
