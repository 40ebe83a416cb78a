//! Supplier management service
//!
//! Covers the supplier directory, its discount terms, and the quick-quote
//! price table used by the shortage report's cheapest-supplier lookup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Supplier, SupplierPrice, SupplierStatistics};
use shared::shortage::BestSupplierPrice;
use shared::validation::{validate_percentage, validate_price, validate_product_code};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    contact: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    credit_days: i32,
    commercial_discount_pct: Decimal,
    early_pay_discount_pct: Decimal,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact: row.contact,
            phone: row.phone,
            email: row.email,
            address: row.address,
            credit_days: row.credit_days,
            commercial_discount_pct: row.commercial_discount_pct,
            early_pay_discount_pct: row.early_pay_discount_pct,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SupplierPriceRow {
    id: Uuid,
    supplier_id: Uuid,
    code: String,
    description: String,
    price: Decimal,
    updated_at: DateTime<Utc>,
}

impl From<SupplierPriceRow> for SupplierPrice {
    fn from(row: SupplierPriceRow) -> Self {
        SupplierPrice {
            id: row.id,
            supplier_id: row.supplier_id,
            code: row.code,
            description: row.description,
            price: row.price,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
pub struct CreateSupplierInput {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_days: Option<i32>,
    pub commercial_discount_pct: Option<Decimal>,
    pub early_pay_discount_pct: Option<Decimal>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_days: Option<i32>,
    pub commercial_discount_pct: Option<Decimal>,
    pub early_pay_discount_pct: Option<Decimal>,
}

/// Input for upserting a quick quote
#[derive(Debug, Deserialize)]
pub struct UpsertSupplierPriceInput {
    pub code: String,
    pub description: String,
    pub price: Decimal,
}

const SELECT_SUPPLIER: &str = r#"
    SELECT id, name, contact, phone, email, address, credit_days,
           commercial_discount_pct, early_pay_discount_pct, active, created_at
    FROM suppliers
"#;

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers, active only by default
    pub async fn list_suppliers(&self, include_inactive: bool) -> AppResult<Vec<Supplier>> {
        let sql = if include_inactive {
            format!("{} ORDER BY name", SELECT_SUPPLIER)
        } else {
            format!("{} WHERE active = TRUE ORDER BY name", SELECT_SUPPLIER)
        };
        let rows = sqlx::query_as::<_, SupplierRow>(&sql)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    /// Get a supplier by ID
    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row =
            sqlx::query_as::<_, SupplierRow>(&format!("{} WHERE id = $1", SELECT_SUPPLIER))
                .bind(supplier_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(Supplier::from(row))
    }

    /// Create a new supplier
    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name is required".to_string(),
                message_es: "El nombre del proveedor es obligatorio".to_string(),
            });
        }

        let commercial = input.commercial_discount_pct.unwrap_or(Decimal::ZERO);
        let early_pay = input.early_pay_discount_pct.unwrap_or(Decimal::ZERO);
        Self::validate_terms(commercial, early_pay, input.credit_days)?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers WHERE name = $1")
            .bind(name)
            .fetch_one(&self.db)
            .await?;
        if exists > 0 {
            return Err(AppError::DuplicateEntry("supplier name".to_string()));
        }

        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            INSERT INTO suppliers (name, contact, phone, email, address, credit_days,
                                   commercial_discount_pct, early_pay_discount_pct)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, contact, phone, email, address, credit_days,
                      commercial_discount_pct, early_pay_discount_pct, active, created_at
            "#,
        )
        .bind(name)
        .bind(&input.contact)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(input.credit_days.unwrap_or(0))
        .bind(commercial)
        .bind(early_pay)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created supplier {}", row.name);
        Ok(Supplier::from(row))
    }

    /// Update a supplier
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        let existing = self.get_supplier(supplier_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let contact = input.contact.or(existing.contact);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        let address = input.address.or(existing.address);
        let credit_days = input.credit_days.unwrap_or(existing.credit_days);
        let commercial = input
            .commercial_discount_pct
            .unwrap_or(existing.commercial_discount_pct);
        let early_pay = input
            .early_pay_discount_pct
            .unwrap_or(existing.early_pay_discount_pct);

        Self::validate_terms(commercial, early_pay, Some(credit_days))?;

        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            UPDATE suppliers
            SET name = $1, contact = $2, phone = $3, email = $4, address = $5,
                credit_days = $6, commercial_discount_pct = $7, early_pay_discount_pct = $8
            WHERE id = $9
            RETURNING id, name, contact, phone, email, address, credit_days,
                      commercial_discount_pct, early_pay_discount_pct, active, created_at
            "#,
        )
        .bind(&name)
        .bind(&contact)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(credit_days)
        .bind(commercial)
        .bind(early_pay)
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Supplier::from(row))
    }

    /// Deactivate a supplier
    ///
    /// Soft delete: quotes and purchase history keep pointing at the record,
    /// it just stops appearing in listings and comparisons.
    pub async fn deactivate_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE suppliers SET active = FALSE WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        tracing::info!("Deactivated supplier {}", supplier_id);
        Ok(())
    }

    /// Reactivate a previously deactivated supplier
    pub async fn reactivate_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            UPDATE suppliers SET active = TRUE WHERE id = $1
            RETURNING id, name, contact, phone, email, address, credit_days,
                      commercial_discount_pct, early_pay_discount_pct, active, created_at
            "#,
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        tracing::info!("Reactivated supplier {}", supplier_id);
        Ok(Supplier::from(row))
    }

    /// Aggregate statistics over active suppliers
    pub async fn get_statistics(&self) -> AppResult<SupplierStatistics> {
        let row = sqlx::query_as::<_, (i64, i64, Option<Decimal>, Option<Decimal>)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE credit_days > 0),
                   AVG(credit_days::numeric),
                   AVG(commercial_discount_pct)
            FROM suppliers
            WHERE active = TRUE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(SupplierStatistics {
            total_suppliers: row.0,
            suppliers_with_credit: row.1,
            avg_credit_days: row.2.unwrap_or(Decimal::ZERO),
            avg_commercial_discount_pct: row.3.unwrap_or(Decimal::ZERO),
        })
    }

    /// List a supplier's quick quotes
    pub async fn list_prices(&self, supplier_id: Uuid) -> AppResult<Vec<SupplierPrice>> {
        let rows = sqlx::query_as::<_, SupplierPriceRow>(
            r#"
            SELECT id, supplier_id, code, description, price, updated_at
            FROM supplier_prices
            WHERE supplier_id = $1
            ORDER BY code
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SupplierPrice::from).collect())
    }

    /// Insert or refresh a quick quote for a product
    pub async fn upsert_price(
        &self,
        supplier_id: Uuid,
        input: UpsertSupplierPriceInput,
    ) -> AppResult<SupplierPrice> {
        validate_product_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
            message_es: format!("Código inválido: {}", msg),
        })?;
        validate_price(input.price).map_err(|msg| AppError::Validation {
            field: "price".to_string(),
            message: msg.to_string(),
            message_es: format!("Precio inválido: {}", msg),
        })?;

        // Make sure the supplier exists before upserting
        self.get_supplier(supplier_id).await?;

        let row = sqlx::query_as::<_, SupplierPriceRow>(
            r#"
            INSERT INTO supplier_prices (supplier_id, code, description, price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (supplier_id, code)
            DO UPDATE SET description = EXCLUDED.description,
                          price = EXCLUDED.price,
                          updated_at = NOW()
            RETURNING id, supplier_id, code, description, price, updated_at
            "#,
        )
        .bind(supplier_id)
        .bind(input.code.trim())
        .bind(input.description.trim())
        .bind(input.price)
        .fetch_one(&self.db)
        .await?;

        Ok(SupplierPrice::from(row))
    }

    /// Remove a quick quote
    pub async fn delete_price(&self, supplier_id: Uuid, price_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM supplier_prices WHERE id = $1 AND supplier_id = $2")
                .bind(price_id)
                .bind(supplier_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier price".to_string()));
        }

        Ok(())
    }

    /// All active suppliers' quick quotes for one product code, cheapest first
    pub async fn list_prices_for_code(&self, code: &str) -> AppResult<Vec<SupplierPrice>> {
        let rows = sqlx::query_as::<_, SupplierPriceRow>(
            r#"
            SELECT sp.id, sp.supplier_id, sp.code, sp.description, sp.price, sp.updated_at
            FROM supplier_prices sp
            JOIN suppliers s ON s.id = sp.supplier_id
            WHERE sp.code = $1 AND s.active = TRUE
            ORDER BY sp.price ASC, s.id
            "#,
        )
        .bind(code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SupplierPrice::from).collect())
    }

    /// Cheapest quoted price per product code across active suppliers
    ///
    /// Compares raw quoted prices without the discount cascade; this feeds
    /// the shortage report's supplier suggestion.
    pub async fn best_prices_by_code(&self) -> AppResult<HashMap<String, BestSupplierPrice>> {
        let rows = sqlx::query_as::<_, (String, String, Decimal)>(
            r#"
            SELECT DISTINCT ON (sp.code) sp.code, s.name, sp.price
            FROM supplier_prices sp
            JOIN suppliers s ON s.id = sp.supplier_id
            WHERE s.active = TRUE
            ORDER BY sp.code, sp.price ASC, s.id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, supplier_name, price)| {
                (code, BestSupplierPrice { supplier_name, price })
            })
            .collect())
    }

    fn validate_terms(
        commercial: Decimal,
        early_pay: Decimal,
        credit_days: Option<i32>,
    ) -> AppResult<()> {
        validate_percentage(commercial).map_err(|msg| AppError::Validation {
            field: "commercial_discount_pct".to_string(),
            message: msg.to_string(),
            message_es: format!("Porcentaje inválido: {}", msg),
        })?;
        validate_percentage(early_pay).map_err(|msg| AppError::Validation {
            field: "early_pay_discount_pct".to_string(),
            message: msg.to_string(),
            message_es: format!("Porcentaje inválido: {}", msg),
        })?;
        if let Some(days) = credit_days {
            if days < 0 {
                return Err(AppError::Validation {
                    field: "credit_days".to_string(),
                    message: "Credit days cannot be negative".to_string(),
                    message_es: "Los días de crédito no pueden ser negativos".to_string(),
                });
            }
        }
        Ok(())
    }
}
