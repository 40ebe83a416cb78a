//! Inventory management service for per-branch stock

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::InventoryItem;
use shared::shortage::InventoryLevel;
use shared::validation::{validate_percentage, validate_price, validate_product_code};

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct InventoryItemRow {
    id: Uuid,
    pharmacy_id: Uuid,
    code: String,
    description: String,
    lab: Option<String>,
    national: Option<bool>,
    department: Option<String>,
    expiry_date: Option<NaiveDate>,
    list_price: Option<Decimal>,
    discount_pct: Option<Decimal>,
    net_price: Option<Decimal>,
    on_hand: i64,
    total_units: Option<i64>,
    created_at: DateTime<Utc>,
    pharmacy_name: Option<String>,
}

impl From<InventoryItemRow> for InventoryItem {
    fn from(row: InventoryItemRow) -> Self {
        InventoryItem {
            id: row.id,
            pharmacy_id: row.pharmacy_id,
            code: row.code,
            description: row.description,
            lab: row.lab,
            national: row.national,
            department: row.department,
            expiry_date: row.expiry_date,
            list_price: row.list_price,
            discount_pct: row.discount_pct,
            net_price: row.net_price,
            on_hand: row.on_hand,
            total_units: row.total_units,
            created_at: row.created_at,
            pharmacy_name: row.pharmacy_name,
        }
    }
}

/// Input for creating an inventory item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub pharmacy_id: Uuid,
    pub code: String,
    pub description: String,
    pub lab: Option<String>,
    pub national: Option<bool>,
    pub department: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub list_price: Option<Decimal>,
    pub discount_pct: Option<Decimal>,
    pub on_hand: Option<i64>,
    pub total_units: Option<i64>,
}

/// Input for updating an inventory item
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    pub description: Option<String>,
    pub lab: Option<String>,
    pub national: Option<bool>,
    pub department: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub list_price: Option<Decimal>,
    pub discount_pct: Option<Decimal>,
    pub on_hand: Option<i64>,
    pub total_units: Option<i64>,
}

/// Net price after the item's own discount
pub(crate) fn compute_net_price(
    list_price: Option<Decimal>,
    discount_pct: Option<Decimal>,
) -> Option<Decimal> {
    let list = list_price?;
    match discount_pct {
        Some(pct) => Some(list - list * pct / Decimal::from(100)),
        None => Some(list),
    }
}

const SELECT_ITEM: &str = r#"
    SELECT i.id, i.pharmacy_id, i.code, i.description, i.lab, i.national, i.department,
           i.expiry_date, i.list_price, i.discount_pct, i.net_price, i.on_hand,
           i.total_units, i.created_at, p.name as pharmacy_name
    FROM inventory_items i
    JOIN pharmacies p ON p.id = i.pharmacy_id
"#;

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List inventory, optionally scoped to a branch
    pub async fn list_items(&self, pharmacy_id: Option<Uuid>) -> AppResult<Vec<InventoryItem>> {
        let rows = match pharmacy_id {
            Some(id) => {
                sqlx::query_as::<_, InventoryItemRow>(&format!(
                    "{} WHERE i.pharmacy_id = $1 ORDER BY i.code",
                    SELECT_ITEM
                ))
                .bind(id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryItemRow>(&format!(
                    "{} ORDER BY i.code, p.name",
                    SELECT_ITEM
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Get an inventory item by ID
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, InventoryItemRow>(&format!(
            "{} WHERE i.id = $1",
            SELECT_ITEM
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        Ok(InventoryItem::from(row))
    }

    /// Search inventory by code, description, or lab across the chain
    pub async fn search_items(
        &self,
        query: &str,
        pharmacy_id: Option<Uuid>,
    ) -> AppResult<Vec<InventoryItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", query);

        let rows = match pharmacy_id {
            Some(id) => {
                sqlx::query_as::<_, InventoryItemRow>(&format!(
                    r#"{} WHERE i.pharmacy_id = $1
                       AND (i.code ILIKE $2 OR i.description ILIKE $2 OR i.lab ILIKE $2)
                       ORDER BY i.code"#,
                    SELECT_ITEM
                ))
                .bind(id)
                .bind(&pattern)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryItemRow>(&format!(
                    r#"{} WHERE i.code ILIKE $1 OR i.description ILIKE $1 OR i.lab ILIKE $1
                       ORDER BY i.code, p.name"#,
                    SELECT_ITEM
                ))
                .bind(&pattern)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Create a new inventory item
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<InventoryItem> {
        validate_product_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
            message_es: format!("Código inválido: {}", msg),
        })?;
        Self::validate_pricing(input.list_price, input.discount_pct)?;

        let pharmacy_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pharmacies WHERE id = $1")
                .bind(input.pharmacy_id)
                .fetch_one(&self.db)
                .await?;
        if pharmacy_exists == 0 {
            return Err(AppError::NotFound("Pharmacy".to_string()));
        }

        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory_items WHERE pharmacy_id = $1 AND code = $2",
        )
        .bind(input.pharmacy_id)
        .bind(input.code.trim())
        .fetch_one(&self.db)
        .await?;
        if duplicate > 0 {
            return Err(AppError::DuplicateEntry("product code".to_string()));
        }

        let net_price = compute_net_price(input.list_price, input.discount_pct);

        let item_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory_items (pharmacy_id, code, description, lab, national,
                                         department, expiry_date, list_price, discount_pct,
                                         net_price, on_hand, total_units)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(input.pharmacy_id)
        .bind(input.code.trim())
        .bind(input.description.trim())
        .bind(&input.lab)
        .bind(input.national)
        .bind(&input.department)
        .bind(input.expiry_date)
        .bind(input.list_price)
        .bind(input.discount_pct)
        .bind(net_price)
        .bind(input.on_hand.unwrap_or(0))
        .bind(input.total_units)
        .fetch_one(&self.db)
        .await?;

        self.get_item(item_id).await
    }

    /// Update an inventory item, recomputing the net price when pricing
    /// fields change
    pub async fn update_item(
        &self,
        item_id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<InventoryItem> {
        let existing = self.get_item(item_id).await?;

        let description = input.description.unwrap_or(existing.description);
        let lab = input.lab.or(existing.lab);
        let national = input.national.or(existing.national);
        let department = input.department.or(existing.department);
        let expiry_date = input.expiry_date.or(existing.expiry_date);
        let list_price = input.list_price.or(existing.list_price);
        let discount_pct = input.discount_pct.or(existing.discount_pct);
        let on_hand = input.on_hand.unwrap_or(existing.on_hand);
        let total_units = input.total_units.or(existing.total_units);

        Self::validate_pricing(list_price, discount_pct)?;
        if on_hand < 0 {
            return Err(AppError::Validation {
                field: "on_hand".to_string(),
                message: "Stock cannot be negative".to_string(),
                message_es: "El stock no puede ser negativo".to_string(),
            });
        }

        let net_price = compute_net_price(list_price, discount_pct);

        sqlx::query(
            r#"
            UPDATE inventory_items
            SET description = $1, lab = $2, national = $3, department = $4, expiry_date = $5,
                list_price = $6, discount_pct = $7, net_price = $8, on_hand = $9, total_units = $10
            WHERE id = $11
            "#,
        )
        .bind(&description)
        .bind(&lab)
        .bind(national)
        .bind(&department)
        .bind(expiry_date)
        .bind(list_price)
        .bind(discount_pct)
        .bind(net_price)
        .bind(on_hand)
        .bind(total_units)
        .bind(item_id)
        .execute(&self.db)
        .await?;

        self.get_item(item_id).await
    }

    /// Delete an inventory item
    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }

        Ok(())
    }

    /// Full stock snapshot used by the shortage and overstock reports
    pub async fn levels_snapshot(&self) -> AppResult<Vec<InventoryLevel>> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>, i64, Option<Decimal>, Option<Decimal>, Uuid, String)>(
            r#"
            SELECT i.code, i.description, i.lab, i.on_hand, i.net_price, i.list_price,
                   i.pharmacy_id, p.name
            FROM inventory_items i
            JOIN pharmacies p ON p.id = i.pharmacy_id
            ORDER BY i.code, p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(code, description, lab, on_hand, net_price, list_price, pharmacy_id, pharmacy_name)| {
                    InventoryLevel {
                        code,
                        description,
                        lab,
                        on_hand,
                        net_price,
                        list_price,
                        pharmacy_id,
                        pharmacy_name,
                    }
                },
            )
            .collect())
    }

    fn validate_pricing(
        list_price: Option<Decimal>,
        discount_pct: Option<Decimal>,
    ) -> AppResult<()> {
        if let Some(price) = list_price {
            validate_price(price).map_err(|msg| AppError::Validation {
                field: "list_price".to_string(),
                message: msg.to_string(),
                message_es: format!("Precio inválido: {}", msg),
            })?;
        }
        if let Some(pct) = discount_pct {
            validate_percentage(pct).map_err(|msg| AppError::Validation {
                field: "discount_pct".to_string(),
                message: msg.to_string(),
                message_es: format!("Porcentaje inválido: {}", msg),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn net_price_applies_item_discount() {
        assert_eq!(
            compute_net_price(Some(dec("100")), Some(dec("25"))),
            Some(dec("75"))
        );
    }

    #[test]
    fn net_price_without_discount_is_list_price() {
        assert_eq!(compute_net_price(Some(dec("80")), None), Some(dec("80")));
    }

    #[test]
    fn net_price_requires_list_price() {
        assert_eq!(compute_net_price(None, Some(dec("10"))), None);
    }
}
