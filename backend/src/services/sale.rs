//! Point-of-sale service
//!
//! A sale atomically decrements branch stock for each line; the unit price
//! charged is the item's net price, falling back to its list price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{PaymentMethod, Sale, SaleItem, SalesSummary};
use shared::types::DateRange;

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    client_id: Option<Uuid>,
    pharmacy_id: Uuid,
    total: Decimal,
    payment_method: String,
    sold_at: DateTime<Utc>,
    client_name: Option<String>,
    pharmacy_name: Option<String>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            client_id: row.client_id,
            pharmacy_id: row.pharmacy_id,
            total: row.total,
            // Stored values come from PaymentMethod::as_str; cash is the
            // conservative default for anything else
            payment_method: PaymentMethod::parse(&row.payment_method)
                .unwrap_or(PaymentMethod::Cash),
            sold_at: row.sold_at,
            client_name: row.client_name,
            pharmacy_name: row.pharmacy_name,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    inventory_item_id: Uuid,
    quantity: i64,
    unit_price: Decimal,
    product_description: Option<String>,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            inventory_item_id: row.inventory_item_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            product_description: row.product_description,
        }
    }
}

/// One line of a sale request
#[derive(Debug, Deserialize)]
pub struct SaleLineInput {
    pub inventory_item_id: Uuid,
    pub quantity: i64,
}

/// Input for recording a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub pharmacy_id: Uuid,
    pub client_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub items: Vec<SaleLineInput>,
}

/// A sale with its lines
#[derive(Debug, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Filters for listing sales
#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub pharmacy_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

const SELECT_SALE: &str = r#"
    SELECT s.id, s.client_id, s.pharmacy_id, s.total, s.payment_method, s.sold_at,
           c.name as client_name, p.name as pharmacy_name
    FROM sales s
    LEFT JOIN clients c ON c.id = s.client_id
    JOIN pharmacies p ON p.id = s.pharmacy_id
"#;

impl SaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale, decrementing stock for each line
    pub async fn create_sale(&self, input: CreateSaleInput) -> AppResult<SaleDetail> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A sale needs at least one line".to_string(),
                message_es: "Una venta necesita al menos una línea".to_string(),
            });
        }
        for line in &input.items {
            if line.quantity <= 0 {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be positive".to_string(),
                    message_es: "La cantidad debe ser positiva".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        let mut total = Decimal::ZERO;
        let mut priced_lines: Vec<(Uuid, i64, Decimal, String)> =
            Vec::with_capacity(input.items.len());

        for line in &input.items {
            // Lock the stock row for the duration of the transaction
            let item = sqlx::query_as::<_, (String, i64, Option<Decimal>, Option<Decimal>)>(
                r#"
                SELECT description, on_hand, net_price, list_price
                FROM inventory_items
                WHERE id = $1 AND pharmacy_id = $2
                FOR UPDATE
                "#,
            )
            .bind(line.inventory_item_id)
            .bind(input.pharmacy_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

            let (description, on_hand, net_price, list_price) = item;
            if on_hand < line.quantity {
                return Err(AppError::InsufficientInventory(format!(
                    "{}: {} on hand, {} requested",
                    description, on_hand, line.quantity
                )));
            }

            let unit_price = net_price.or(list_price).unwrap_or(Decimal::ZERO);
            total += unit_price * Decimal::from(line.quantity);
            priced_lines.push((line.inventory_item_id, line.quantity, unit_price, description));

            sqlx::query("UPDATE inventory_items SET on_hand = on_hand - $1 WHERE id = $2")
                .bind(line.quantity)
                .bind(line.inventory_item_id)
                .execute(&mut *tx)
                .await?;
        }

        let sale_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales (client_id, pharmacy_id, total, payment_method)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.client_id)
        .bind(input.pharmacy_id)
        .bind(total)
        .bind(input.payment_method.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for (item_id, quantity, unit_price, _) in &priced_lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, inventory_item_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(sale_id)
            .bind(item_id)
            .bind(quantity)
            .bind(unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Recorded sale {} for {}", sale_id, total);
        self.get_sale(sale_id).await
    }

    /// List sales, newest first
    pub async fn list_sales(&self, filter: SaleFilter) -> AppResult<Vec<Sale>> {
        let rows = match (filter.pharmacy_id, filter.client_id) {
            (Some(pharmacy_id), Some(client_id)) => {
                sqlx::query_as::<_, SaleRow>(&format!(
                    "{} WHERE s.pharmacy_id = $1 AND s.client_id = $2 ORDER BY s.sold_at DESC",
                    SELECT_SALE
                ))
                .bind(pharmacy_id)
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
            (Some(pharmacy_id), None) => {
                sqlx::query_as::<_, SaleRow>(&format!(
                    "{} WHERE s.pharmacy_id = $1 ORDER BY s.sold_at DESC",
                    SELECT_SALE
                ))
                .bind(pharmacy_id)
                .fetch_all(&self.db)
                .await?
            }
            (None, Some(client_id)) => {
                sqlx::query_as::<_, SaleRow>(&format!(
                    "{} WHERE s.client_id = $1 ORDER BY s.sold_at DESC",
                    SELECT_SALE
                ))
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
            (None, None) => {
                sqlx::query_as::<_, SaleRow>(&format!(
                    "{} ORDER BY s.sold_at DESC",
                    SELECT_SALE
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    /// Get a sale with its lines
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleDetail> {
        let row = sqlx::query_as::<_, SaleRow>(&format!("{} WHERE s.id = $1", SELECT_SALE))
            .bind(sale_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.id, si.sale_id, si.inventory_item_id, si.quantity, si.unit_price,
                   i.description as product_description
            FROM sale_items si
            LEFT JOIN inventory_items i ON i.id = si.inventory_item_id
            WHERE si.sale_id = $1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleDetail {
            sale: Sale::from(row),
            items: items.into_iter().map(SaleItem::from).collect(),
        })
    }

    /// Revenue and units sold, optionally constrained to a branch and range
    pub async fn sales_summary(
        &self,
        pharmacy_id: Option<Uuid>,
        range: Option<DateRange>,
    ) -> AppResult<SalesSummary> {
        // Summing over a join would count each sale's total once per line,
        // so revenue and units come from separate subqueries
        let mut filters = String::new();
        if pharmacy_id.is_some() {
            filters.push_str(" AND s.pharmacy_id = $1");
        }
        if range.is_some() {
            let (from_idx, to_idx) = if pharmacy_id.is_some() { (2, 3) } else { (1, 2) };
            filters.push_str(&format!(
                " AND s.sold_at >= ${} AND s.sold_at < ${}",
                from_idx, to_idx
            ));
        }
        let sql = format!(
            r#"
            SELECT
                COALESCE((SELECT SUM(s.total) FROM sales s WHERE 1 = 1{filters}), 0),
                COALESCE((
                    SELECT SUM(si.quantity)
                    FROM sale_items si
                    JOIN sales s ON s.id = si.sale_id
                    WHERE 1 = 1{filters}
                ), 0)
            "#
        );

        let mut query = sqlx::query_as::<_, (Decimal, i64)>(&sql);
        if let Some(id) = pharmacy_id {
            query = query.bind(id);
        }
        if let Some(range) = &range {
            // The end date is inclusive, so the cutoff is the next midnight
            let cutoff = range.end.succ_opt().unwrap_or(range.end);
            query = query.bind(range.start).bind(cutoff);
        }

        let (total_revenue, total_items_sold) = query.fetch_one(&self.db).await?;

        Ok(SalesSummary {
            total_revenue,
            total_items_sold,
        })
    }
}
