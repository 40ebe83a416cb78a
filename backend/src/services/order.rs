//! Purchase order service
//!
//! Orders are created from a replenishment cart and grouped so each supplier
//! gets its own order. Receiving an order writes purchase history rows that
//! back the last-purchase-price lookup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{OrderStatus, PurchaseHistoryEntry, PurchaseOrder, PurchaseOrderItem};

/// Purchase order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    pharmacy_id: Uuid,
    supplier_id: Uuid,
    total: Decimal,
    status: String,
    order_date: DateTime<Utc>,
    received_date: Option<DateTime<Utc>>,
    delivery_photo_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderItemRow {
    code: String,
    description: String,
    quantity: i64,
    unit_price: Decimal,
}

impl From<OrderItemRow> for PurchaseOrderItem {
    fn from(row: OrderItemRow) -> Self {
        PurchaseOrderItem {
            code: row.code,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    order_id: Uuid,
    pharmacy_id: Uuid,
    supplier_id: Uuid,
    code: String,
    description: String,
    quantity: i64,
    unit_price: Decimal,
    purchased_at: DateTime<Utc>,
}

impl From<HistoryRow> for PurchaseHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        PurchaseHistoryEntry {
            id: row.id,
            order_id: row.order_id,
            pharmacy_id: row.pharmacy_id,
            supplier_id: row.supplier_id,
            code: row.code,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            purchased_at: row.purchased_at,
        }
    }
}

/// One cart line destined for a supplier
#[derive(Debug, Deserialize)]
pub struct CartLineInput {
    pub supplier_id: Uuid,
    pub code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Input for creating orders from a cart
#[derive(Debug, Deserialize)]
pub struct CreateOrdersInput {
    pub pharmacy_id: Uuid,
    pub items: Vec<CartLineInput>,
}

/// Input for replacing a pending order's lines
#[derive(Debug, Deserialize)]
pub struct UpdateOrderItemsInput {
    pub items: Vec<OrderLineInput>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Input for a status change
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: OrderStatus,
}

/// Input for marking an order received
#[derive(Debug, Deserialize)]
pub struct ReceiveOrderInput {
    pub delivery_photo_url: Option<String>,
}

/// Filters for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub pharmacy_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    matches!(
        (from, to),
        (OrderStatus::Pending, OrderStatus::InTransit)
            | (OrderStatus::Pending, OrderStatus::Cancelled)
            | (OrderStatus::Pending, OrderStatus::Received)
            | (OrderStatus::InTransit, OrderStatus::Received)
            | (OrderStatus::InTransit, OrderStatus::Cancelled)
    )
}

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create purchase orders from a cart, one order per supplier
    pub async fn create_from_cart(&self, input: CreateOrdersInput) -> AppResult<Vec<PurchaseOrder>> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Cart is empty".to_string(),
                message_es: "El carrito está vacío".to_string(),
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
            if line.unit_price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "unit_price".to_string(),
                    message: "Unit price cannot be negative".to_string(),
                    message_es: "El precio unitario no puede ser negativo".to_string(),
                });
            }
        }

        let pharmacy_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pharmacies WHERE id = $1")
                .bind(input.pharmacy_id)
                .fetch_one(&self.db)
                .await?;
        if pharmacy_exists == 0 {
            return Err(AppError::NotFound("Pharmacy".to_string()));
        }

        // Group cart lines per supplier, preserving cart order
        let mut supplier_order: Vec<Uuid> = Vec::new();
        let mut grouped: std::collections::HashMap<Uuid, Vec<&CartLineInput>> =
            std::collections::HashMap::new();
        for line in &input.items {
            if !grouped.contains_key(&line.supplier_id) {
                supplier_order.push(line.supplier_id);
            }
            grouped.entry(line.supplier_id).or_default().push(line);
        }

        let mut tx = self.db.begin().await?;
        let mut order_ids: Vec<Uuid> = Vec::with_capacity(supplier_order.len());

        for supplier_id in supplier_order {
            let known = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM suppliers WHERE id = $1 AND active = TRUE",
            )
            .bind(supplier_id)
            .fetch_one(&mut *tx)
            .await?;
            if known == 0 {
                return Err(AppError::NotFound("Supplier".to_string()));
            }

            let lines = &grouped[&supplier_id];
            let total: Decimal = lines
                .iter()
                .map(|l| l.unit_price * Decimal::from(l.quantity))
                .sum();

            let order_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO purchase_orders (pharmacy_id, supplier_id, total, status)
                VALUES ($1, $2, $3, 'pending')
                RETURNING id
                "#,
            )
            .bind(input.pharmacy_id)
            .bind(supplier_id)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;

            for line in lines {
                sqlx::query(
                    r#"
                    INSERT INTO purchase_order_items (order_id, code, description, quantity, unit_price)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(order_id)
                .bind(line.code.trim())
                .bind(line.description.trim())
                .bind(line.quantity)
                .bind(line.unit_price)
                .execute(&mut *tx)
                .await?;
            }

            order_ids.push(order_id);
        }

        tx.commit().await?;

        let mut orders = Vec::with_capacity(order_ids.len());
        for id in order_ids {
            orders.push(self.get_order(id).await?);
        }

        tracing::info!(
            "Created {} purchase order(s) for pharmacy {}",
            orders.len(),
            input.pharmacy_id
        );
        Ok(orders)
    }

    /// List orders, newest first
    pub async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<PurchaseOrder>> {
        let mut sql = String::from(
            r#"
            SELECT id, pharmacy_id, supplier_id, total, status, order_date,
                   received_date, delivery_photo_url
            FROM purchase_orders
            WHERE 1 = 1
            "#,
        );
        let mut idx = 0;
        if filter.pharmacy_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND pharmacy_id = ${}", idx));
        }
        if filter.supplier_id.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND supplier_id = ${}", idx));
        }
        if filter.status.is_some() {
            idx += 1;
            sql.push_str(&format!(" AND status = ${}", idx));
        }
        sql.push_str(" ORDER BY order_date DESC");

        let mut query = sqlx::query_as::<_, OrderRow>(&sql);
        if let Some(id) = filter.pharmacy_id {
            query = query.bind(id);
        }
        if let Some(id) = filter.supplier_id {
            query = query.bind(id);
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }

        let rows = query.fetch_all(&self.db).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(row.id).await?;
            orders.push(Self::assemble(row, items));
        }
        Ok(orders)
    }

    /// Get an order with its lines
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<PurchaseOrder> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, pharmacy_id, supplier_id, total, status, order_date,
                   received_date, delivery_photo_url
            FROM purchase_orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let items = self.load_items(order_id).await?;
        Ok(Self::assemble(row, items))
    }

    /// Move an order through its lifecycle
    pub async fn update_status(
        &self,
        order_id: Uuid,
        input: UpdateStatusInput,
    ) -> AppResult<PurchaseOrder> {
        if input.status == OrderStatus::Received {
            // Receiving has its own path so history gets recorded
            return self
                .mark_received(order_id, ReceiveOrderInput { delivery_photo_url: None })
                .await;
        }

        let order = self.get_order(order_id).await?;
        if !transition_allowed(order.status, input.status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move order from {} to {}",
                order.status.as_str(),
                input.status.as_str()
            )));
        }

        sqlx::query("UPDATE purchase_orders SET status = $1 WHERE id = $2")
            .bind(input.status.as_str())
            .bind(order_id)
            .execute(&self.db)
            .await?;

        self.get_order(order_id).await
    }

    /// Mark an order received and record its lines as purchase history
    pub async fn mark_received(
        &self,
        order_id: Uuid,
        input: ReceiveOrderInput,
    ) -> AppResult<PurchaseOrder> {
        let order = self.get_order(order_id).await?;
        if !transition_allowed(order.status, OrderStatus::Received) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot receive an order that is {}",
                order.status.as_str()
            )));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE purchase_orders
            SET status = 'received', received_date = NOW(), delivery_photo_url = $1
            WHERE id = $2
            "#,
        )
        .bind(&input.delivery_photo_url)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO purchase_history (order_id, pharmacy_id, supplier_id, code,
                                              description, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(order_id)
            .bind(order.pharmacy_id)
            .bind(order.supplier_id)
            .bind(&item.code)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Order {} received", order_id);
        self.get_order(order_id).await
    }

    /// Replace an order's lines; only allowed while pending
    pub async fn update_items(
        &self,
        order_id: Uuid,
        input: UpdateOrderItemsInput,
    ) -> AppResult<PurchaseOrder> {
        let order = self.get_order(order_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidStateTransition(format!(
                "Items can only be edited while pending, order is {}",
                order.status.as_str()
            )));
        }
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "An order needs at least one line".to_string(),
                message_es: "Un pedido necesita al menos una línea".to_string(),
            });
        }
        for line in &input.items {
            if line.quantity <= 0 || line.unit_price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "items".to_string(),
                    message: "Lines need a positive quantity and non-negative price".to_string(),
                    message_es: "Las líneas requieren cantidad positiva y precio no negativo"
                        .to_string(),
                });
            }
        }

        let total: Decimal = input
            .items
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM purchase_order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for line in &input.items {
            sqlx::query(
                r#"
                INSERT INTO purchase_order_items (order_id, code, description, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(line.code.trim())
            .bind(line.description.trim())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE purchase_orders SET total = $1 WHERE id = $2")
            .bind(total)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Purchase history for a product code, newest first
    pub async fn purchase_history(&self, code: &str) -> AppResult<Vec<PurchaseHistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, order_id, pharmacy_id, supplier_id, code, description,
                   quantity, unit_price, purchased_at
            FROM purchase_history
            WHERE code = $1
            ORDER BY purchased_at DESC
            "#,
        )
        .bind(code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PurchaseHistoryEntry::from).collect())
    }

    /// Most recent price paid for a product code, if any
    pub async fn last_purchase_price(&self, code: &str) -> AppResult<Option<PurchaseHistoryEntry>> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, order_id, pharmacy_id, supplier_id, code, description,
                   quantity, unit_price, purchased_at
            FROM purchase_history
            WHERE code = $1
            ORDER BY purchased_at DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(PurchaseHistoryEntry::from))
    }

    async fn load_items(&self, order_id: Uuid) -> AppResult<Vec<PurchaseOrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT code, description, quantity, unit_price
            FROM purchase_order_items
            WHERE order_id = $1
            ORDER BY code
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PurchaseOrderItem::from).collect())
    }

    fn assemble(row: OrderRow, items: Vec<PurchaseOrderItem>) -> PurchaseOrder {
        PurchaseOrder {
            id: row.id,
            pharmacy_id: row.pharmacy_id,
            supplier_id: row.supplier_id,
            total: row.total,
            status: OrderStatus::parse(&row.status).unwrap_or(OrderStatus::Pending),
            order_date: row.order_date,
            received_date: row.received_date,
            delivery_photo_url: row.delivery_photo_url,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_orders_can_move_forward_or_cancel() {
        assert!(transition_allowed(OrderStatus::Pending, OrderStatus::InTransit));
        assert!(transition_allowed(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(transition_allowed(OrderStatus::Pending, OrderStatus::Received));
        assert!(transition_allowed(OrderStatus::InTransit, OrderStatus::Received));
    }

    #[test]
    fn terminal_states_are_final() {
        assert!(!transition_allowed(OrderStatus::Received, OrderStatus::Pending));
        assert!(!transition_allowed(OrderStatus::Received, OrderStatus::Cancelled));
        assert!(!transition_allowed(OrderStatus::Cancelled, OrderStatus::InTransit));
        assert!(!transition_allowed(OrderStatus::Cancelled, OrderStatus::Received));
    }
}
