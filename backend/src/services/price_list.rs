//! Supplier price list service
//!
//! Maintains each supplier's published offer list and ingests CSV uploads.
//! Uploaded files come from many distributors, so header names are matched
//! against known aliases in Spanish and English rather than fixed positions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::PriceListItem;
use shared::validation::{validate_price, validate_product_code};

/// Price list service
#[derive(Clone)]
pub struct PriceListService {
    db: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PriceListItemRow {
    id: Uuid,
    supplier_id: Uuid,
    code: String,
    description: String,
    lab: String,
    list_price: Option<Decimal>,
    discounted_list_price: Option<Decimal>,
    available: bool,
    updated_at: DateTime<Utc>,
}

impl From<PriceListItemRow> for PriceListItem {
    fn from(row: PriceListItemRow) -> Self {
        PriceListItem {
            id: row.id,
            supplier_id: row.supplier_id,
            code: row.code,
            description: row.description,
            lab: row.lab,
            list_price: row.list_price,
            discounted_list_price: row.discounted_list_price,
            available: row.available,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating or updating a single offer
#[derive(Debug, Deserialize)]
pub struct UpsertOfferInput {
    pub code: String,
    pub description: String,
    pub lab: Option<String>,
    pub list_price: Decimal,
    pub discounted_list_price: Option<Decimal>,
    pub available: Option<bool>,
}

/// Result of a CSV bulk upload
#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    /// First few row-level problems, for operator feedback
    pub errors: Vec<String>,
}

/// Cap on reported row errors so a broken file stays readable
const MAX_REPORTED_ERRORS: usize = 10;

/// A supplier that has published a price list
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SupplierWithList {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub item_count: i64,
    pub last_updated: DateTime<Utc>,
}

/// Column indexes resolved from a CSV header row
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub code: Option<usize>,
    pub description: Option<usize>,
    pub lab: Option<usize>,
    pub list_price: Option<usize>,
    pub discounted_price: Option<usize>,
    pub available: Option<usize>,
}

impl ColumnMap {
    /// A usable file needs at least a product code and a price column
    pub fn is_usable(&self) -> bool {
        self.code.is_some() && self.list_price.is_some()
    }
}

const CODE_ALIASES: &[&str] = &["codigo", "código", "code", "clave", "sku"];
const DESCRIPTION_ALIASES: &[&str] = &[
    "descripcion",
    "descripción",
    "description",
    "producto",
    "nombre",
];
const LAB_ALIASES: &[&str] = &["laboratorio", "lab", "marca"];
const LIST_PRICE_ALIASES: &[&str] = &[
    "precio",
    "precio lista",
    "precio de lista",
    "price",
    "list price",
    "precio publico",
    "precio público",
];
const DISCOUNTED_ALIASES: &[&str] = &[
    "precio con descuento",
    "precio neto",
    "precio descuento",
    "discounted price",
    "net price",
];
const AVAILABLE_ALIASES: &[&str] = &["disponible", "available", "existencia", "stock"];

/// Resolve header names to column positions
pub(crate) fn map_headers(headers: &csv::StringRecord) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (idx, raw) in headers.iter().enumerate() {
        let name = raw.trim().to_lowercase();
        let name = name.replace('_', " ");
        if map.code.is_none() && CODE_ALIASES.contains(&name.as_str()) {
            map.code = Some(idx);
        } else if map.description.is_none() && DESCRIPTION_ALIASES.contains(&name.as_str()) {
            map.description = Some(idx);
        } else if map.lab.is_none() && LAB_ALIASES.contains(&name.as_str()) {
            map.lab = Some(idx);
        } else if map.discounted_price.is_none() && DISCOUNTED_ALIASES.contains(&name.as_str()) {
            map.discounted_price = Some(idx);
        } else if map.list_price.is_none() && LIST_PRICE_ALIASES.contains(&name.as_str()) {
            map.list_price = Some(idx);
        } else if map.available.is_none() && AVAILABLE_ALIASES.contains(&name.as_str()) {
            map.available = Some(idx);
        }
    }
    map
}

/// Parse a price cell, tolerating currency symbols and thousands separators
pub(crate) fn parse_price_cell(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok().filter(|p| *p >= Decimal::ZERO)
}

/// Parse an availability cell; anything unrecognized counts as available
pub(crate) fn parse_available_cell(raw: &str) -> bool {
    !matches!(
        raw.trim().to_lowercase().as_str(),
        "no" | "false" | "0" | "agotado" | "sin stock"
    )
}

impl PriceListService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List a supplier's published offers
    pub async fn list_offers(&self, supplier_id: Uuid) -> AppResult<Vec<PriceListItem>> {
        let rows = sqlx::query_as::<_, PriceListItemRow>(
            r#"
            SELECT id, supplier_id, code, description, lab, list_price,
                   discounted_list_price, available, updated_at
            FROM price_list_items
            WHERE supplier_id = $1
            ORDER BY code
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PriceListItem::from).collect())
    }

    /// Insert or refresh a single offer
    pub async fn upsert_offer(
        &self,
        supplier_id: Uuid,
        input: UpsertOfferInput,
    ) -> AppResult<PriceListItem> {
        validate_product_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
            message_es: format!("Código inválido: {}", msg),
        })?;
        validate_price(input.list_price).map_err(|msg| AppError::Validation {
            field: "list_price".to_string(),
            message: msg.to_string(),
            message_es: format!("Precio inválido: {}", msg),
        })?;
        if let Some(discounted) = input.discounted_list_price {
            validate_price(discounted).map_err(|msg| AppError::Validation {
                field: "discounted_list_price".to_string(),
                message: msg.to_string(),
                message_es: format!("Precio inválido: {}", msg),
            })?;
        }

        let row = sqlx::query_as::<_, PriceListItemRow>(
            r#"
            INSERT INTO price_list_items (supplier_id, code, description, lab, list_price,
                                          discounted_list_price, available)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (supplier_id, code)
            DO UPDATE SET description = EXCLUDED.description,
                          lab = EXCLUDED.lab,
                          list_price = EXCLUDED.list_price,
                          discounted_list_price = EXCLUDED.discounted_list_price,
                          available = EXCLUDED.available,
                          updated_at = NOW()
            RETURNING id, supplier_id, code, description, lab, list_price,
                      discounted_list_price, available, updated_at
            "#,
        )
        .bind(supplier_id)
        .bind(input.code.trim())
        .bind(input.description.trim())
        .bind(input.lab.as_deref().unwrap_or("").trim())
        .bind(input.list_price)
        .bind(input.discounted_list_price)
        .bind(input.available.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        Ok(PriceListItem::from(row))
    }

    /// Remove a single offer
    pub async fn delete_offer(&self, supplier_id: Uuid, item_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM price_list_items WHERE id = $1 AND supplier_id = $2")
                .bind(item_id)
                .bind(supplier_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Price list item".to_string()));
        }

        Ok(())
    }

    /// Bulk-load a supplier's price list from a CSV file
    ///
    /// The upload replaces the supplier's previous list. Rows missing a code
    /// or a parseable price are skipped and counted rather than failing the
    /// whole file.
    pub async fn upload_csv(&self, supplier_id: Uuid, data: &[u8]) -> AppResult<UploadSummary> {
        let known =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers WHERE id = $1")
                .bind(supplier_id)
                .fetch_one(&self.db)
                .await?;
        if known == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers = reader
            .headers()
            .map_err(|e| AppError::UploadError(format!("Unreadable CSV header: {}", e)))?
            .clone();
        let columns = map_headers(&headers);
        if !columns.is_usable() {
            return Err(AppError::UploadError(
                "Could not find product code and price columns".to_string(),
            ));
        }

        let mut total_rows = 0;
        let mut imported = 0;
        let mut skipped = 0;
        let mut errors: Vec<String> = Vec::new();
        let mut report = |row: usize, problem: &str, errors: &mut Vec<String>| {
            if errors.len() < MAX_REPORTED_ERRORS {
                errors.push(format!("row {}: {}", row, problem));
            }
        };

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM price_list_items WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(&mut *tx)
            .await?;

        for record in reader.records() {
            total_rows += 1;
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    skipped += 1;
                    report(total_rows, &format!("unreadable: {}", e), &mut errors);
                    continue;
                }
            };

            let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

            let code = cell(columns.code);
            if code.is_empty() {
                skipped += 1;
                report(total_rows, "missing product code", &mut errors);
                continue;
            }
            let list_price = match parse_price_cell(cell(columns.list_price)) {
                Some(p) => p,
                None => {
                    skipped += 1;
                    report(total_rows, "missing or unparseable price", &mut errors);
                    continue;
                }
            };

            let description = cell(columns.description);
            let lab = cell(columns.lab);
            let discounted = columns
                .discounted_price
                .and_then(|i| record.get(i))
                .and_then(parse_price_cell);
            let available = columns
                .available
                .and_then(|i| record.get(i))
                .map(parse_available_cell)
                .unwrap_or(true);

            sqlx::query(
                r#"
                INSERT INTO price_list_items (supplier_id, code, description, lab, list_price,
                                              discounted_list_price, available)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (supplier_id, code)
                DO UPDATE SET description = EXCLUDED.description,
                              lab = EXCLUDED.lab,
                              list_price = EXCLUDED.list_price,
                              discounted_list_price = EXCLUDED.discounted_list_price,
                              available = EXCLUDED.available,
                              updated_at = NOW()
                "#,
            )
            .bind(supplier_id)
            .bind(code)
            .bind(description)
            .bind(lab)
            .bind(list_price)
            .bind(discounted)
            .bind(available)
            .execute(&mut *tx)
            .await?;

            imported += 1;
        }

        tx.commit().await?;

        tracing::info!(
            "Price list upload for supplier {}: {} imported, {} skipped",
            supplier_id,
            imported,
            skipped
        );

        Ok(UploadSummary {
            total_rows,
            imported,
            skipped,
            errors,
        })
    }

    /// Suppliers that currently have a published price list
    pub async fn suppliers_with_lists(&self) -> AppResult<Vec<SupplierWithList>> {
        let rows = sqlx::query_as::<_, SupplierWithList>(
            r#"
            SELECT s.id as supplier_id, s.name as supplier_name,
                   COUNT(p.id) as item_count, MAX(p.updated_at) as last_updated
            FROM suppliers s
            JOIN price_list_items p ON p.supplier_id = s.id
            WHERE s.active = TRUE
            GROUP BY s.id, s.name
            ORDER BY s.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_match_spanish_aliases() {
        let headers =
            csv::StringRecord::from(vec!["Código", "Descripción", "Laboratorio", "Precio"]);
        let map = map_headers(&headers);
        assert_eq!(map.code, Some(0));
        assert_eq!(map.description, Some(1));
        assert_eq!(map.lab, Some(2));
        assert_eq!(map.list_price, Some(3));
        assert!(map.is_usable());
    }

    #[test]
    fn headers_match_english_aliases() {
        let headers = csv::StringRecord::from(vec!["code", "description", "list_price"]);
        let map = map_headers(&headers);
        assert_eq!(map.code, Some(0));
        assert_eq!(map.list_price, Some(2));
    }

    #[test]
    fn discounted_column_does_not_shadow_list_price() {
        let headers =
            csv::StringRecord::from(vec!["codigo", "precio", "precio con descuento"]);
        let map = map_headers(&headers);
        assert_eq!(map.list_price, Some(1));
        assert_eq!(map.discounted_price, Some(2));
    }

    #[test]
    fn unusable_without_code_or_price() {
        let headers = csv::StringRecord::from(vec!["descripcion", "laboratorio"]);
        assert!(!map_headers(&headers).is_usable());
    }

    #[test]
    fn price_cells_tolerate_formatting() {
        assert_eq!(parse_price_cell("$1,234.50"), Some("1234.50".parse().unwrap()));
        assert_eq!(parse_price_cell(" 99 "), Some("99".parse().unwrap()));
        assert_eq!(parse_price_cell(""), None);
        assert_eq!(parse_price_cell("n/a"), None);
        assert_eq!(parse_price_cell("-5"), None);
    }

    #[test]
    fn availability_defaults_to_true() {
        assert!(parse_available_cell("sí"));
        assert!(parse_available_cell("yes"));
        assert!(parse_available_cell(""));
        assert!(!parse_available_cell("No"));
        assert!(!parse_available_cell("0"));
        assert!(!parse_available_cell("agotado"));
    }
}
