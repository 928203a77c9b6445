use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::instrument;

use gameshop_core::{EntityId, SaleId, SaleLineId, StoreError};
use gameshop_sales::{NewSale, SaleHeader, SaleLine, SaleStore};

use super::PostgresDatabase;
use super::error::{map_reference_write_error, map_sqlx_error, money_from_db, money_to_db};

const HEADER_COLUMNS: &str =
    "id, purchase_date, purchase_time, buyer_id, payment_method_id, shipping_method_id, status_id";

fn header_from_row(row: &PgRow) -> Result<SaleHeader, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode sale", e);
    Ok(SaleHeader {
        id: SaleId::new(row.try_get("id").map_err(decode)?),
        purchase_date: row.try_get("purchase_date").map_err(decode)?,
        purchase_time: row.try_get("purchase_time").map_err(decode)?,
        buyer: EntityId::new(row.try_get("buyer_id").map_err(decode)?),
        payment_method: EntityId::new(row.try_get("payment_method_id").map_err(decode)?),
        shipping_method: EntityId::new(row.try_get("shipping_method_id").map_err(decode)?),
        status: EntityId::new(row.try_get("status_id").map_err(decode)?),
        lines: Vec::new(),
    })
}

fn line_from_row(row: &PgRow) -> Result<SaleLine, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode sale line", e);
    Ok(SaleLine {
        id: SaleLineId::new(row.try_get("id").map_err(decode)?),
        sale: SaleId::new(row.try_get("sale_id").map_err(decode)?),
        product: EntityId::new(row.try_get("product_id").map_err(decode)?),
        quantity: row.try_get("quantity").map_err(decode)?,
        unit_price_at_sale: money_from_db(row.try_get("unit_price_at_sale").map_err(decode)?)?,
    })
}

#[async_trait]
impl SaleStore for PostgresDatabase {
    #[instrument(skip(self), err)]
    async fn find(&self, id: SaleId) -> Result<Option<SaleHeader>, StoreError> {
        let row = sqlx::query(&format!("SELECT {HEADER_COLUMNS} FROM sales WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_sale", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut header = header_from_row(&row)?;

        let lines = sqlx::query(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_at_sale
            FROM sale_lines
            WHERE sale_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.get())
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_sale_lines", e))?;

        for row in &lines {
            header.lines.push(line_from_row(row)?);
        }
        Ok(Some(header))
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<SaleHeader>, StoreError> {
        let headers = sqlx::query(&format!("SELECT {HEADER_COLUMNS} FROM sales ORDER BY id ASC"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_sqlx_error("list_sales", e))?;

        let lines = sqlx::query(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_at_sale
            FROM sale_lines
            ORDER BY sale_id ASC, position ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_sale_lines", e))?;

        let mut by_sale: HashMap<SaleId, Vec<SaleLine>> = HashMap::new();
        for row in &lines {
            let line = line_from_row(row)?;
            by_sale.entry(line.sale).or_default().push(line);
        }

        headers
            .iter()
            .map(|row| {
                let mut header = header_from_row(row)?;
                header.lines = by_sale.remove(&header.id).unwrap_or_default();
                Ok(header)
            })
            .collect()
    }

    /// Header and lines go in one transaction; any failure rolls back all of it.
    #[instrument(skip(self, sale), err)]
    async fn insert(&self, sale: &NewSale) -> Result<SaleHeader, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_insert_sale", e))?;

        let sale_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (
                purchase_date, purchase_time, buyer_id,
                payment_method_id, shipping_method_id, status_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(sale.date)
        .bind(sale.time)
        .bind(sale.buyer_id.get())
        .bind(sale.payment_method_id.get())
        .bind(sale.shipping_method_id.get())
        .bind(sale.status_id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_reference_write_error("insert_sale", e))?;

        let mut lines = Vec::with_capacity(sale.lines.len());
        for (position, line) in sale.lines.iter().enumerate() {
            let line_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO sale_lines (sale_id, position, product_id, quantity, unit_price_at_sale)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(sale_id)
            .bind(position as i32)
            .bind(line.product_id.get())
            .bind(line.quantity)
            .bind(money_to_db(line.unit_price)?)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_reference_write_error("insert_sale_line", e))?;

            lines.push(SaleLine {
                id: SaleLineId::new(line_id),
                sale: SaleId::new(sale_id),
                product: line.product_id,
                quantity: line.quantity,
                unit_price_at_sale: line.unit_price,
            });
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_insert_sale", e))?;

        Ok(SaleHeader {
            id: SaleId::new(sale_id),
            purchase_date: sale.date,
            purchase_time: sale.time,
            buyer: sale.buyer_id,
            payment_method: sale.payment_method_id,
            shipping_method: sale.shipping_method_id,
            status: sale.status_id,
            lines,
        })
    }

    #[instrument(skip(self, header), fields(id = %header.id), err)]
    async fn update_header(&self, header: &SaleHeader) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE sales
            SET purchase_date = $1, purchase_time = $2, buyer_id = $3,
                payment_method_id = $4, shipping_method_id = $5, status_id = $6
            WHERE id = $7
            "#,
        )
        .bind(header.purchase_date)
        .bind(header.purchase_time)
        .bind(header.buyer.get())
        .bind(header.payment_method.get())
        .bind(header.shipping_method.get())
        .bind(header.status.get())
        .bind(header.id.get())
        .execute(self.pool())
        .await
        .map_err(|e| map_reference_write_error("update_sale", e))?;
        Ok(())
    }

    /// Lines go with the header (`ON DELETE CASCADE`).
    #[instrument(skip(self), err)]
    async fn delete(&self, id: SaleId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_sale", e))?;
        Ok(result.rows_affected() > 0)
    }
}
