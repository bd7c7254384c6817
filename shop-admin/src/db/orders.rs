use chrono::{DateTime, Utc};
use shared::models::{LineItem, Order};
use sqlx::PgPool;
use sqlx::types::Json;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    line_items: Json<Vec<LineItem>>,
    email: Option<String>,
    paid: bool,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            line_items: row.line_items.0,
            email: row.email,
            paid: row.paid,
            created_at: row.created_at,
        }
    }
}

/// Orders created at or after `since`, newest first
pub async fn list_orders_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<Order>, sqlx::Error> {
    let rows: Vec<OrderRow> = sqlx::query_as(
        "SELECT id, line_items, email, paid, created_at FROM orders
         WHERE created_at >= $1 ORDER BY created_at DESC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
}
