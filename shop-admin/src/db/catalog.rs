//! Categories and products

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{Category, CategorySnapshot, Product, Property};
use sqlx::PgPool;
use sqlx::types::Json;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    parent_id: Option<String>,
    properties: Json<Vec<Property>>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            properties: row.properties.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    title: String,
    description: String,
    price: Decimal,
    images: Json<Vec<String>>,
    category: Option<Json<CategorySnapshot>>,
    properties: Json<BTreeMap<String, String>>,
    stripe_price_id: Option<String>,
    hidden: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            images: row.images.0,
            category: row.category.map(|c| c.0),
            properties: row.properties.0,
            stripe_price_id: row.stripe_price_id,
            hidden: row.hidden,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, title, description, price, images, category, properties, stripe_price_id, hidden";

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows: Vec<CategoryRow> =
        sqlx::query_as("SELECT id, name, parent_id, properties FROM categories ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(Category::from).collect())
}

/// All products, by id
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn get_product(pool: &PgPool, id: &str) -> Result<Option<Product>, sqlx::Error> {
    let row: Option<ProductRow> =
        sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Product::from))
}

pub async fn set_stripe_price_id(
    pool: &PgPool,
    product_id: &str,
    price_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET stripe_price_id = $1 WHERE id = $2")
        .bind(price_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(())
}
