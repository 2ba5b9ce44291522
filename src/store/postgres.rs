//! PostgreSQL store backed by the `products` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;
use crate::domain::{Category, NewProduct, Product, ProductId, ProductPatch, Sku};
use crate::{CatalogError, Result};
use super::{CatalogStore, ProductFilter};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid, name: String, description: String, price: f64, category: String,
    image: Option<String>, stock: i64, sku: Option<String>, is_active: bool,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = CatalogError;

    fn try_from(row: ProductRow) -> Result<Self> {
        let category = row.category.parse::<Category>()
            .map_err(|_| CatalogError::Store(format!("stored category `{}` is not recognised", row.category)))?;
        Ok(Product {
            id: row.id.into(), name: row.name, description: row.description, price: row.price, category,
            image: row.image, stock: row.stock, sku: row.sku.and_then(Sku::parse), is_active: row.is_active,
            created_at: row.created_at, updated_at: row.updated_at,
        })
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            match db.code().as_deref() {
                Some("23505") => return CatalogError::Validation("sku already exists".into()),
                Some("23514") => return CatalogError::Validation(db.message().to_string()),
                _ => {}
            }
        }
        tracing::error!(error = %err, "catalog query failed");
        CatalogError::Store(err.to_string())
    }
}

const INSERT: &str = "INSERT INTO products (id, name, description, price, category, image, stock, sku, is_active) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *";

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, p: NewProduct) -> Result<Product> {
        p.validate()?;
        let row = sqlx::query_as::<_, ProductRow>(INSERT)
            .bind(ProductId::generate().as_uuid()).bind(&p.name).bind(&p.description).bind(p.price)
            .bind(p.category.as_str()).bind(&p.image).bind(p.stock).bind(p.sku.as_ref().map(Sku::as_str)).bind(p.is_active)
            .fetch_one(&mut **tx).await?;
        row.try_into()
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert(&mut tx, product).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid()).fetch_optional(&self.pool).await?
            .map(Product::try_from).transpose()
    }

    async fn find(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE ($1::text IS NULL OR category = $1) AND ($2::boolean IS NULL OR is_active = $2) \
             ORDER BY created_at DESC, id DESC")
            .bind(filter.category.map(|c| c.as_str())).bind(filter.is_active)
            .fetch_all(&self.pool).await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn update_by_id(&self, id: ProductId, patch: ProductPatch) -> Result<Option<Product>> {
        patch.validate()?;
        sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET name = COALESCE($2, name), description = COALESCE($3, description), \
             price = COALESCE($4, price), category = COALESCE($5, category), image = COALESCE($6, image), \
             stock = COALESCE($7, stock), sku = COALESCE($8, sku), is_active = $9, updated_at = clock_timestamp() \
             WHERE id = $1 RETURNING *")
            .bind(id.as_uuid()).bind(&patch.name).bind(&patch.description).bind(patch.price)
            .bind(patch.category.map(|c| c.as_str())).bind(&patch.image).bind(patch.stock)
            .bind(patch.sku.as_ref().map(Sku::as_str)).bind(patch.is_active)
            .fetch_optional(&self.pool).await?
            .map(Product::try_from).transpose()
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id.as_uuid()).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_many(&self, products: Vec<NewProduct>) -> Result<Vec<Product>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(products.len());
        for product in products {
            created.push(Self::insert(&mut tx, product).await?);
        }
        tx.commit().await?;
        Ok(created)
    }
}
