//! Postgres-backed store implementation.
//!
//! The relational store is an external collaborator: this module only
//! splices the condition sequence onto a base `SELECT` and binds each
//! condition's value, it never invents predicates of its own. Schema
//! management (migrations) is outside this repository.
//!
//! Column naming follows the store convention the naming normalizer targets:
//! camelCase, quoted. Products reference categories through the
//! `productCategory` join table.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::debug;

use storefront_catalog::{Category, NewCategory, NewProduct, Product};
use storefront_core::{CategoryId, Entity, ProductId, UserId};
use storefront_query::{Condition, Scalar};

use crate::repository::{
    CategoryRepository, ProductRepository, RepositoryError, RepositoryResult,
};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach each product's category set, resolved in one query.
    async fn load_categories(
        &self,
        product_ids: &[i64],
    ) -> RepositoryResult<HashMap<i64, Vec<Category>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT pc."productId", c."id", c."name", c."createdAt"
            FROM "productCategory" pc
            JOIN "category" c ON c."id" = pc."categoryId"
            WHERE pc."productId" = ANY($1)
            ORDER BY pc."productId", c."id"
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut by_product: HashMap<i64, Vec<Category>> = HashMap::new();
        for row in rows {
            let product_id: i64 = row.try_get("productId").map_err(storage)?;
            by_product
                .entry(product_id)
                .or_default()
                .push(category_from_row(&row)?);
        }
        Ok(by_product)
    }
}

fn storage(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

/// Double any embedded quote so a column name can be spliced as a quoted
/// identifier.
fn quote_ident(ident: &str) -> String {
    ident.replace('"', "\"\"")
}

fn bind_scalar<'qb>(builder: &mut QueryBuilder<'qb, Postgres>, value: &Scalar) {
    match value {
        Scalar::Bool(b) => builder.push_bind(*b),
        Scalar::Int(i) => builder.push_bind(*i),
        Scalar::Float(f) => builder.push_bind(*f),
        Scalar::Text(s) => builder.push_bind(s.clone()),
        Scalar::Uuid(u) => builder.push_bind(*u),
    };
}

fn category_from_row(row: &sqlx::postgres::PgRow) -> RepositoryResult<Category> {
    let id: i64 = row.try_get("id").map_err(storage)?;
    let name: String = row.try_get("name").map_err(storage)?;
    let created_at: DateTime<Utc> = row.try_get("createdAt").map_err(storage)?;
    Ok(Category::new(CategoryId::new(id), name, created_at))
}

fn product_from_row(
    row: &sqlx::postgres::PgRow,
    categories: Vec<Category>,
) -> RepositoryResult<Product> {
    let id: i64 = row.try_get("id").map_err(storage)?;
    let owner: uuid::Uuid = row.try_get("ownerId").map_err(storage)?;
    let name: String = row.try_get("name").map_err(storage)?;
    let price_subunit: i64 = row.try_get("priceSubunit").map_err(storage)?;
    let created_at: DateTime<Utc> = row.try_get("createdAt").map_err(storage)?;

    Ok(Product::new(
        ProductId::new(id),
        UserId::from_uuid(owner),
        name,
        price_subunit,
        categories,
        created_at,
    ))
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn insert(
        &self,
        owner: UserId,
        input: NewProduct,
        categories: Vec<Category>,
    ) -> RepositoryResult<Product> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row = sqlx::query(
            r#"
            INSERT INTO "product" ("ownerId", "name", "priceSubunit")
            VALUES ($1, $2, $3)
            RETURNING "id", "createdAt"
            "#,
        )
        .bind(owner.as_uuid())
        .bind(&input.name)
        .bind(input.price_subunit)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;

        let id: i64 = row.try_get("id").map_err(storage)?;
        let created_at: DateTime<Utc> = row.try_get("createdAt").map_err(storage)?;

        let product = Product::new(
            ProductId::new(id),
            owner,
            input.name,
            input.price_subunit,
            categories,
            created_at,
        );

        for category in product.categories() {
            sqlx::query(
                r#"INSERT INTO "productCategory" ("productId", "categoryId") VALUES ($1, $2)"#,
            )
            .bind(id)
            .bind(category.id.value())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;
        debug!(product_id = id, "product inserted");
        Ok(product)
    }

    async fn find_one(&self, owner: UserId, id: ProductId) -> RepositoryResult<Product> {
        let row = sqlx::query(
            r#"
            SELECT "id", "ownerId", "name", "priceSubunit", "createdAt"
            FROM "product"
            WHERE "id" = $1 AND "ownerId" = $2
            "#,
        )
        .bind(id.value())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(RepositoryError::NotFound)?;

        let mut categories = self.load_categories(&[id.value()]).await?;
        product_from_row(&row, categories.remove(&id.value()).unwrap_or_default())
    }

    async fn list(&self, conditions: &[Condition]) -> RepositoryResult<Vec<Product>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"SELECT "id", "ownerId", "name", "priceSubunit", "createdAt" FROM "product""#,
        );

        for (i, condition) in conditions.iter().enumerate() {
            builder.push(if i == 0 { " WHERE \"" } else { " AND \"" });
            builder.push(quote_ident(condition.column()));
            builder.push("\" ");
            builder.push(condition.op().as_sql());
            builder.push(" ");
            bind_scalar(&mut builder, condition.value());
        }
        builder.push(r#" ORDER BY "id""#);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        debug!(conditions = conditions.len(), rows = rows.len(), "products listed");

        let ids: Vec<i64> = rows
            .iter()
            .map(|r| r.try_get::<i64, _>("id").map_err(storage))
            .collect::<RepositoryResult<_>>()?;
        let mut categories = self.load_categories(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| product_from_row(row, categories.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let result = sqlx::query(
            r#"
            UPDATE "product"
            SET "name" = $1, "priceSubunit" = $2
            WHERE "id" = $3 AND "ownerId" = $4
            "#,
        )
        .bind(product.name())
        .bind(product.price_subunit())
        .bind(product.id().value())
        .bind(product.owner_id().as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(r#"DELETE FROM "productCategory" WHERE "productId" = $1"#)
            .bind(product.id().value())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        for category in product.categories() {
            sqlx::query(
                r#"INSERT INTO "productCategory" ("productId", "categoryId") VALUES ($1, $2)"#,
            )
            .bind(product.id().value())
            .bind(category.id.value())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;
        Ok(product.clone())
    }

    async fn delete(&self, owner: UserId, id: ProductId) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query(r#"DELETE FROM "productCategory" WHERE "productId" = $1"#)
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        let result = sqlx::query(r#"DELETE FROM "product" WHERE "id" = $1 AND "ownerId" = $2"#)
            .bind(id.value())
            .bind(owner.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the join-table delete.
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PostgresStore {
    async fn insert(&self, input: NewCategory) -> RepositoryResult<Category> {
        let row = sqlx::query(
            r#"INSERT INTO "category" ("name") VALUES ($1) RETURNING "id", "name", "createdAt""#,
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        category_from_row(&row)
    }

    async fn list(&self) -> RepositoryResult<Vec<Category>> {
        let rows = sqlx::query(
            r#"SELECT "id", "name", "createdAt" FROM "category" ORDER BY "id""#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(category_from_row).collect()
    }

    async fn find_by_ids(&self, ids: &[CategoryId]) -> RepositoryResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.value()).collect();

        let rows = sqlx::query(
            r#"SELECT "id", "name", "createdAt" FROM "category" WHERE "id" = ANY($1) ORDER BY "id""#,
        )
        .bind(&raw)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(category_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("priceSubunit"), "priceSubunit");
        assert_eq!(quote_ident("bad\"col"), "bad\"\"col");
    }
}
