//! Inventory ledger accessors.
//!
//! Every function takes the caller's open transaction; none of them begins
//! or commits one. Reads take a row lock (`FOR UPDATE` where the backend has
//! row locks) and writes are conditional updates, so a stock value read here
//! stays valid until the caller commits.

use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    entity::products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
};

/// Lock a product row for the rest of the transaction.
pub async fn lock_product(txn: &DatabaseTransaction, product_id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(product_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Lock several product rows, always in ascending id order so two
/// transactions touching overlapping products cannot deadlock.
pub async fn lock_products(
    txn: &DatabaseTransaction,
    product_ids: &[Uuid],
) -> AppResult<Vec<ProductModel>> {
    let mut ids = product_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let products = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(txn)
        .await?;
    Ok(products)
}

pub async fn get_stock(txn: &DatabaseTransaction, product_id: Uuid) -> AppResult<i32> {
    Ok(lock_product(txn, product_id).await?.stock)
}

/// `stock = stock - amount`, only where enough stock remains.
pub async fn decrement_stock(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    amount: i32,
) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "decrement amount must be greater than 0".into(),
        ));
    }

    let result = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(amount))
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::Stock.gte(amount))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        let exists = Products::find_by_id(product_id).one(txn).await?.is_some();
        if !exists {
            return Err(AppError::NotFound);
        }
        tracing::info!(%product_id, amount, "stock decrement rejected");
        return Err(AppError::InsufficientStock { product_id });
    }

    Ok(())
}

pub async fn increment_stock(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    amount: i32,
) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "increment amount must be greater than 0".into(),
        ));
    }

    let current = lock_product(txn, product_id).await?.stock;
    if current.checked_add(amount).is_none() {
        return Err(AppError::Validation(format!(
            "stock of {product_id} cannot grow by {amount}"
        )));
    }

    let result = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(amount))
        .filter(ProdCol::Id.eq(product_id))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Fail with `InsufficientStock` when `quantity` units cannot be covered.
pub fn ensure_available(product: &ProductModel, quantity: i32) -> AppResult<()> {
    if quantity > product.stock {
        tracing::debug!(
            product_id = %product.id,
            requested = quantity,
            stock = product.stock,
            "insufficient stock"
        );
        return Err(AppError::InsufficientStock {
            product_id: product.id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: i32) -> ProductModel {
        ProductModel {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Axum Hoodie".into(),
            description: None,
            sku: "HOODIE-1".into(),
            price: 550_000,
            stock,
            is_active: true,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn quantity_equal_to_stock_is_available() {
        assert!(ensure_available(&product(5), 5).is_ok());
    }

    #[test]
    fn quantity_above_stock_names_product() {
        let p = product(5);
        match ensure_available(&p, 6) {
            Err(AppError::InsufficientStock { product_id }) => assert_eq!(product_id, p.id),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
