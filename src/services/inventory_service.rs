use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    audit,
    db::within_deadline,
    dto::inventory::{InventoryAdjustRequest, StockView},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    services::inventory,
    state::AppState,
};

/// Admin restock or write-off. Goes through the same ledger accessors as
/// checkout, so it can never drive stock below zero.
pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<StockView> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::Validation("delta must not be 0".into()));
    }

    let view = within_deadline(state.tx_timeout, async {
        let txn = state.orm.begin().await?;
        inventory::lock_product(&txn, product_id).await?;

        if payload.delta > 0 {
            inventory::increment_stock(&txn, product_id, payload.delta).await?;
        } else {
            let amount = payload.delta.checked_neg().ok_or_else(|| {
                AppError::Validation("delta is out of range".into())
            })?;
            inventory::decrement_stock(&txn, product_id, amount).await?;
        }

        let stock = inventory::get_stock(&txn, product_id).await?;
        txn.commit().await?;
        Ok::<_, AppError>(StockView { product_id, stock })
    })
    .await?;

    audit::record(
        state,
        user.user_id,
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": product_id, "delta": payload.delta }),
    )
    .await;

    Ok(view)
}
