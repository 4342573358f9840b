use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::within_deadline,
    dto::orders::{OrderView, UpdateOrderStatusRequest},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, CartItemStatus, Column as CartItemCol,
            Entity as CartItems, Model as CartItemModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    presenter::{self, line_total},
    response::Meta,
    routes::params::OrderListQuery,
    services::{cart_service::lock_cart, inventory},
    state::AppState,
};

/// Convert the user's active cart lines into a pending order.
///
/// Stock is checked and decremented under row locks in the same transaction
/// that inserts the order and tombstones the cart lines. Any failure rolls
/// the whole unit back: no order, no stock change, cart untouched.
pub async fn create_order(state: &AppState, user: &AuthUser) -> AppResult<OrderView> {
    let order = within_deadline(state.tx_timeout, create_in_txn(state, user.user_id)).await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total_amount = order.total_amount,
        items = order.items.len(),
        "order created"
    );
    audit::record(
        state,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_amount": order.total_amount }),
    )
    .await;

    Ok(order)
}

async fn create_in_txn(state: &AppState, user_id: Uuid) -> AppResult<OrderView> {
    let now = state.clock.now().fixed_offset();
    let txn = state.orm.begin().await?;

    // Holding the cart lock keeps the line set fixed until commit, so the
    // product set below is complete and locked in one ascending pass.
    let cart = lock_cart(&txn, user_id).await?.ok_or(AppError::EmptyCart)?;
    let preview = active_lines(&txn, cart.id, false).await?;
    if preview.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let product_ids: Vec<Uuid> = preview.iter().map(|line| line.product_id).collect();
    let products: HashMap<Uuid, _> = inventory::lock_products(&txn, &product_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines = active_lines(&txn, cart.id, true).await?;

    // Validate every line before the first write.
    let mut priced = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = products.get(&line.product_id).ok_or(AppError::NotFound)?;
        if !product.is_active {
            tracing::info!(product_id = %product.id, "checkout rejected, product inactive");
            return Err(AppError::NotFound);
        }
        inventory::ensure_available(product, line.quantity)?;
        priced.push((line, product.price));
    }
    let total_amount: i64 = priced
        .iter()
        .map(|(line, price)| line_total(*price, line.quantity))
        .sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        status: Set(OrderStatus::Pending),
        total_amount: Set(total_amount),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for (line, price) in priced {
        inventory::decrement_stock(&txn, line.product_id, line.quantity).await?;

        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            price: Set(price),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    CartItems::update_many()
        .set(CartItemActive {
            status: Set(CartItemStatus::Removed),
            removed_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::Status.eq(CartItemStatus::Active))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(presenter::order_view(order, items))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<(Vec<OrderView>, Meta)> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = items_by_order(&state.orm, order_ids).await?;

    let views = orders
        .into_iter()
        .map(|order| {
            let order_items = items.remove(&order.id).unwrap_or_default();
            presenter::order_view(order, order_items)
        })
        .collect();

    Ok((views, Meta::new(page, limit, total)))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderView> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?;

    Ok(presenter::order_view(order, items))
}

/// Admin-only lifecycle move. Cancelling returns the ordered units to stock
/// in the same transaction.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<OrderView> {
    ensure_admin(user)?;
    let next = payload.status;

    let order = within_deadline(state.tx_timeout, async {
        let now = state.clock.now().fixed_offset();
        let txn = state.orm.begin().await?;

        let existing = Orders::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        if !existing.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "cannot move order from {:?} to {:?}",
                existing.status, next
            )));
        }

        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(existing.id))
            .order_by_asc(OrderItemCol::CreatedAt)
            .order_by_asc(OrderItemCol::Id)
            .all(&txn)
            .await?;

        if next == OrderStatus::Cancelled {
            let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
            inventory::lock_products(&txn, &product_ids).await?;
            for item in &items {
                inventory::increment_stock(&txn, item.product_id, item.quantity).await?;
            }
        }

        let mut active: OrderActive = existing.into();
        active.status = Set(next);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok::<_, AppError>(presenter::order_view(updated, items))
    })
    .await?;

    audit::record(
        state,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(order)
}

async fn active_lines<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
    for_update: bool,
) -> AppResult<Vec<CartItemModel>> {
    let mut query = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .filter(CartItemCol::Status.eq(CartItemStatus::Active))
        .order_by_asc(CartItemCol::CreatedAt)
        .order_by_asc(CartItemCol::Id);
    if for_update {
        query = query.lock(LockType::Update);
    }
    Ok(query.all(db).await?)
}

async fn items_by_order<C: ConnectionTrait>(
    db: &C,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<OrderItemModel>>> {
    let mut grouped: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(db)
        .await?;
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}
