use chrono::{DateTime, Utc};
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::within_deadline,
    dto::cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, CartItemStatus, Column as CartItemCol,
            Entity as CartItems, Model as CartItemModel,
        },
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    presenter::{self, CartLine},
    services::{catalog_service::ProductDetails, inventory},
    state::AppState,
};

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<CartView> {
    within_deadline(state.tx_timeout, async {
        let txn = state.orm.begin().await?;
        let cart = get_or_create_cart(&txn, user.user_id, state.clock.now()).await?;
        let view = load_cart_view(&txn, &cart).await?;
        txn.commit().await?;
        Ok::<_, AppError>(view)
    })
    .await
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<CartView> {
    ensure_quantity(payload.quantity)?;

    let view = within_deadline(state.tx_timeout, add_in_txn(state, user.user_id, payload)).await?;

    audit::record(
        state,
        user.user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(view)
}

async fn add_in_txn(
    state: &AppState,
    user_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<CartView> {
    let now = state.clock.now();
    let txn = state.orm.begin().await?;

    // Lock order everywhere: cart, then products, then cart items.
    let cart = get_or_create_cart(&txn, user_id, now).await?;
    let product = inventory::lock_product(&txn, payload.product_id).await?;
    if !product.is_active {
        return Err(AppError::NotFound);
    }

    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    match existing {
        None => {
            inventory::ensure_available(&product, payload.quantity)?;
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                quantity: Set(payload.quantity),
                status: Set(CartItemStatus::Active),
                removed_at: Set(None),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
            }
            .insert(&txn)
            .await?;
        }
        Some(item) => {
            let quantity = item.quantity_after_add(payload.quantity);
            inventory::ensure_available(&product, quantity)?;
            if !item.is_active() {
                tracing::debug!(cart_item_id = %item.id, "reactivating removed cart item");
            }

            let mut active: CartItemActive = item.into();
            active.quantity = Set(quantity);
            active.status = Set(CartItemStatus::Active);
            active.removed_at = Set(None);
            active.updated_at = Set(now.fixed_offset());
            active.update(&txn).await?;
        }
    }

    let view = load_cart_view(&txn, &cart).await?;
    txn.commit().await?;
    Ok(view)
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<CartView> {
    ensure_quantity(payload.quantity)?;

    let view = within_deadline(
        state.tx_timeout,
        update_in_txn(state, user.user_id, item_id, payload.quantity),
    )
    .await?;

    audit::record(
        state,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "cart_item_id": item_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(view)
}

async fn update_in_txn(
    state: &AppState,
    user_id: Uuid,
    item_id: Uuid,
    quantity: i32,
) -> AppResult<CartView> {
    let now = state.clock.now();
    let txn = state.orm.begin().await?;

    let cart = lock_cart(&txn, user_id).await?.ok_or(AppError::NotFound)?;
    let item = find_active_item(&txn, &cart, item_id, false).await?;

    let product = inventory::lock_product(&txn, item.product_id).await?;
    let item = find_active_item(&txn, &cart, item.id, true).await?;
    inventory::ensure_available(&product, quantity)?;

    let mut active: CartItemActive = item.into();
    active.quantity = Set(quantity);
    active.updated_at = Set(now.fixed_offset());
    active.update(&txn).await?;

    let view = load_cart_view(&txn, &cart).await?;
    txn.commit().await?;
    Ok(view)
}

pub async fn remove_from_cart(state: &AppState, user: &AuthUser, item_id: Uuid) -> AppResult<()> {
    within_deadline(state.tx_timeout, async {
        let now = state.clock.now();
        let txn = state.orm.begin().await?;

        let cart = lock_cart(&txn, user.user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let item = find_active_item(&txn, &cart, item_id, true).await?;

        let mut active: CartItemActive = item.into();
        active.status = Set(CartItemStatus::Removed);
        active.removed_at = Set(Some(now.fixed_offset()));
        active.updated_at = Set(now.fixed_offset());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok::<_, AppError>(())
    })
    .await?;

    audit::record(
        state,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_item_id": item_id }),
    )
    .await;

    Ok(())
}

fn ensure_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Lock the user's cart row. Every mutation of its lines holds this lock
/// until commit, so lines read under it are stable.
pub(crate) async fn lock_cart(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> AppResult<Option<CartModel>> {
    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(txn)
        .await?;
    Ok(cart)
}

/// Get-or-create keyed on `user_id`, returning the cart locked. The insert
/// yields to a concurrent one through the unique index instead of failing.
async fn get_or_create_cart(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<CartModel> {
    if let Some(cart) = lock_cart(txn, user_id).await? {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(now.fixed_offset()),
        updated_at: Set(now.fixed_offset()),
    };
    Carts::insert(cart)
        .on_conflict(OnConflict::column(CartCol::UserId).do_nothing().to_owned())
        .exec_without_returning(txn)
        .await?;

    lock_cart(txn, user_id).await?.ok_or(AppError::NotFound)
}

/// Ownership gate: the item must belong to `cart`, which was looked up by
/// user id. An item of another user's cart reads as not found.
async fn find_active_item(
    txn: &DatabaseTransaction,
    cart: &CartModel,
    item_id: Uuid,
    for_update: bool,
) -> AppResult<CartItemModel> {
    let mut query = CartItems::find()
        .filter(CartItemCol::Id.eq(item_id))
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::Status.eq(CartItemStatus::Active));
    if for_update {
        query = query.lock(LockType::Update);
    }
    query.one(txn).await?.ok_or(AppError::NotFound)
}

/// Build the cart projection from the current active lines.
pub(crate) async fn load_cart_view<C: ConnectionTrait>(db: &C, cart: &CartModel) -> AppResult<CartView> {
    let rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::Status.eq(CartItemStatus::Active))
        .order_by_asc(CartItemCol::CreatedAt)
        .order_by_asc(CartItemCol::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    let mut details = ProductDetails::load(db, rows.iter().filter_map(|(_, p)| p.as_ref())).await?;

    let lines = rows
        .into_iter()
        .filter_map(|(item, product)| {
            let Some(product) = product else {
                tracing::warn!(cart_item_id = %item.id, "cart item references a missing product");
                return None;
            };
            let (category, images) = details.parts(&product);
            Some(CartLine {
                item,
                product,
                category,
                images,
            })
        })
        .collect();

    Ok(presenter::cart_view(cart, lines))
}
