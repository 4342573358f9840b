mod common;

use order_fulfillment_api::{
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::cart_service,
};
use uuid::Uuid;

use common::{
    add_image, create_category, create_inactive_product, create_product, create_product_in,
    setup, stock_of,
};

fn add(product_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        product_id,
        quantity,
    }
}

#[tokio::test]
async fn new_user_gets_an_empty_cart_once() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());

    let first = cart_service::get_cart(&app.state, &user).await?;
    let second = cart_service::get_cart(&app.state, &user).await?;

    assert_eq!(first.id, second.id);
    assert_eq!(first.user_id, user.user_id);
    assert!(first.items.is_empty());
    assert_eq!(first.total, 0);
    Ok(())
}

#[tokio::test]
async fn add_returns_projection_with_product_details() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let category = create_category(&app.state, "Mugs").await?;
    let product = create_product_in(&app.state, &category, 1_000, 10).await?;
    add_image(&app.state, &product, "https://cdn.test/side.png", false).await?;
    add_image(&app.state, &product, "https://cdn.test/front.png", true).await?;

    let cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 2)).await?;

    assert_eq!(cart.items.len(), 1);
    let line = &cart.items[0];
    assert_eq!(line.quantity, 2);
    assert_eq!(line.subtotal, 2_000);
    assert_eq!(cart.total, 2_000);
    assert_eq!(line.product.id, product.id);
    assert_eq!(line.product.price, 1_000);
    assert_eq!(
        line.product.category.as_ref().map(|c| c.name.as_str()),
        Some("Mugs")
    );
    assert_eq!(line.product.images.len(), 2);
    assert!(line.product.images[0].is_primary);
    Ok(())
}

#[tokio::test]
async fn repeated_adds_accumulate_until_stock_runs_out() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 500, 5).await?;

    cart_service::add_to_cart(&app.state, &user, add(product.id, 3)).await?;
    let cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 2)).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.total, 2_500);

    let err = cart_service::add_to_cart(&app.state, &user, add(product.id, 1))
        .await
        .expect_err("sixth unit exceeds stock");
    match err {
        AppError::InsufficientStock { product_id } => assert_eq!(product_id, product.id),
        other => panic!("unexpected error: {other:?}"),
    }

    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert_eq!(cart.items[0].quantity, 5);
    // Carts never reserve stock.
    assert_eq!(stock_of(&app.state, product.id).await?, 5);
    Ok(())
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 500, 5).await?;

    for quantity in [0, -3] {
        let err = cart_service::add_to_cart(&app.state, &user, add(product.id, quantity))
            .await
            .expect_err("quantity must be positive");
        assert!(matches!(err, AppError::Validation(_)));
    }

    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert!(cart.items.is_empty());

    let cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 1)).await?;
    let item_id = cart.items[0].id;

    let err = cart_service::update_cart_item(
        &app.state,
        &user,
        item_id,
        UpdateCartItemRequest { quantity: 0 },
    )
    .await
    .expect_err("quantity must be positive");
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn unknown_or_inactive_products_cannot_be_added() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let inactive = create_inactive_product(&app.state, 500, 5).await?;

    let err = cart_service::add_to_cart(&app.state, &user, add(Uuid::new_v4(), 1))
        .await
        .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound));

    let err = cart_service::add_to_cart(&app.state, &user, add(inactive.id, 1))
        .await
        .expect_err("inactive product");
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn update_replaces_quantity_within_stock() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 250, 4).await?;

    let cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 3)).await?;
    let item_id = cart.items[0].id;

    let cart = cart_service::update_cart_item(
        &app.state,
        &user,
        item_id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await?;
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.total, 250);

    let err = cart_service::update_cart_item(
        &app.state,
        &user,
        item_id,
        UpdateCartItemRequest { quantity: 5 },
    )
    .await
    .expect_err("above stock");
    assert!(matches!(err, AppError::InsufficientStock { .. }));

    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert_eq!(cart.items[0].quantity, 1);
    Ok(())
}

#[tokio::test]
async fn removed_line_disappears_and_readd_starts_fresh() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 100, 10).await?;

    let cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 4)).await?;
    let item_id = cart.items[0].id;

    cart_service::remove_from_cart(&app.state, &user, item_id).await?;
    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);

    let err = cart_service::remove_from_cart(&app.state, &user, item_id)
        .await
        .expect_err("already removed");
    assert!(matches!(err, AppError::NotFound));

    let err = cart_service::update_cart_item(
        &app.state,
        &user,
        item_id,
        UpdateCartItemRequest { quantity: 2 },
    )
    .await
    .expect_err("removed lines cannot be updated");
    assert!(matches!(err, AppError::NotFound));

    let cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 2)).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].id, item_id);
    assert_eq!(cart.items[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn other_users_items_read_as_not_found() -> anyhow::Result<()> {
    let app = setup().await?;
    let owner = AuthUser::customer(Uuid::new_v4());
    let intruder = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 100, 10).await?;

    let cart = cart_service::add_to_cart(&app.state, &owner, add(product.id, 2)).await?;
    let item_id = cart.items[0].id;

    // The intruder has a cart of their own too.
    cart_service::get_cart(&app.state, &intruder).await?;

    let err = cart_service::update_cart_item(
        &app.state,
        &intruder,
        item_id,
        UpdateCartItemRequest { quantity: 9 },
    )
    .await
    .expect_err("foreign item");
    assert!(matches!(err, AppError::NotFound));

    let err = cart_service::remove_from_cart(&app.state, &intruder, item_id)
        .await
        .expect_err("foreign item");
    assert!(matches!(err, AppError::NotFound));

    let cart = cart_service::get_cart(&app.state, &owner).await?;
    assert_eq!(cart.items[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn second_add_past_stock_leaves_first_quantity() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 100, 5).await?;

    cart_service::add_to_cart(&app.state, &user, add(product.id, 3)).await?;
    let err = cart_service::add_to_cart(&app.state, &user, add(product.id, 3))
        .await
        .expect_err("3 + 3 exceeds 5");
    assert!(matches!(err, AppError::InsufficientStock { .. }));

    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    Ok(())
}

#[tokio::test]
async fn alternating_remove_and_add_matches_a_fresh_add() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 100, 5).await?;

    let mut cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 5)).await?;
    for _ in 0..3 {
        cart_service::remove_from_cart(&app.state, &user, cart.items[0].id).await?;
        cart = cart_service::add_to_cart(&app.state, &user, add(product.id, 2)).await?;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product.id, product.id);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total, 200);
    }
    Ok(())
}
