mod common;

use std::time::Duration;

use order_fulfillment_api::{
    dto::cart::AddToCartRequest,
    entity::Orders,
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, order_service},
};
use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};
use tokio::task::JoinSet;
use uuid::Uuid;

use common::{create_product, setup, setup_with_timeout, stock_of};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_never_exceed_stock() -> anyhow::Result<()> {
    let app = setup().await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 100, 5).await?;

    let mut tasks = JoinSet::new();
    for _ in 0..10 {
        let state = app.state.clone();
        let user = user.clone();
        let product_id = product.id;
        tasks.spawn(async move {
            cart_service::add_to_cart(
                &state,
                &user,
                AddToCartRequest {
                    product_id,
                    quantity: 1,
                },
            )
            .await
        });
    }

    let mut accepted = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(_) => accepted += 1,
            Err(AppError::InsufficientStock { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(accepted, 5);
    assert_eq!(rejected, 5);
    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert_eq!(cart.items[0].quantity, 5);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_cannot_oversell() -> anyhow::Result<()> {
    let app = setup().await?;
    let product = create_product(&app.state, 1_000, 5).await?;

    let buyers: Vec<AuthUser> = (0..4).map(|_| AuthUser::customer(Uuid::new_v4())).collect();
    for buyer in &buyers {
        cart_service::add_to_cart(
            &app.state,
            buyer,
            AddToCartRequest {
                product_id: product.id,
                quantity: 2,
            },
        )
        .await?;
    }

    let mut tasks = JoinSet::new();
    for buyer in buyers {
        let state = app.state.clone();
        tasks.spawn(async move { order_service::create_order(&state, &buyer).await });
    }

    let mut placed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(_) => placed += 1,
            Err(AppError::InsufficientStock { product_id }) => assert_eq!(product_id, product.id),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    // 5 units cover two orders of 2, never a third.
    assert_eq!(placed, 2);
    assert_eq!(Orders::find().count(&app.state.orm).await?, 2);
    assert_eq!(stock_of(&app.state, product.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn stalled_unit_of_work_times_out_without_side_effects() -> anyhow::Result<()> {
    let app = setup_with_timeout(Duration::from_millis(50)).await?;
    let user = AuthUser::customer(Uuid::new_v4());
    let product = create_product(&app.state, 100, 5).await?;

    // Hold the only connection so the checkout cannot get one in time.
    let blocker = app.state.orm.begin().await?;

    let err = cart_service::add_to_cart(
        &app.state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .expect_err("cannot finish within the deadline");
    assert!(matches!(err, AppError::TransactionTimeout));

    let err = order_service::create_order(&app.state, &user)
        .await
        .expect_err("cannot finish within the deadline");
    assert!(matches!(err, AppError::TransactionTimeout));

    blocker.rollback().await?;

    assert_eq!(stock_of(&app.state, product.id).await?, 5);
    assert_eq!(Orders::find().count(&app.state.orm).await?, 0);
    let cart = cart_service::get_cart(&app.state, &user).await?;
    assert!(cart.items.is_empty());
    Ok(())
}
