#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tokio::sync::OnceCell;
use uuid::Uuid;

use order_fulfillment_api::{
    clock::ManualClock,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::{self, ActiveModel as CategoryActive},
        product_images::ActiveModel as ImageActive,
        products::{self, ActiveModel as ProductActive, Entity as Products},
    },
    state::AppState,
};

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

pub async fn setup() -> anyhow::Result<TestApp> {
    setup_with_timeout(Duration::from_secs(5)).await
}

/// Fresh in-memory database with the schema applied and a manual clock.
pub async fn setup_with_timeout(tx_timeout: Duration) -> anyhow::Result<TestApp> {
    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        db_max_connections: 1,
        tx_timeout,
    };
    let orm = create_orm_conn(&config.database_url, config.db_max_connections).await?;
    run_migrations(&orm).await?;

    let start = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid start time");
    let clock = Arc::new(ManualClock::new(start));
    let state = AppState::new(orm, &config).with_clock(clock.clone());

    Ok(TestApp { state, clock })
}

static PG_MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Shared Postgres database from `TEST_DATABASE_URL` or `DATABASE_URL`, with a
/// pool wide enough for transactions to really overlap. `None` when neither
/// variable is set.
pub async fn setup_postgres(max_connections: u32) -> anyhow::Result<Option<TestApp>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) if url.starts_with("postgres") => url,
        _ => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to a Postgres database.");
            return Ok(None);
        }
    };

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        db_max_connections: max_connections,
        tx_timeout: Duration::from_secs(10),
    };
    let orm = create_orm_conn(&config.database_url, config.db_max_connections).await?;
    // Tests in one binary share the schema; migrate it once.
    PG_MIGRATED
        .get_or_try_init(|| async { run_migrations(&orm).await })
        .await?;

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let state = AppState::new(orm, &config).with_clock(clock.clone());
    Ok(Some(TestApp { state, clock }))
}

pub async fn create_category(state: &AppState, name: &str) -> anyhow::Result<categories::Model> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(state.clock.now().fixed_offset()),
    }
    .insert(&state.orm)
    .await?;
    Ok(category)
}

pub async fn create_product(
    state: &AppState,
    price: i64,
    stock: i32,
) -> anyhow::Result<products::Model> {
    insert_product(state, None, price, stock, true).await
}

pub async fn create_inactive_product(
    state: &AppState,
    price: i64,
    stock: i32,
) -> anyhow::Result<products::Model> {
    insert_product(state, None, price, stock, false).await
}

pub async fn create_product_in(
    state: &AppState,
    category: &categories::Model,
    price: i64,
    stock: i32,
) -> anyhow::Result<products::Model> {
    insert_product(state, Some(category.id), price, stock, true).await
}

async fn insert_product(
    state: &AppState,
    category_id: Option<Uuid>,
    price: i64,
    stock: i32,
    is_active: bool,
) -> anyhow::Result<products::Model> {
    let id = Uuid::new_v4();
    let product = ProductActive {
        id: Set(id),
        category_id: Set(category_id),
        name: Set(format!("Widget {id}")),
        description: Set(Some("A product for testing".into())),
        sku: Set(format!("SKU-{id}")),
        price: Set(price),
        stock: Set(stock),
        is_active: Set(is_active),
        created_at: Set(state.clock.now().fixed_offset()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub async fn add_image(
    state: &AppState,
    product: &products::Model,
    url: &str,
    is_primary: bool,
) -> anyhow::Result<()> {
    ImageActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        url: Set(url.into()),
        alt_text: Set(None),
        is_primary: Set(is_primary),
        created_at: Set(state.clock.now().fixed_offset()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {product_id} missing"))?;
    Ok(product.stock)
}
