use chrono::{Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use uuid::Uuid;

use order_fulfillment_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    middleware::auth::sign_token,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let category_id = ensure_category(&orm, "Merch", "Things for Rustaceans").await?;
    seed_products(&orm, category_id).await?;

    // Tokens for poking the API locally.
    let now = Utc::now();
    let customer_id = Uuid::new_v4();
    let admin_id = Uuid::new_v4();
    let customer = sign_token(&config.jwt_secret, customer_id, "customer", now, Duration::days(7))?;
    let admin = sign_token(&config.jwt_secret, admin_id, "admin", now, Duration::days(7))?;

    println!("Seed completed.");
    println!("Customer {customer_id}: {customer}");
    println!("Admin {admin_id}: {admin}");
    Ok(())
}

async fn ensure_category(
    orm: &DatabaseConnection,
    name: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let id = Uuid::new_v4();
    Categories::insert(CategoryActive {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        is_active: Set(true),
        created_at: Set(Utc::now().fixed_offset()),
    })
    .exec_without_returning(orm)
    .await?;

    println!("Ensured category {name}");
    Ok(id)
}

async fn seed_products(orm: &DatabaseConnection, category_id: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("HOODIE-01", "Axum Hoodie", "Warm hoodie for Rustaceans", 550_000, 50),
        ("MUG-01", "Ferris Mug", "Coffee tastes better with Ferris", 120_000, 100),
        ("STICKER-01", "Rust Sticker Pack", "Decorate your laptop", 50_000, 200),
        ("EBOOK-01", "E-book: Async Rust", "Learn async Rust patterns", 250_000, 75),
    ];

    for (sku, name, desc, price, stock) in products {
        Products::insert(ProductActive {
            id: Set(Uuid::new_v4()),
            category_id: Set(Some(category_id)),
            name: Set(name.to_string()),
            description: Set(Some(desc.to_string())),
            sku: Set(sku.to_string()),
            price: Set(price),
            stock: Set(stock),
            is_active: Set(true),
            created_at: Set(Utc::now().fixed_offset()),
        })
        .on_conflict(OnConflict::column(ProdCol::Sku).do_nothing().to_owned())
        .exec_without_returning(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
