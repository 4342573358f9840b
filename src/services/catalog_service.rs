//! Category and product management plus the public product reads.
//!
//! Product updates take the product row lock, so a price change serializes
//! with checkouts that capture the price under the same lock.

use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::within_deadline,
    dto::{
        cart::{CategoryView, ProductView},
        catalog::{
            CreateCategoryRequest, CreateProductRequest, UpdateCategoryRequest,
            UpdateProductRequest,
        },
    },
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        product_images::{Column as ImageCol, Entity as ProductImages, Model as ImageModel},
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    presenter,
    response::Meta,
    routes::params::Pagination,
    services::inventory,
    state::AppState,
};

/// Categories and images for a batch of products, fetched in two queries.
#[derive(Debug, Default)]
pub(crate) struct ProductDetails {
    categories: HashMap<Uuid, CategoryModel>,
    images: HashMap<Uuid, Vec<ImageModel>>,
}

impl ProductDetails {
    pub(crate) async fn load<'a, C, I>(db: &C, products: I) -> AppResult<Self>
    where
        C: ConnectionTrait,
        I: IntoIterator<Item = &'a ProductModel>,
    {
        let mut category_ids = Vec::new();
        let mut product_ids = Vec::new();
        for product in products {
            product_ids.push(product.id);
            if let Some(category_id) = product.category_id {
                category_ids.push(category_id);
            }
        }

        let mut details = Self::default();
        if !category_ids.is_empty() {
            details.categories = Categories::find()
                .filter(CategoryCol::Id.is_in(category_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();
        }
        if !product_ids.is_empty() {
            let found = ProductImages::find()
                .filter(ImageCol::ProductId.is_in(product_ids))
                .order_by_desc(ImageCol::IsPrimary)
                .order_by_asc(ImageCol::CreatedAt)
                .all(db)
                .await?;
            for image in found {
                details.images.entry(image.product_id).or_default().push(image);
            }
        }
        Ok(details)
    }

    pub(crate) fn parts(&mut self, product: &ProductModel) -> (Option<CategoryModel>, Vec<ImageModel>) {
        let category = product
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        let images = self.images.remove(&product.id).unwrap_or_default();
        (category, images)
    }

    fn view(&mut self, product: ProductModel) -> ProductView {
        let (category, images) = self.parts(&product);
        presenter::product_view(product, category, images)
    }
}

fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn ensure_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    Ok(())
}

async fn ensure_category<C: ConnectionTrait>(db: &C, category_id: Uuid) -> AppResult<()> {
    Categories::find_by_id(category_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound)
}

pub async fn list_categories(state: &AppState) -> AppResult<Vec<CategoryView>> {
    let categories = Categories::find()
        .filter(CategoryCol::IsActive.eq(true))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?;
    Ok(categories.into_iter().map(presenter::category_view).collect())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<CategoryView> {
    ensure_admin(user)?;
    let name = require_text("name", &payload.name)?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        is_active: Set(true),
        created_at: Set(state.clock.now().fixed_offset()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(presenter::category_view(category))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<CategoryView> {
    ensure_admin(user)?;
    let name = payload
        .name
        .as_deref()
        .map(|name| require_text("name", name))
        .transpose()?;

    let category = within_deadline(state.tx_timeout, async {
        let txn = state.orm.begin().await?;
        let existing = Categories::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: CategoryActive = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = payload.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = payload.is_active {
            active.is_active = Set(is_active);
        }
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok::<_, AppError>(updated)
    })
    .await?;

    audit::record(
        state,
        user.user_id,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(presenter::category_view(category))
}

/// Products of a deleted category keep existing without one.
pub async fn delete_category(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        state,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;
    Ok(())
}

pub async fn list_products(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<(Vec<ProductView>, Meta)> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Products::find()
        .filter(ProdCol::IsActive.eq(true))
        .order_by_desc(ProdCol::CreatedAt)
        .order_by_desc(ProdCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut details = ProductDetails::load(&state.orm, &products).await?;
    let views = products.into_iter().map(|p| details.view(p)).collect();
    Ok((views, Meta::new(page, limit, total)))
}

/// Inactive products read as not found.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ProductView> {
    let product = Products::find_by_id(id)
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut details = ProductDetails::load(&state.orm, [&product]).await?;
    Ok(details.view(product))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ProductView> {
    ensure_admin(user)?;
    let name = require_text("name", &payload.name)?;
    let sku = require_text("sku", &payload.sku)?;
    ensure_price(payload.price)?;
    if payload.stock < 0 {
        return Err(AppError::Validation("stock must not be negative".into()));
    }

    let product = within_deadline(state.tx_timeout, async {
        let txn = state.orm.begin().await?;
        if let Some(category_id) = payload.category_id {
            ensure_category(&txn, category_id).await?;
        }
        let taken = Products::find()
            .filter(ProdCol::Sku.eq(sku.as_str()))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(AppError::Validation(format!("sku {sku} is already in use")));
        }

        let product = ProductActive {
            id: Set(Uuid::new_v4()),
            category_id: Set(payload.category_id),
            name: Set(name.clone()),
            description: Set(payload.description.clone()),
            sku: Set(sku.clone()),
            price: Set(payload.price),
            stock: Set(payload.stock),
            is_active: Set(true),
            created_at: Set(state.clock.now().fixed_offset()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok::<_, AppError>(product)
    })
    .await?;

    tracing::info!(product_id = %product.id, sku = %product.sku, "product created");
    audit::record(
        state,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "sku": product.sku }),
    )
    .await;

    let mut details = ProductDetails::load(&state.orm, [&product]).await?;
    Ok(details.view(product))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ProductView> {
    ensure_admin(user)?;
    let name = payload
        .name
        .as_deref()
        .map(|name| require_text("name", name))
        .transpose()?;
    if let Some(price) = payload.price {
        ensure_price(price)?;
    }

    let product = within_deadline(state.tx_timeout, async {
        let txn = state.orm.begin().await?;
        let existing = inventory::lock_product(&txn, id).await?;
        if let Some(category_id) = payload.category_id {
            ensure_category(&txn, category_id).await?;
        }

        let mut active: ProductActive = existing.into();
        if let Some(category_id) = payload.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = payload.description.clone() {
            active.description = Set(Some(description));
        }
        if let Some(price) = payload.price {
            active.price = Set(price);
        }
        if let Some(is_active) = payload.is_active {
            active.is_active = Set(is_active);
        }
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok::<_, AppError>(updated)
    })
    .await?;

    audit::record(
        state,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": id, "price": payload.price, "is_active": payload.is_active }),
    )
    .await;

    let mut details = ProductDetails::load(&state.orm, [&product]).await?;
    Ok(details.view(product))
}

/// Soft delete. Orders and cart lines keep referencing the row; it can no
/// longer be added to a cart or checked out.
pub async fn deactivate_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;

    within_deadline(state.tx_timeout, async {
        let txn = state.orm.begin().await?;
        let existing = inventory::lock_product(&txn, id).await?;
        let mut active: ProductActive = existing.into();
        active.is_active = Set(false);
        active.update(&txn).await?;
        txn.commit().await?;
        Ok::<_, AppError>(())
    })
    .await?;

    audit::record(
        state,
        user.user_id,
        "product_deactivate",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;
    Ok(())
}
