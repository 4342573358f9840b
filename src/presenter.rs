//! Pure conversions from persisted aggregates to response views.
//!
//! Totals are derived here on every call and never stored.

use chrono::Utc;

use crate::{
    dto::{
        cart::{CartItemView, CartView, CategoryView, ProductImageView, ProductView},
        orders::{OrderItemView, OrderView},
    },
    entity::{carts, cart_items, categories, order_items, orders, product_images, products},
};

/// An active cart line together with everything the projection shows about it.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: cart_items::Model,
    pub product: products::Model,
    pub category: Option<categories::Model>,
    pub images: Vec<product_images::Model>,
}

pub fn cart_view(cart: &carts::Model, lines: Vec<CartLine>) -> CartView {
    let items: Vec<CartItemView> = lines.into_iter().map(cart_item_view).collect();
    let total = items.iter().map(|item| item.subtotal).sum();
    CartView {
        id: cart.id,
        user_id: cart.user_id,
        items,
        total,
    }
}

fn cart_item_view(line: CartLine) -> CartItemView {
    let CartLine {
        item,
        product,
        category,
        images,
    } = line;
    CartItemView {
        id: item.id,
        subtotal: line_total(product.price, item.quantity),
        quantity: item.quantity,
        product: product_view(product, category, images),
    }
}

pub fn product_view(
    product: products::Model,
    category: Option<categories::Model>,
    images: Vec<product_images::Model>,
) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        description: product.description,
        sku: product.sku,
        price: product.price,
        stock: product.stock,
        is_active: product.is_active,
        category: category.map(category_view),
        images: images
            .into_iter()
            .map(|img| ProductImageView {
                id: img.id,
                url: img.url,
                alt_text: img.alt_text,
                is_primary: img.is_primary,
            })
            .collect(),
    }
}

pub fn category_view(category: categories::Model) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        is_active: category.is_active,
    }
}

pub fn order_view(order: orders::Model, items: Vec<order_items::Model>) -> OrderView {
    OrderView {
        id: order.id,
        user_id: order.user_id,
        status: order.status,
        total_amount: order.total_amount,
        created_at: order.created_at.with_timezone(&Utc),
        updated_at: order.updated_at.with_timezone(&Utc),
        items: items.into_iter().map(order_item_view).collect(),
    }
}

fn order_item_view(model: order_items::Model) -> OrderItemView {
    OrderItemView {
        id: model.id,
        product_id: model.product_id,
        subtotal: model.subtotal(),
        quantity: model.quantity,
        price: model.price,
    }
}

pub fn line_total(price: i64, quantity: i32) -> i64 {
    price * i64::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{cart_items::CartItemStatus, orders::OrderStatus};
    use uuid::Uuid;

    fn product(price: i64) -> products::Model {
        products::Model {
            id: Uuid::new_v4(),
            category_id: None,
            name: "Ferris Mug".into(),
            description: None,
            sku: format!("SKU-{}", Uuid::new_v4()),
            price,
            stock: 10,
            is_active: true,
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn line(cart_id: uuid::Uuid, price: i64, quantity: i32) -> CartLine {
        let product = product(price);
        let now = Utc::now().fixed_offset();
        CartLine {
            item: cart_items::Model {
                id: Uuid::new_v4(),
                cart_id,
                product_id: product.id,
                quantity,
                status: CartItemStatus::Active,
                removed_at: None,
                created_at: now,
                updated_at: now,
            },
            product,
            category: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn cart_total_is_sum_of_line_subtotals() {
        let now = Utc::now().fixed_offset();
        let cart = carts::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        let view = cart_view(&cart, vec![line(cart.id, 1250, 2), line(cart.id, 99, 3)]);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].subtotal, 2500);
        assert_eq!(view.items[1].subtotal, 297);
        assert_eq!(view.total, 2797);
    }

    #[test]
    fn empty_cart_totals_zero() {
        let now = Utc::now().fixed_offset();
        let cart = carts::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let view = cart_view(&cart, Vec::new());
        assert!(view.items.is_empty());
        assert_eq!(view.total, 0);
    }

    #[test]
    fn order_items_carry_their_own_subtotal() {
        let now = Utc::now().fixed_offset();
        let order = orders::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: OrderStatus::Pending,
            total_amount: 3000,
            created_at: now,
            updated_at: now,
        };
        let item = order_items::Model {
            id: Uuid::new_v4(),
            order_id: order.id,
            product_id: Uuid::new_v4(),
            quantity: 3,
            price: 1000,
            created_at: now,
        };

        let view = order_view(order, vec![item]);
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.items[0].subtotal, 3000);
        assert_eq!(view.total_amount, 3000);
    }
}
