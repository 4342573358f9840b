use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a cart line. Removal tombstones the row instead of deleting
/// it, so a later add for the same product reactivates the same row.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CartItemStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "removed")]
    Removed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub status: CartItemStatus,
    pub removed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == CartItemStatus::Active
    }

    /// Quantity the line holds after another `requested` units are added.
    ///
    /// An active line accumulates. A removed line starts over from
    /// `requested`: the earlier quantity was discarded when it was removed.
    pub fn quantity_after_add(&self, requested: i32) -> i32 {
        match self.status {
            CartItemStatus::Active => self.quantity.saturating_add(requested),
            CartItemStatus::Removed => requested,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id"
    )]
    Carts,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(status: CartItemStatus, quantity: i32) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity,
            status,
            removed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_line_accumulates() {
        assert_eq!(line(CartItemStatus::Active, 3).quantity_after_add(2), 5);
    }

    #[test]
    fn removed_line_restarts_from_requested() {
        assert_eq!(line(CartItemStatus::Removed, 9).quantity_after_add(2), 2);
    }

    #[test]
    fn accumulation_saturates_instead_of_overflowing() {
        assert_eq!(
            line(CartItemStatus::Active, i32::MAX).quantity_after_add(1),
            i32::MAX
        );
    }
}
