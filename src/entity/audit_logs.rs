use sea_orm::{Set, entity::prelude::*};
use serde_json::Value;

/// Append-only trail of committed cart, order and inventory mutations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModel {
    pub fn entry(
        user_id: Option<Uuid>,
        action: &str,
        resource: Option<&str>,
        metadata: Option<Value>,
        at: DateTimeWithTimeZone,
    ) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            action: Set(action.to_owned()),
            resource: Set(resource.map(str::to_owned)),
            metadata: Set(metadata),
            created_at: Set(at),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
