use sea_orm::ActiveModelTrait;
use serde_json::Value;
use uuid::Uuid;

use crate::{entity::audit_logs::ActiveModel as AuditLogActive, error::AppResult, state::AppState};

pub async fn log_audit(
    state: &AppState,
    user_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let at = state.clock.now().fixed_offset();
    AuditLogActive::entry(user_id, action, resource, metadata, at)
        .insert(&state.orm)
        .await?;

    Ok(())
}

/// Record an audit entry after a unit of work committed. The business result
/// stands even when the audit write fails.
pub async fn record(
    state: &AppState,
    user_id: Uuid,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_audit(state, Some(user_id), action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
