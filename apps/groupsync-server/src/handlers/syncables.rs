//! Link handlers: link, unlink, get, list, patch

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use groupsync_storage::{
    GroupId, GroupSyncable, GroupSyncablePatch, Syncable, SyncableType,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::parse_param;
use crate::error::ApiError;
use crate::server::{Actor, AppState};

fn parse_target(
    group_id: &str,
    syncable_type: &str,
    syncable_id: &str,
) -> Result<(GroupId, Syncable), ApiError> {
    let group_id: GroupId = parse_param(group_id, "group_id")?;
    let kind: SyncableType = parse_param(syncable_type, "syncable_type")?;
    let id: Uuid = parse_param(syncable_id, "syncable_id")?;
    Ok((group_id, Syncable::from_parts(kind, id)))
}

/// An empty body is an empty patch.
fn parse_patch(body: &[u8], field: String) -> Result<GroupSyncablePatch, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GroupSyncablePatch::default());
    }
    serde_json::from_slice(body).map_err(|_| ApiError::invalid(field))
}

pub async fn link(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((group_id, syncable_type, syncable_id)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<(StatusCode, Json<GroupSyncable>), ApiError> {
    let (group_id, syncable) = parse_target(&group_id, &syncable_type, &syncable_id)?;
    let patch = parse_patch(&body, format!("Group{}", syncable.kind().title()))?;
    let record = state
        .linkage
        .link(&actor, &group_id, syncable, &patch)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn unlink(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((group_id, syncable_type, syncable_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let (group_id, syncable) = parse_target(&group_id, &syncable_type, &syncable_id)?;
    state.linkage.unlink(&actor, &group_id, syncable).await?;
    Ok(Json(json!({ "status": "OK" })))
}

pub async fn get_syncable(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((group_id, syncable_type, syncable_id)): Path<(String, String, String)>,
) -> Result<Json<GroupSyncable>, ApiError> {
    let (group_id, syncable) = parse_target(&group_id, &syncable_type, &syncable_id)?;
    let record = state.linkage.get(&actor, &group_id, syncable).await?;
    Ok(Json(record))
}

pub async fn list_syncables(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((group_id, syncable_type)): Path<(String, String)>,
) -> Result<Json<Vec<GroupSyncable>>, ApiError> {
    let group_id: GroupId = parse_param(&group_id, "group_id")?;
    let kind: SyncableType = parse_param(&syncable_type, "syncable_type")?;
    let records = state.linkage.list(&actor, &group_id, kind).await?;
    Ok(Json(records))
}

pub async fn patch_syncable(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((group_id, syncable_type, syncable_id)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<Json<GroupSyncable>, ApiError> {
    let (group_id, syncable) = parse_target(&group_id, &syncable_type, &syncable_id)?;
    let patch = parse_patch(&body, format!("Group[{}]Patch", syncable.kind().title()))?;
    let record = state
        .linkage
        .patch(&actor, &group_id, syncable, &patch)
        .await?;
    Ok(Json(record))
}
