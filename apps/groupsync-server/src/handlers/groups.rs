//! Group handlers: list, get, patch

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use groupsync_storage::{Group, GroupId, GroupPatch, GroupSearchOpts, Page, TeamId};
use serde::Deserialize;

use super::{parse_param, query};
use crate::error::ApiError;
use crate::server::{Actor, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListGroupsQuery {
    pub q: Option<String>,
    pub include_member_count: bool,
    pub not_associated_to_team: Option<TeamId>,
    pub include_deleted: bool,
    pub page: u32,
    pub per_page: u32,
}

pub async fn list_groups(
    State(state): State<AppState>,
    Actor(actor): Actor,
    params: Result<Query<ListGroupsQuery>, QueryRejection>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let params = query(params)?;
    let opts = GroupSearchOpts {
        q: params.q,
        include_member_count: params.include_member_count,
        not_associated_to_team: params.not_associated_to_team,
        include_deleted: params.include_deleted,
        paginate: None,
    };
    let groups = state
        .directory
        .list_groups(&actor, Page::new(params.page, params.per_page), &opts)
        .await?;
    Ok(Json(groups))
}

pub async fn get_group(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let group_id: GroupId = parse_param(&group_id, "group_id")?;
    let group = state.directory.get_group(&actor, &group_id).await?;
    Ok(Json(group))
}

pub async fn patch_group(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(group_id): Path<String>,
    body: Bytes,
) -> Result<Json<Group>, ApiError> {
    let group_id: GroupId = parse_param(&group_id, "group_id")?;
    let patch: GroupPatch = serde_json::from_slice(&body).map_err(|_| ApiError::invalid("group"))?;
    let group = state.directory.patch_group(&actor, &group_id, &patch).await?;
    Ok(Json(group))
}
