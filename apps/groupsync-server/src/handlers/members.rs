//! Membership handlers: group members, groups by channel, groups by team

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use groupsync_core::MemberPage;
use groupsync_storage::{ChannelId, Group, GroupId, GroupSearchOpts, Page, TeamId};
use serde::Deserialize;

use super::{parse_param, query, PageQuery};
use crate::error::ApiError;
use crate::server::{Actor, AppState};

pub async fn page_group_members(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(group_id): Path<String>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<MemberPage>, ApiError> {
    let page = query(params)?.to_page();
    let group_id: GroupId = parse_param(&group_id, "group_id")?;
    let members = state
        .pager
        .page_group_members(&actor, &group_id, page)
        .await?;
    Ok(Json(members))
}

pub async fn list_groups_for_channel(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(channel_id): Path<String>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let page = query(params)?.to_page();
    let channel_id: ChannelId = parse_param(&channel_id, "channel_id")?;
    let groups = state
        .pager
        .list_groups_for_channel(&actor, &channel_id, page)
        .await?;
    Ok(Json(groups))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamGroupsQuery {
    pub q: Option<String>,
    pub include_member_count: bool,
    pub not_associated_to_team: Option<TeamId>,
    pub include_deleted: bool,
    pub paginate: Option<bool>,
    pub page: u32,
    pub per_page: u32,
}

pub async fn list_groups_for_team(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(team_id): Path<String>,
    params: Result<Query<TeamGroupsQuery>, QueryRejection>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let params = query(params)?;
    let team_id: TeamId = parse_param(&team_id, "team_id")?;
    let opts = GroupSearchOpts {
        q: params.q,
        include_member_count: params.include_member_count,
        not_associated_to_team: params.not_associated_to_team,
        include_deleted: params.include_deleted,
        paginate: params.paginate,
    };
    let groups = state
        .pager
        .list_groups_for_team(
            &actor,
            &team_id,
            Page::new(params.page, params.per_page),
            &opts,
        )
        .await?;
    Ok(Json(groups))
}
