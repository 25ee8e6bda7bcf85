//! Application state, the actor extractor and the route table.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use groupsync_core::{
    AccessPolicy, Authorizer, GroupDirectory, License, LinkageManager, MembershipPager,
};
use groupsync_storage::{GroupStore, SyncableStore, UserId};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::error::ApiError;
use crate::handlers::{groups, members, syncables};
use crate::metrics::track_metrics;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub linkage: Arc<LinkageManager>,
    pub pager: Arc<MembershipPager>,
    pub directory: Arc<GroupDirectory>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, policy: Arc<dyn AccessPolicy>, license: License) -> Self
    where
        S: GroupStore + SyncableStore + 'static,
    {
        let auth = Authorizer::new(policy, license);
        Self {
            linkage: Arc::new(LinkageManager::new(
                store.clone(),
                store.clone(),
                auth.clone(),
            )),
            pager: Arc::new(MembershipPager::new(store.clone(), auth.clone())),
            directory: Arc::new(GroupDirectory::new(store, auth)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// The authenticated caller, taken from the `X-User-Id` header.
#[derive(Clone, Copy, Debug)]
pub struct Actor(pub UserId);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(ApiError::Unauthorized("missing X-User-Id header"))?;
        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .map(Actor)
            .ok_or(ApiError::Unauthorized("malformed X-User-Id header"))
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/v4/groups", get(groups::list_groups))
        .route("/api/v4/groups/:group_id", get(groups::get_group))
        .route("/api/v4/groups/:group_id/patch", put(groups::patch_group))
        .route(
            "/api/v4/groups/:group_id/members",
            get(members::page_group_members),
        )
        .route(
            "/api/v4/groups/:group_id/:syncable_type",
            get(syncables::list_syncables),
        )
        .route(
            "/api/v4/groups/:group_id/:syncable_type/:syncable_id",
            get(syncables::get_syncable),
        )
        .route(
            "/api/v4/groups/:group_id/:syncable_type/:syncable_id/link",
            post(syncables::link).delete(syncables::unlink),
        )
        .route(
            "/api/v4/groups/:group_id/:syncable_type/:syncable_id/patch",
            put(syncables::patch_syncable),
        )
        .route(
            "/api/v4/channels/:channel_id/groups",
            get(members::list_groups_for_channel),
        )
        .route(
            "/api/v4/teams/:team_id/groups",
            get(members::list_groups_for_team),
        )
        .route("/healthz", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics));

    api.with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(|h| h.render())
        .ok_or(StatusCode::NOT_FOUND)
}
