use axum::http::{Method, StatusCode};
use groupsync_core::{Capability, GrantTable, License};
use groupsync_storage::{ChannelId, TeamId, UserId};

use crate::tests::common::{test_app, test_app_with};

#[tokio::test]
async fn link_unlink_relink_over_http() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    let team = TeamId::new();
    let link = format!("/api/v4/groups/{}/teams/{}/link", g.id, team);

    let (status, body) = app
        .as_admin(Method::POST, &link, Some(r#"{"auto_add": true}"#))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["auto_add"], true);
    assert_eq!(body["type"], "team");
    assert_eq!(body["syncable_id"], team.to_string());
    assert!(body["deleted_at"].is_null());
    let created_at = body["created_at"].clone();

    let (status, body) = app.as_admin(Method::DELETE, &link, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let get = format!("/api/v4/groups/{}/teams/{}", g.id, team);
    let (status, _) = app.as_admin(Method::GET, &get, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .as_admin(Method::POST, &link, Some(r#"{"auto_add": false}"#))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["auto_add"], false);
    assert_eq!(body["created_at"], created_at);

    let (status, body) = app.as_admin(Method::GET, &get, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["deleted_at"].is_null());
}

#[tokio::test]
async fn link_without_body_uses_empty_patch() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    let uri = format!("/api/v4/groups/{}/channels/{}/link", g.id, ChannelId::new());

    let (status, body) = app.as_admin(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["auto_add"], false);
    assert_eq!(body["scheme_admin"], false);
}

#[tokio::test]
async fn malformed_bodies_name_the_expected_payload() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    let team = TeamId::new();

    let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, team);
    let (status, body) = app.as_admin(Method::POST, &uri, Some("{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["id"], "invalid_argument");
    assert_eq!(body["message"], "invalid argument: GroupTeam");

    let uri = format!("/api/v4/groups/{}/channels/{}/patch", g.id, ChannelId::new());
    let (status, body) = app
        .as_admin(Method::PUT, &uri, Some(r#"{"auto_add": "yes"}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: Group[Channel]Patch");
    assert_eq!(body["status_code"], 400);
}

#[tokio::test]
async fn patch_of_missing_link_is_404() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    let uri = format!("/api/v4/groups/{}/teams/{}/patch", g.id, TeamId::new());

    let (status, body) = app
        .as_admin(Method::PUT, &uri, Some(r#"{"scheme_admin": true}"#))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["id"], "not_found");
}

#[tokio::test]
async fn patch_updates_flags_and_list_shows_active_only() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    let keep = TeamId::new();
    let drop = TeamId::new();
    for team in [keep, drop] {
        let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, team);
        app.as_admin(Method::POST, &uri, None).await;
    }
    let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, drop);
    app.as_admin(Method::DELETE, &uri, None).await;

    let uri = format!("/api/v4/groups/{}/teams/{}/patch", g.id, keep);
    let (status, body) = app
        .as_admin(Method::PUT, &uri, Some(r#"{"scheme_admin": true}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scheme_admin"], true);
    assert_eq!(body["auto_add"], false);

    let (status, body) = app
        .as_admin(Method::GET, &format!("/api/v4/groups/{}/teams", g.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["syncable_id"], keep.to_string());
}

#[tokio::test]
async fn team_lead_can_link_but_not_unlink() {
    let lead = UserId::new();
    let team = TeamId::new();
    let app = test_app_with(
        GrantTable::default().with_team_grant(lead, team, [Capability::ManageTeam]),
        License::with_ldap_groups(),
    )
    .await;
    let g = app.group("eng", "Engineering").await;
    let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, team);

    let (status, _) = app.send(Method::POST, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "permission denied: requires manage_system");

    // A team grant does not open channels.
    let uri = format!("/api/v4/groups/{}/channels/{}/link", g.id, ChannelId::new());
    let (status, body) = app.send(Method::POST, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "permission denied: requires manage_public_channel_members"
    );
}

#[tokio::test]
async fn unlicensed_link_is_501() {
    let app = test_app_with(GrantTable::default(), License::default()).await;
    let g = app.group("eng", "Engineering").await;
    let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, TeamId::new());

    let (status, body) = app.as_admin(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["id"], "not_implemented");
}

#[tokio::test]
async fn bad_path_segments_are_400() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;

    let uri = format!("/api/v4/groups/{}/teams/not-a-uuid/link", g.id);
    let (status, body) = app.as_admin(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: syncable_id");

    let uri = format!("/api/v4/groups/{}/users/{}/link", g.id, TeamId::new());
    let (status, body) = app.as_admin(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: syncable_type");
}

#[tokio::test]
async fn link_to_unknown_group_is_404() {
    let app = test_app().await;
    let uri = format!(
        "/api/v4/groups/{}/teams/{}/link",
        groupsync_storage::GroupId::new(),
        TeamId::new()
    );
    let (status, body) = app.as_admin(Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().starts_with("group not found"));
}
