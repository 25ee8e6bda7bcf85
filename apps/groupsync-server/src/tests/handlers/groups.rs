use axum::http::{Method, StatusCode};
use groupsync_core::{Capability, GrantTable, License};
use groupsync_storage::{TeamId, UserId};

use crate::tests::common::{test_app, test_app_with};

#[tokio::test]
async fn requests_without_actor_are_401() {
    let app = test_app().await;
    let (status, body) = app.send(Method::GET, "/api/v4/groups", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["id"], "unauthorized");
    assert_eq!(body["status_code"], 401);
}

#[tokio::test]
async fn malformed_actor_is_401() {
    let app = test_app().await;
    let req = axum::http::Request::builder()
        .uri("/api/v4/groups")
        .header(crate::server::USER_ID_HEADER, "bob")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = tower::ServiceExt::oneshot(app.router.clone(), req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_groups_search_and_member_count() {
    let app = test_app().await;
    let eng = app.group("eng", "Engineering").await;
    app.group("ops", "Operations").await;
    app.member(&eng, "alice").await;

    let anyone = UserId::new();
    let (status, body) = app
        .send(Method::GET, "/api/v4/groups?q=neer", Some(&anyone), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "eng");
    assert!(groups[0].get("member_count").is_none());

    let (_, body) = app
        .send(
            Method::GET,
            "/api/v4/groups?include_member_count=true&per_page=1",
            Some(&anyone),
            None,
        )
        .await;
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["display_name"], "Engineering");
    assert_eq!(groups[0]["member_count"], 1);
}

#[tokio::test]
async fn not_associated_filter_needs_team_capability() {
    let lead = UserId::new();
    let team = TeamId::new();
    let app = test_app_with(
        GrantTable::default().with_team_grant(lead, team, [Capability::ManageTeam]),
        License::with_ldap_groups(),
    )
    .await;
    let eng = app.group("eng", "Engineering").await;
    app.group("ops", "Operations").await;
    let link = format!("/api/v4/groups/{}/teams/{}/link", eng.id, team);
    app.send(Method::POST, &link, Some(&lead), None).await;

    let uri = format!("/api/v4/groups?not_associated_to_team={}", team);
    let (status, body) = app.send(Method::GET, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["ops"]);

    let (status, _) = app
        .send(Method::GET, &uri, Some(&UserId::new()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bad_query_is_400() {
    let app = test_app().await;
    let (status, body) = app
        .as_admin(Method::GET, "/api/v4/groups?page=-1", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: query");
}

#[tokio::test]
async fn get_and_patch_group() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    let uri = format!("/api/v4/groups/{}", g.id);

    let (status, body) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "ldap");

    let (status, _) = app.send(Method::GET, &uri, Some(&UserId::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let patch = format!("/api/v4/groups/{}/patch", g.id);
    let (status, body) = app
        .as_admin(
            Method::PUT,
            &patch,
            Some(r#"{"display_name": "Eng", "description": "builders"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Eng");
    assert_eq!(body["description"], "builders");

    let (status, body) = app
        .as_admin(Method::PUT, &patch, Some(r#"{"display_name": ""}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: display_name");

    let (status, body) = app.as_admin(Method::PUT, &patch, Some("[]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: group");
}

#[tokio::test]
async fn unknown_group_is_404_and_bad_id_is_400() {
    let app = test_app().await;
    let uri = format!("/api/v4/groups/{}", groupsync_storage::GroupId::new());
    let (status, _) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.as_admin(Method::GET, "/api/v4/groups/123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid argument: group_id");
}

#[tokio::test]
async fn health_and_metrics_routes() {
    let app = test_app().await;
    let (status, _) = app.send(Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // No recorder is installed in tests.
    let (status, _) = app.send(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
