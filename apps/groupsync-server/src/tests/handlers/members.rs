use axum::http::{Method, StatusCode};
use groupsync_core::{Capability, GrantTable, License};
use groupsync_storage::{ChannelId, TeamId, UserId};

use crate::tests::common::{test_app, test_app_with};

#[tokio::test]
async fn member_pages_carry_total_count() {
    let app = test_app().await;
    let g = app.group("eng", "Engineering").await;
    for name in ["carol", "alice", "bob"] {
        app.member(&g, name).await;
    }

    let uri = format!("/api/v4/groups/{}/members?page=1&per_page=2", g.id);
    let (status, body) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_member_count"], 3);
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["username"], "carol");

    let (status, _) = app.send(Method::GET, &uri, Some(&UserId::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn groups_for_channel() {
    let app = test_app().await;
    let channel = ChannelId::new();
    for (name, display) in [("b", "Bravo"), ("a", "Alpha")] {
        let g = app.group(name, display).await;
        let uri = format!("/api/v4/groups/{}/channels/{}/link", g.id, channel);
        app.as_admin(Method::POST, &uri, None).await;
    }

    let uri = format!("/api/v4/channels/{}/groups", channel);
    let (status, body) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["display_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha", "Bravo"]);
}

#[tokio::test]
async fn groups_for_team_paginate_false_returns_everything() {
    let lead = UserId::new();
    let team = TeamId::new();
    let app = test_app_with(
        GrantTable::default().with_team_grant(lead, team, [Capability::ManageTeam]),
        License::with_ldap_groups(),
    )
    .await;
    for name in ["a", "b", "c"] {
        let g = app.group(name, &name.to_uppercase()).await;
        let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, team);
        app.send(Method::POST, &uri, Some(&lead), None).await;
    }

    let uri = format!("/api/v4/teams/{}/groups?per_page=1", team);
    let (status, body) = app.send(Method::GET, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let uri = format!("/api/v4/teams/{}/groups?per_page=1&paginate=false", team);
    let (status, body) = app.send(Method::GET, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let other = format!("/api/v4/teams/{}/groups", TeamId::new());
    let (status, _) = app.send(Method::GET, &other, Some(&lead), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn groups_for_team_query_filters_are_wired() {
    let app = test_app().await;
    let t1 = TeamId::new();
    let t2 = TeamId::new();
    let a = app.group("a", "Alpha").await;
    let b = app.group("b", "Bravo").await;
    for (g, team) in [(&a, t1), (&b, t1), (&a, t2)] {
        let uri = format!("/api/v4/groups/{}/teams/{}/link", g.id, team);
        app.as_admin(Method::POST, &uri, None).await;
    }

    let uri = format!("/api/v4/teams/{}/groups?not_associated_to_team={}", t1, t2);
    let (status, body) = app.as_admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "b");

    let lead = UserId::new();
    let lead_app = test_app_with(
        GrantTable::default().with_team_grant(lead, t1, [Capability::ManageTeam]),
        License::with_ldap_groups(),
    )
    .await;
    let uri = format!("/api/v4/teams/{}/groups?include_deleted=true", t1);
    let (status, body) = lead_app.send(Method::GET, &uri, Some(&lead), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "permission denied: requires manage_system");
}
