//! Common test helpers for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use groupsync_core::{GrantTable, License};
use groupsync_storage::{
    CreateGroupParams, CreateUserParams, Group, GroupSource, GroupStore, User, UserId,
};
use groupsync_store_sqlite::SqliteStore;
use serde_json::Value;
use tower::ServiceExt;

use crate::server::{router, AppState, USER_ID_HEADER};

pub struct TestApp {
    pub store: Arc<SqliteStore>,
    pub router: Router,
    pub admin: UserId,
}

/// Licensed app where `admin` is a system admin on top of `grants`.
pub async fn test_app_with(grants: GrantTable, license: License) -> TestApp {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let admin = UserId::new();
    let grants = grants.with_system_admin(admin);
    let state = AppState::new(store.clone(), Arc::new(grants), license);
    TestApp {
        store,
        router: router(state),
        admin,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(GrantTable::default(), License::with_ldap_groups()).await
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        actor: Option<&UserId>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            req = req.header(USER_ID_HEADER, actor.to_string());
        }
        let req = req
            .header("content-type", "application/json")
            .body(Body::from(body.unwrap_or_default().to_string()))
            .unwrap();

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn as_admin(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        self.send(method, uri, Some(&self.admin), body).await
    }

    pub async fn group(&self, name: &str, display_name: &str) -> Group {
        self.store
            .create_group(&CreateGroupParams {
                name: name.to_string(),
                display_name: display_name.to_string(),
                description: None,
                source: GroupSource::Ldap,
                remote_id: format!("cn={},ou=groups", name),
            })
            .await
            .unwrap()
    }

    pub async fn member(&self, group: &Group, username: &str) -> User {
        let user = self
            .store
            .create_user(&CreateUserParams {
                username: username.to_string(),
                email: format!("{}@example.com", username),
            })
            .await
            .unwrap();
        self.store.add_group_member(&group.id, &user.id).await.unwrap();
        user
    }
}
