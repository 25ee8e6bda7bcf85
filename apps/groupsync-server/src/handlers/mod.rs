//! HTTP handlers, one module per resource.

pub mod groups;
pub mod members;
pub mod syncables;

use std::str::FromStr;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use groupsync_storage::Page;
use serde::Deserialize;

use crate::error::ApiError;

/// Parse a path segment, reporting `field` as the invalid argument.
pub(crate) fn parse_param<T: FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid(field))
}

pub(crate) fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|_| ApiError::invalid("query"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: u32,
    pub per_page: u32,
}

impl PageQuery {
    pub fn to_page(&self) -> Page {
        Page::new(self.page, self.per_page)
    }
}
