//! HTTP request handlers.

use super::AppState;
use crate::metrics::{Exposition, CONTENT_TYPE};

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Json},
};
use serde::Serialize;

const HOME_TEMPLATE: &str = include_str!("templates/home.html");

pub async fn handle_home() -> impl IntoResponse {
    Html(HOME_TEMPLATE.replace("{{version}}", env!("CARGO_PKG_VERSION")))
}

/// Probe every server and render the results.
pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let _guard = state.scrape_lock.lock().await;

    let mut exposition = Exposition::new();
    state.collector.collect(&mut exposition).await;

    ([(header::CONTENT_TYPE, CONTENT_TYPE)], exposition.render())
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub commit: &'static str,
    pub version: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            commit: option_env!("GIT_COMMIT").unwrap_or(""),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

pub async fn handle_version() -> impl IntoResponse {
    Json(VersionInfo::current())
}
