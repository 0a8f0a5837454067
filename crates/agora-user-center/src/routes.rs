// SPDX-FileCopyrightText: 2026 Agora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Endpoints the user center attaches to the host router, one set per trust tier.
//!
//! - unauthenticated: `GET /user-center/{slug}/login` redirects to the directory login page
//! - authenticated user: `GET /user-center/{slug}/profile` redirects to the profile page
//! - administrator: `GET /user-center/{slug}/status` reports configuration state

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use agora_core::{ConfigSlot, PluginConfig};

use crate::RemoteUserCenterConfig;

#[derive(Clone)]
pub(crate) struct RouteState {
    pub slug: String,
    pub config: Arc<ConfigSlot<RemoteUserCenterConfig>>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct StatusBody {
    slug: String,
    configured: bool,
    endpoint: String,
    has_api_key: bool,
}

fn base_path(slug: &str) -> String {
    format!("/user-center/{slug}")
}

fn redirect_or_unavailable(target: &str, what: &str) -> Response {
    if target.is_empty() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody {
                error: format!("{what} is not configured"),
            }),
        )
            .into_response()
    } else {
        Redirect::temporary(target).into_response()
    }
}

async fn login(State(state): State<RouteState>) -> Response {
    redirect_or_unavailable(&state.config.load().login_url, "login_url")
}

async fn profile(State(state): State<RouteState>) -> Response {
    redirect_or_unavailable(&state.config.load().profile_url, "profile_url")
}

async fn status(State(state): State<RouteState>) -> Json<StatusBody> {
    let config = state.config.load();
    Json(StatusBody {
        slug: state.slug.clone(),
        configured: config.is_configured(),
        endpoint: config.endpoint.clone(),
        has_api_key: !config.api_key.is_empty(),
    })
}

pub(crate) fn unauth(router: Router, state: RouteState) -> Router {
    let routes = Router::new()
        .route(&format!("{}/login", base_path(&state.slug)), get(login))
        .with_state(state);
    router.merge(routes)
}

pub(crate) fn auth_user(router: Router, state: RouteState) -> Router {
    let routes = Router::new()
        .route(&format!("{}/profile", base_path(&state.slug)), get(profile))
        .with_state(state);
    router.merge(routes)
}

pub(crate) fn auth_admin(router: Router, state: RouteState) -> Router {
    let routes = Router::new()
        .route(&format!("{}/status", base_path(&state.slug)), get(status))
        .with_state(state);
    router.merge(routes)
}
