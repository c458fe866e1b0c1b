use axum::{
    Extension, Json, Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::{
    AppState,
    middleware::{admin_auth, log_errors, user_auth},
    models::PrincipalKind,
};

pub mod course;
pub mod principal;

#[derive(Serialize)]
pub struct PingResponse {
    pub status: String,
    pub timestamp: i64,
}

/// 健康检查接口
pub async fn ping() -> impl IntoResponse {
    Json(PingResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// 注册、登录、登出对两类主体共用，类型通过 `Extension` 注入
fn principal_routes(kind: PrincipalKind) -> Router<AppState> {
    Router::new()
        .route("/signup", post(principal::signup))
        .route("/login", post(principal::login))
        .route("/logout", get(principal::logout))
        .layer(Extension(kind))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    principal_routes(PrincipalKind::User).route(
        "/purchases",
        get(principal::purchases).route_layer(from_fn_with_state(state.clone(), user_auth)),
    )
}

fn course_routes(state: &AppState) -> Router<AppState> {
    let admin_only = Router::new()
        .route("/create", post(course::create_course))
        .route("/update/{id}", put(course::update_course))
        .route("/delete/{id}", delete(course::delete_course))
        .route_layer(from_fn_with_state(state.clone(), admin_auth));

    let user_only = Router::new()
        .route("/buy/{id}", post(course::buy_course))
        .route_layer(from_fn_with_state(state.clone(), user_auth));

    Router::new()
        .route("/courses", get(course::list_courses))
        .route("/{id}", get(course::course_details))
        .merge(admin_only)
        .merge(user_only)
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .nest("/user", user_routes(&state))
        .nest("/admin", principal_routes(PrincipalKind::Admin))
        .nest("/course", course_routes(&state));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(from_fn(log_errors))
        .with_state(state)
}
