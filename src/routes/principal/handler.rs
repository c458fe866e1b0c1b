use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{Value, json};

use super::model::{LoginRequest, PurchasesResponse, SignupRequest, signup_schema};
use crate::{
    AppState,
    auth::{hash_password, verify_password},
    error::{AppError, AppResult},
    extract::ApiJson,
    middleware::UserId,
    models::{NewPrincipal, PrincipalKind},
    store::StoreError,
};

/// 邮箱比较不区分大小写
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_cookie(kind: PrincipalKind, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((kind.cookie_name(), token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::hours(24))
        .build()
}

#[axum::debug_handler]
pub async fn signup(
    Extension(kind): Extension<PrincipalKind>,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<impl IntoResponse> {
    let req: SignupRequest = signup_schema()
        .parse(&body)
        .into_result()
        .map_err(AppError::Validation)?;

    let password_hash = hash_password(&req.password).await?;
    let principal = state
        .store
        .insert_principal(
            kind,
            NewPrincipal {
                first_name: req.first_name,
                last_name: req.last_name,
                email: normalize_email(&req.email),
                password_hash,
            },
        )
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => AppError::Conflict(format!("{} already exists", kind.label())),
            other => other.into(),
        })?;

    tracing::info!("{:?} {} signed up", kind, principal.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Signup succeeded",
            kind.key(): principal,
        })),
    ))
}

/// 邮箱不存在与密码错误返回完全相同的响应
#[axum::debug_handler]
pub async fn login(
    Extension(kind): Extension<PrincipalKind>,
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let principal = state
        .store
        .find_principal_by_email(kind, &normalize_email(&req.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &principal.password_hash).await {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(principal.id, kind)?;
    let jar = jar.add(session_cookie(kind, token.clone(), state.config.production));

    tracing::info!("{:?} {} logged in", kind, principal.id);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "Login successful",
            kind.key(): principal,
            "token": token,
        })),
    ))
}

/// 无论是否携带 Cookie 都清除并返回成功；服务端不吊销令牌
#[axum::debug_handler]
pub async fn logout(
    Extension(kind): Extension<PrincipalKind>,
    jar: CookieJar,
) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(kind.cookie_name()).path("/"));
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-store")],
        jar,
        Json(json!({ "message": "Logged out successfully" })),
    )
}

#[axum::debug_handler]
pub async fn purchases(
    Extension(UserId(user_id)): Extension<UserId>,
    State(state): State<AppState>,
) -> AppResult<Json<PurchasesResponse>> {
    let purchases = state.store.list_purchases(user_id).await?;
    let ids: Vec<_> = purchases.iter().map(|p| p.course_id).collect();
    let courses = state.store.courses_by_ids(&ids).await?;
    Ok(Json(PurchasesResponse { purchases, courses }))
}
