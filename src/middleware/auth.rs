use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use uuid::Uuid;

use crate::{AppState, error::AppError, models::PrincipalKind};

/// 用户中间件放行后写入请求扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// 管理员中间件放行后写入请求扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminId(pub Uuid);

/// 两类主体都只从 `Authorization: Bearer <token>` 读取令牌
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
}

fn authenticate(state: &AppState, headers: &HeaderMap, kind: PrincipalKind) -> Result<Uuid, AppError> {
    let Some(token) = bearer_token(headers) else {
        tracing::warn!("{:?} route called without bearer token", kind);
        return Err(AppError::Unauthenticated("No token provided".into()));
    };

    match state.tokens.verify(&token, kind) {
        Ok(id) => {
            tracing::debug!("admitted {:?} {}", kind, id);
            Ok(id)
        }
        Err(_) => {
            tracing::warn!("rejected invalid {:?} token", kind);
            Err(AppError::Unauthenticated("Invalid token or expired".into()))
        }
    }
}

pub async fn user_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = authenticate(&state, req.headers(), PrincipalKind::User)?;
    req.extensions_mut().insert(UserId(id));
    Ok(next.run(req).await)
}

pub async fn admin_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = authenticate(&state, req.headers(), PrincipalKind::Admin)?;
    req.extensions_mut().insert(AdminId(id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            bearer_token(&headers("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("abc.def.ghi")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
