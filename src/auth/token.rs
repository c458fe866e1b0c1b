use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::PrincipalKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

/// 签名不匹配与已过期不做区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid or expired token")]
pub struct InvalidToken;

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// 按主体类型分别签发和校验令牌
///
/// 用户令牌与管理员令牌使用不同密钥，
/// 一种类型的令牌永远不能通过另一种类型的校验。
/// 服务端不保存吊销列表，登出后令牌仍然有效直到过期。
pub struct TokenService {
    user: KeyPair,
    admin: KeyPair,
    ttl_secs: i64,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            user: KeyPair::from_secret(&config.jwt_user_secret),
            admin: KeyPair::from_secret(&config.jwt_admin_secret),
            ttl_secs: config.token_ttl().as_secs() as i64,
            validation,
        }
    }

    fn keys(&self, kind: PrincipalKind) -> &KeyPair {
        match kind {
            PrincipalKind::User => &self.user,
            PrincipalKind::Admin => &self.admin,
        }
    }

    pub fn issue(&self, principal_id: Uuid, kind: PrincipalKind) -> Result<String, AppError> {
        self.issue_at(principal_id, kind, Utc::now())
    }

    pub fn issue_at(
        &self,
        principal_id: Uuid,
        kind: PrincipalKind,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            id: principal_id.to_string(),
            iat: issued_at.timestamp(),
            exp: issued_at.timestamp() + self.ttl_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(kind).encoding,
        )
        .map_err(|e| AppError::Unexpected(format!("failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str, kind: PrincipalKind) -> Result<Uuid, InvalidToken> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|_| InvalidToken)?;

        // jsonwebtoken 在 exp == now 时仍视为有效
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(InvalidToken);
        }

        Uuid::parse_str(&data.claims.id).map_err(|_| InvalidToken)
    }
}
