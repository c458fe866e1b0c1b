use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 主体类型：普通用户或管理员
///
/// 每种类型对应独立的表、签名密钥和 Cookie，
/// 注册、登录、登出逻辑只写一份，按类型参数化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Admin,
}

impl PrincipalKind {
    pub fn table(self) -> &'static str {
        match self {
            PrincipalKind::User => "users",
            PrincipalKind::Admin => "admins",
        }
    }

    pub fn cookie_name(self) -> &'static str {
        match self {
            PrincipalKind::User => "jwt",
            PrincipalKind::Admin => "admin_jwt",
        }
    }

    /// 响应体中的字段名
    pub fn key(self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrincipalKind::User => "User",
            PrincipalKind::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}
