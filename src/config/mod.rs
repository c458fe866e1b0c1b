use std::env;
use std::time::Duration;

/// 令牌有效期固定为 24 小时
pub const TOKEN_TTL_SECS: u64 = 24 * 3600;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing or invalid environment variable {name}: {source}")]
    Var {
        name: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("JWT_USER_SECRET and JWT_ADMIN_SECRET must differ")]
    SharedSecret,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// 为空时使用内存存储
    pub database_url: Option<String>,
    pub jwt_user_secret: String,
    pub jwt_admin_secret: String,
    pub production: bool,
    pub max_upload_bytes: usize,
    pub media: MediaConfig,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|source| ConfigError::Var { name, source })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api/v1".into()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_user_secret: required("JWT_USER_SECRET")?,
            jwt_admin_secret: required("JWT_ADMIN_SECRET")?,
            production: env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production")),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            media: MediaConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
            },
        };
        config.check()?;
        Ok(config)
    }

    /// 用户密钥与管理员密钥相同时，两类令牌可以互相冒用
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.jwt_user_secret == self.jwt_admin_secret {
            return Err(ConfigError::SharedSecret);
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(TOKEN_TTL_SECS)
    }
}
