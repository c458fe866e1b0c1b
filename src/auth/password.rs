use bcrypt::{hash, verify};

use crate::error::{AppError, AppResult};

/// bcrypt 工作因子
pub const BCRYPT_COST: u32 = 10;

/// 哈希计算放到阻塞线程池，不占用异步工作线程
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash(password.as_bytes(), BCRYPT_COST))
        .await
        .map_err(|e| AppError::Unexpected(format!("hash task failed: {}", e)))?
        .map_err(|e| AppError::Unexpected(format!("failed to hash password: {}", e)))
}

/// 存储的哈希格式错误时返回 false，不向上抛错
pub async fn verify_password(password: &str, hashed: &str) -> bool {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    match tokio::task::spawn_blocking(move || verify(password.as_bytes(), &hashed)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::warn!("stored password hash is unusable: {}", e);
            false
        }
        Err(e) => {
            tracing::error!("verify task failed: {}", e);
            false
        }
    }
}
