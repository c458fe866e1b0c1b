//! 凭据与资源存储
//!
//! 唯一性（同类主体的邮箱、同一用户对同一课程的购买）由存储层原子地保证，
//! 处理函数不再做先查后写的检查。

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use uuid::Uuid;

use crate::models::{
    Course, CourseChanges, NewCourse, NewPrincipal, Principal, PrincipalKind, Purchase,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// 邮箱在该类型内已被使用时返回 `StoreError::Duplicate`
    async fn insert_principal(
        &self,
        kind: PrincipalKind,
        principal: NewPrincipal,
    ) -> Result<Principal, StoreError>;

    async fn find_principal_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<Principal>, StoreError>;

    async fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError>;

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, StoreError>;

    /// 只更新 `creator_id` 匹配的课程；不存在与不属于该管理员都返回 `None`
    async fn update_owned_course(
        &self,
        id: Uuid,
        creator_id: Uuid,
        changes: CourseChanges,
    ) -> Result<Option<Course>, StoreError>;

    /// 返回被删除的课程
    async fn delete_owned_course(
        &self,
        id: Uuid,
        creator_id: Uuid,
    ) -> Result<Option<Course>, StoreError>;

    /// 已购买时返回 `StoreError::Duplicate`
    async fn insert_purchase(&self, user_id: Uuid, course_id: Uuid)
    -> Result<Purchase, StoreError>;

    async fn list_purchases(&self, user_id: Uuid) -> Result<Vec<Purchase>, StoreError>;

    async fn courses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, StoreError>;
}
