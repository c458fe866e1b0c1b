use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    Course, CourseChanges, NewCourse, NewPrincipal, Principal, PrincipalKind, Purchase,
};

const SCHEMA: &str = include_str!("../../migrations/schema.sql");

const COURSE_COLUMNS: &str =
    "id, title, description, price, image_public_id, image_url, creator_id, created_at";

const PRINCIPAL_COLUMNS: &str = "id, first_name, last_name, email, password_hash";

/// Postgres 存储，唯一性依赖表上的唯一索引
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn map_unique(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
        _ => StoreError::Database(e),
    }
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'coursehub';").await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.bootstrap().await?;
        Ok(store)
    }

    /// 建表语句均为 IF NOT EXISTS，可重复执行
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("database schema is ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn insert_principal(
        &self,
        kind: PrincipalKind,
        principal: NewPrincipal,
    ) -> Result<Principal, StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, first_name, last_name, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {}",
            kind.table(),
            PRINCIPAL_COLUMNS
        );

        sqlx::query_as::<_, Principal>(&sql)
            .bind(Uuid::new_v4())
            .bind(&principal.first_name)
            .bind(&principal.last_name)
            .bind(&principal.email)
            .bind(&principal.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique)?
            .ok_or(StoreError::Duplicate)
    }

    async fn find_principal_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<Principal>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1",
            PRINCIPAL_COLUMNS,
            kind.table()
        );

        Ok(sqlx::query_as::<_, Principal>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        let sql = format!(
            "INSERT INTO courses (id, title, description, price, image_public_id, image_url, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            COURSE_COLUMNS
        );

        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(Uuid::new_v4())
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.price)
            .bind(&course.image.public_id)
            .bind(&course.image.url)
            .bind(course.creator_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let sql = format!("SELECT {} FROM courses ORDER BY created_at", COURSE_COLUMNS);
        Ok(sqlx::query_as::<_, Course>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let sql = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_owned_course(
        &self,
        id: Uuid,
        creator_id: Uuid,
        changes: CourseChanges,
    ) -> Result<Option<Course>, StoreError> {
        let (image_public_id, image_url) = match changes.image {
            Some(image) => (Some(image.public_id), Some(image.url)),
            None => (None, None),
        };
        let sql = format!(
            "UPDATE courses \
             SET title = $3, description = $4, price = $5, \
                 image_public_id = COALESCE($6, image_public_id), \
                 image_url = COALESCE($7, image_url) \
             WHERE id = $1 AND creator_id = $2 \
             RETURNING {}",
            COURSE_COLUMNS
        );

        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(creator_id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.price)
            .bind(image_public_id)
            .bind(image_url)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_owned_course(
        &self,
        id: Uuid,
        creator_id: Uuid,
    ) -> Result<Option<Course>, StoreError> {
        let sql = format!(
            "DELETE FROM courses WHERE id = $1 AND creator_id = $2 RETURNING {}",
            COURSE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(creator_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_purchase(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Purchase, StoreError> {
        sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (id, user_id, course_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING id, user_id, course_id, purchased_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique)?
        .ok_or(StoreError::Duplicate)
    }

    async fn list_purchases(&self, user_id: Uuid) -> Result<Vec<Purchase>, StoreError> {
        Ok(sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, user_id, course_id, purchased_at
            FROM purchases
            WHERE user_id = $1
            ORDER BY purchased_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn courses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, StoreError> {
        let sql = format!("SELECT {} FROM courses WHERE id = ANY($1)", COURSE_COLUMNS);
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }
}
