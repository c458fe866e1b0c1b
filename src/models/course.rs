use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// 媒体托管返回的图片标识与地址
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CourseImage {
    #[serde(rename = "id")]
    #[sqlx(rename = "image_public_id")]
    pub public_id: String,
    #[sqlx(rename = "image_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[sqlx(flatten)]
    pub image: CourseImage,
    /// 创建该课程的管理员
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: CourseImage,
    pub creator_id: Uuid,
}

/// 更新课程时的字段；`image` 为空表示保留原图
#[derive(Debug, Clone)]
pub struct CourseChanges {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: Option<CourseImage>,
}

impl Course {
    pub fn apply(&mut self, changes: CourseChanges) {
        self.title = changes.title;
        self.description = changes.description;
        self.price = changes.price;
        if let Some(image) = changes.image {
            self.image = image;
        }
    }
}
