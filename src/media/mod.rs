//! 第三方图片托管

mod cloudinary;

pub use cloudinary::CloudinaryClient;

/// 课程封面只接受这两种格式
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// 托管方明确拒绝了请求
    #[error("upload rejected: {0}")]
    Rejected(String),
    #[error("media host unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected media host response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub public_id: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError>;

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;
}

pub fn is_allowed_image(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

impl From<UploadedImage> for crate::models::CourseImage {
    fn from(image: UploadedImage) -> Self {
        Self {
            public_id: image.public_id,
            url: image.url,
        }
    }
}
