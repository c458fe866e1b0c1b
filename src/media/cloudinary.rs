use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ImageUpload, MediaError, MediaHost, UploadedImage};
use crate::config::MediaConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: Option<String>,
    secure_url: Option<String>,
    url: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<ApiErrorBody>,
}

/// Cloudinary 签名上传客户端
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: MediaConfig,
    api_base: String,
}

/// 参数按名称排序后以 `k=v&k=v` 拼接，再接上密钥做 SHA-256
pub(crate) fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl CloudinaryClient {
    pub fn new(config: MediaConfig) -> Self {
        Self::with_base(config, API_BASE)
    }

    pub fn with_base(config: MediaConfig, api_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base, self.config.cloud_name, action)
    }

    fn signed_form(&self, params: Vec<(&'static str, String)>) -> Form {
        let signature = sign(&params, &self.config.api_secret);
        params
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }
}

#[async_trait::async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let file = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = self
            .signed_form(vec![("timestamp", timestamp)])
            .part("file", file);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body: UploadResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(MediaError::Rejected(error.message));
        }
        if !status.is_success() {
            return Err(MediaError::Rejected(format!("status {}", status)));
        }

        let public_id = body
            .public_id
            .ok_or_else(|| MediaError::Malformed("missing public_id".into()))?;
        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| MediaError::Malformed("missing url".into()))?;

        tracing::info!("uploaded image {}", public_id);
        Ok(UploadedImage { public_id, url })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let form = self.signed_form(vec![
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
        ]);

        let body: DestroyResponse = self
            .http
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.error {
            return Err(MediaError::Rejected(error.message));
        }
        match body.result.as_deref() {
            Some("ok") | Some("not found") => Ok(()),
            other => Err(MediaError::Malformed(format!("destroy result {:?}", other))),
        }
    }
}
