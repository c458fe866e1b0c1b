#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use coursehub::{
    AppState,
    config::{Config, MediaConfig},
    media::{ImageUpload, MediaError, MediaHost, UploadedImage},
    routes,
    store::MemoryStore,
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const BASE: &str = "/api/v1";
const BOUNDARY: &str = "coursehub-test-boundary";

/// 记录上传与删除的假媒体托管
#[derive(Default)]
pub struct FakeMedia {
    pub reject: AtomicBool,
    /// 模拟托管方返回无法解析的响应
    pub malformed: AtomicBool,
    counter: AtomicUsize,
    pub uploaded: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl MediaHost for FakeMedia {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(MediaError::Rejected("Invalid image file".into()));
        }
        if self.malformed.load(Ordering::SeqCst) {
            return Err(MediaError::Malformed("missing public_id".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("courses/{}-{}", n, image.file_name);
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(UploadedImage {
            url: format!("https://media.example.com/{}", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub media: Arc<FakeMedia>,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: Vec<u8>,
}

pub fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: BASE.into(),
        database_url: None,
        jwt_user_secret: "test-user-secret".into(),
        jwt_admin_secret: "test-admin-secret".into(),
        production: false,
        max_upload_bytes: 1024 * 1024,
        media: MediaConfig {
            cloud_name: "test".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        },
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let media = Arc::new(FakeMedia::default());
        let state = AppState::new(config, Arc::new(MemoryStore::new()), media.clone());
        Self {
            router: routes::router(state.clone()),
            state,
            media,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        Response {
            status,
            headers,
            body,
            raw,
        }
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Response {
        self.send(
            Request::post(format!("{}{}", BASE, path))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        self.send(authorized(Request::get(format!("{}{}", BASE, path)), token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> Response {
        self.send(authorized(Request::post(format!("{}{}", BASE, path)), token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Response {
        self.send(
            authorized(Request::delete(format!("{}{}", BASE, path)), token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn multipart(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response {
        let req = Request::builder()
            .method(method)
            .uri(format!("{}{}", BASE, path))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        self.send(
            authorized(req, token)
                .body(Body::from(multipart_body(fields, image)))
                .unwrap(),
        )
        .await
    }

    /// 注册并登录，返回 (token, id)
    pub async fn login_as(&self, kind: &str, email: &str) -> (String, String) {
        let signup = self
            .post_json(
                &format!("/{}/signup", kind),
                json!({
                    "firstName": "Test",
                    "lastName": "Person",
                    "email": email,
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);

        let login = self
            .post_json(
                &format!("/{}/login", kind),
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(login.status, StatusCode::CREATED, "{:?}", login.body);
        (
            login.body["token"].as_str().unwrap().to_string(),
            login.body[kind]["id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_course(&self, admin_token: &str, title: &str) -> Response {
        self.multipart(
            "POST",
            "/course/create",
            Some(admin_token),
            &[("title", title), ("description", "A course"), ("price", "25")],
            Some(("image/png", b"\x89PNG fake")),
        )
        .await
    }
}

fn authorized(
    builder: axum::http::request::Builder,
    token: Option<&str>,
) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cover.png\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn set_cookie(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
