use std::sync::Arc;

use config::Config;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod media;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use auth::TokenService;
use media::MediaHost;
use store::Store;

/// 进程级共享状态，启动时构造一次后只读
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn MediaHost>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, media: Arc<dyn MediaHost>) -> Self {
        let tokens = Arc::new(TokenService::new(&config));
        Self {
            config: Arc::new(config),
            tokens,
            store,
            media,
        }
    }
}
