use std::sync::Arc;

use tower_cookies::Key;

use crate::auth::session_key;
use crate::config::Config;
use crate::views::{HtmlRenderer, Renderer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub renderer: Arc<dyn Renderer>,
    /// Signs the session cookie; derived from `config.secret_key`.
    pub session_key: Key,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_renderer(config, HtmlRenderer)
    }

    pub fn with_renderer(config: Config, renderer: impl Renderer + 'static) -> Self {
        let session_key = session_key(&config.secret_key);
        Self {
            config: Arc::new(config),
            renderer: Arc::new(renderer),
            session_key,
        }
    }
}
