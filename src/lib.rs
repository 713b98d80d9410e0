//! A minimal personal blog.
//!
//! Anyone can read posts, newest or oldest first, and filter them by category.
//! A single admin, whose credentials live in the config file, can log in to
//! write posts, add categories and delete posts. Everything is stored in two
//! SQLite tables; each request opens its own connection.

use axum::{
    routing::{get, post},
    Router,
};
use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tower_cookies::CookieManagerLayer;
use tracing::info;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

use config::Config;
use state::AppState;

/// Build the full application: routes, session handling and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::show_entries))
        .route("/add", post(routes::add_entry))
        .route("/add_category", post(routes::add_category))
        .route("/del/:entry_id", get(routes::delete_entry))
        .route("/login", get(routes::login_form).post(routes::login))
        .route("/logout", get(routes::logout).post(routes::logout))
        .route("/new_post", get(routes::new_post))
        .route("/new_category", get(routes::new_category))
        .route("/view_category/:category", get(routes::view_category))
        .route("/favicon.ico", get(routes::favicon))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let address = config.bind_address.clone();
    let router = app(AppState::new(config));

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
