mod authentication;
pub mod config;
mod data_formats;
pub mod db_helpers;
mod errors;
mod handlers;
pub mod models;
pub mod page_cache;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use data_formats::*;
use handlers::*;
use page_cache::PageCache;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr) -> Result<()> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = init_db(&db_url).await?;
    let cache = Arc::new(PageCache::new(config::page_cache_ttl()));
    serve(app, db, cache, address).await
}

/// Wires the shared state into the router and runs the server. Tests call
/// this directly so they can keep handles to the pool and the page cache.
pub async fn serve(
    app: Router,
    db: SqlitePool,
    cache: Arc<PageCache>,
    address: SocketAddr,
) -> Result<()> {
    let app = app
        .layer(Extension(Arc::new(db)))
        .layer(Extension(cache));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(db_url).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/about/author", get(about_author))
        .route("/about/tech", get(about_tech))
        .route("/users", post(register_user))
        .route("/users/login", post(login_user))
        .route("/user", get(get_current_user))
        .route("/posts", get(index).post(post_create))
        .route("/posts/:id", get(post_detail).put(post_edit))
        .route("/posts/:id/comments", get(post_comments).post(add_comment))
        .route("/groups/:slug/posts", get(group_posts))
        .route("/profiles/:username", get(profile))
        .route("/profiles/:username/posts", get(profile_posts))
        .route(
            "/profiles/:username/follow",
            post(profile_follow).delete(profile_unfollow),
        )
        .route("/feed", get(follow_index))
        .fallback(not_found)
}
