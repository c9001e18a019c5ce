//! # Rusty-Press Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use rp_api::handlers::AppState;
use std::sync::Arc;
use std::time::Duration;

// Feature-gated imports: the binary is compiled to order from plugins.
#[cfg(feature = "db-sqlite")]
use rp_db_sqlite::SqliteBlogRepo;

#[cfg(feature = "storage-local")]
use rp_storage_local::LocalMediaStore;

#[cfg(feature = "auth-session")]
use rp_auth_session::SessionAuthProvider;

#[cfg(feature = "cache-memory")]
use rp_cache_memory::MemoryPageCache;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let bind = env_or("RP_BIND", "127.0.0.1:8080");
    let database_url = env_or("RP_DATABASE_URL", "sqlite:rusty_press.db");
    let upload_dir = env_or("RP_UPLOAD_DIR", "./data/uploads");
    let cache_ttl_secs: u64 = env_or("RP_CACHE_TTL_SECS", "20").parse().unwrap_or(20);
    let session_ttl_secs: i64 = env_or("RP_SESSION_TTL_SECS", "1209600") // 14 days
        .parse()
        .unwrap_or(1_209_600);
    let session_secret = std::env::var("RP_SESSION_SECRET").unwrap_or_else(|_| {
        log::warn!("RP_SESSION_SECRET not set; sessions will not survive a restart");
        uuid::Uuid::new_v4().to_string()
    });

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteBlogRepo::new(&database_url)
        .await
        .expect("Failed to init SQLite");

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let store = LocalMediaStore::new(upload_dir.clone().into(), "/static/media".into());

    // 3. Initialize Auth Implementation
    #[cfg(feature = "auth-session")]
    let auth = SessionAuthProvider::new(&session_secret, session_ttl_secs);

    // 4. Initialize Page Cache Implementation
    #[cfg(feature = "cache-memory")]
    let cache = MemoryPageCache::new(Duration::from_secs(cache_ttl_secs));

    let state = web::Data::new(AppState {
        repo: Arc::new(repo),
        store: Arc::new(store),
        auth: Arc::new(auth),
        cache: Arc::new(cache),
    });

    log::info!("🚀 Rusty-Press starting on http://{bind}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(rp_api::middleware::standard_middleware())
            .wrap(rp_api::middleware::security_headers())
            .service(actix_files::Files::new("/static/media", upload_dir.as_str()))
            .configure(rp_api::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
