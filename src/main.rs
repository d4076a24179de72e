use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use gas_admin_service::application::realtime::ChangeFeed;
use gas_admin_service::config::AppConfig;
use gas_admin_service::infrastructure::change_feed::spawn_change_poller;
use gas_admin_service::infrastructure::identity::JwtIdentity;
use gas_admin_service::infrastructure::storage::FsObjectStorage;
use gas_admin_service::infrastructure::DieselStore;
use gas_admin_service::{build_server, create_pool, run_migrations, Adapters, AppState};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;

    let pool = create_pool(&config.database_url, config.db_pool_size).map_err(startup_error)?;
    if config.run_migrations {
        run_migrations(&pool).map_err(startup_error)?;
    }

    let store = DieselStore::new(pool);
    let feed = ChangeFeed::new();
    spawn_change_poller(store.clone(), feed.clone(), config.change_feed_poll);

    let identity = Arc::new(JwtIdentity::new(
        config.jwt_secret.as_bytes(),
        &config.jwt_audience,
    ));
    let storage = Arc::new(FsObjectStorage::new(
        &config.storage_root,
        &config.public_storage_url,
    ));
    let state = web::Data::new(AppState::new(
        Adapters::diesel(store, identity, storage),
        feed,
        config.report_offset,
    ));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
