pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::FixedOffset;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::entity_service::EntityService;
use application::order_service::OrderService;
use application::raffle_service::RaffleService;
use application::realtime::ChangeFeed;
use application::report_service::ReportService;
use application::session::Authenticator;
use application::support::SupportService;
use application::user_service::UserService;
use domain::catalog::{Accessory, Product};
use domain::errors::DomainError;
use domain::marketing::{Notification, Partner, RedemptionLevel};
use domain::ports::{
    EntityRepository, IdentityProvider, ObjectStorage, OrderRepository, RaffleRepository,
    SupportDesk, UserDirectory,
};
use infrastructure::DieselStore;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Internal(format!("migrations failed: {e}")))?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Port implementations the services are wired to.
pub struct Adapters {
    pub identity: Arc<dyn IdentityProvider>,
    pub users: Arc<dyn UserDirectory>,
    pub products: Arc<dyn EntityRepository<Product>>,
    pub accessories: Arc<dyn EntityRepository<Accessory>>,
    pub notifications: Arc<dyn EntityRepository<Notification>>,
    pub partners: Arc<dyn EntityRepository<Partner>>,
    pub redemption_levels: Arc<dyn EntityRepository<RedemptionLevel>>,
    pub orders: Arc<dyn OrderRepository>,
    pub raffles: Arc<dyn RaffleRepository>,
    pub support: Arc<dyn SupportDesk>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Adapters {
    /// Every record port backed by the same diesel store.
    pub fn diesel(
        store: DieselStore,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            identity,
            users: store.clone(),
            products: store.clone(),
            accessories: store.clone(),
            notifications: store.clone(),
            partners: store.clone(),
            redemption_levels: store.clone(),
            orders: store.clone(),
            raffles: store.clone(),
            support: store,
            storage,
        }
    }
}

/// Composition root shared by every worker.
pub struct AppState {
    pub authenticator: Authenticator,
    pub products: EntityService<Product>,
    pub accessories: EntityService<Accessory>,
    pub notifications: EntityService<Notification>,
    pub partners: EntityService<Partner>,
    pub redemption_levels: EntityService<RedemptionLevel>,
    pub orders: OrderService,
    pub reports: ReportService,
    pub raffles: RaffleService,
    pub users: UserService,
    pub support: SupportService,
    pub storage: Arc<dyn ObjectStorage>,
    pub feed: ChangeFeed,
}

impl AppState {
    pub fn new(adapters: Adapters, feed: ChangeFeed, offset: FixedOffset) -> Self {
        let Adapters {
            identity,
            users,
            products,
            accessories,
            notifications,
            partners,
            redemption_levels,
            orders,
            raffles,
            support,
            storage,
        } = adapters;
        Self {
            authenticator: Authenticator::new(identity, users.clone()),
            products: EntityService::new(products, storage.clone()),
            accessories: EntityService::new(accessories, storage.clone()),
            notifications: EntityService::new(notifications, storage.clone()),
            partners: EntityService::new(partners, storage.clone()),
            redemption_levels: EntityService::new(redemption_levels, storage.clone()),
            orders: OrderService::new(orders.clone(), users.clone(), offset),
            reports: ReportService::new(orders, users.clone(), offset),
            raffles: RaffleService::new(raffles, users.clone(), storage.clone()),
            users: UserService::new(users, offset),
            support: SupportService::new(support),
            storage,
            feed,
        }
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
