pub mod entities;
pub mod events;
pub mod orders;
pub mod raffles;
pub mod reports;
pub mod session;
pub mod storage;
pub mod support;
pub mod users;

use actix_web::{error, web, HttpRequest};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::catalog::{Accessory, Product};
use crate::domain::marketing::{Notification, Partner, RedemptionLevel};
use crate::errors::AppError;

/// Inline base64 images need room above actix's 32 KiB default.
const JSON_LIMIT: usize = 16 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::get_order,
        orders::update_status,
        reports::revenue_by_category,
        reports::top_products,
        reports::orders_daily,
        reports::summary,
        raffles::list_raffles,
        raffles::create_raffle,
        raffles::delete_raffle,
        raffles::list_participants,
        raffles::draw_winner,
        support::open_ticket,
        support::request_data_deletion,
    ),
    components(schemas(
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::ListOrdersResponse,
        orders::UpdateStatusRequest,
        reports::SummaryRowResponse,
        reports::TopProductsResponse,
        reports::DailyBucketResponse,
        reports::SummaryResponse,
        raffles::CreateRaffleRequest,
        raffles::RaffleResponse,
        raffles::RaffleBoardResponse,
        raffles::CreatedRaffleResponse,
        raffles::ParticipantResponse,
        raffles::DrawResponse,
        entities::ImagePayload,
        support::TicketRequest,
        support::DataDeletionRequest,
        support::TicketResponse,
    )),
    tags(
        (name = "orders", description = "Order management"),
        (name = "reports", description = "Sales and user reports"),
        (name = "raffles", description = "Raffles and winner draws"),
        (name = "support", description = "Public support requests"),
    )
)]
pub struct ApiDoc;

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Registers every route. Shared by `build_server` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(json_error),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .app_data(web::PathConfig::default().error_handler(path_error))
    .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
    .service(entities::scope::<Product>("/products"))
    .service(entities::scope::<Accessory>("/accessories"))
    .service(entities::scope::<Notification>("/notifications"))
    .service(entities::scope::<Partner>("/partners"))
    .service(entities::scope::<RedemptionLevel>("/redemption-levels"))
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/status", web::patch().to(orders::update_status)),
    )
    .service(
        web::scope("/reports")
            .route("/revenue-by-category", web::get().to(reports::revenue_by_category))
            .route("/top-products", web::get().to(reports::top_products))
            .route("/orders-daily", web::get().to(reports::orders_daily))
            .route("/summary", web::get().to(reports::summary)),
    )
    .service(
        web::scope("/raffles")
            .route("", web::get().to(raffles::list_raffles))
            .route("", web::post().to(raffles::create_raffle))
            .route("/{id}", web::delete().to(raffles::delete_raffle))
            .route("/{id}/participants", web::get().to(raffles::list_participants))
            .route("/{id}/draw", web::post().to(raffles::draw_winner)),
    )
    .service(web::scope("/users").route("", web::get().to(users::list_users)))
    .service(
        web::scope("/support")
            .route("/tickets", web::post().to(support::open_ticket))
            .route("/data-deletion", web::post().to(support::request_data_deletion)),
    )
    .service(
        web::scope("/events")
            .route("/orders", web::get().to(events::order_alerts))
            .route("/points", web::get().to(events::points_updates)),
    )
    .route("/storage/{bucket}/{path:.*}", web::get().to(storage::serve_object));
}
