use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::{OrderQuery, ORDERS_PER_PAGE};
use crate::application::session::Session;
use crate::domain::order::{Order, OrderLineItem, OrderStatus, OrderView};
use crate::errors::AppError;
use crate::handlers::session::AdminSession;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: Option<String>,
    pub total_amount: String,
    pub status: String,
    pub status_label: String,
    pub payment_method_label: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderLineItem> for OrderItemResponse {
    fn from(item: OrderLineItem) -> Self {
        Self {
            id: item.id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.unit_price.to_string(),
        }
    }
}

impl OrderResponse {
    fn new(order: Order, user_email: Option<String>, items: Vec<OrderLineItem>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            user_email,
            total_amount: order.total_amount.to_string(),
            status: order.status.as_str().to_owned(),
            status_label: order.status.label().to_owned(),
            payment_method_label: order.payment_method.label().to_owned(),
            created_at: order.created_at.to_rfc3339(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        Self::new(view.order, view.user_email, view.items)
    }
}

// ── Pagination and filters ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// pending, completed or cancelled
    pub status: Option<String>,
    /// First local calendar day included (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last local calendar day included (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// pending, completed or cancelled
    pub status: String,
}

/// "" and "all" mean no status filter.
fn parse_status(raw: Option<&str>) -> Result<Option<OrderStatus>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => Ok(Some(s.parse::<OrderStatus>()?)),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Returns a page of orders with their line items. Admins see every order
/// and the customer's email; other users only their own orders.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 422, description = "Unknown status filter"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    session: Session,
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let query = OrderQuery {
        status: parse_status(params.status.as_deref())?,
        from: params.from,
        to: params.to,
        page: params.page.max(1),
    };
    let page = query.page;

    let result = web::block(move || state.orders.list_orders(&session, &query)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page,
        limit: ORDERS_PER_PAGE,
    }))
}

/// GET /orders/{id}
///
/// Returns the order together with its line items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let view = web::block(move || state.orders.get_order(&session, order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(view)))
}

/// PATCH /orders/{id}/status
///
/// Any status may move to any other status.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    session: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status: OrderStatus = body.status.trim().parse()?;
    let order = web::block(move || state.orders.update_status(&session, order_id, status)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::new(order, None, Vec::new())))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::order::PaymentMethod;
    use crate::handlers::configure;
    use crate::testing::{bearer, Harness, MemoryOrders, ADMIN_TOKEN, MEMBER_TOKEN};

    fn view(user_id: Uuid, total: i32) -> OrderView {
        let id = Uuid::new_v4();
        OrderView {
            order: Order {
                id,
                user_id,
                total_amount: BigDecimal::from(total),
                status: OrderStatus::Pending,
                payment_method: PaymentMethod::Pix,
                created_at: Utc::now(),
            },
            user_email: None,
            items: vec![OrderLineItem {
                id: Uuid::new_v4(),
                order_id: id,
                product_name: "Botijão P13".into(),
                quantity: 1,
                unit_price: BigDecimal::from(total),
            }],
        }
    }

    fn harness() -> (Harness, Uuid) {
        let harness = Harness::with_orders(|admin, member| {
            MemoryOrders::with(vec![view(member.id, 120), view(admin.id, 60)], vec![])
        });
        let member = harness.member.id;
        (harness, member)
    }

    #[::core::prelude::v1::test]
    fn status_filter_accepts_all_and_blank() {
        assert_eq!(parse_status(Some("all")).unwrap(), None);
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("completed")).unwrap(), Some(OrderStatus::Completed));
        assert!(parse_status(Some("shipped")).is_err());
    }

    #[actix_web::test]
    async fn members_only_see_their_own_orders() {
        let (harness, member) = harness();
        let app = test::init_service(App::new().app_data(harness.state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/orders")
            .insert_header(bearer(MEMBER_TOKEN))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["items"][0]["user_id"], json!(member));
        assert!(page["items"][0]["user_email"].is_null());
        assert_eq!(page["items"][0]["status_label"], "A Caminho");
        assert_eq!(page["items"][0]["payment_method_label"], "PIX");

        let req = test::TestRequest::get()
            .uri("/orders")
            .insert_header(bearer(ADMIN_TOKEN))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["total"], 2);
        assert_eq!(page["limit"], 10);
        let emails: Vec<&str> = page["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|o| o["user_email"].as_str())
            .collect();
        assert_eq!(emails.len(), 2);
    }

    #[actix_web::test]
    async fn only_admins_change_status() {
        let (harness, _) = harness();
        let state = harness.state();
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/orders")
            .insert_header(bearer(MEMBER_TOKEN))
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        let id = page["items"][0]["id"].as_str().unwrap().to_owned();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{id}/status"))
            .insert_header(bearer(MEMBER_TOKEN))
            .set_json(json!({ "status": "completed" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{id}/status"))
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({ "status": "completed" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "completed");
        assert_eq!(updated["status_label"], "Entregue");

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{id}"))
            .insert_header(bearer(MEMBER_TOKEN))
            .to_request();
        let order: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(order["status"], "completed");
        assert_eq!(order["items"][0]["product_name"], "Botijão P13");
    }
}
